use std::fmt::Display;

use serde::{Deserialize, Serialize};
use shop_payment_engine::db_types::CartItem;

/// One line of an incoming checkout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// The body of `POST /api/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    /// Shape checks only, reporting every violation in the cart at once. Whether the products exist
    /// and carry enough stock is the engine's call, made inside the reservation transaction.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("Cart cannot be empty".to_string());
        }
        let mut violations = Vec::new();
        for item in &self.items {
            if item.product_id < 1 {
                violations.push(format!("{} is not a valid product id", item.product_id));
            }
            if item.quantity < 1 {
                violations.push(format!("Quantity for product {} must be at least 1", item.product_id));
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations.join("; "))
        }
    }

    pub fn to_cart(&self) -> Vec<CartItem> {
        self.items.iter().map(|i| CartItem { product_id: i.product_id, quantity: i.quantity }).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

use log::*;
use shop_common::Rupiah;

use crate::MidtransApiError;

/// Recover the local order id from a gateway order reference.
///
/// References sent to Midtrans are either the bare order id ("41") or the id
/// with a timestamp suffix ("41-1712345678") when a fresh token was issued
/// for an existing order. The local id is the numeric prefix before the
/// first `-`.
pub fn extract_order_ref(order_ref: &str) -> Result<i64, MidtransApiError> {
    let prefix = order_ref.split('-').next().unwrap_or("");
    prefix.trim().parse::<i64>().map_err(|_| MidtransApiError::InvalidOrderRef(order_ref.to_string()))
}

/// Midtrans expresses amounts as decimal strings ("250000.00"). IDR has no
/// sub-unit, so the fractional part is dropped. Absent or garbled values
/// fall back to zero.
pub fn parse_gross_amount(amount: Option<&str>) -> Rupiah {
    let raw = match amount {
        Some(raw) => raw,
        None => return Rupiah::default(),
    };
    match raw.trim().split('.').next().unwrap_or("").parse::<i64>() {
        Ok(v) => Rupiah::from(v),
        Err(_) => {
            warn!("Could not parse gross_amount '{raw}'. Defaulting to 0");
            Rupiah::default()
        },
    }
}

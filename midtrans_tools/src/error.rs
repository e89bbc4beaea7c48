use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidtransApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the payment gateway: {0}")]
    Transport(String),
    #[error("The payment gateway did not respond in time")]
    Timeout,
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Snap request rejected. Error {status}. {message}")]
    SnapError { status: u16, message: String },
    #[error("Invalid order reference: {0}")]
    InvalidOrderRef(String),
}

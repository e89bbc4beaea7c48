mod helpers;
mod rupiah;

pub mod op;
mod secret;

pub use helpers::parse_boolean_flag;
pub use rupiah::{Rupiah, RupiahConversionError, IDR_CURRENCY_CODE, IDR_CURRENCY_CODE_LOWER};
pub use secret::Secret;

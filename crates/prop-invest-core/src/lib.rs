pub mod calculators;
pub mod error;
pub mod numeric;
pub mod recommendation;
pub mod service;
pub mod time_value;
pub mod types;

pub use error::PropInvestError;
pub use types::*;

/// Standard result type for all engine operations
pub type PropInvestResult<T> = Result<T, PropInvestError>;

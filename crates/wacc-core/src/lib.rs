pub mod aggregate;
pub mod cost_of_capital;
pub mod error;
pub mod forensic;
pub mod instruments;
pub mod pipeline;
pub mod types;
pub mod validation;
pub mod weighting;

pub use error::WaccError;
pub use instruments::{Instrument, InstrumentMap};
pub use types::*;

/// Standard result type for all WACC operations
pub type WaccResult<T> = Result<T, WaccError>;

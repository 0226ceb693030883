use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaccError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Length mismatch: {costs} costs but {weights} weights")]
    LengthMismatch { costs: usize, weights: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for WaccError {
    fn from(e: serde_json::Error) -> Self {
        WaccError::SerializationError(e.to_string())
    }
}

impl WaccError {
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        WaccError::Overflow {
            context: context.into(),
        }
    }
}

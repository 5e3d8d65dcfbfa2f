use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MortgageError {
    /// A monetary amount that must be zero or greater was negative.
    pub fn negative_amount(field: &str) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: "Amount cannot be negative".into(),
        }
    }

    /// A rate expressed in percent was below zero.
    pub fn negative_rate(field: &str) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: "Rate cannot be negative".into(),
        }
    }

    /// A count (term, month index) that must be at least one was zero.
    pub fn non_positive(field: &str) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: "Must be greater than zero".into(),
        }
    }

    pub fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}

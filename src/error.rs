//! Error types for input validation and loading

use thiserror::Error;

/// Validation failures surfaced before a simulation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("at least one loan is required")]
    NoLoans,

    #[error("loan {index}: principal must be positive, got {value}")]
    NonPositivePrincipal { index: usize, value: f64 },

    #[error("loan {index}: term must be at least one year")]
    ZeroTerm { index: usize },

    #[error("loan {index}: annual rate must be non-negative, got {value}%")]
    NegativeRate { index: usize, value: f64 },

    #[error("invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The fixed installment never covers the interest, so the balance cannot shrink
    #[error("loan {index}: installment {installment:.2} does not cover first-month interest {interest:.2}")]
    NonAmortizing {
        index: usize,
        installment: f64,
        interest: f64,
    },
}

impl SimulationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures while reading loan tables or household files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown loan kind: {0}")]
    UnknownLoanKind(String),

    #[error("unknown prepayment strategy: {0}")]
    UnknownStrategy(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

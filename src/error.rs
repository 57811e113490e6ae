use rust_decimal::Decimal;
use thiserror::Error;

/// Result type returned by every calculation in this crate.
pub type Result<T> = std::result::Result<T, FinanceError>;

/// Failures reported by the calculation core.
///
/// Every variant is detected before any computed field is written, so a caller
/// never observes a partially updated value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinanceError {
    /// A field precondition was violated, or an amount overflowed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The monthly payment cannot retire the principal.
    #[error("monthly payment {payment} does not cover the first month's interest of {interest}")]
    NonConvergent { payment: Decimal, interest: Decimal },
}

impl FinanceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FinanceError::InvalidInput(message.into())
    }

    /// An amount that no longer fits in a `Decimal`.
    pub(crate) fn overflow(what: &str) -> Self {
        FinanceError::InvalidInput(format!("{what} is too large to calculate"))
    }
}

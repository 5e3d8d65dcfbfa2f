pub mod calendar;
pub mod error;
pub mod loan;
pub mod payment;
pub mod time_value;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "affordability")]
pub mod affordability;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "rates")]
pub mod rates;

pub use error::MortgageError;
pub use loan::{CarryingCosts, LoanTerms};
pub use types::*;

/// Standard result type for all mortgage operations
pub type MortgageResult<T> = Result<T, MortgageError>;

pub mod affordability;
pub mod compare;
pub mod payment;
pub mod rates;
pub mod schedule;

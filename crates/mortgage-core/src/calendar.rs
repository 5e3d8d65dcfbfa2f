use chrono::{Months, NaiveDate};

use crate::error::MortgageError;
use crate::MortgageResult;

/// Add whole calendar months to a date.
///
/// The day of month is clamped to the last day of the target month, so
/// 31 January plus one month is 28 (or 29) February. Returns `None` when the
/// result falls outside chrono's representable range.
pub fn add_months(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months))
}

/// Date of the `month_index`-th payment (1-based) for a loan starting on
/// `start`. The first payment falls on the start date itself.
pub fn payment_date(start: NaiveDate, month_index: u32) -> MortgageResult<NaiveDate> {
    if month_index == 0 {
        return Err(MortgageError::non_positive("month_index"));
    }
    add_months(start, month_index - 1).ok_or_else(|| {
        MortgageError::DateError(format!(
            "Payment {month_index} from {start} is beyond the supported calendar range"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_rolls_year() {
        assert_eq!(add_months(date(2024, 11, 15), 3), Some(date(2025, 2, 15)));
    }

    #[test]
    fn test_add_months_clamps_short_month() {
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        // Clamping does not stick: later months return to the 31st
        assert_eq!(add_months(date(2024, 1, 31), 2), Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_payment_date_first_is_start() {
        assert_eq!(payment_date(date(2025, 6, 1), 1).unwrap(), date(2025, 6, 1));
        assert_eq!(payment_date(date(2025, 6, 1), 360).unwrap(), date(2055, 5, 1));
    }

    #[test]
    fn test_payment_date_zero_index() {
        assert!(payment_date(date(2025, 6, 1), 0).is_err());
    }

    #[test]
    fn test_payment_date_out_of_range() {
        assert!(matches!(
            payment_date(NaiveDate::MAX, 2),
            Err(MortgageError::DateError(_))
        ));
    }
}

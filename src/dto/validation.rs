//! Validation helpers for DTOs.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use validator::ValidationError;

/// `YYYY-MM-DD`, the only date shape the setlist calendar understands.
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Validates that a setlist date is a real calendar date in `YYYY-MM-DD` form.
pub fn validate_date(date: &str) -> Result<(), ValidationError> {
    if Date::parse(date, DATE_FORMAT).is_err() {
        let mut err = ValidationError::new("date_format");
        err.message = Some(format!("`{date}` is not a valid YYYY-MM-DD date").into());
        return Err(err);
    }
    Ok(())
}

/// Validates a calendar month filter in `YYYY-MM` form.
pub fn validate_month(month: &str) -> Result<(), ValidationError> {
    let bytes = month.as_bytes();
    let shape_ok = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit);
    let month_ok = shape_ok && matches!(month[5..].parse::<u8>(), Ok(1..=12));

    if !month_ok {
        let mut err = ValidationError::new("month_format");
        err.message = Some(format!("`{month}` is not a valid YYYY-MM month").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_dates() {
        assert!(validate_date("2026-08-07").is_ok());
        assert!(validate_date("2024-02-29").is_ok());
    }

    #[test]
    fn rejects_malformed_or_impossible_dates() {
        assert!(validate_date("2026-8-7").is_err()); // missing zero padding
        assert!(validate_date("2026-13-01").is_err()); // month 13
        assert!(validate_date("2025-02-29").is_err()); // not a leap year
        assert!(validate_date("next friday").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn accepts_real_months() {
        assert!(validate_month("2026-01").is_ok());
        assert!(validate_month("2026-12").is_ok());
    }

    #[test]
    fn rejects_malformed_months() {
        assert!(validate_month("2026-00").is_err());
        assert!(validate_month("2026-13").is_err());
        assert!(validate_month("2026-1").is_err());
        assert!(validate_month("202601").is_err());
        assert!(validate_month("2026-01-05").is_err());
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for due-date parsing and formatting.

use crate::error::AppError;
use chrono::NaiveDate;

/// Date format users type in task messages.
const USER_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a user-supplied `DD-MM-YYYY` due date.
///
/// Only a bare calendar date is accepted; anything with a time component,
/// a different field order, or an impossible date (e.g. `31-02-2025`) is
/// rejected.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input.trim(), USER_DATE_FORMAT)
        .map_err(|_| AppError::InvalidDate(input.trim().to_string()))
}

/// Render a calendar date the way Google Tasks stores due dates:
/// midnight UTC with milliseconds and a `Z` suffix.
pub fn to_midnight_utc(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Render a calendar date back into the user-facing `DD-MM-YYYY` form.
pub fn format_user_date(date: NaiveDate) -> String {
    date.format(USER_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date_valid() {
        let date = parse_due_date("01-03-2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_due_date_trims_whitespace() {
        assert!(parse_due_date("  28-12-2025 ").is_ok());
    }

    #[test]
    fn test_parse_due_date_rejects_impossible_calendar_date() {
        assert!(matches!(
            parse_due_date("31-02-2025"),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_due_date_rejects_wrong_field_order() {
        assert!(matches!(
            parse_due_date("2025-02-31"),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_due_date_rejects_time_component() {
        assert!(parse_due_date("01-03-2025 10:30").is_err());
    }

    #[test]
    fn test_to_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(to_midnight_utc(date), "2025-03-01T00:00:00.000Z");
    }

    #[test]
    fn test_format_user_date_round_trip() {
        let date = parse_due_date("05-01-2026").unwrap();
        assert_eq!(format_user_date(date), "05-01-2026");
    }
}

//! Shared field checks used by model validation

use chrono::{NaiveDate, NaiveTime};

/// Check that a string looks like `local@domain.tld`
///
/// This is a shape check, not RFC 5322 parsing.
///
/// # Examples
///
/// ```
/// use cova_db::utils::is_valid_email;
///
/// assert!(is_valid_email("a@x.com"));
/// assert!(!is_valid_email("a@x"));
/// assert!(!is_valid_email("@x.com"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.starts_with('.'),
        None => false,
    }
}

/// Lowercase the domain part of an email address
///
/// The local part is kept as given.
///
/// # Examples
///
/// ```
/// use cova_db::utils::normalize_email;
///
/// assert_eq!(normalize_email("Ada@Example.COM"), "Ada@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Reject negative and non-finite amounts
pub fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a non-negative number", field));
    }
    Ok(())
}

/// Booking dates are `YYYY-MM-DD`
pub fn check_booking_date(date: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("date must be YYYY-MM-DD, got '{}'", date))
}

/// Booking times are `HH:MM`
pub fn check_booking_time(time: &str) -> Result<(), String> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| format!("time must be HH:MM, got '{}'", time))
}

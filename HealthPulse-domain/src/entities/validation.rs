//! Custom field validators shared by the request entities

use std::borrow::Cow;

use validator::ValidationError;

pub const GENDERS: [&str; 4] = ["male", "female", "other", "prefer_not_to_say"];

pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_gender(value: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&value) {
        Ok(())
    } else {
        Err(invalid("gender", format!("Gender must be one of: {}", GENDERS.join(", "))))
    }
}

pub fn validate_blood_type(value: &str) -> Result<(), ValidationError> {
    if BLOOD_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(invalid("blood_type", format!("Blood type must be one of: {}", BLOOD_TYPES.join(", "))))
    }
}

/// Accepts digits with an optional leading `+`, spaces, dashes and parentheses
pub fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') || (c == '+' && i == 0));

    if allowed && (5..=20).contains(&digits) {
        Ok(())
    } else {
        Err(invalid("phone", "Phone number must contain 5 to 20 digits"))
    }
}

/// Free-text list entries (allergies, conditions). Blank entries are
/// dropped later, so only length is checked here.
pub fn validate_list_entries(values: &[String]) -> Result<(), ValidationError> {
    if values.len() > 50 {
        return Err(invalid("list", "No more than 50 entries are allowed"));
    }
    if values.iter().any(|v| v.trim().chars().count() > 100) {
        return Err(invalid("list", "Entries cannot exceed 100 characters"));
    }
    Ok(())
}

/// Schedule times use 24-hour `HH:MM`
pub fn validate_times_of_day(values: &[String]) -> Result<(), ValidationError> {
    if values.len() > 12 {
        return Err(invalid("time_of_day", "No more than 12 scheduled times are allowed"));
    }
    if values.iter().all(|v| is_time_of_day(v)) {
        Ok(())
    } else {
        Err(invalid("time_of_day", "Times must use the 24-hour HH:MM format"))
    }
}

fn is_time_of_day(value: &str) -> bool {
    match value.split_once(':') {
        Some((h, m)) if h.len() == 2 && m.len() == 2 => {
            matches!((h.parse::<u8>(), m.parse::<u8>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
        }
        _ => false,
    }
}

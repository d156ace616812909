//! Login form validation.

use once_cell::sync::Lazy;
use regex::Regex;

use super::FieldErrors;

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|regex| regex.is_match(email))
}

/// Both fields must be present and not blank.
///
/// # Errors
/// Returns the messages for each blank field.
pub fn require_fields(email: Option<&str>, password: Option<&str>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if is_blank(email) {
        errors.add("email", "The email field is required.");
    }
    if is_blank(password) {
        errors.add("password", "The password field is required.");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Full check of a submitted login form.
///
/// # Errors
/// Returns the messages for each invalid field.
pub fn validate_login(email: Option<&str>, password: Option<&str>) -> Result<(), FieldErrors> {
    let mut errors = match require_fields(email, password) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };
    if let Some(email) = email.map(str::trim).filter(|email| !email.is_empty()) {
        if !valid_email(email) {
            errors.add("email", "The email must be a valid email address.");
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

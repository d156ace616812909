use serde::Serialize;
use std::collections::BTreeMap;

pub const FAILED_MESSAGE: &str = "These credentials do not match our records.";

#[must_use]
pub fn throttle_message(remaining_seconds: u64) -> String {
    format!("Too many login attempts. Please try again in {remaining_seconds} seconds.")
}

/// Validation messages keyed by form field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// How a login attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Carries the subject id now bound to the session.
    Authenticated(String),
    InvalidCredentials,
    LockedOut { remaining_seconds: u64 },
    InvalidInput(FieldErrors),
    /// A collaborator failed. Nothing was counted; the caller may retry.
    TransientFailure,
}

impl LoginOutcome {
    /// Errors to show next to the form, empty on success.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::Authenticated(_) => FieldErrors::new(),
            Self::InvalidCredentials => FieldErrors::single("email", FAILED_MESSAGE),
            Self::LockedOut { remaining_seconds } => {
                FieldErrors::single("email", throttle_message(*remaining_seconds))
            }
            Self::InvalidInput(errors) => errors.clone(),
            Self::TransientFailure => FieldErrors::single(
                "email",
                "The login service is temporarily unavailable. Please try again.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_serialize_as_plain_map() -> Result<(), serde_json::Error> {
        let mut errors = FieldErrors::new();
        errors.add("email", "The email field is required.");
        errors.add("password", "The password field is required.");
        assert_eq!(
            serde_json::to_value(&errors)?,
            serde_json::json!({
                "email": ["The email field is required."],
                "password": ["The password field is required."],
            })
        );
        Ok(())
    }

    #[test]
    fn lockout_message_names_remaining_seconds() {
        let errors = LoginOutcome::LockedOut {
            remaining_seconds: 42,
        }
        .field_errors();
        assert_eq!(
            errors.get("email"),
            ["Too many login attempts. Please try again in 42 seconds."]
        );
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        let errors = LoginOutcome::InvalidCredentials.field_errors();
        assert_eq!(errors.get("email"), [FAILED_MESSAGE]);
        assert!(errors.get("password").is_empty());
    }
}

//! Call-back request form and its field validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Characters a customer name may not contain.
pub const FORBIDDEN_NAME_CHARS: &[char] = &['!', '>', '?', '<', '_', '-', '$', '№', '#', '@'];

const REQUIRED: &str = "field is required";

/// A "call me back" request as submitted by the storefront modal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A call-back request whose fields passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidCallback {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Validate a customer name.
///
/// # Errors
///
/// Returns the message shown next to the field.
pub fn validate_name(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }
    if value.contains(FORBIDDEN_NAME_CHARS) {
        return Err("Text should not contain !>?<_-$№#@ symbols".to_string());
    }
    Ok(())
}

/// Validate a phone number: an optional leading `+`, then digits and dashes.
///
/// # Errors
///
/// Returns the message shown next to the field.
pub fn validate_phone(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err("Invalid phone number".to_string());
    }
    Ok(())
}

impl CallbackRequest {
    /// Validate every field, collecting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<ValidCallback, FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Err(message) = validate_name(&self.name) {
            errors.insert("name", message);
        }
        if let Err(message) = validate_phone(&self.phone) {
            errors.insert("phone", message);
        }

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.insert("email", "Invalid email".to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidCallback {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email,
            message: self
                .message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        })
    }
}

//! Visitor preferences and call-back requests.
//!
//! Both live on the same key-value surface as the basket: the theme under
//! `isDarkMode`, the last call-back request under `userData`.

use chrono::{DateTime, Utc};
use mebel_core::{CallbackRequest, FieldErrors, ValidCallback};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Read the theme preference. Missing or unreadable values mean light mode.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn dark_mode(storage: &dyn KeyValueStore) -> Result<bool, StorageError> {
    let Some(text) = storage.get(keys::DARK_MODE)? else {
        return Ok(false);
    };
    Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
        tracing::warn!(value = %text, error = %e, "Malformed theme preference, using light mode");
        false
    }))
}

/// Flip the theme preference and return the new value.
///
/// # Errors
///
/// Returns an error if the backend cannot be read or written.
pub fn toggle_theme(storage: &dyn KeyValueStore) -> Result<bool, StorageError> {
    let dark = !dark_mode(storage)?;
    storage.set(keys::DARK_MODE, if dark { "true" } else { "false" })?;
    tracing::debug!(dark, "Theme toggled");
    Ok(dark)
}

/// Errors from submitting a call-back request.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// One or more fields failed validation.
    #[error("invalid call-back request")]
    Invalid(FieldErrors),

    /// The request could not be cached.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A validated call-back request as cached under `userData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedCallback {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmittedCallback {
    fn new(callback: ValidCallback, submitted_at: DateTime<Utc>) -> Self {
        Self {
            name: callback.name,
            phone: callback.phone,
            email: callback.email.map(|email| email.to_string()),
            message: callback.message,
            submitted_at,
        }
    }
}

/// Validate a call-back request and cache it.
///
/// # Errors
///
/// Returns [`CallbackError::Invalid`] with per-field messages, or
/// [`CallbackError::Storage`] if the request could not be cached.
pub fn submit_callback(
    storage: &dyn KeyValueStore,
    request: &CallbackRequest,
) -> Result<SubmittedCallback, CallbackError> {
    let valid = request.validate().map_err(|errors| {
        tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Call-back request rejected");
        CallbackError::Invalid(errors)
    })?;

    let submitted = SubmittedCallback::new(valid, Utc::now());
    let text = serde_json::to_string(&submitted).map_err(StorageError::from)?;
    storage.set(keys::USER_DATA, &text)?;

    // Contact details stay out of logs; they reach Sentry as breadcrumbs.
    tracing::info!(
        has_email = submitted.email.is_some(),
        has_message = submitted.message.is_some(),
        "Call-back requested"
    );
    Ok(submitted)
}

/// The last cached call-back request, if any, used to prefill the form.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn last_callback(storage: &dyn KeyValueStore) -> Result<Option<SubmittedCallback>, StorageError> {
    let Some(text) = storage.get(keys::USER_DATA)? else {
        return Ok(None);
    };
    match serde_json::from_str(&text) {
        Ok(callback) => Ok(Some(callback)),
        Err(e) => {
            tracing::warn!(error = %e, "Malformed cached call-back request ignored");
            Ok(None)
        }
    }
}

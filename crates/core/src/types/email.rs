//! E-mail address left on the call-back form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not an acceptable e-mail address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {0} characters")]
    TooLong(usize),
    /// Not of the shape `local@domain.tld`.
    #[error("email is malformed: {0}")]
    Malformed(&'static str),
}

/// A syntactically plausible e-mail address.
///
/// The form accepts `local@domain.tld` where the top-level domain is two to
/// four ASCII letters. No deliverability checks are made.
///
/// ```
/// use mebel_core::Email;
///
/// assert!(Email::parse("ivan@mail.ru").is_ok());
/// assert!(Email::parse("ivan@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse and trim an address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first problem found.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong(Self::MAX_LENGTH));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed("contains whitespace"));
        }

        let Some((local, domain)) = s.split_once('@') else {
            return Err(EmailError::Malformed("missing @"));
        };
        if local.is_empty() || domain.contains('@') {
            return Err(EmailError::Malformed("expected exactly one local part"));
        }

        let (host, tld) = domain
            .rsplit_once('.')
            .ok_or(EmailError::Malformed("missing top-level domain"))?;
        if host.is_empty()
            || !(2..=4).contains(&tld.len())
            || !tld.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(EmailError::Malformed("missing top-level domain"));
        }

        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

//! Structural validation of submitted credentials
//!
//! Runs before any hashing or store access. A failure carries the offending
//! field and the rule it broke so the HTTP layer can report it without
//! leaking anything else.

use serde::Deserialize;
use std::fmt;
use validator::Validate;

/// Inclusive password length bounds, counted in characters
pub const PASSWORD_MIN_CHARS: u64 = 5;
/// See [`PASSWORD_MIN_CHARS`]
pub const PASSWORD_MAX_CHARS: u64 = 20;

/// Email and password as submitted to register or login
///
/// `Debug` output never includes the password.
#[derive(Clone, Deserialize, Validate)]
pub struct Credentials {
    /// Email address
    #[serde(default)]
    #[validate(email)]
    pub email: String,

    /// Plaintext password
    #[serde(default)]
    #[validate(length(min = PASSWORD_MIN_CHARS, max = PASSWORD_MAX_CHARS))]
    pub password: String,
}

impl Credentials {
    /// Convenience constructor
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Rule a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field missing or empty
    Required,
    /// Not a well-formed email address
    Email,
    /// Character count outside the inclusive bounds
    Length {
        /// Minimum characters
        min: u64,
        /// Maximum characters
        max: u64,
    },
}

/// First validation failure found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Offending field name
    pub field: &'static str,
    /// Rule that failed
    pub rule: Rule,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::Required => write!(f, "{} is required", self.field),
            Rule::Email => write!(f, "{} must be a valid email address", self.field),
            Rule::Length { min, max } => write!(
                f,
                "{} must be between {min} and {max} characters",
                self.field
            ),
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// Validate credentials, reporting the first failing field (email first)
///
/// Within a field, presence is checked before format or length.
///
/// # Errors
///
/// Returns the [`ValidationFailure`] for the first broken rule.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationFailure> {
    if credentials.email.trim().is_empty() {
        return Err(ValidationFailure {
            field: "email",
            rule: Rule::Required,
        });
    }

    let errors = credentials.validate().err();
    let broken = |field: &str| {
        errors
            .as_ref()
            .is_some_and(|e| e.field_errors().contains_key(field))
    };

    if broken("email") {
        return Err(ValidationFailure {
            field: "email",
            rule: Rule::Email,
        });
    }
    if credentials.password.is_empty() {
        return Err(ValidationFailure {
            field: "password",
            rule: Rule::Required,
        });
    }
    if broken("password") {
        return Err(ValidationFailure {
            field: "password",
            rule: Rule::Length {
                min: PASSWORD_MIN_CHARS,
                max: PASSWORD_MAX_CHARS,
            },
        });
    }
    Ok(())
}

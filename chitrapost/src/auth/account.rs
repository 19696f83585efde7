//! Account model
//!
//! # Database Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id BIGSERIAL PRIMARY KEY,
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use validator::Validate;

/// Store-assigned account identifier
pub type AccountId = i64;

/// Rejected email address
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid email address: {0}")]
pub struct InvalidEmail(pub String);

/// Email address newtype
///
/// Always well-formed and normalised to lowercase, so uniqueness at the
/// store is case-insensitive.
///
/// # Example
///
/// ```rust
/// use chitrapost::auth::EmailAddress;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let email = EmailAddress::parse("A@X.com")?;
/// assert_eq!(email.as_str(), "a@x.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalise an email address
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEmail`] if the address is not well-formed.
    pub fn parse(email: impl Into<String>) -> Result<Self, InvalidEmail> {
        #[derive(Validate)]
        struct EmailField {
            #[validate(email)]
            email: String,
        }

        let email = email.into();
        let field = EmailField {
            email: email.trim().to_lowercase(),
        };
        if field.validate().is_err() {
            return Err(InvalidEmail(email));
        }
        Ok(Self(field.email))
    }

    /// Get the email as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = InvalidEmail;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

/// A registered account
///
/// `password_hash` is write-only from the API's point of view and is skipped
/// on serialization.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    /// Account ID (primary key)
    pub id: AccountId,

    /// Unique, lowercase email address
    pub email: EmailAddress,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

//! Registration and login
//!
//! Both flows validate their input before touching the hasher or the store.
//! Login reports an unknown email and a wrong password identically.

use crate::auth::account::{Account, EmailAddress};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::token::{TokenError, TokenIssuer};
use crate::store::{AccountStore, StoreError};
use crate::validation::{validate_credentials, Credentials, Rule, ValidationFailure};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Registration and login failures
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input failed structural validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Email already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Hashing or verification could not run
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token could not be signed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Store failure
    #[error(transparent)]
    Store(StoreError),
}

/// Account registration and credential exchange
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Create a service with the default hasher
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenIssuer) -> Self {
        Self {
            accounts,
            hasher: PasswordHasher::new(),
            tokens,
        }
    }

    /// Replace the hasher
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Token issuer used by [`AccountService::login`]
    #[must_use]
    pub const fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// [`AccountError::Validation`] for bad input,
    /// [`AccountError::DuplicateEmail`] if the email is taken, otherwise
    /// internal failures.
    pub async fn register(&self, credentials: Credentials) -> Result<Account, AccountError> {
        validate_credentials(&credentials)?;
        let email = EmailAddress::parse(credentials.email).map_err(|_| ValidationFailure {
            field: "email",
            rule: Rule::Email,
        })?;

        let password_hash = self.hasher.hash_async(credentials.password).await?;
        let account = self
            .accounts
            .insert(&email, &password_hash)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey { .. } => AccountError::DuplicateEmail,
                other => AccountError::Store(other),
            })?;

        info!(account_id = account.id, email = %account.email, "account registered");
        Ok(account)
    }

    /// Exchange credentials for a signed token
    ///
    /// # Errors
    ///
    /// [`AccountError::Validation`] for bad input,
    /// [`AccountError::InvalidCredentials`] for an unknown email or wrong
    /// password, otherwise internal failures.
    pub async fn login(&self, credentials: Credentials) -> Result<String, AccountError> {
        validate_credentials(&credentials)?;
        let email = EmailAddress::parse(credentials.email)
            .map_err(|_| AccountError::InvalidCredentials)?;

        let account = match self.accounts.find_by_email(&email).await {
            Ok(account) => account,
            Err(StoreError::NotFound) => {
                debug!(%email, "login for unknown email");
                self.hasher.verify_decoy_async(credentials.password).await?;
                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => return Err(AccountError::Store(e)),
        };

        let matches = self
            .hasher
            .verify_async(credentials.password, account.password_hash)
            .await?;
        if !matches {
            debug!(account_id = account.id, "login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(account.id, account.email.as_str())?;
        info!(account_id = account.id, "login succeeded");
        Ok(token)
    }
}

//! Authentication
//!
//! - [`password`]: Argon2id credential hashing
//! - [`token`]: signed, stateless session tokens
//! - [`account`]: the account model
//! - [`service`]: registration and login
//! - [`extractors`]: the bearer-token extractor for handlers

pub mod account;
pub mod extractors;
pub mod password;
pub mod service;
pub mod token;

pub use account::{Account, AccountId, EmailAddress, InvalidEmail};
pub use extractors::Authenticated;
pub use password::{PasswordError, PasswordHashConfig, PasswordHasher};
pub use service::{AccountError, AccountService};
pub use token::{AuthFailure, Claims, TokenError, TokenIssuer};

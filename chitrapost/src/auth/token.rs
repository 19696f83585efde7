//! Stateless signed session tokens
//!
//! Tokens are HS256 JWTs carrying the account id, email and an absolute
//! expiry. Nothing is stored server-side: every protected request rebuilds
//! its [`Claims`] by checking signature and expiry against the server
//! secret.
//!
//! # Example
//!
//! ```rust
//! use chitrapost::auth::token::TokenIssuer;
//!
//! # fn example() -> anyhow::Result<()> {
//! let issuer = TokenIssuer::new(b"server-secret", TokenIssuer::DEFAULT_TTL)?;
//! let token = issuer.issue(42, "a@x.com")?;
//!
//! let claims = issuer.verify(&token)?;
//! assert_eq!(claims.id, 42);
//! assert_eq!(claims.email, "a@x.com");
//! # Ok(())
//! # }
//! ```

use crate::auth::account::AccountId;
use chrono::{DateTime, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identity facts embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub id: AccountId,
    /// Account email at issue time
    pub email: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Token construction errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// The signing secret is empty
    #[error("JWT secret must not be empty")]
    EmptySecret,

    /// The ttl does not fit a timestamp
    #[error("Token ttl out of range: {0:?}")]
    InvalidTtl(Duration),

    /// Encoding failed
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Why a token was rejected
///
/// Every variant is reported to the caller as the same unauthorized
/// response; the distinction exists for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Signature does not match the server secret
    #[error("bad signature")]
    BadSignature,
    /// Expiry has passed
    #[error("expired")]
    Expired,
    /// Not a parseable token, wrong algorithm, or missing bearer credential
    #[error("malformed")]
    Malformed,
}

impl AuthFailure {
    fn classify(err: &jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Issues and verifies tokens with a server-held HMAC secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Lifetime of a freshly issued token
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create an issuer for `secret`
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] for an empty secret and
    /// [`TokenError::InvalidTtl`] for a ttl that overflows a timestamp.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::InvalidTtl(ttl))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Issue a token valid from now for the configured ttl
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, id: AccountId, email: &str) -> Result<String, TokenError> {
        self.issue_at(id, email, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    ///
    /// Deterministic: the same inputs and `now` produce the same token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue_at(
        &self,
        id: AccountId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Check signature and expiry and return the embedded claims
    ///
    /// # Errors
    ///
    /// Returns the [`AuthFailure`] describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthFailure> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthFailure::classify(&e))
    }

    /// Verify the value of an `Authorization` header
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::Malformed`] when the value is not a bearer
    /// credential, otherwise whatever [`TokenIssuer::verify`] returns.
    pub fn verify_bearer(&self, header_value: &str) -> Result<Claims, AuthFailure> {
        let token = bearer_token(header_value).ok_or(AuthFailure::Malformed)?;
        self.verify(token)
    }
}

fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", TokenIssuer::DEFAULT_TTL).unwrap()
    }

    #[test]
    fn test_issue_then_verify_round_trips_identity() {
        let issuer = issuer();
        let token = issuer.issue(7, "a@x.com").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_issue_at_is_deterministic() {
        let issuer = issuer();
        let now = Utc::now();

        let first = issuer.issue_at(1, "a@x.com", now).unwrap();
        let second = issuer.issue_at(1, "a@x.com", now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupted_signature_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue(1, "a@x.com").unwrap();

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{head}.{}", String::from_utf8(bytes).unwrap());

        assert_eq!(issuer.verify(&tampered), Err(AuthFailure::BadSignature));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = issuer().issue(1, "a@x.com").unwrap();
        let other = TokenIssuer::new(b"other-secret", TokenIssuer::DEFAULT_TTL).unwrap();

        assert_eq!(other.verify(&token), Err(AuthFailure::BadSignature));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer();
        let issued = Utc::now() - chrono::Duration::hours(25);
        let token = issuer.issue_at(1, "a@x.com", issued).unwrap();

        assert_eq!(issuer.verify(&token), Err(AuthFailure::Expired));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let issuer = issuer();
        for input in ["", "abc", "a.b.c", "....", "\u{0}\u{1}", "Bearer x"] {
            assert_eq!(issuer.verify(input), Err(AuthFailure::Malformed), "input {input:?}");
        }
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = Claims {
            id: 1,
            email: "a@x.com".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(issuer().verify(&token), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_bearer_parsing() {
        let issuer = issuer();
        let token = issuer.issue(3, "b@x.com").unwrap();

        assert_eq!(issuer.verify_bearer(&format!("Bearer {token}")).unwrap().id, 3);
        assert_eq!(issuer.verify_bearer(&format!("bearer  {token}")).unwrap().id, 3);
        assert_eq!(issuer.verify_bearer(&token), Err(AuthFailure::Malformed));
        assert_eq!(issuer.verify_bearer("Basic Zm9vOmJhcg=="), Err(AuthFailure::Malformed));
        assert_eq!(issuer.verify_bearer("Bearer "), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            TokenIssuer::new(b"", TokenIssuer::DEFAULT_TTL),
            Err(TokenError::EmptySecret)
        ));
    }
}

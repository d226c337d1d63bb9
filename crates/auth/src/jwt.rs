use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Distinguishes the two token flavours; part of the signed payload.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Access or refresh
    pub kind: TokenKind,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims with the given subject, kind, and expiration duration in seconds
    pub fn new(subject: String, kind: TokenKind, expires_in_seconds: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(expires_in_seconds);

        Self {
            sub: subject,
            kind,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Access and refresh token returned by login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Signs and verifies access and refresh tokens with one HS256 secret.
///
/// The secret is handed in once at startup and never changes afterwards.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// # Arguments
    /// * `secret` - The secret key for signing tokens
    /// * `access_ttl_seconds` - Access token lifetime (e.g. 1800 for 30 minutes)
    /// * `refresh_ttl_seconds` - Refresh token lifetime (e.g. 604800 for 7 days)
    pub fn new(secret: &str, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn issue_access(&self, subject: &str) -> Result<String> {
        self.issue(subject, TokenKind::Access, self.access_ttl_seconds)
    }

    pub fn issue_refresh(&self, subject: &str) -> Result<String> {
        self.issue(subject, TokenKind::Refresh, self.refresh_ttl_seconds)
    }

    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
            token_type: "bearer".to_string(),
        })
    }

    fn issue(&self, subject: &str, kind: TokenKind, expires_in_seconds: i64) -> Result<String> {
        let claims = Claims::new(subject.to_string(), kind, expires_in_seconds);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate a token and return its claims.
    ///
    /// Bad signature, malformed input, expiry and a kind other than
    /// `expected` all fail with [`AuthError::InvalidToken`].
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.is_expired() {
            return Err(AuthError::InvalidToken);
        }

        if claims.kind != expected {
            tracing::debug!(?expected, actual = ?claims.kind, "token kind mismatch");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

//! HS256 session tokens.
//!
//! Tokens are stateless: nothing is stored server-side, so logout cannot
//! revoke one before its `exp`. Expiry is checked with zero leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use minutes_core::roles::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identity;
use crate::config::ConfigError;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the directory username.
    pub sub: String,
    pub prefix: String,
    pub fname: String,
    pub lname: String,
    pub role: Role,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4), recorded for audit correlation.
    pub jti: String,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.sub.clone(),
            prefix: self.prefix.clone(),
            fname: self.fname.clone(),
            lname: self.lname.clone(),
            role: self.role,
        }
    }
}

/// Why a token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("No bearer token supplied")]
    Missing,

    #[error("Token is malformed or its signature does not match")]
    Invalid,

    #[error("Token has expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in hours (default: 24).
    pub expiry_hours: i64,
}

/// Default token lifetime in hours.
const DEFAULT_EXPIRY_HOURS: i64 = 24;

impl JwtConfig {
    /// Load JWT configuration through a variable lookup.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_EXPIRY_HOURS` | no       | `24`    |
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let expiry_hours = match lookup("JWT_EXPIRY_HOURS").filter(|s| !s.trim().is_empty()) {
            None => DEFAULT_EXPIRY_HOURS,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: "JWT_EXPIRY_HOURS",
                        value: raw,
                        reason: "must be positive".into(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "JWT_EXPIRY_HOURS",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
        };

        Ok(Self {
            secret,
            expiry_hours,
        })
    }
}

/// Issues and verifies session tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime: Duration::hours(config.expiry_hours),
        }
    }

    /// Sign a token for `identity`, valid for the configured lifetime.
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity.username.clone(),
            prefix: identity.prefix.clone(),
            fname: identity.fname.clone(),
            lname: identity.lname.clone(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check the signature and expiry of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

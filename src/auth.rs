use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token.
///
/// Field names follow the issuer's wire format (`userID`, `appID`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "appID")]
    pub app_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token was issued for application {found}, expected {expected}")]
    WrongApplication { expected: i32, found: i32 },

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// Verifies HS256 tokens against the shared application secret.
///
/// Holds only immutable key material, so one instance is shared by every
/// concurrent call.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    expected_app_id: Option<i32>,
}

impl TokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked to the second
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expected_app_id: None,
        }
    }

    /// Reject tokens minted for any other application
    pub fn with_app_id(mut self, app_id: Option<i32>) -> Self {
        self.expected_app_id = app_id;
        self
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Malformed("token is empty".to_string()));
        }

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?.claims;

        if let Some(expected) = self.expected_app_id {
            if claims.app_id != expected {
                return Err(AuthError::WrongApplication {
                    expected,
                    found: claims.app_id,
                });
            }
        }

        Ok(claims)
    }

    /// Verify the token and return the owner identity it carries
    pub fn owner_id(&self, token: &str) -> Result<i64, AuthError> {
        self.validate(token).map(|claims| claims.user_id)
    }
}

/// One-shot validation with a raw secret
pub fn validate_token(token: &str, secret: &[u8]) -> Result<i64, AuthError> {
    TokenValidator::new(secret).owner_id(token)
}

/// Mints HS256 tokens in the same format the validator accepts.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Create a token for `user_id` that expires after the configured TTL
    pub fn issue(
        &self,
        user_id: i64,
        app_id: i32,
        email: Option<&str>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            user_id,
            app_id,
            email: email.map(str::to_string),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims, including already-expired ones
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

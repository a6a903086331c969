//! JWT session tokens
//!
//! HS256 tokens carrying the user id and role. An access token is turned
//! into a [`Caller`] at the HTTP boundary; a refresh token is only good for
//! minting a new pair.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use market_core::{Caller, Role, Snowflake};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub token_type: TokenType,
}

impl Claims {
    /// # Errors
    /// Returns an error if the subject cannot be parsed as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    /// The capability handed to service operations
    ///
    /// # Errors
    /// Returns an error if the subject is malformed
    pub fn caller(&self) -> Result<Caller, AppError> {
        Ok(Caller::new(self.user_id()?, self.role))
    }
}

/// Token pair containing access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and expiry times (seconds)
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64, refresh_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    /// Issue an access and a refresh token for `user_id` acting as `role`
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_token_pair(&self, user_id: Snowflake, role: Role) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.encode_token(user_id, role, TokenType::Access)?,
            refresh_token: self.encode_token(user_id, role, TokenType::Refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn encode_token(&self, user_id: Snowflake, role: Role, token_type: TokenType) -> Result<String, AppError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_token_expiry,
            TokenType::Refresh => self.refresh_token_expiry,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(lifetime)).timestamp(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    /// Decode and validate signature and expiry
    ///
    /// # Errors
    /// Returns `TokenExpired` or `InvalidToken`
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    /// # Errors
    /// Returns an error if the token is invalid, expired, or not an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_expecting(token, TokenType::Access)
    }

    /// # Errors
    /// Returns an error if the token is invalid, expired, or not a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_expecting(token, TokenType::Refresh)
    }

    fn decode_expecting(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.token_type != expected {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

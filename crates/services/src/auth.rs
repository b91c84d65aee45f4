use foodwise_config::JwtSettings;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims of an access token issued by the external identity service.
/// This core only verifies; it never mints sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(jwt_settings: &JwtSettings) -> Self {
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        let mut validation = Validation::default();
        validation.set_issuer(&[&jwt_settings.issuer]);
        Self {
            decoding_key,
            validation,
        }
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

//! Bearer token verification for Supabase-issued access tokens.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audience Supabase stamps on tokens of signed-in users
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token has no subject")]
    MissingSubject,
}

/// Claims read from a Supabase access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_anonymous: Option<bool>,
}

/// Verifies HS256 access tokens against the project's JWT secret
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a raw token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(data.claims)
    }

    /// Validate an `Authorization` header value of the form `Bearer <token>`
    pub fn verify_header(&self, header: Option<&str>) -> Result<(String, Claims), AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.verify(token)?;
        Ok((token.to_string(), claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, aud: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            aud: aud.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            role: Some("authenticated".to_string()),
            is_anonymous: Some(true),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = TokenVerifier::new("secret");
        let claims = verifier.verify(&token("secret", "user-1", "authenticated", 3600)).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token("other", "user-1", "authenticated", 3600)).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token("secret", "user-1", "anon", 3600)).is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token("secret", "user-1", "authenticated", -3600)).is_err());
    }

    #[test]
    fn test_verify_header() {
        let verifier = TokenVerifier::new("secret");
        let raw = token("secret", "user-1", "authenticated", 3600);

        let (tok, claims) = verifier.verify_header(Some(&format!("Bearer {}", raw))).unwrap();
        assert_eq!(tok, raw);
        assert_eq!(claims.sub, "user-1");

        assert!(matches!(verifier.verify_header(None), Err(AuthError::MissingToken)));
        assert!(matches!(verifier.verify_header(Some("Basic abc")), Err(AuthError::MissingToken)));
    }
}

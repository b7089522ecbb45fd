//! JWT access-token handling.
//!
//! The external identity provider issues HS256-signed tokens with a
//! shared secret; this service only verifies them. Claims carry the
//! username so audit entries can name the actor without a per-request
//! directory lookup. Generation exists for tooling and tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stockroom_core::types::DbId;

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's internal database id.
    pub sub: DbId,
    /// Username, used as the audit actor name.
    pub username: String,
    /// Role name (`"admin"` or `"user"`).
    pub role: String,
    /// Expiration (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at (UTC Unix timestamp).
    pub iat: i64,
}

/// Token secret and lifetime, shared with the identity provider.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load from the environment.
    ///
    /// `JWT_SECRET` is required and must be non-empty;
    /// `JWT_ACCESS_EXPIRY_MINS` defaults to 60. Panics on a missing or
    /// empty secret so a misconfigured deployment refuses to start.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Sign an access token for the given user.
    pub fn generate(
        &self,
        user_id: DbId,
        username: &str,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            role: role.to_string(),
            exp: (now + chrono::Duration::minutes(self.access_token_expiry_mins)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 15,
        }
    }

    #[test]
    fn round_trip_preserves_claims() {
        let config = test_config();
        let token = config.generate(7, "jdoe", "admin").unwrap();
        let claims = config.validate(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = test_config().generate(7, "jdoe", "admin").unwrap();

        let other = JwtConfig {
            secret: "different-secret".to_string(),
            access_token_expiry_mins: 15,
        };
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let config = JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: -10,
        };
        let token = config.generate(7, "jdoe", "user").unwrap();
        assert!(config.validate(&token).is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(test_config().validate("not.a.jwt").is_err());
    }
}

use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};

use crate::models::users::Role;

/// Paramètres de signature des tokens (clé secrète + durée de vie)
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub username: String,
    pub role: Role,
    pub exp: i64,        // expiration timestamp
}

/// Génère un JWT token pour un utilisateur
pub fn generate_token(
    config: &JwtConfig,
    user_id: i32,
    username: &str,
    role: Role,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.ttl_hours))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un JWT token
pub fn verify_token(config: &JwtConfig, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            ttl_hours: 1,
        }
    }

    #[test]
    fn test_generate_and_verify_token() {
        let token = generate_token(&config(), 123, "investor1", Role::Investor).unwrap();
        let claims = verify_token(&config(), &token).unwrap();

        assert_eq!(claims.sub, 123);
        assert_eq!(claims.username, "investor1");
        assert_eq!(claims.role, Role::Investor);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token(&config(), "invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ttl_hours: 1,
        };
        let token = generate_token(&other, 1, "admin", Role::Admin).unwrap();

        assert!(verify_token(&config(), &token).is_err());
    }
}

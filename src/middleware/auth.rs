use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::users::Role;
use crate::utils::jwt::{self, JwtConfig};

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    fn from_request_sync(req: &HttpRequest) -> Result<Self, LedgerError> {
        // 1. Extraire le header Authorization
        let auth_header = req
            .headers()
            .get("Authorization")
            .ok_or_else(|| LedgerError::Unauthorized("Missing Authorization header".to_string()))?;

        // 2. Convertir le header en string
        let auth_str = auth_header
            .to_str()
            .map_err(|_| LedgerError::Unauthorized("Invalid Authorization header".to_string()))?;

        // 3. Extraire le token (format: "Bearer <token>")
        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            LedgerError::Unauthorized(
                "Invalid Authorization format (expected: Bearer <token>)".to_string(),
            )
        })?;

        // 4. Vérifier le token JWT avec la config partagée par l'App
        let config = req
            .app_data::<web::Data<JwtConfig>>()
            .ok_or_else(|| LedgerError::Internal("JWT configuration missing from app data".to_string()))?;

        let claims = jwt::verify_token(config, token).map_err(LedgerError::Unauthorized)?;

        // 5. Créer et retourner AuthUser
        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = LedgerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_sync(req))
    }
}

use actix_web::{post, get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::LedgerError;
use crate::middleware::AuthUser;
use crate::models::dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use crate::services::investor_service::InvestorService;
use crate::utils::jwt::{self, JwtConfig};

/// POST /auth/register - Créer un compte investisseur (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    jwt_config: web::Data<JwtConfig>,
) -> Result<HttpResponse, LedgerError> {
    // 1. Valider la requête
    body.validate()?;

    // 2. Créer l'utilisateur + le profil investisseur
    let (user, _investor) = InvestorService::register(db.get_ref(), body.into_inner()).await?;

    // 3. Générer le JWT
    let token = jwt::generate_token(&jwt_config, user.id, &user.username, user.role)
        .map_err(LedgerError::Internal)?;

    // 4. Retourner la réponse
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    jwt_config: web::Data<JwtConfig>,
) -> Result<HttpResponse, LedgerError> {
    // 1. Vérifier username / mot de passe
    let user = InvestorService::authenticate(db.get_ref(), &body).await?;

    // 2. Générer le JWT
    let token = jwt::generate_token(&jwt_config, user.id, &user.username, user.role)
        .map_err(LedgerError::Internal)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        username: auth_user.username,
        role: auth_user.role,
    })
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
    );
}

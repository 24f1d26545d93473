use sea_orm::*;
use rust_decimal::Decimal;
use serde::Serialize;
use chrono::Utc;

use crate::error::LedgerError;
use crate::models::dto::{LoginRequest, RegisterRequest};
use crate::models::investor::{self, KycStatus};
use crate::models::users::{self, Role};
use crate::services::ledger_service::LedgerService;
use crate::utils::password;

/// Profil renvoyé à l'investisseur: ses soldes et ses cumuls
#[derive(Debug, Serialize)]
pub struct InvestorProfile {
    pub username: String,
    #[serde(flatten)]
    pub investor: investor::Model,
}

pub struct InvestorService;

impl InvestorService {
    /// Crée le compte utilisateur (rôle investor) et le profil investisseur
    /// avec des soldes à zéro
    pub async fn register(
        db: &DatabaseConnection,
        request: RegisterRequest,
    ) -> Result<(users::Model, investor::Model), LedgerError> {
        // 1. Vérifier si l'utilisateur existe déjà
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(&request.username))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(LedgerError::Conflict("Username already exists".to_string()));
        }

        // 2. Hash le mot de passe
        let password_hash = password::hash_password(&request.password)
            .map_err(|e| LedgerError::Internal(format!("Failed to hash password: {}", e)))?;

        // 3. User + Investor dans la même transaction
        let txn = db.begin().await?;
        let now = Utc::now();

        let user = users::ActiveModel {
            username: Set(request.username),
            password_hash: Set(password_hash),
            role: Set(Role::Investor),
            created_at: Set(now),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        let investor = investor::ActiveModel {
            user_id: Set(user.id),
            full_name: Set(request.full_name),
            phone: Set(request.phone),
            cash_balance: Set(Decimal::ZERO),
            profit_balance: Set(Decimal::ZERO),
            total_invested: Set(Decimal::ZERO),
            total_profit: Set(Decimal::ZERO),
            total_withdrawn: Set(Decimal::ZERO),
            kyc_status: Set(KycStatus::Pending),
            agreement_accepted: Set(false),
            agreement_accepted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        txn.commit().await?;

        log::info!("Investor {} registered (user {})", investor.id, user.username);

        Ok((user, investor))
    }

    /// Vérifie le couple username / mot de passe
    pub async fn authenticate(
        db: &DatabaseConnection,
        request: &LoginRequest,
    ) -> Result<users::Model, LedgerError> {
        let invalid = || LedgerError::Unauthorized("Invalid username or password".to_string());

        let user = users::Entity::find()
            .filter(users::Column::Username.eq(&request.username))
            .one(db)
            .await?
            .ok_or_else(invalid)?;

        let is_valid = password::verify_password(&request.password, &user.password_hash)
            .map_err(|e| LedgerError::Internal(format!("Password verification error: {}", e)))?;

        if !is_valid {
            log::warn!("Failed login for {}", request.username);
            return Err(invalid());
        }

        Ok(user)
    }

    /// Acceptation du contrat d'investissement (idempotent: la date
    /// d'origine est conservée)
    pub async fn accept_agreement(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<investor::Model, LedgerError> {
        let investor = LedgerService::find_investor(db, investor_id).await?;
        if investor.agreement_accepted {
            return Ok(investor);
        }

        let now = Utc::now();
        let mut active: investor::ActiveModel = investor.into();
        active.agreement_accepted = Set(true);
        active.agreement_accepted_at = Set(Some(now));
        active.updated_at = Set(now);

        Ok(active.update(db).await?)
    }

    pub async fn set_kyc_status(
        db: &DatabaseConnection,
        investor_id: i32,
        status: KycStatus,
    ) -> Result<investor::Model, LedgerError> {
        let investor = LedgerService::find_investor(db, investor_id).await?;

        let mut active: investor::ActiveModel = investor.into();
        active.kyc_status = Set(status);
        active.updated_at = Set(Utc::now());

        let investor = active.update(db).await?;
        log::info!("Investor {} KYC set to {:?}", investor.id, investor.kyc_status);

        Ok(investor)
    }

    /// Profil investisseur rattaché à un compte utilisateur
    pub async fn find_by_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<investor::Model, LedgerError> {
        investor::Entity::find()
            .filter(investor::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Investor profile".to_string()))
    }

    pub async fn profile(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<InvestorProfile, LedgerError> {
        let (investor, user) = investor::Entity::find_by_id(investor_id)
            .find_also_related(users::Entity)
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Investor".to_string()))?;

        Ok(InvestorProfile {
            username: user.map(|u| u.username).unwrap_or_default(),
            investor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "correct horse".to_string(),
            full_name: "Ama Mensah".to_string(),
            phone: Some("+233200000000".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_creates_empty_investor() {
        let db = crate::test_support::setup_db().await;

        let (user, investor) = InvestorService::register(&db, registration("ama")).await.unwrap();

        assert_eq!(user.role, Role::Investor);
        assert_eq!(investor.user_id, user.id);
        assert_eq!(investor.cash_balance, Decimal::ZERO);
        assert_eq!(investor.kyc_status, KycStatus::Pending);
        assert!(!investor.agreement_accepted);
        assert!(user.password_hash.starts_with("pbkdf2:sha256:"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let db = crate::test_support::setup_db().await;
        InvestorService::register(&db, registration("kwame")).await.unwrap();

        let result = InvestorService::register(&db, registration("kwame")).await;

        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = crate::test_support::setup_db().await;
        InvestorService::register(&db, registration("efua")).await.unwrap();

        let ok = InvestorService::authenticate(
            &db,
            &LoginRequest { username: "efua".to_string(), password: "correct horse".to_string() },
        )
            .await;
        assert!(ok.is_ok());

        let wrong = InvestorService::authenticate(
            &db,
            &LoginRequest { username: "efua".to_string(), password: "battery staple".to_string() },
        )
            .await;
        assert!(matches!(wrong, Err(LedgerError::Unauthorized(_))));

        let unknown = InvestorService::authenticate(
            &db,
            &LoginRequest { username: "nobody".to_string(), password: "correct horse".to_string() },
        )
            .await;
        assert!(matches!(unknown, Err(LedgerError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_accept_agreement_is_idempotent() {
        let db = crate::test_support::setup_db().await;
        let (_, investor) = InvestorService::register(&db, registration("yaw")).await.unwrap();

        let first = InvestorService::accept_agreement(&db, investor.id).await.unwrap();
        let second = InvestorService::accept_agreement(&db, investor.id).await.unwrap();

        assert!(first.agreement_accepted);
        assert_eq!(first.agreement_accepted_at, second.agreement_accepted_at);
    }

    #[tokio::test]
    async fn test_kyc_and_profile() {
        let db = crate::test_support::setup_db().await;
        let (user, investor) = InvestorService::register(&db, registration("akosua")).await.unwrap();

        InvestorService::set_kyc_status(&db, investor.id, KycStatus::Verified).await.unwrap();

        let found = InvestorService::find_by_user(&db, user.id).await.unwrap();
        assert_eq!(found.kyc_status, KycStatus::Verified);

        let profile = InvestorService::profile(&db, investor.id).await.unwrap();
        assert_eq!(profile.username, "akosua");
        assert_eq!(profile.investor.id, investor.id);

        assert!(matches!(
            InvestorService::find_by_user(&db, 999).await,
            Err(LedgerError::NotFound(_))
        ));
    }
}

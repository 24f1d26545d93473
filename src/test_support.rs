// Helpers partagés par les tests (base SQLite en mémoire + jeux de données)

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;

use crate::db;
use crate::models::investor_transaction::{LedgerAccount, TransactionType};
use crate::models::users::Role;
use crate::models::{equipment, investor, product, product_variant, users};
use crate::services::ledger_service::{LedgerEntry, LedgerService, TotalsDelta};
use crate::utils::jwt::{self, JwtConfig};

/// Une seule connexion: chaque connexion SQLite en mémoire est une base distincte
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    db::sync_schema(&db).await.unwrap();
    db
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        ttl_hours: 1,
    }
}

pub fn token_for(user: &users::Model) -> String {
    jwt::generate_token(&jwt_config(), user.id, &user.username, user.role).unwrap()
}

async fn seed_user(db: &DatabaseConnection, username: &str, role: Role) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("pbkdf2:sha256:1000$seed$00".to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub async fn seed_admin(db: &DatabaseConnection, username: &str) -> users::Model {
    seed_user(db, username, Role::Admin).await
}

/// Investisseur (contrat non accepté, KYC pending). Le cash initial passe
/// par le journal comme un dépôt, pour que reconcile reste cohérent.
pub async fn seed_investor(db: &DatabaseConnection, username: &str, cash: Decimal) -> investor::Model {
    let user = seed_user(db, username, Role::Investor).await;
    let now = Utc::now();

    let investor = investor::ActiveModel {
        user_id: Set(user.id),
        full_name: Set(username.to_string()),
        phone: Set(None),
        cash_balance: Set(Decimal::ZERO),
        profit_balance: Set(Decimal::ZERO),
        total_invested: Set(Decimal::ZERO),
        total_profit: Set(Decimal::ZERO),
        total_withdrawn: Set(Decimal::ZERO),
        kyc_status: Set(investor::KycStatus::Pending),
        agreement_accepted: Set(false),
        agreement_accepted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap();

    if cash.is_zero() {
        return investor;
    }

    LedgerService::post(
        db,
        LedgerEntry {
            investor_id: investor.id,
            transaction_type: TransactionType::Deposit,
            account: LedgerAccount::Cash,
            amount: cash,
            description: "Initial deposit".to_string(),
            reference: None,
            performed_by: None,
        },
        TotalsDelta { invested: cash, ..Default::default() },
    )
        .await
        .unwrap()
        .investor
}

pub async fn seed_product(db: &DatabaseConnection, name: &str, track_inventory: bool, stock: i32) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_string()),
        price: Set(Decimal::ONE_HUNDRED),
        track_inventory: Set(track_inventory),
        stock_quantity: Set(stock),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub async fn seed_variant(db: &DatabaseConnection, product_id: i32, name: &str, stock: i32) -> product_variant::Model {
    product_variant::ActiveModel {
        product_id: Set(product_id),
        name: Set(name.to_string()),
        stock_quantity: Set(stock),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub async fn seed_equipment(db: &DatabaseConnection, name: &str, purchase_price: Decimal) -> equipment::Model {
    equipment::ActiveModel {
        name: Set(name.to_string()),
        purchase_price: Set(purchase_price),
        status: Set("active".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

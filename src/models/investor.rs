// ============================================================================
// MODÈLE : INVESTOR
// ============================================================================
//
// Colonnes de la table investors:
//   - id (SERIAL) / user_id (FK vers users, UNIQUE)
//   - cash_balance : trésorerie disponible (dépôts - allocations + remboursements)
//   - profit_balance : profits crédités, non retirés
//   - total_invested / total_profit / total_withdrawn : cumuls
//   - kyc_status : pending | verified | rejected
//   - agreement_accepted (+ agreement_accepted_at)
//
// Points d'attention:
//   - Les soldes ne sont JAMAIS modifiés directement: seul
//     LedgerService::post les touche (avec écriture d'une transaction)
//   - cash_balance et profit_balance ne peuvent pas être négatifs
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

use crate::utils::money::Balances;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub full_name: String,
    pub phone: Option<String>,
    pub cash_balance: Decimal,
    pub profit_balance: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub total_withdrawn: Decimal,
    pub kyc_status: KycStatus,
    pub agreement_accepted: bool,
    pub agreement_accepted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn balances(&self) -> Balances {
        Balances::new(self.cash_balance, self.profit_balance)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

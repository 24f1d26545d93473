// ============================================================================
// MODÈLE : INVESTOR TRANSACTION (journal d'audit)
// ============================================================================
//
// Une ligne par mouvement de cash_balance ou de profit_balance.
//
// Colonnes clés:
//   - account : cash | profit (le solde touché)
//   - amount : montant SIGNÉ (négatif = débit)
//   - cash_balance_after / profit_balance_after : soldes après le mouvement
//
// Points d'attention:
//   - Append-only: aucune mise à jour, aucune suppression
//   - La somme des amount par account redonne le solde courant
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "allocation_product")]
    AllocationProduct,
    #[sea_orm(string_value = "allocation_equipment")]
    AllocationEquipment,
    #[sea_orm(string_value = "profit_credit")]
    ProfitCredit,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "capital_return")]
    CapitalReturn,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum LedgerAccount {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "profit")]
    Profit,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investor_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub investor_id: i32,
    pub transaction_type: TransactionType,
    pub account: LedgerAccount,
    pub amount: Decimal,
    pub cash_balance_after: Decimal,
    pub profit_balance_after: Decimal,
    pub description: String,
    pub reference: Option<String>,
    pub performed_by: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::investor::Entity",
        from = "Column::InvestorId",
        to = "super::investor::Column::Id"
    )]
    Investor,
}

impl Related<super::investor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalType {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "profit")]
    Profit,
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "equipment_share")]
    EquipmentShare,
}

// Seul l'état initial est géré ici: l'approbation et le paiement sont faits
// par l'administration hors de ce service
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub investor_id: i32,
    #[sea_orm(unique)]
    pub request_number: String,
    pub withdrawal_type: WithdrawalType,
    pub amount: Option<Decimal>,                 // cash / profit
    pub product_allocation_id: Option<i32>,      // product
    pub quantity: Option<i32>,                   // product
    pub equipment_allocation_id: Option<i32>,    // equipment_share
    pub payout_method: Option<String>,
    pub payout_details: Option<String>,
    pub reason: Option<String>,
    pub status: WithdrawalStatus,
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

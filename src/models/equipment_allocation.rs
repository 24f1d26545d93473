use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment_allocations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub investor_id: i32,
    pub equipment_id: i32,
    pub amount_allocated: Decimal,
    pub investment_percentage: Decimal, // amount_allocated / equipment.purchase_price * 100
    pub profit_share: Decimal,          // = investment_percentage à la création
    pub total_profit_received: Decimal,
    pub has_exited: bool,
    pub allocated_by: Option<i32>,
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

    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
}

impl Related<super::investor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

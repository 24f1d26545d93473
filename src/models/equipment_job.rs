use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Une utilisation de l'équipement sur un job (événement de profit)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub equipment_id: i32,
    pub batch_ref: Uuid,
    pub description: Option<String>,
    pub revenue: Decimal,
    pub total_costs: Decimal,
    pub net_profit: Decimal,
    pub company_profit: Decimal,
    pub investor_pool_profit: Decimal,
    pub distributed_amount: Decimal,
    pub retained_amount: Decimal, // part du pool non distribuée, gardée par la société
    pub recorded_by: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

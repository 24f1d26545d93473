// ============================================================================
// MODÈLE : PRODUCT ALLOCATION
// ============================================================================
//
// Capital d'un investisseur engagé sur un lot de produits.
//
// Exemple:
//   - Allocation 10 unités à 50 → quantity=10, quantity_remaining=10, total_investment=500
//   - Vente de 3 unités         → quantity_remaining=7, quantity_sold=3
//
// Invariant: quantity_remaining + quantity_sold == quantity
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_allocations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub investor_id: i32,
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub total_investment: Decimal,
    pub quantity_remaining: i32,
    pub quantity_sold: i32,
    pub profit_generated: Decimal,
    pub capital_returned: Decimal,
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
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::investor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

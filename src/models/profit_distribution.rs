// ============================================================================
// MODÈLE : PROFIT DISTRIBUTION
// ============================================================================
//
// Enregistrement immuable de la part d'UN investisseur dans UN événement de
// profit (job d'équipement ou vente de produit).
//
// Colonnes clés:
//   - batch_ref : regroupe toutes les lignes d'un même événement
//   - source : equipment_job | product_sale
//   - revenue / cost / gross_profit : chiffres de l'événement complet
//   - company_share / investor_share : moitié société / part de CET investisseur
//   - share_percentage : profit_share appliqué (100 pour une vente de produit)
//
// Points d'attention:
//   - Jamais modifié ni supprimé après insertion
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum DistributionSource {
    #[sea_orm(string_value = "equipment_job")]
    EquipmentJob,
    #[sea_orm(string_value = "product_sale")]
    ProductSale,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profit_distributions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub batch_ref: Uuid,
    pub investor_id: i32,
    pub source: DistributionSource,
    pub equipment_id: Option<i32>,
    pub equipment_job_id: Option<i32>,
    pub product_allocation_id: Option<i32>,
    pub order_reference: Option<String>,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub gross_profit: Decimal,
    pub company_share: Decimal,
    pub investor_share: Decimal,
    pub share_percentage: Decimal,
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

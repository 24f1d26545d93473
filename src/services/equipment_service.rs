use sea_orm::*;
use chrono::Utc;

use crate::error::LedgerError;
use crate::models::dto::CreateEquipmentRequest;
use crate::models::equipment;
use crate::utils::money;

pub struct EquipmentService;

impl EquipmentService {
    pub async fn create(
        db: &DatabaseConnection,
        request: CreateEquipmentRequest,
    ) -> Result<equipment::Model, LedgerError> {
        let purchase_price = money::ensure_positive(request.purchase_price, "purchase_price")?;

        let equipment = equipment::ActiveModel {
            name: Set(request.name),
            purchase_price: Set(purchase_price),
            status: Set("active".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(db)
            .await?;

        log::info!("Equipment {} registered ({})", equipment.name, equipment.purchase_price);

        Ok(equipment)
    }

    pub async fn list(db: &DatabaseConnection) -> Result<Vec<equipment::Model>, LedgerError> {
        let equipment = equipment::Entity::find()
            .order_by_asc(equipment::Column::Id)
            .all(db)
            .await?;

        Ok(equipment)
    }

    pub async fn find(db: &DatabaseConnection, equipment_id: i32) -> Result<equipment::Model, LedgerError> {
        equipment::Entity::find_by_id(equipment_id)
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Equipment".to_string()))
    }
}

use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::LedgerError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateEquipmentRequest, JobUsageRequest};
use crate::policy::{Capability, Policy};
use crate::services::allocation_service::AllocationService;
use crate::services::equipment_service::EquipmentService;
use crate::services::profit_service::ProfitService;

/// POST /equipment - Enregistrer un équipement (ADMIN)
#[post("")]
pub async fn create_equipment(
    auth_user: AuthUser,
    body: web::Json<CreateEquipmentRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageEquipment)?;
    body.validate()?;

    let equipment = EquipmentService::create(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(equipment))
}

#[get("")]
pub async fn list_equipment(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageEquipment)?;
    let equipment = EquipmentService::list(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(equipment))
}

#[get("/{id}/allocations")]
pub async fn equipment_allocations(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageEquipment)?;

    // 404 si l'équipement n'existe pas (plutôt qu'une liste vide)
    let equipment = EquipmentService::find(db.get_ref(), path.into_inner()).await?;
    let allocations = AllocationService::list_for_equipment(db.get_ref(), equipment.id).await?;

    Ok(HttpResponse::Ok().json(allocations))
}

/// POST /equipment/{id}/job-usage - Enregistrer un job et distribuer le profit (ADMIN)
#[post("/{id}/job-usage")]
pub async fn job_usage(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<JobUsageRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::DistributeProfit)?;
    body.validate()?;

    let result = ProfitService::distribute_equipment_job_profit(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        Some(auth_user.user_id),
    )
        .await?;

    Ok(HttpResponse::Created().json(result))
}

pub fn equipment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/equipment")
            .service(create_equipment)
            .service(list_equipment)
            .service(equipment_allocations)
            .service(job_usage)
    );
}

use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::LedgerError;
use crate::middleware::AuthUser;
use crate::models::dto::ProductSaleRequest;
use crate::policy::{Capability, Policy};
use crate::services::profit_service::ProfitService;

/// POST /allocations/products/{id}/sales - Vente d'unités d'un lot alloué (ADMIN)
#[post("/products/{id}/sales")]
pub async fn record_sale(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ProductSaleRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::DistributeProfit)?;
    body.validate()?;

    let result = ProfitService::record_product_sale(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        Some(auth_user.user_id),
    )
        .await?;

    Ok(HttpResponse::Created().json(result))
}

pub fn allocation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/allocations")
            .service(record_sale)
    );
}

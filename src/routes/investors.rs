// ============================================================================
// ROUTES : /investors
// ============================================================================
//
// Un seul scope pour toutes les routes /investors. Les chemins littéraux
// (me, deposits, withdrawals) sont enregistrés avant les chemins /{id}.
//
//   investisseur : me/*, deposits (création, reçu, confirmation, litige),
//                  withdrawals
//   admin        : deposits/{id}/confirm-receipt|reject-receipt,
//                  {id}/allocate-product|allocate-equipment|remove-allocation,
//                  {id}/kyc, {id}/reconcile
//
// ============================================================================

use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::LedgerError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    AllocateEquipmentRequest, AllocateProductRequest, ConfirmReceiptRequest, CreateDepositRequest,
    CreateWithdrawalRequest, DisputeRequest, KycRequest, RejectReceiptRequest, RemoveAllocationRequest,
    SubmitReceiptRequest,
};
use crate::policy::{Capability, Policy};
use crate::services::allocation_service::AllocationService;
use crate::services::deposit_service::DepositService;
use crate::services::investor_service::InvestorService;
use crate::services::ledger_service::LedgerService;
use crate::services::profit_service::ProfitService;
use crate::services::withdrawal_service::WithdrawalService;

// ---------------------------------------------------------------- me

/// GET /investors/me - Profil et soldes de l'investisseur connecté
#[get("/me")]
pub async fn my_profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let profile = InvestorService::profile(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /investors/me/accept-agreement
#[post("/me/accept-agreement")]
pub async fn accept_agreement(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let investor = InvestorService::accept_agreement(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(investor))
}

/// GET /investors/me/transactions - Journal complet, le plus récent en premier
#[get("/me/transactions")]
pub async fn my_transactions(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let transactions = LedgerService::history(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/me/allocations")]
pub async fn my_allocations(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let allocations = AllocationService::list_for_investor(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(allocations))
}

#[get("/me/distributions")]
pub async fn my_distributions(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let distributions = ProfitService::list_for_investor(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(distributions))
}

// ---------------------------------------------------------------- deposits

#[get("/deposits")]
pub async fn list_deposits(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let deposits = DepositService::list_for_investor(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(deposits))
}

/// POST /investors/deposits - Déclarer un dépôt
#[post("/deposits")]
pub async fn create_deposit(
    auth_user: AuthUser,
    body: web::Json<CreateDepositRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let deposit = DepositService::create(db.get_ref(), investor.id, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(deposit))
}

#[post("/deposits/{id}/receipt")]
pub async fn submit_receipt(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<SubmitReceiptRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    body.validate()?;
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;

    let deposit = DepositService::submit_receipt(
        db.get_ref(),
        investor.id,
        path.into_inner(),
        body.into_inner(),
    )
        .await?;

    Ok(HttpResponse::Ok().json(deposit))
}

/// POST /investors/deposits/{id}/confirm - L'investisseur accepte le montant net
#[post("/deposits/{id}/confirm")]
pub async fn confirm_deposit(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let deposit = DepositService::confirm(db.get_ref(), investor.id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(deposit))
}

#[post("/deposits/{id}/dispute")]
pub async fn dispute_deposit(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<DisputeRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    body.validate()?;
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;

    let deposit = DepositService::dispute(
        db.get_ref(),
        investor.id,
        path.into_inner(),
        body.into_inner(),
    )
        .await?;

    Ok(HttpResponse::Ok().json(deposit))
}

/// POST /investors/deposits/{id}/confirm-receipt - L'admin valide le reçu (ADMIN)
#[post("/deposits/{id}/confirm-receipt")]
pub async fn confirm_receipt(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ConfirmReceiptRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ReviewDeposits)?;
    body.validate()?;

    let deposit = DepositService::confirm_receipt(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        auth_user.user_id,
    )
        .await?;

    Ok(HttpResponse::Ok().json(deposit))
}

#[post("/deposits/{id}/reject-receipt")]
pub async fn reject_receipt(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RejectReceiptRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ReviewDeposits)?;
    body.validate()?;

    let deposit = DepositService::reject_receipt(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        auth_user.user_id,
    )
        .await?;

    Ok(HttpResponse::Ok().json(deposit))
}

// ---------------------------------------------------------------- withdrawals

#[get("/withdrawals")]
pub async fn list_withdrawals(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let requests = WithdrawalService::list_for_investor(db.get_ref(), investor.id).await?;

    Ok(HttpResponse::Ok().json(requests))
}

#[post("/withdrawals")]
pub async fn create_withdrawal(
    auth_user: AuthUser,
    body: web::Json<CreateWithdrawalRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    body.validate()?;
    let investor = Policy::investor_profile(db.get_ref(), &auth_user).await?;
    let request = WithdrawalService::create(db.get_ref(), &investor, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(request))
}

// ---------------------------------------------------------------- admin

/// POST /investors/{id}/allocate-product (ADMIN)
#[post("/{id}/allocate-product")]
pub async fn allocate_product(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<AllocateProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageAllocations)?;
    body.validate()?;

    let allocation = AllocationService::allocate_to_product(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        Some(auth_user.user_id),
    )
        .await?;

    Ok(HttpResponse::Created().json(allocation))
}

/// POST /investors/{id}/allocate-equipment (ADMIN)
#[post("/{id}/allocate-equipment")]
pub async fn allocate_equipment(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<AllocateEquipmentRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageAllocations)?;

    let allocation = AllocationService::allocate_to_equipment(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        Some(auth_user.user_id),
    )
        .await?;

    Ok(HttpResponse::Created().json(allocation))
}

/// POST /investors/{id}/remove-allocation (ADMIN)
#[post("/{id}/remove-allocation")]
pub async fn remove_allocation(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RemoveAllocationRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageAllocations)?;

    let removed = AllocationService::remove_product_allocation(
        db.get_ref(),
        path.into_inner(),
        body.allocation_id,
        Some(auth_user.user_id),
    )
        .await?;

    Ok(HttpResponse::Ok().json(removed))
}

#[post("/{id}/kyc")]
pub async fn set_kyc(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<KycRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageInvestors)?;
    let investor = InvestorService::set_kyc_status(db.get_ref(), path.into_inner(), body.status).await?;

    Ok(HttpResponse::Ok().json(investor))
}

/// GET /investors/{id}/reconcile - Soldes stockés vs somme du journal (ADMIN)
#[get("/{id}/reconcile")]
pub async fn reconcile(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LedgerError> {
    Policy::authorize(&auth_user, Capability::ManageInvestors)?;
    let reconciliation = LedgerService::reconcile(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(reconciliation))
}

pub fn investor_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/investors")
            .service(my_profile)
            .service(accept_agreement)
            .service(my_transactions)
            .service(my_allocations)
            .service(my_distributions)
            .service(list_deposits)
            .service(create_deposit)
            .service(submit_receipt)
            .service(confirm_deposit)
            .service(dispute_deposit)
            .service(confirm_receipt)
            .service(reject_receipt)
            .service(list_withdrawals)
            .service(create_withdrawal)
            .service(allocate_product)
            .service(allocate_equipment)
            .service(remove_allocation)
            .service(set_kyc)
            .service(reconcile)
    );
}

// ============================================================================
// ERREURS DU LEDGER
// ============================================================================
//
// Description:
//   Taxonomie unique des erreurs remontées par les services et les routes.
//   Chaque variante correspond à un code HTTP (voir status_code) et la
//   réponse JSON a toujours la forme { "error": "..." }.
//
// Correspondance HTTP:
//   - Unauthorized            → 401
//   - Forbidden               → 403
//   - NotFound                → 404
//   - Conflict                → 409
//   - erreurs de validation   → 400
//   - Database / Internal     → 500 (message générique, détail dans les logs)
//
// ============================================================================

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Authentication required")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Insufficient balance: {available} available, {required} required")]
    InsufficientBalance { required: Decimal, available: Decimal },

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("Insufficient allocation: {available} units remaining, {requested} requested")]
    InsufficientAllocation { requested: i32, available: i32 },

    #[error("Allocation already has {0} units sold and cannot be removed")]
    HasSales(i32),

    #[error("No profit to distribute (net profit: {0})")]
    NoProfit(Decimal),

    #[error("Charges leave a non-positive net amount ({0})")]
    InvalidNetAmount(Decimal),

    #[error("Invalid state: cannot {action} while {current}")]
    InvalidState { current: String, action: String },

    #[error("Allocation exceeds equipment value: {allocated} already allocated of {purchase_price}")]
    AllocationExceedsEquipment { allocated: Decimal, purchase_price: Decimal },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn invalid_state(current: impl ToString, action: &str) -> Self {
        LedgerError::InvalidState {
            current: current.to_string(),
            action: action.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LedgerError::Validation(errors.to_string())
    }
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::Database(_) | LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Le détail reste côté serveur
            LedgerError::Database(e) => {
                log::error!("Database failure: {}", e);
                "Internal server error".to_string()
            }
            LedgerError::Internal(e) => {
                log::error!("Internal failure: {}", e);
                "Internal server error".to_string()
            }
            LedgerError::Unauthorized(reason) => reason.clone(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": message
        }))
    }
}

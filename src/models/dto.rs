// Requêtes et réponses de l'API (les montants restent des Decimal)
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::LedgerError;
use crate::models::investor::KycStatus;
use crate::models::investor_deposit::PaymentMethod;
use crate::models::users::Role;
use crate::models::withdrawal_request::WithdrawalType;
use crate::models::{equipment_allocation, product_allocation};
use crate::utils::money;

// ---------------------------------------------------------------- auth

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

// ---------------------------------------------------------------- allocations

#[derive(Debug, Deserialize, Validate)]
pub struct AllocateProductRequest {
    pub product_id: i32,
    pub variant_id: Option<i32>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub purchase_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AllocateEquipmentRequest {
    pub equipment_id: i32,
    pub amount_allocated: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RemoveAllocationRequest {
    pub allocation_id: i32,
}

#[derive(Debug, Serialize)]
pub struct RemovedAllocationResponse {
    pub allocation_id: i32,
    pub refunded_amount: Decimal,
    pub restored_quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct InvestorAllocationsResponse {
    pub products: Vec<product_allocation::Model>,
    pub equipment: Vec<equipment_allocation::Model>,
}

// ---------------------------------------------------------------- profit

/// Coûts d'un job d'équipement (chaque poste >= 0, absent = 0)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct JobCosts {
    #[serde(default)]
    pub materials: Decimal,
    #[serde(default)]
    pub labor: Decimal,
    #[serde(default)]
    pub maintenance: Decimal,
    #[serde(default)]
    pub other: Decimal,
}

impl JobCosts {
    pub fn items(&self) -> [(&'static str, Decimal); 4] {
        [
            ("materials", self.materials),
            ("labor", self.labor),
            ("maintenance", self.maintenance),
            ("other", self.other),
        ]
    }

    pub fn total(&self) -> Result<Decimal, LedgerError> {
        money::checked_sum(self.items().iter().map(|(_, cost)| *cost))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct JobUsageRequest {
    pub revenue: Decimal,
    #[serde(default)]
    pub costs: JobCosts,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductSaleRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_sale_price: Decimal,
    #[validate(length(min = 1, max = 64))]
    pub order_reference: Option<String>,
}

// ---------------------------------------------------------------- deposits

#[derive(Debug, Deserialize)]
pub struct CreateDepositRequest {
    pub gross_amount: Decimal,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReceiptRequest {
    #[validate(length(min = 1, max = 500))]
    pub receipt_reference: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmReceiptRequest {
    pub charges: Decimal,
    #[validate(length(max = 1000))]
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectReceiptRequest {
    #[validate(length(max = 1000))]
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DisputeRequest {
    #[validate(length(min = 1, max = 1000))]
    pub note: String,
}

// ---------------------------------------------------------------- withdrawals

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWithdrawalRequest {
    pub withdrawal_type: WithdrawalType,
    pub amount: Option<Decimal>,
    pub product_allocation_id: Option<i32>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub equipment_allocation_id: Option<i32>,
    #[validate(length(max = 64))]
    pub payout_method: Option<String>,
    #[validate(length(max = 500))]
    pub payout_details: Option<String>,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

// ---------------------------------------------------------------- admin

#[derive(Debug, Deserialize)]
pub struct KycRequest {
    pub status: KycStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEquipmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub purchase_price: Decimal,
}

// ============================================================================
// SERVICE : DEMANDES DE RETRAIT
// ============================================================================
//
// Une demande est seulement ENREGISTRÉE ici (statut pending). Aucun solde
// n'est débité: l'approbation et le paiement relèvent de l'administration.
//
// Contrôles à la création (un WithdrawalCheck par type):
//   - cash / profit    : solde suffisant, moins les demandes pending du même type
//   - product          : lot appartenant à l'investisseur, quantité restante
//   - equipment_share  : allocation active appartenant à l'investisseur
//
// ============================================================================

use sea_orm::*;
use async_trait::async_trait;
use rust_decimal::Decimal;
use chrono::Utc;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::dto::CreateWithdrawalRequest;
use crate::models::investor::{self, KycStatus};
use crate::models::withdrawal_request::{self, WithdrawalStatus, WithdrawalType};
use crate::models::{equipment_allocation, product_allocation};
use crate::utils::money;

//trait = Interface
#[async_trait]
pub trait WithdrawalCheck: Send + Sync {
    async fn check(
        &self,
        db: &DatabaseConnection,
        investor: &investor::Model,
        request: &CreateWithdrawalRequest,
    ) -> Result<(), LedgerError>;
}

/// cash / profit: montant <= solde - demandes pending du même type
pub struct BalanceCheck {
    pub withdrawal_type: WithdrawalType,
}

#[async_trait]
impl WithdrawalCheck for BalanceCheck {
    async fn check(
        &self,
        db: &DatabaseConnection,
        investor: &investor::Model,
        request: &CreateWithdrawalRequest,
    ) -> Result<(), LedgerError> {
        let amount = request
            .amount
            .ok_or_else(|| LedgerError::Validation("amount is required".to_string()))?;
        money::ensure_positive(amount, "amount")?;

        let balance = match self.withdrawal_type {
            WithdrawalType::Profit => investor.profit_balance,
            _ => investor.cash_balance,
        };

        let pending_requests = withdrawal_request::Entity::find()
            .filter(withdrawal_request::Column::InvestorId.eq(investor.id))
            .filter(withdrawal_request::Column::WithdrawalType.eq(self.withdrawal_type))
            .filter(withdrawal_request::Column::Status.eq(WithdrawalStatus::Pending))
            .all(db)
            .await?;
        let pending = money::checked_sum(pending_requests.iter().filter_map(|request| request.amount))?;

        let available = money::checked_sub(balance, pending)?.max(Decimal::ZERO);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }

        Ok(())
    }
}

/// product: le lot existe, appartient à l'investisseur et a assez d'unités
pub struct ProductCheck;

#[async_trait]
impl WithdrawalCheck for ProductCheck {
    async fn check(
        &self,
        db: &DatabaseConnection,
        investor: &investor::Model,
        request: &CreateWithdrawalRequest,
    ) -> Result<(), LedgerError> {
        let (allocation_id, quantity) = match (request.product_allocation_id, request.quantity) {
            (Some(allocation_id), Some(quantity)) if quantity > 0 => (allocation_id, quantity),
            _ => {
                return Err(LedgerError::Validation(
                    "product_allocation_id and a positive quantity are required".to_string(),
                ));
            }
        };

        let allocation = product_allocation::Entity::find_by_id(allocation_id)
            .filter(product_allocation::Column::InvestorId.eq(investor.id))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Product allocation".to_string()))?;

        // Unités déjà réclamées par des demandes en attente sur ce lot
        let pending: i32 = withdrawal_request::Entity::find()
            .filter(withdrawal_request::Column::ProductAllocationId.eq(allocation.id))
            .filter(withdrawal_request::Column::WithdrawalType.eq(WithdrawalType::Product))
            .filter(withdrawal_request::Column::Status.eq(WithdrawalStatus::Pending))
            .all(db)
            .await?
            .iter()
            .filter_map(|request| request.quantity)
            .fold(0i32, |acc, q| acc.saturating_add(q));

        let available = allocation.quantity_remaining.saturating_sub(pending).max(0);
        if quantity > available {
            return Err(LedgerError::InsufficientAllocation {
                requested: quantity,
                available,
            });
        }

        Ok(())
    }
}

/// equipment_share: allocation active appartenant à l'investisseur
pub struct EquipmentShareCheck;

#[async_trait]
impl WithdrawalCheck for EquipmentShareCheck {
    async fn check(
        &self,
        db: &DatabaseConnection,
        investor: &investor::Model,
        request: &CreateWithdrawalRequest,
    ) -> Result<(), LedgerError> {
        let allocation_id = request
            .equipment_allocation_id
            .ok_or_else(|| LedgerError::Validation("equipment_allocation_id is required".to_string()))?;

        equipment_allocation::Entity::find_by_id(allocation_id)
            .filter(equipment_allocation::Column::InvestorId.eq(investor.id))
            .filter(equipment_allocation::Column::HasExited.eq(false))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Equipment allocation".to_string()))?;

        Ok(())
    }
}

pub struct WithdrawalService;

impl WithdrawalService {
    pub fn check_for(withdrawal_type: WithdrawalType) -> Box<dyn WithdrawalCheck> {
        match withdrawal_type {
            WithdrawalType::Cash | WithdrawalType::Profit => Box::new(BalanceCheck { withdrawal_type }),
            WithdrawalType::Product => Box::new(ProductCheck),
            WithdrawalType::EquipmentShare => Box::new(EquipmentShareCheck),
        }
    }

    pub async fn create(
        db: &DatabaseConnection,
        investor: &investor::Model,
        request: CreateWithdrawalRequest,
    ) -> Result<withdrawal_request::Model, LedgerError> {
        // 1. KYC
        if investor.kyc_status != KycStatus::Verified {
            return Err(LedgerError::Forbidden(
                "KYC verification is required before requesting a withdrawal".to_string(),
            ));
        }

        // 2. Contrôles propres au type
        Self::check_for(request.withdrawal_type)
            .check(db, investor, &request)
            .await?;

        // 3. Enregistrer la demande (seuls les champs du type sont gardés)
        let (amount, product_allocation_id, quantity, equipment_allocation_id) = match request.withdrawal_type {
            WithdrawalType::Cash | WithdrawalType::Profit => (request.amount, None, None, None),
            WithdrawalType::Product => (None, request.product_allocation_id, request.quantity, None),
            WithdrawalType::EquipmentShare => (None, None, None, request.equipment_allocation_id),
        };

        let withdrawal = withdrawal_request::ActiveModel {
            investor_id: Set(investor.id),
            request_number: Set(Self::new_request_number()),
            withdrawal_type: Set(request.withdrawal_type),
            amount: Set(amount),
            product_allocation_id: Set(product_allocation_id),
            quantity: Set(quantity),
            equipment_allocation_id: Set(equipment_allocation_id),
            payout_method: Set(request.payout_method),
            payout_details: Set(request.payout_details),
            reason: Set(request.reason),
            status: Set(WithdrawalStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(db)
            .await?;

        log::info!(
            "Withdrawal request {} ({:?}) created for investor {}",
            withdrawal.request_number,
            withdrawal.withdrawal_type,
            investor.id
        );

        Ok(withdrawal)
    }

    pub async fn list_for_investor(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<Vec<withdrawal_request::Model>, LedgerError> {
        let requests = withdrawal_request::Entity::find()
            .filter(withdrawal_request::Column::InvestorId.eq(investor_id))
            .order_by_desc(withdrawal_request::Column::Id)
            .all(db)
            .await?;

        Ok(requests)
    }

    fn new_request_number() -> String {
        let id = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("WDR-{}", &id[..12])
    }
}

// ============================================================================
// SERVICE : DÉPÔTS
// ============================================================================
//
// Chaque étape passe par DepositStatus::next (machine à états) puis par un
// UPDATE filtré sur le statut courant: si deux requêtes arrivent en même
// temps, une seule modifie la ligne, l'autre reçoit InvalidState.
//
// Le solde n'est crédité qu'à la confirmation par l'investisseur, dans la
// même transaction que le changement de statut.
//
// ============================================================================

use sea_orm::*;
use rust_decimal::Decimal;
use chrono::Utc;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::dto::{ConfirmReceiptRequest, CreateDepositRequest, DisputeRequest, RejectReceiptRequest, SubmitReceiptRequest};
use crate::models::investor_deposit::{self, DepositEvent, DepositStatus};
use crate::models::investor_transaction::{LedgerAccount, TransactionType};
use crate::services::ledger_service::{LedgerEntry, LedgerService, TotalsDelta};
use crate::utils::money;

pub struct DepositService;

impl DepositService {
    pub async fn create(
        db: &DatabaseConnection,
        investor_id: i32,
        request: CreateDepositRequest,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let gross_amount = money::ensure_positive(request.gross_amount, "gross_amount")?;

        let investor = LedgerService::find_investor(db, investor_id).await?;
        if !investor.agreement_accepted {
            return Err(LedgerError::Forbidden(
                "The investment agreement must be accepted before depositing".to_string(),
            ));
        }

        let now = Utc::now();
        let deposit = investor_deposit::ActiveModel {
            investor_id: Set(investor.id),
            reference: Set(Self::new_reference()),
            payment_method: Set(request.payment_method),
            gross_amount: Set(gross_amount),
            charges: Set(Decimal::ZERO),
            amount: Set(gross_amount),
            status: Set(DepositStatus::initial(request.payment_method)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
            .insert(db)
            .await?;

        log::info!(
            "Deposit {} created for investor {} ({} via {:?})",
            deposit.reference,
            investor.id,
            gross_amount,
            deposit.payment_method
        );

        Ok(deposit)
    }

    /// L'investisseur indique la référence de son paiement
    pub async fn submit_receipt(
        db: &DatabaseConnection,
        investor_id: i32,
        deposit_id: i32,
        request: SubmitReceiptRequest,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let receipt_reference = request.receipt_reference.trim().to_string();
        if receipt_reference.is_empty() {
            return Err(LedgerError::Validation("receipt_reference is required".to_string()));
        }

        let deposit = Self::find_owned(db, investor_id, deposit_id).await?;

        let changes = investor_deposit::ActiveModel {
            receipt_reference: Set(Some(receipt_reference)),
            ..Default::default()
        };

        Self::apply_transition(db, &deposit, DepositEvent::SubmitReceipt, changes).await
    }

    /// L'admin valide le reçu et fixe les frais
    pub async fn confirm_receipt(
        db: &DatabaseConnection,
        deposit_id: i32,
        request: ConfirmReceiptRequest,
        admin_id: i32,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let charges = money::ensure_non_negative(request.charges, "charges")?;
        let deposit = Self::find(db, deposit_id).await?;
        deposit.status.next(DepositEvent::ConfirmReceipt)?;

        let net = money::checked_sub(deposit.gross_amount, charges)?;
        if net <= Decimal::ZERO {
            return Err(LedgerError::InvalidNetAmount(net));
        }

        let changes = investor_deposit::ActiveModel {
            charges: Set(charges),
            amount: Set(net),
            admin_note: Set(request.admin_note),
            reviewed_by: Set(Some(admin_id)),
            ..Default::default()
        };

        Self::apply_transition(db, &deposit, DepositEvent::ConfirmReceipt, changes).await
    }

    /// L'admin rejette le reçu: le dépôt repart en attente de paiement
    pub async fn reject_receipt(
        db: &DatabaseConnection,
        deposit_id: i32,
        request: RejectReceiptRequest,
        admin_id: i32,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let deposit = Self::find(db, deposit_id).await?;

        let changes = investor_deposit::ActiveModel {
            receipt_reference: Set(None),
            admin_note: Set(request.admin_note),
            reviewed_by: Set(Some(admin_id)),
            ..Default::default()
        };

        Self::apply_transition(db, &deposit, DepositEvent::RejectReceipt, changes).await
    }

    /// L'investisseur accepte le montant net: crédit du cash_balance
    pub async fn confirm(
        db: &DatabaseConnection,
        investor_id: i32,
        deposit_id: i32,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let deposit = Self::find_owned(db, investor_id, deposit_id).await?;
        deposit.status.next(DepositEvent::Confirm)?;

        let txn = db.begin().await?;

        let changes = investor_deposit::ActiveModel {
            confirmed_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let confirmed = Self::apply_transition(&txn, &deposit, DepositEvent::Confirm, changes).await?;

        LedgerService::post(
            &txn,
            LedgerEntry {
                investor_id: deposit.investor_id,
                transaction_type: TransactionType::Deposit,
                account: LedgerAccount::Cash,
                amount: confirmed.amount,
                description: format!(
                    "Deposit {} ({} gross, {} charges)",
                    confirmed.reference, confirmed.gross_amount, confirmed.charges
                ),
                reference: Some(confirmed.reference.clone()),
                performed_by: None,
            },
            TotalsDelta { invested: confirmed.amount, ..Default::default() },
        )
            .await?;

        txn.commit().await?;

        log::info!(
            "Deposit {} confirmed: investor {} credited {}",
            confirmed.reference,
            confirmed.investor_id,
            confirmed.amount
        );

        Ok(confirmed)
    }

    /// L'investisseur conteste le montant net (état terminal)
    pub async fn dispute(
        db: &DatabaseConnection,
        investor_id: i32,
        deposit_id: i32,
        request: DisputeRequest,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let note = request.note.trim().to_string();
        if note.is_empty() {
            return Err(LedgerError::Validation("A dispute note is required".to_string()));
        }

        let deposit = Self::find_owned(db, investor_id, deposit_id).await?;

        let changes = investor_deposit::ActiveModel {
            dispute_note: Set(Some(note)),
            ..Default::default()
        };

        let disputed = Self::apply_transition(db, &deposit, DepositEvent::Dispute, changes).await?;
        log::warn!("Deposit {} disputed by investor {}", disputed.reference, investor_id);

        Ok(disputed)
    }

    pub async fn list_for_investor(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<Vec<investor_deposit::Model>, LedgerError> {
        let deposits = investor_deposit::Entity::find()
            .filter(investor_deposit::Column::InvestorId.eq(investor_id))
            .order_by_desc(investor_deposit::Column::Id)
            .all(db)
            .await?;

        Ok(deposits)
    }

    // ---------------------------------------------------------------- helpers

    /// Applique `changes` + le nouveau statut, seulement si le statut en base
    /// est encore celui lu dans `deposit`
    async fn apply_transition<C: ConnectionTrait>(
        db: &C,
        deposit: &investor_deposit::Model,
        event: DepositEvent,
        mut changes: investor_deposit::ActiveModel,
    ) -> Result<investor_deposit::Model, LedgerError> {
        let next = deposit.status.next(event)?;

        changes.status = Set(next);
        changes.updated_at = Set(Utc::now());

        let result = investor_deposit::Entity::update_many()
            .set(changes)
            .filter(investor_deposit::Column::Id.eq(deposit.id))
            .filter(investor_deposit::Column::Status.eq(deposit.status))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            // Quelqu'un est passé avant nous: relire pour un message exact
            let current = Self::find(db, deposit.id).await?;
            return Err(current.status.next(event).err().unwrap_or_else(|| {
                LedgerError::Conflict("Deposit was modified concurrently".to_string())
            }));
        }

        Self::find(db, deposit.id).await
    }

    async fn find<C: ConnectionTrait>(db: &C, deposit_id: i32) -> Result<investor_deposit::Model, LedgerError> {
        investor_deposit::Entity::find_by_id(deposit_id)
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Deposit".to_string()))
    }

    /// Un investisseur ne voit que ses propres dépôts (404 sinon)
    async fn find_owned(
        db: &DatabaseConnection,
        investor_id: i32,
        deposit_id: i32,
    ) -> Result<investor_deposit::Model, LedgerError> {
        investor_deposit::Entity::find_by_id(deposit_id)
            .filter(investor_deposit::Column::InvestorId.eq(investor_id))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Deposit".to_string()))
    }

    fn new_reference() -> String {
        let id = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("DEP-{}", &id[..12])
    }
}

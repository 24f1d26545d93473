// ============================================================================
// MODÈLE : INVESTOR DEPOSIT
// ============================================================================
//
// Workflow (machine à états):
//   1. L'investisseur crée le dépôt
//        mobile_money → awaiting_payment
//        cash         → awaiting_receipt
//   2. L'investisseur envoie la référence du reçu → awaiting_admin_confirmation
//   3. L'admin valide le reçu et fixe les frais   → pending_confirmation
//      (ou le rejette                             → awaiting_payment)
//   4. L'investisseur confirme le montant net      → confirmed (solde crédité)
//      (ou le conteste avec une note               → disputed, terminal)
//
// Points d'attention:
//   - amount = gross_amount - charges, doit rester > 0
//   - Le crédit du solde n'a lieu qu'à l'étape 4 (confirmed)
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    #[sea_orm(string_value = "cash")]
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    #[sea_orm(string_value = "awaiting_payment")]
    AwaitingPayment,
    #[sea_orm(string_value = "awaiting_receipt")]
    AwaitingReceipt,
    #[sea_orm(string_value = "awaiting_admin_confirmation")]
    AwaitingAdminConfirmation,
    #[sea_orm(string_value = "pending_confirmation")]
    PendingConfirmation,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "disputed")]
    Disputed,
}

/// Actions possibles sur un dépôt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositEvent {
    SubmitReceipt,
    ConfirmReceipt,
    RejectReceipt,
    Confirm,
    Dispute,
}

impl DepositEvent {
    fn action(self) -> &'static str {
        match self {
            DepositEvent::SubmitReceipt => "submit a receipt",
            DepositEvent::ConfirmReceipt => "confirm the receipt",
            DepositEvent::RejectReceipt => "reject the receipt",
            DepositEvent::Confirm => "confirm the deposit",
            DepositEvent::Dispute => "dispute the deposit",
        }
    }
}

impl DepositStatus {
    pub fn initial(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::MobileMoney => DepositStatus::AwaitingPayment,
            PaymentMethod::Cash => DepositStatus::AwaitingReceipt,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DepositStatus::AwaitingPayment => "awaiting_payment",
            DepositStatus::AwaitingReceipt => "awaiting_receipt",
            DepositStatus::AwaitingAdminConfirmation => "awaiting_admin_confirmation",
            DepositStatus::PendingConfirmation => "pending_confirmation",
            DepositStatus::Confirmed => "confirmed",
            DepositStatus::Disputed => "disputed",
        }
    }

    /// Transition de la machine à états, InvalidState si l'action est interdite
    pub fn next(self, event: DepositEvent) -> Result<Self, LedgerError> {
        use DepositStatus::*;

        match (self, event) {
            (AwaitingPayment | AwaitingReceipt, DepositEvent::SubmitReceipt) => Ok(AwaitingAdminConfirmation),
            (AwaitingAdminConfirmation, DepositEvent::ConfirmReceipt) => Ok(PendingConfirmation),
            (AwaitingAdminConfirmation, DepositEvent::RejectReceipt) => Ok(AwaitingPayment),
            (PendingConfirmation, DepositEvent::Confirm) => Ok(Confirmed),
            (PendingConfirmation, DepositEvent::Dispute) => Ok(Disputed),
            (current, event) => Err(LedgerError::invalid_state(current.as_str(), event.action())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investor_deposits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub investor_id: i32,
    #[sea_orm(unique)]
    pub reference: String,
    pub payment_method: PaymentMethod,
    pub gross_amount: Decimal,
    pub charges: Decimal,
    pub amount: Decimal, // net = gross_amount - charges
    pub status: DepositStatus,
    pub receipt_reference: Option<String>,
    pub admin_note: Option<String>,
    pub dispute_note: Option<String>,
    pub reviewed_by: Option<i32>,
    pub confirmed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_depends_on_method() {
        assert_eq!(DepositStatus::initial(PaymentMethod::MobileMoney), DepositStatus::AwaitingPayment);
        assert_eq!(DepositStatus::initial(PaymentMethod::Cash), DepositStatus::AwaitingReceipt);
    }

    #[test]
    fn test_happy_path() {
        let status = DepositStatus::AwaitingPayment
            .next(DepositEvent::SubmitReceipt)
            .and_then(|s| s.next(DepositEvent::ConfirmReceipt))
            .and_then(|s| s.next(DepositEvent::Confirm))
            .unwrap();

        assert_eq!(status, DepositStatus::Confirmed);
    }

    #[test]
    fn test_rejected_receipt_returns_to_awaiting_payment() {
        let status = DepositStatus::AwaitingReceipt
            .next(DepositEvent::SubmitReceipt)
            .and_then(|s| s.next(DepositEvent::RejectReceipt))
            .unwrap();

        assert_eq!(status, DepositStatus::AwaitingPayment);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for event in [
            DepositEvent::SubmitReceipt,
            DepositEvent::ConfirmReceipt,
            DepositEvent::RejectReceipt,
            DepositEvent::Confirm,
            DepositEvent::Dispute,
        ] {
            assert!(DepositStatus::Confirmed.next(event).is_err());
            assert!(DepositStatus::Disputed.next(event).is_err());
        }
    }

    #[test]
    fn test_confirm_requires_pending_confirmation() {
        let err = DepositStatus::AwaitingAdminConfirmation
            .next(DepositEvent::Confirm)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid state: cannot confirm the deposit while awaiting_admin_confirmation"
        );
    }
}

use sea_orm::*;
use sea_orm::sea_query::Expr;
use rust_decimal::Decimal;
use serde::Serialize;
use chrono::Utc;

use crate::error::LedgerError;
use crate::models::investor;
use crate::models::investor_transaction::{self, LedgerAccount, TransactionType};

/// Un mouvement à inscrire au journal
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub investor_id: i32,
    pub transaction_type: TransactionType,
    pub account: LedgerAccount,
    pub amount: Decimal, // signé: négatif = débit
    pub description: String,
    pub reference: Option<String>,
    pub performed_by: Option<i32>,
}

/// Cumuls à incrémenter en même temps que le solde
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalsDelta {
    pub invested: Decimal,
    pub profit: Decimal,
}

#[derive(Debug)]
pub struct PostedEntry {
    pub investor: investor::Model,
    pub transaction: investor_transaction::Model,
}

/// Comparaison entre les soldes stockés et la somme du journal
#[derive(Debug, Serialize)]
pub struct Reconciliation {
    pub investor_id: i32,
    pub cash_balance: Decimal,
    pub cash_from_ledger: Decimal,
    pub cash_matches: bool,
    pub profit_balance: Decimal,
    pub profit_from_ledger: Decimal,
    pub profit_matches: bool,
    pub entries: usize,
}

pub struct LedgerService;

impl LedgerService {
    /// Applique un mouvement sur le solde d'un investisseur ET écrit la
    /// transaction correspondante. C'est le seul chemin qui modifie
    /// cash_balance / profit_balance.
    ///
    /// À appeler avec la transaction DB de l'opération métier (db.begin()),
    /// pour que le solde et le journal soient validés ensemble.
    pub async fn post<C: ConnectionTrait>(
        db: &C,
        entry: LedgerEntry,
        totals: TotalsDelta,
    ) -> Result<PostedEntry, LedgerError> {
        if entry.amount.is_zero() {
            return Err(LedgerError::Validation(
                "Ledger entry amount cannot be zero".to_string(),
            ));
        }

        // 1. Vérifier le solde actuel (message d'erreur précis)
        let current = Self::find_investor(db, entry.investor_id).await?;
        let balances = current.balances();
        let debit = -entry.amount;

        match (entry.account, entry.amount.is_sign_negative()) {
            (LedgerAccount::Cash, true) => balances.debit_cash(debit)?,
            (LedgerAccount::Profit, true) => balances.debit_profit(debit)?,
            (LedgerAccount::Cash, false) => balances.credit_cash(entry.amount)?,
            (LedgerAccount::Profit, false) => balances.credit_profit(entry.amount)?,
        };

        // 2. UPDATE conditionnel: le solde ne peut pas passer sous zéro,
        //    même si une autre requête l'a modifié entre-temps
        let column = match entry.account {
            LedgerAccount::Cash => investor::Column::CashBalance,
            LedgerAccount::Profit => investor::Column::ProfitBalance,
        };

        let mut update = investor::Entity::update_many()
            .col_expr(column, Expr::col(column).add(entry.amount))
            .col_expr(investor::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(investor::Column::Id.eq(entry.investor_id));

        if !totals.invested.is_zero() {
            update = update.col_expr(
                investor::Column::TotalInvested,
                Expr::col(investor::Column::TotalInvested).add(totals.invested),
            );
        }
        if !totals.profit.is_zero() {
            update = update.col_expr(
                investor::Column::TotalProfit,
                Expr::col(investor::Column::TotalProfit).add(totals.profit),
            );
        }
        if entry.amount.is_sign_negative() {
            update = update.filter(column.gte(debit));
        }

        let result = update.exec(db).await?;
        if result.rows_affected == 0 {
            return Err(LedgerError::InsufficientBalance {
                required: debit,
                available: match entry.account {
                    LedgerAccount::Cash => balances.cash,
                    LedgerAccount::Profit => balances.profit,
                },
            });
        }

        // 3. Relire les soldes pour le snapshot
        let updated = Self::find_investor(db, entry.investor_id).await?;

        // 4. Écrire la ligne du journal
        let transaction = investor_transaction::ActiveModel {
            investor_id: Set(entry.investor_id),
            transaction_type: Set(entry.transaction_type),
            account: Set(entry.account),
            amount: Set(entry.amount),
            cash_balance_after: Set(updated.cash_balance),
            profit_balance_after: Set(updated.profit_balance),
            description: Set(entry.description),
            reference: Set(entry.reference),
            performed_by: Set(entry.performed_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(db)
            .await?;

        log::debug!(
            "Ledger: investor {} {:?} {} on {:?} (cash={}, profit={})",
            updated.id,
            transaction.transaction_type,
            transaction.amount,
            transaction.account,
            updated.cash_balance,
            updated.profit_balance
        );

        Ok(PostedEntry {
            investor: updated,
            transaction,
        })
    }

    /// Historique complet, le plus récent en premier
    pub async fn history(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<Vec<investor_transaction::Model>, LedgerError> {
        let transactions = investor_transaction::Entity::find()
            .filter(investor_transaction::Column::InvestorId.eq(investor_id))
            .order_by_desc(investor_transaction::Column::Id)
            .all(db)
            .await?;

        Ok(transactions)
    }

    /// Recalcule les soldes à partir du journal et les compare aux soldes stockés
    pub async fn reconcile(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<Reconciliation, LedgerError> {
        let investor = Self::find_investor(db, investor_id).await?;

        let transactions = investor_transaction::Entity::find()
            .filter(investor_transaction::Column::InvestorId.eq(investor_id))
            .all(db)
            .await?;

        let mut cash_from_ledger = Decimal::ZERO;
        let mut profit_from_ledger = Decimal::ZERO;

        for transaction in &transactions {
            match transaction.account {
                LedgerAccount::Cash => cash_from_ledger += transaction.amount,
                LedgerAccount::Profit => profit_from_ledger += transaction.amount,
            }
        }

        let reconciliation = Reconciliation {
            investor_id,
            cash_balance: investor.cash_balance,
            cash_from_ledger,
            cash_matches: cash_from_ledger == investor.cash_balance,
            profit_balance: investor.profit_balance,
            profit_from_ledger,
            profit_matches: profit_from_ledger == investor.profit_balance,
            entries: transactions.len(),
        };

        if !reconciliation.cash_matches || !reconciliation.profit_matches {
            log::warn!(
                "Ledger mismatch for investor {}: cash {} vs {}, profit {} vs {}",
                investor_id,
                investor.cash_balance,
                cash_from_ledger,
                investor.profit_balance,
                profit_from_ledger
            );
        }

        Ok(reconciliation)
    }

    pub async fn find_investor<C: ConnectionTrait>(
        db: &C,
        investor_id: i32,
    ) -> Result<investor::Model, LedgerError> {
        investor::Entity::find_by_id(investor_id)
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Investor".to_string()))
    }
}

// ============================================================================
// PRIMITIVES MONÉTAIRES DU LEDGER
// ============================================================================
//
// Description:
//   Arithmétique décimale utilisée par toutes les opérations du ledger.
//   Aucun f64 : tous les montants sont des rust_decimal::Decimal.
//
// Règles:
//   - Les parts créditées aux investisseurs sont tronquées au centime
//   - Les pourcentages de participation gardent 6 décimales
//   - split_half garantit company + pool == net exactement
//   - Les montants venant du client passent par checked_* : un dépassement
//     de capacité est une erreur de validation, jamais un panic
//
// ============================================================================

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::LedgerError;

/// Nombre de décimales des montants crédités
pub const MONEY_SCALE: u32 = 2;

/// Nombre de décimales des pourcentages (investment_percentage, profit_share)
pub const PERCENT_SCALE: u32 = 6;

/// Refuse un montant nul ou négatif
pub fn ensure_positive(amount: Decimal, field: &str) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(amount)
}

/// Refuse un montant négatif (zéro accepté, ex: frais de dépôt)
pub fn ensure_non_negative(amount: Decimal, field: &str) -> Result<Decimal, LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{} cannot be negative",
            field
        )));
    }
    Ok(amount)
}

fn out_of_range() -> LedgerError {
    LedgerError::Validation("amount out of range".to_string())
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_sub(b).ok_or_else(out_of_range)
}

pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

/// Somme contrôlée d'une suite de montants
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Result<Decimal, LedgerError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, checked_add)
}

/// Partage un profit net en deux: (part société, pool investisseurs)
pub fn split_half(net: Decimal) -> (Decimal, Decimal) {
    let pool = net / Decimal::TWO;
    let company = net - pool;
    (company, pool)
}

/// part / whole * 100, arrondi à PERCENT_SCALE décimales
pub fn percentage_of(part: Decimal, whole: Decimal) -> Result<Decimal, LedgerError> {
    if whole <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "Reference amount must be greater than 0".to_string(),
        ));
    }

    let ratio = part.checked_div(whole).ok_or_else(out_of_range)?;

    Ok(checked_mul(ratio, Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// pool * percentage / 100, tronqué au centime
pub fn share_of(pool: Decimal, percentage: Decimal) -> Result<Decimal, LedgerError> {
    Ok(checked_mul(pool, percentage / Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero))
}

/// Soldes d'un investisseur, avec mouvements contrôlés
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balances {
    pub cash: Decimal,
    pub profit: Decimal,
}

impl Balances {
    pub fn new(cash: Decimal, profit: Decimal) -> Self {
        Self { cash, profit }
    }

    pub fn debit_cash(self, amount: Decimal) -> Result<Self, LedgerError> {
        if self.cash < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: self.cash,
            });
        }
        Ok(Self { cash: self.cash - amount, ..self })
    }

    pub fn debit_profit(self, amount: Decimal) -> Result<Self, LedgerError> {
        if self.profit < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: self.profit,
            });
        }
        Ok(Self { profit: self.profit - amount, ..self })
    }

    pub fn credit_cash(self, amount: Decimal) -> Result<Self, LedgerError> {
        Ok(Self { cash: checked_add(self.cash, amount)?, ..self })
    }

    pub fn credit_profit(self, amount: Decimal) -> Result<Self, LedgerError> {
        Ok(Self { profit: checked_add(self.profit, amount)?, ..self })
    }
}

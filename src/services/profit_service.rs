// ============================================================================
// SERVICE : DISTRIBUTION DES PROFITS
// ============================================================================
//
// Deux sources de profit:
//
//   1. Job d'équipement (distribute_equipment_job_profit)
//      net = revenue - coûts, partagé 50/50 société / pool investisseurs.
//      Le pool est réparti au prorata de profit_share des allocations actives.
//
//   2. Vente d'unités d'un lot alloué (record_product_sale)
//      Le capital (purchase_price * quantité) revient en cash à l'investisseur,
//      la marge brute est partagée 50/50 société / investisseur.
//
// Règle d'arrondi:
//   - chaque part est tronquée au centime (money::share_of)
//   - si l'équipement est financé à 100%, la dernière allocation (id le plus
//     grand) reçoit le reste: pool - somme des autres parts
//   - sinon le reste (part non financée + résidus d'arrondi) est gardé par la
//     société et enregistré dans equipment_jobs.retained_amount
//
// Tout se fait dans UNE transaction DB: tous les investisseurs sont crédités
// ou aucun.
//
// ============================================================================

use sea_orm::*;
use sea_orm::sea_query::Expr;
use rust_decimal::Decimal;
use serde::Serialize;
use chrono::Utc;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::dto::{JobUsageRequest, ProductSaleRequest};
use crate::models::investor_transaction::{LedgerAccount, TransactionType};
use crate::models::profit_distribution::DistributionSource;
use crate::models::{equipment, equipment_allocation, equipment_job, product_allocation, profit_distribution};
use crate::services::allocation_service::AllocationService;
use crate::services::ledger_service::{LedgerEntry, LedgerService, TotalsDelta};
use crate::utils::money;

#[derive(Debug, Serialize)]
pub struct JobDistribution {
    pub job: equipment_job::Model,
    pub distributions: Vec<profit_distribution::Model>,
}

#[derive(Debug, Serialize)]
pub struct ProductSaleResult {
    pub allocation: product_allocation::Model,
    pub distribution: profit_distribution::Model,
    pub capital_returned: Decimal,
}

/// Calcule la part de chaque allocation dans le pool.
/// `fully_allocated` = l'équipement est financé à 100% par les allocations actives.
pub fn plan_shares(
    pool: Decimal,
    percentages: &[Decimal],
    fully_allocated: bool,
) -> Result<Vec<Decimal>, LedgerError> {
    let mut shares = percentages
        .iter()
        .map(|percentage| money::share_of(pool, *percentage))
        .collect::<Result<Vec<Decimal>, LedgerError>>()?;

    if fully_allocated {
        if let Some((last, others)) = shares.split_last_mut() {
            let distributed = money::checked_sum(others.iter().copied())?;
            *last = money::checked_sub(pool, distributed)?;
        }
    }

    Ok(shares)
}

pub struct ProfitService;

impl ProfitService {
    /// Enregistre un job d'équipement et distribue la moitié du profit net
    /// aux investisseurs actifs de cet équipement
    pub async fn distribute_equipment_job_profit(
        db: &DatabaseConnection,
        equipment_id: i32,
        request: JobUsageRequest,
        performed_by: Option<i32>,
    ) -> Result<JobDistribution, LedgerError> {
        // 1. Validation avant toute écriture
        let revenue = money::ensure_non_negative(request.revenue, "revenue")?;
        for (name, cost) in request.costs.items() {
            money::ensure_non_negative(cost, name)?;
        }

        let total_costs = request.costs.total()?;
        let net_profit = money::checked_sub(revenue, total_costs)?;
        if net_profit <= Decimal::ZERO {
            return Err(LedgerError::NoProfit(net_profit));
        }

        let (company_profit, investor_pool) = money::split_half(net_profit);

        let txn = db.begin().await?;

        let equipment = equipment::Entity::find_by_id(equipment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Equipment".to_string()))?;

        // 2. Calcul des parts
        let allocations = AllocationService::active_equipment_allocations(&txn, equipment.id).await?;
        let funded = money::checked_sum(allocations.iter().map(|a| a.amount_allocated))?;
        let percentages: Vec<Decimal> = allocations.iter().map(|a| a.profit_share).collect();
        let shares = plan_shares(investor_pool, &percentages, funded == equipment.purchase_price)?;

        let distributed_amount = money::checked_sum(shares.iter().copied())?;
        let retained_amount = money::checked_sub(investor_pool, distributed_amount)?;
        let batch_ref = Uuid::new_v4();

        // 3. Le job
        let job = equipment_job::ActiveModel {
            equipment_id: Set(equipment.id),
            batch_ref: Set(batch_ref),
            description: Set(request.description.clone()),
            revenue: Set(revenue),
            total_costs: Set(total_costs),
            net_profit: Set(net_profit),
            company_profit: Set(company_profit),
            investor_pool_profit: Set(investor_pool),
            distributed_amount: Set(distributed_amount),
            retained_amount: Set(retained_amount),
            recorded_by: Set(performed_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        // 4. Une distribution + une transaction par investisseur
        let mut distributions = Vec::with_capacity(allocations.len());

        for (allocation, share) in allocations.into_iter().zip(shares) {
            if share <= Decimal::ZERO {
                log::debug!(
                    "Allocation {} share rounds to zero on job {}, skipped",
                    allocation.id,
                    job.id
                );
                continue;
            }

            equipment_allocation::Entity::update_many()
                .col_expr(
                    equipment_allocation::Column::TotalProfitReceived,
                    Expr::col(equipment_allocation::Column::TotalProfitReceived).add(share),
                )
                .filter(equipment_allocation::Column::Id.eq(allocation.id))
                .exec(&txn)
                .await?;

            let distribution = profit_distribution::ActiveModel {
                batch_ref: Set(batch_ref),
                investor_id: Set(allocation.investor_id),
                source: Set(DistributionSource::EquipmentJob),
                equipment_id: Set(Some(equipment.id)),
                equipment_job_id: Set(Some(job.id)),
                product_allocation_id: Set(None),
                order_reference: Set(None),
                revenue: Set(revenue),
                cost: Set(total_costs),
                gross_profit: Set(net_profit),
                company_share: Set(company_profit),
                investor_share: Set(share),
                share_percentage: Set(allocation.profit_share),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
                .insert(&txn)
                .await?;

            LedgerService::post(
                &txn,
                LedgerEntry {
                    investor_id: allocation.investor_id,
                    transaction_type: TransactionType::ProfitCredit,
                    account: LedgerAccount::Profit,
                    amount: share,
                    description: format!(
                        "Profit share ({}%) from {} job #{}",
                        allocation.profit_share, equipment.name, job.id
                    ),
                    reference: Some(format!("profit_distribution:{}", distribution.id)),
                    performed_by,
                },
                TotalsDelta { profit: share, ..Default::default() },
            )
                .await?;

            distributions.push(distribution);
        }

        txn.commit().await?;

        log::info!(
            "Equipment {} job {}: net {} → company {}, pool {} ({} distributed to {} investors, {} retained)",
            equipment.id,
            job.id,
            net_profit,
            company_profit,
            investor_pool,
            distributed_amount,
            distributions.len(),
            retained_amount
        );

        Ok(JobDistribution { job, distributions })
    }

    /// Enregistre la vente d'unités d'un lot alloué: retour du capital en cash
    /// et moitié de la marge brute créditée en profit
    pub async fn record_product_sale(
        db: &DatabaseConnection,
        allocation_id: i32,
        request: ProductSaleRequest,
        performed_by: Option<i32>,
    ) -> Result<ProductSaleResult, LedgerError> {
        if request.quantity < 1 {
            return Err(LedgerError::Validation("quantity must be at least 1".to_string()));
        }
        let unit_sale_price = money::ensure_positive(request.unit_sale_price, "unit_sale_price")?;
        let quantity = Decimal::from(request.quantity);
        let revenue = money::checked_mul(unit_sale_price, quantity)?;

        let txn = db.begin().await?;

        let allocation = product_allocation::Entity::find_by_id(allocation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Product allocation".to_string()))?;

        if allocation.quantity_remaining < request.quantity {
            return Err(LedgerError::InsufficientAllocation {
                requested: request.quantity,
                available: allocation.quantity_remaining,
            });
        }

        // 1. Chiffres de la vente
        let capital = money::checked_mul(allocation.purchase_price, quantity)?;
        let gross_profit = money::checked_sub(revenue, capital)?;
        let capital_returned = capital.min(revenue);

        let (company_share, investor_share) = if gross_profit > Decimal::ZERO {
            let (_, pool) = money::split_half(gross_profit);
            let investor_share = money::share_of(pool, Decimal::ONE_HUNDRED)?;
            (gross_profit - investor_share, investor_share)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        // 2. Mettre à jour le lot (garde: quantity_remaining suffisante)
        let result = product_allocation::Entity::update_many()
            .col_expr(
                product_allocation::Column::QuantityRemaining,
                Expr::col(product_allocation::Column::QuantityRemaining).sub(request.quantity),
            )
            .col_expr(
                product_allocation::Column::QuantitySold,
                Expr::col(product_allocation::Column::QuantitySold).add(request.quantity),
            )
            .col_expr(
                product_allocation::Column::ProfitGenerated,
                Expr::col(product_allocation::Column::ProfitGenerated).add(investor_share),
            )
            .col_expr(
                product_allocation::Column::CapitalReturned,
                Expr::col(product_allocation::Column::CapitalReturned).add(capital_returned),
            )
            .filter(product_allocation::Column::Id.eq(allocation.id))
            .filter(product_allocation::Column::QuantityRemaining.gte(request.quantity))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(LedgerError::InsufficientAllocation {
                requested: request.quantity,
                available: allocation.quantity_remaining,
            });
        }

        // 3. Trace de la distribution
        let distribution = profit_distribution::ActiveModel {
            batch_ref: Set(Uuid::new_v4()),
            investor_id: Set(allocation.investor_id),
            source: Set(DistributionSource::ProductSale),
            equipment_id: Set(None),
            equipment_job_id: Set(None),
            product_allocation_id: Set(Some(allocation.id)),
            order_reference: Set(request.order_reference.clone()),
            revenue: Set(revenue),
            cost: Set(capital),
            gross_profit: Set(gross_profit),
            company_share: Set(company_share),
            investor_share: Set(investor_share),
            share_percentage: Set(Decimal::ONE_HUNDRED),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        let reference = Some(format!("profit_distribution:{}", distribution.id));

        // 4. Capital → cash, marge → profit
        if capital_returned > Decimal::ZERO {
            LedgerService::post(
                &txn,
                LedgerEntry {
                    investor_id: allocation.investor_id,
                    transaction_type: TransactionType::CapitalReturn,
                    account: LedgerAccount::Cash,
                    amount: capital_returned,
                    description: format!(
                        "Capital returned for {} units of allocation {}",
                        request.quantity, allocation.id
                    ),
                    reference: reference.clone(),
                    performed_by,
                },
                TotalsDelta::default(),
            )
                .await?;
        }

        if investor_share > Decimal::ZERO {
            LedgerService::post(
                &txn,
                LedgerEntry {
                    investor_id: allocation.investor_id,
                    transaction_type: TransactionType::ProfitCredit,
                    account: LedgerAccount::Profit,
                    amount: investor_share,
                    description: format!(
                        "Profit share from sale of {} units of allocation {}",
                        request.quantity, allocation.id
                    ),
                    reference,
                    performed_by,
                },
                TotalsDelta { profit: investor_share, ..Default::default() },
            )
                .await?;
        }

        let allocation = product_allocation::Entity::find_by_id(allocation.id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Product allocation".to_string()))?;

        txn.commit().await?;

        log::info!(
            "Sale on allocation {}: {} units, revenue {}, investor profit {}",
            allocation.id,
            request.quantity,
            revenue,
            investor_share
        );

        Ok(ProductSaleResult {
            allocation,
            distribution,
            capital_returned,
        })
    }

    pub async fn list_for_investor(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<Vec<profit_distribution::Model>, LedgerError> {
        let distributions = profit_distribution::Entity::find()
            .filter(profit_distribution::Column::InvestorId.eq(investor_id))
            .order_by_desc(profit_distribution::Column::Id)
            .all(db)
            .await?;

        Ok(distributions)
    }
}

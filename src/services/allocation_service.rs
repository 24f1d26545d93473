use sea_orm::*;
use sea_orm::sea_query::Expr;
use rust_decimal::Decimal;
use chrono::Utc;

use crate::error::LedgerError;
use crate::models::dto::{AllocateEquipmentRequest, AllocateProductRequest, InvestorAllocationsResponse, RemovedAllocationResponse};
use crate::models::investor_transaction::{LedgerAccount, TransactionType};
use crate::models::{equipment, equipment_allocation, product, product_allocation, product_variant};
use crate::services::ledger_service::{LedgerEntry, LedgerService, TotalsDelta};
use crate::utils::money;

pub struct AllocationService;

impl AllocationService {
    /// Engage le capital d'un investisseur sur un lot de produits.
    /// Le stock n'est PAS décrémenté: il ne baisse qu'à la vente réelle.
    pub async fn allocate_to_product(
        db: &DatabaseConnection,
        investor_id: i32,
        request: AllocateProductRequest,
        performed_by: Option<i32>,
    ) -> Result<product_allocation::Model, LedgerError> {
        if request.quantity < 1 {
            return Err(LedgerError::Validation("quantity must be at least 1".to_string()));
        }
        let purchase_price = money::ensure_positive(request.purchase_price, "purchase_price")?;
        let total_investment = money::checked_mul(purchase_price, Decimal::from(request.quantity))?;

        let txn = db.begin().await?;

        // 1. Vérifier la trésorerie de l'investisseur
        let investor = LedgerService::find_investor(&txn, investor_id).await?;
        investor.balances().debit_cash(total_investment)?;

        // 2. Vérifier le produit (et la variante) + le stock si suivi
        let product = product::Entity::find_by_id(request.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Product".to_string()))?;

        let available_stock = match request.variant_id {
            Some(variant_id) => {
                product_variant::Entity::find_by_id(variant_id)
                    .filter(product_variant::Column::ProductId.eq(product.id))
                    .one(&txn)
                    .await?
                    .ok_or_else(|| LedgerError::NotFound("Product variant".to_string()))?
                    .stock_quantity
            }
            None => product.stock_quantity,
        };

        if product.track_inventory && available_stock < request.quantity {
            return Err(LedgerError::InsufficientStock {
                requested: request.quantity,
                available: available_stock,
            });
        }

        // 3. Créer l'allocation
        let allocation = product_allocation::ActiveModel {
            investor_id: Set(investor.id),
            product_id: Set(product.id),
            variant_id: Set(request.variant_id),
            quantity: Set(request.quantity),
            purchase_price: Set(purchase_price),
            total_investment: Set(total_investment),
            quantity_remaining: Set(request.quantity),
            quantity_sold: Set(0),
            profit_generated: Set(Decimal::ZERO),
            capital_returned: Set(Decimal::ZERO),
            allocated_by: Set(performed_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        // 4. Débiter la trésorerie + journal
        LedgerService::post(
            &txn,
            LedgerEntry {
                investor_id: investor.id,
                transaction_type: TransactionType::AllocationProduct,
                account: LedgerAccount::Cash,
                amount: -total_investment,
                description: format!(
                    "Allocation of {} x {} at {}",
                    request.quantity, product.name, purchase_price
                ),
                reference: Some(format!("product_allocation:{}", allocation.id)),
                performed_by,
            },
            TotalsDelta::default(),
        )
            .await?;

        txn.commit().await?;

        log::info!(
            "Investor {} allocated {} to product {} ({} units)",
            investor.id,
            total_investment,
            product.id,
            request.quantity
        );

        Ok(allocation)
    }

    /// Engage le capital d'un investisseur sur un équipement.
    /// La somme des allocations actives ne peut pas dépasser le prix d'achat.
    pub async fn allocate_to_equipment(
        db: &DatabaseConnection,
        investor_id: i32,
        request: AllocateEquipmentRequest,
        performed_by: Option<i32>,
    ) -> Result<equipment_allocation::Model, LedgerError> {
        let amount = money::ensure_positive(request.amount_allocated, "amount_allocated")?;

        let txn = db.begin().await?;

        let investor = LedgerService::find_investor(&txn, investor_id).await?;
        investor.balances().debit_cash(amount)?;

        let equipment = equipment::Entity::find_by_id(request.equipment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Equipment".to_string()))?;

        let already_allocated = Self::active_allocated_amount(&txn, equipment.id).await?;
        if money::checked_add(already_allocated, amount)? > equipment.purchase_price {
            return Err(LedgerError::AllocationExceedsEquipment {
                allocated: already_allocated,
                purchase_price: equipment.purchase_price,
            });
        }

        let percentage = money::percentage_of(amount, equipment.purchase_price)?;

        let allocation = equipment_allocation::ActiveModel {
            investor_id: Set(investor.id),
            equipment_id: Set(equipment.id),
            amount_allocated: Set(amount),
            investment_percentage: Set(percentage),
            profit_share: Set(percentage),
            total_profit_received: Set(Decimal::ZERO),
            has_exited: Set(false),
            allocated_by: Set(performed_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        LedgerService::post(
            &txn,
            LedgerEntry {
                investor_id: investor.id,
                transaction_type: TransactionType::AllocationEquipment,
                account: LedgerAccount::Cash,
                amount: -amount,
                description: format!("Allocation to equipment {} ({}%)", equipment.name, percentage),
                reference: Some(format!("equipment_allocation:{}", allocation.id)),
                performed_by,
            },
            TotalsDelta::default(),
        )
            .await?;

        txn.commit().await?;

        log::info!(
            "Investor {} allocated {} to equipment {} ({}%)",
            investor.id,
            amount,
            equipment.id,
            percentage
        );

        Ok(allocation)
    }

    /// Annule une allocation produit sans vente: remet le stock et rembourse
    pub async fn remove_product_allocation(
        db: &DatabaseConnection,
        investor_id: i32,
        allocation_id: i32,
        performed_by: Option<i32>,
    ) -> Result<RemovedAllocationResponse, LedgerError> {
        let txn = db.begin().await?;

        let allocation = product_allocation::Entity::find_by_id(allocation_id)
            .filter(product_allocation::Column::InvestorId.eq(investor_id))
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Product allocation".to_string()))?;

        if allocation.quantity_sold > 0 {
            return Err(LedgerError::HasSales(allocation.quantity_sold));
        }

        let product = product::Entity::find_by_id(allocation.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Product".to_string()))?;

        // 1. Remettre le stock (seulement si le produit est suivi)
        let restored_quantity = if product.track_inventory {
            match allocation.variant_id {
                Some(variant_id) => {
                    product_variant::Entity::update_many()
                        .col_expr(
                            product_variant::Column::StockQuantity,
                            Expr::col(product_variant::Column::StockQuantity).add(allocation.quantity),
                        )
                        .filter(product_variant::Column::Id.eq(variant_id))
                        .exec(&txn)
                        .await?;
                }
                None => {
                    product::Entity::update_many()
                        .col_expr(
                            product::Column::StockQuantity,
                            Expr::col(product::Column::StockQuantity).add(allocation.quantity),
                        )
                        .filter(product::Column::Id.eq(product.id))
                        .exec(&txn)
                        .await?;
                }
            }
            allocation.quantity
        } else {
            0
        };

        // 2. Supprimer l'allocation
        let refunded_amount = allocation.total_investment;
        let quantity = allocation.quantity;
        allocation.delete(&txn).await?;

        // 3. Rembourser + journal
        LedgerService::post(
            &txn,
            LedgerEntry {
                investor_id,
                transaction_type: TransactionType::Refund,
                account: LedgerAccount::Cash,
                amount: refunded_amount,
                description: format!("Refund of allocation {} ({} x {})", allocation_id, quantity, product.name),
                reference: Some(format!("product_allocation:{}", allocation_id)),
                performed_by,
            },
            TotalsDelta::default(),
        )
            .await?;

        txn.commit().await?;

        log::info!(
            "Removed product allocation {} for investor {}, refunded {}",
            allocation_id,
            investor_id,
            refunded_amount
        );

        Ok(RemovedAllocationResponse {
            allocation_id,
            refunded_amount,
            restored_quantity,
        })
    }

    pub async fn list_for_investor(
        db: &DatabaseConnection,
        investor_id: i32,
    ) -> Result<InvestorAllocationsResponse, LedgerError> {
        let products = product_allocation::Entity::find()
            .filter(product_allocation::Column::InvestorId.eq(investor_id))
            .order_by_asc(product_allocation::Column::Id)
            .all(db)
            .await?;

        let equipment = equipment_allocation::Entity::find()
            .filter(equipment_allocation::Column::InvestorId.eq(investor_id))
            .order_by_asc(equipment_allocation::Column::Id)
            .all(db)
            .await?;

        Ok(InvestorAllocationsResponse { products, equipment })
    }

    pub async fn list_for_equipment(
        db: &DatabaseConnection,
        equipment_id: i32,
    ) -> Result<Vec<equipment_allocation::Model>, LedgerError> {
        let allocations = equipment_allocation::Entity::find()
            .filter(equipment_allocation::Column::EquipmentId.eq(equipment_id))
            .order_by_asc(equipment_allocation::Column::Id)
            .all(db)
            .await?;

        Ok(allocations)
    }

    /// Allocations actives (has_exited = false) d'un équipement, par id croissant
    pub async fn active_equipment_allocations<C: ConnectionTrait>(
        db: &C,
        equipment_id: i32,
    ) -> Result<Vec<equipment_allocation::Model>, LedgerError> {
        let allocations = equipment_allocation::Entity::find()
            .filter(equipment_allocation::Column::EquipmentId.eq(equipment_id))
            .filter(equipment_allocation::Column::HasExited.eq(false))
            .order_by_asc(equipment_allocation::Column::Id)
            .all(db)
            .await?;

        Ok(allocations)
    }

    async fn active_allocated_amount<C: ConnectionTrait>(
        db: &C,
        equipment_id: i32,
    ) -> Result<Decimal, LedgerError> {
        let allocations = Self::active_equipment_allocations(db, equipment_id).await?;

        money::checked_sum(allocations.iter().map(|a| a.amount_allocated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::investor_transaction;
    use crate::test_support;
    use rust_decimal_macros::dec;

    fn product_request(product_id: i32, quantity: i32, price: Decimal) -> AllocateProductRequest {
        AllocateProductRequest {
            product_id,
            variant_id: None,
            quantity,
            purchase_price: price,
        }
    }

    #[tokio::test]
    async fn test_allocate_to_product_scenario() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "alice", dec!(1000)).await;
        let product = test_support::seed_product(&db, "Kente shirt", true, 20).await;

        let allocation = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(product.id, 10, dec!(50)),
            Some(1),
        )
            .await
            .unwrap();

        assert_eq!(allocation.quantity_remaining, 10);
        assert_eq!(allocation.quantity_sold, 0);
        assert_eq!(allocation.total_investment, dec!(500));
        assert_eq!(allocation.quantity_remaining + allocation.quantity_sold, allocation.quantity);

        let investor = LedgerService::find_investor(&db, investor.id).await.unwrap();
        assert_eq!(investor.cash_balance, dec!(500));

        // Le stock ne bouge pas à l'allocation
        let product = product::Entity::find_by_id(product.id).one(&db).await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 20);

        let history = LedgerService::history(&db, investor.id).await.unwrap();
        assert_eq!(history[0].transaction_type, TransactionType::AllocationProduct);
        assert_eq!(history[0].amount, dec!(-500));
    }

    #[tokio::test]
    async fn test_allocate_to_product_insufficient_balance() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "bob", dec!(100)).await;
        let product = test_support::seed_product(&db, "Agbada", true, 20).await;

        let result = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(product.id, 3, dec!(50)),
            None,
        )
            .await;

        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        let count = product_allocation::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_allocate_to_product_total_out_of_range() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "dede", dec!(1000)).await;
        let product = test_support::seed_product(&db, "Batik", false, 0).await;

        let result = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(product.id, 2, Decimal::MAX),
            None,
        )
            .await;

        assert!(matches!(result, Err(LedgerError::Validation(msg)) if msg == "amount out of range"));
        let count = product_allocation::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_allocate_to_product_insufficient_stock() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "carol", dec!(1000)).await;
        let tracked = test_support::seed_product(&db, "Cap", true, 2).await;
        let untracked = test_support::seed_product(&db, "Custom suit", false, 0).await;

        let result = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(tracked.id, 5, dec!(10)),
            None,
        )
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientStock { requested: 5, available: 2 })
        ));

        // Produit non suivi: pas de contrôle de stock
        let allocation = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(untracked.id, 5, dec!(10)),
            None,
        )
            .await
            .unwrap();
        assert_eq!(allocation.quantity, 5);
    }

    #[tokio::test]
    async fn test_allocate_to_variant_checks_variant_stock() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "dan", dec!(1000)).await;
        let product = test_support::seed_product(&db, "Dress", true, 100).await;
        let variant = test_support::seed_variant(&db, product.id, "XL", 1).await;

        let result = AllocationService::allocate_to_product(
            &db,
            investor.id,
            AllocateProductRequest {
                product_id: product.id,
                variant_id: Some(variant.id),
                quantity: 2,
                purchase_price: dec!(30),
            },
            None,
        )
            .await;

        assert!(matches!(result, Err(LedgerError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_remove_product_allocation_restores_and_refunds() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "erin", dec!(1000)).await;
        let product = test_support::seed_product(&db, "Sandals", true, 20).await;

        let allocation = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(product.id, 4, dec!(25)),
            None,
        )
            .await
            .unwrap();

        let removed = AllocationService::remove_product_allocation(&db, investor.id, allocation.id, Some(1))
            .await
            .unwrap();

        assert_eq!(removed.refunded_amount, dec!(100));
        assert_eq!(removed.restored_quantity, 4);

        let product = product::Entity::find_by_id(product.id).one(&db).await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 24);

        let investor = LedgerService::find_investor(&db, investor.id).await.unwrap();
        assert_eq!(investor.cash_balance, dec!(1000));

        let refund = investor_transaction::Entity::find()
            .filter(investor_transaction::Column::TransactionType.eq(TransactionType::Refund))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refund.amount, dec!(100));
        assert!(product_allocation::Entity::find_by_id(allocation.id).one(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_product_allocation_with_sales_fails() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "fay", dec!(1000)).await;
        let product = test_support::seed_product(&db, "Bag", true, 20).await;

        let allocation = AllocationService::allocate_to_product(
            &db,
            investor.id,
            product_request(product.id, 4, dec!(25)),
            None,
        )
            .await
            .unwrap();

        let mut sold: product_allocation::ActiveModel = allocation.clone().into();
        sold.quantity_remaining = Set(3);
        sold.quantity_sold = Set(1);
        sold.update(&db).await.unwrap();

        let result = AllocationService::remove_product_allocation(&db, investor.id, allocation.id, None).await;
        assert!(matches!(result, Err(LedgerError::HasSales(1))));

        let investor = LedgerService::find_investor(&db, investor.id).await.unwrap();
        assert_eq!(investor.cash_balance, dec!(900));
    }

    #[tokio::test]
    async fn test_allocate_to_equipment_percentage() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "gus", dec!(5000)).await;
        let equipment = test_support::seed_equipment(&db, "Embroidery machine", dec!(8000)).await;

        let allocation = AllocationService::allocate_to_equipment(
            &db,
            investor.id,
            AllocateEquipmentRequest {
                equipment_id: equipment.id,
                amount_allocated: dec!(2000),
            },
            None,
        )
            .await
            .unwrap();

        assert_eq!(allocation.investment_percentage, dec!(25));
        assert_eq!(allocation.profit_share, dec!(25));
        assert!(!allocation.has_exited);

        let investor = LedgerService::find_investor(&db, investor.id).await.unwrap();
        assert_eq!(investor.cash_balance, dec!(3000));
    }

    #[tokio::test]
    async fn test_equipment_allocation_cannot_exceed_purchase_price() {
        let db = test_support::setup_db().await;
        let first = test_support::seed_investor(&db, "hana", dec!(5000)).await;
        let second = test_support::seed_investor(&db, "ivan", dec!(5000)).await;
        let equipment = test_support::seed_equipment(&db, "Press", dec!(4000)).await;

        AllocationService::allocate_to_equipment(
            &db,
            first.id,
            AllocateEquipmentRequest { equipment_id: equipment.id, amount_allocated: dec!(3000) },
            None,
        )
            .await
            .unwrap();

        let result = AllocationService::allocate_to_equipment(
            &db,
            second.id,
            AllocateEquipmentRequest { equipment_id: equipment.id, amount_allocated: dec!(1500) },
            None,
        )
            .await;

        assert!(matches!(result, Err(LedgerError::AllocationExceedsEquipment { .. })));

        let second = LedgerService::find_investor(&db, second.id).await.unwrap();
        assert_eq!(second.cash_balance, dec!(5000));
    }

    #[tokio::test]
    async fn test_unknown_equipment() {
        let db = test_support::setup_db().await;
        let investor = test_support::seed_investor(&db, "jo", dec!(100)).await;

        let result = AllocationService::allocate_to_equipment(
            &db,
            investor.id,
            AllocateEquipmentRequest { equipment_id: 42, amount_allocated: dec!(50) },
            None,
        )
            .await;

        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }
}

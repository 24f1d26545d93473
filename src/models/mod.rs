// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - dto : Requêtes / réponses de l'API
//   - users : Utilisateurs (admin, investor, customer)
//   - investor : Profils investisseurs et soldes
//   - product / product_variant : Vue minimale du catalogue (stock)
//   - equipment : Équipements financés par les investisseurs
//   - product_allocation : Capital engagé sur un lot de produits
//   - equipment_allocation : Capital engagé sur un équipement
//   - equipment_job : Utilisations d'équipement génératrices de profit
//   - profit_distribution : Parts de profit versées (immuable)
//   - investor_transaction : Journal d'audit des soldes (append-only)
//   - investor_deposit : Dépôts et leur confirmation
//   - withdrawal_request : Demandes de retrait
//
// Points d'attention:
//   - Tous les montants sont des Decimal (jamais de f64)
//   - Les statuts sont des enums DeriveActiveEnum stockés en texte
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod investor;
pub mod product;
pub mod product_variant;
pub mod equipment;
pub mod product_allocation;
pub mod equipment_allocation;
pub mod equipment_job;
pub mod profit_distribution;
pub mod investor_transaction;
pub mod investor_deposit;
pub mod withdrawal_request;

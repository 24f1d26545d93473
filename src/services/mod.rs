pub mod allocation_service;
pub mod deposit_service;
pub mod equipment_service;
pub mod investor_service;
pub mod ledger_service;
pub mod profit_service;
pub mod withdrawal_service;

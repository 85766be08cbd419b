pub mod cost_catalog;
pub use cost_catalog::CostCatalogService;
pub mod cost_ledger;
pub use cost_ledger::CostLedgerService;
pub mod profitability;
pub use profitability::ProfitabilityService;
pub mod realized;
pub use realized::RealizedPeriodService;
pub mod cashflow;
pub use cashflow::CashFlowService;
pub mod goal;
pub use goal::GoalService;

//! # Stock Engine
//!
//! 配方驅動的庫存消耗引擎：
//! 庫存帳本、配方解析、生產交易、引用守衛與臨界庫存監視。

pub mod guard;
pub mod ledger;
pub mod monitor;
pub mod production;
pub mod recipes;

// Re-export 主要類型
pub use guard::{OrderDocuments, PurchaseDocuments, ReferentialGuard, ReferentialVeto};
pub use ledger::{CommitPlan, StockLedger, StockSnapshot};
pub use monitor::{CriticalStockAlert, CriticalStockMonitor};
pub use production::{
    ConsumedLine, ProductionEngine, ProductionError, ProductionReceipt, ProductionRequest,
    Shortfall,
};
pub use recipes::{RecipeBook, RecipeBookError, RecipeResolution};

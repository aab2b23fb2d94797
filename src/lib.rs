//! # Resto Stock
//!
//! 餐廳後台的配方驅動庫存引擎：
//! 原料/成品庫存帳本、配方解析、全有全無的生產交易、
//! 引用守衛與臨界庫存監視。

pub use stock_core::{
    EntityState, FinishedGood, FinishedGoodId, RawMaterial, RawMaterialId, Recipe, RecipeId,
    RecipeLine, StockError, SupplierId, UnitOfMeasure,
};
pub use stock_engine::{
    CommitPlan, ConsumedLine, CriticalStockAlert, CriticalStockMonitor, OrderDocuments,
    ProductionEngine, ProductionError, ProductionReceipt, ProductionRequest, PurchaseDocuments,
    RecipeBook, RecipeBookError, RecipeResolution, ReferentialGuard, ReferentialVeto, Shortfall,
    StockLedger, StockSnapshot,
};

//! # Stock Core
//!
//! 核心資料模型與類型定義

pub mod finished_good;
pub mod raw_material;
pub mod recipe;

// Re-export 主要類型
pub use finished_good::FinishedGood;
pub use raw_material::{RawMaterial, UnitOfMeasure};
pub use recipe::{Recipe, RecipeLine};

use rust_decimal::Decimal;

/// 原料ID（對應資料庫的整數主鍵）
pub type RawMaterialId = u32;

/// 成品ID
pub type FinishedGoodId = u32;

/// 配方ID
pub type RecipeId = u32;

/// 供應商ID
pub type SupplierId = u32;

/// 實體生命週期狀態
///
/// 實體不做硬刪除，只在 Active / Inactive 之間切換。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EntityState {
    /// 啟用
    Active,
    /// 停用
    Inactive,
}

impl EntityState {
    /// 檢查是否為啟用狀態
    pub fn is_active(self) -> bool {
        self == EntityState::Active
    }
}

/// 庫存錯誤類型
#[derive(Debug, Clone, thiserror::Error)]
pub enum StockError {
    #[error("找不到原料: {0}")]
    RawMaterialNotFound(RawMaterialId),

    #[error("找不到成品: {0}")]
    FinishedGoodNotFound(FinishedGoodId),

    #[error("重複的實體ID: {0}")]
    DuplicateId(u32),

    #[error("庫存數量不可為負: 實體 {id} 欲寫入 {requested}")]
    NegativeQuantity { id: u32, requested: Decimal },

    #[error("無效的庫存門檻: {0}")]
    InvalidThresholds(String),

    #[error("版本衝突: 實體 {0} 在讀取後已被其他請求修改")]
    VersionConflict(u32),

    #[error("提交重試次數已用盡")]
    TooManyConflicts,
}

pub type Result<T> = std::result::Result<T, StockError>;

//! 成品模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EntityState, FinishedGoodId};

/// 成品（可販售的餐點）
///
/// 庫存只能由生產引擎（增加）或訂單出餐（扣減）修改，
/// 一律經過 StockLedger 的單一寫入點。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedGood {
    /// 成品ID
    pub id: FinishedGoodId,

    /// 名稱
    pub name: String,

    /// 售價
    pub price: Decimal,

    /// 現有庫存（整數份數）
    pub stock: u32,

    /// 分類ID
    pub category_id: u32,

    /// 生命週期狀態
    pub state: EntityState,
}

impl FinishedGood {
    /// 創建新的成品
    ///
    /// 登記時庫存一律為 0：成品必須經由生產取得庫存。
    pub fn new(id: FinishedGoodId, name: impl Into<String>, price: Decimal, category_id: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock: 0,
            category_id,
            state: EntityState::Active,
        }
    }

    /// 建構器模式：設置生命週期狀態
    pub fn with_state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    /// 檢查是否為啟用狀態
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// 檢查現有庫存是否足以滿足需求份數
    pub fn covers(&self, requested: u32) -> bool {
        self.stock >= requested
    }
}

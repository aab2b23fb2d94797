//! 配方模型（成品的用料清單）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EntityState, FinishedGoodId, RawMaterialId, RecipeId};

/// 配方明細：生產一份成品所需的單一原料用量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    /// 原料ID
    pub raw_material_id: RawMaterialId,

    /// 每份成品的用量（應為正數；非正數視為退化明細，生產時略過）
    pub quantity_per_unit: Decimal,
}

impl RecipeLine {
    /// 創建新的配方明細
    pub fn new(raw_material_id: RawMaterialId, quantity_per_unit: Decimal) -> Self {
        Self {
            raw_material_id,
            quantity_per_unit,
        }
    }

    /// 檢查明細是否退化（用量非正）
    pub fn is_degenerate(&self) -> bool {
        self.quantity_per_unit <= Decimal::ZERO
    }
}

/// 配方
///
/// 每個成品最多只有一個啟用中的配方（由 RecipeBook 在寫入時把關）。
/// 沒有任何明細的配方視為「空配方」，生產時為硬性阻擋而非「產出為零」。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// 配方ID
    pub id: RecipeId,

    /// 所屬成品ID
    pub finished_good_id: FinishedGoodId,

    /// 說明
    pub description: Option<String>,

    /// 生命週期狀態
    pub state: EntityState,

    /// 配方明細（有序）
    pub lines: Vec<RecipeLine>,
}

impl Recipe {
    /// 創建新的配方
    pub fn new(id: RecipeId, finished_good_id: FinishedGoodId) -> Self {
        Self {
            id,
            finished_good_id,
            description: None,
            state: EntityState::Active,
            lines: Vec::new(),
        }
    }

    /// 建構器模式：設置說明
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 建構器模式：設置明細
    pub fn with_lines(mut self, lines: Vec<RecipeLine>) -> Self {
        self.lines = lines;
        self
    }

    /// 建構器模式：設置生命週期狀態
    pub fn with_state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    /// 整組替換明細
    ///
    /// 配方編輯一律整組覆蓋，不做逐筆增補。
    pub fn replace_lines(&mut self, lines: Vec<RecipeLine>) {
        self.lines = lines;
    }

    /// 檢查是否為空配方
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 檢查是否為啟用狀態
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// 檢查配方是否引用指定原料
    pub fn references_raw_material(&self, raw_material_id: RawMaterialId) -> bool {
        self.lines
            .iter()
            .any(|line| line.raw_material_id == raw_material_id)
    }
}

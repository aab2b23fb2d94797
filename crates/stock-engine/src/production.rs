//! 生產引擎：依配方將原料庫存轉換為成品庫存

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stock_core::{FinishedGoodId, RawMaterialId, StockError};
use uuid::Uuid;

use crate::ledger::{CommitPlan, StockLedger};
use crate::recipes::{RecipeBook, RecipeResolution};

/// 提交重試上限：超過即視為基礎設施異常而非業務結果
const MAX_COMMIT_RETRIES: u32 = 16;

/// 生產請求（暫態，不落地）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRequest {
    /// 目標成品ID
    pub finished_good_id: FinishedGoodId,

    /// 需求份數（必須為正整數）
    pub quantity: u32,
}

impl ProductionRequest {
    /// 創建新的生產請求
    pub fn new(finished_good_id: FinishedGoodId, quantity: u32) -> Self {
        Self {
            finished_good_id,
            quantity,
        }
    }
}

/// 單項原料短缺
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// 原料ID
    pub raw_material_id: RawMaterialId,

    /// 原料名稱
    pub name: String,

    /// 本次生產所需數量
    pub required: Decimal,

    /// 現有數量
    pub available: Decimal,
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}（原料 {}）需要 {}、現有 {}",
            self.name, self.raw_material_id, self.required, self.available
        )
    }
}

/// 實際扣用的原料明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedLine {
    /// 原料ID
    pub raw_material_id: RawMaterialId,

    /// 原料名稱
    pub name: String,

    /// 扣用數量
    pub consumed: Decimal,
}

/// 生產回執
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionReceipt {
    /// 回執ID
    pub id: Uuid,

    /// 成品ID
    pub finished_good_id: FinishedGoodId,

    /// 滿足的份數
    pub quantity: u32,

    /// 扣用的原料（快速路徑時為空）
    pub consumed: Vec<ConsumedLine>,

    /// 是否由既有成品庫存直接滿足（未消耗任何原料）
    pub from_existing_stock: bool,

    /// 完成時間
    pub produced_at: DateTime<Utc>,
}

impl ProductionReceipt {
    fn new(finished_good_id: FinishedGoodId, quantity: u32, consumed: Vec<ConsumedLine>) -> Self {
        Self {
            id: Uuid::new_v4(),
            finished_good_id,
            quantity,
            consumed,
            from_existing_stock: false,
            produced_at: Utc::now(),
        }
    }

    fn from_existing_stock(finished_good_id: FinishedGoodId, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            finished_good_id,
            quantity,
            consumed: Vec::new(),
            from_existing_stock: true,
            produced_at: Utc::now(),
        }
    }
}

/// 生產失敗原因
///
/// 全部屬於「修正請求前不可重試」的業務結果（修配方、補貨或改份數），
/// 唯 Ledger 變體包裝基礎設施層的異常。
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProductionError {
    #[error("無效的生產請求: {0}")]
    InvalidInput(String),

    #[error("成品 {0} 沒有啟用中的配方")]
    NoRecipe(FinishedGoodId),

    #[error("成品 {0} 的配方沒有任何明細")]
    EmptyRecipe(FinishedGoodId),

    #[error("原料不足，共 {} 項短缺", .0.len())]
    InsufficientRawMaterial(Vec<Shortfall>),

    #[error("庫存帳本錯誤: {0}")]
    Ledger(#[from] StockError),
}

/// 單輪嘗試的結果：版本衝突是唯一的重試訊號，
/// 其他任何錯誤都直接回傳給呼叫端
enum AttemptError {
    /// 提交時版本不符（帶衝突實體ID，供記錄）
    Conflict(u32),
    /// 終局失敗
    Fatal(ProductionError),
}

/// 生產引擎
///
/// 讀取、驗證、再提交，全程無部分生效：
/// 驗證階段只讀，提交階段由帳本以版本檢查一次套用。
pub struct ProductionEngine {
    ledger: Arc<StockLedger>,
    recipes: Arc<RecipeBook>,
}

impl ProductionEngine {
    /// 創建新的生產引擎
    pub fn new(ledger: Arc<StockLedger>, recipes: Arc<RecipeBook>) -> Self {
        Self { ledger, recipes }
    }

    /// 執行生產請求
    ///
    /// 版本衝突（讀取後有他人先提交）時整輪重新驗證，
    /// 最多 MAX_COMMIT_RETRIES 次；用盡即回報 TooManyConflicts。
    pub fn execute(
        &self,
        request: &ProductionRequest,
    ) -> Result<ProductionReceipt, ProductionError> {
        if request.quantity == 0 {
            return Err(ProductionError::InvalidInput(
                "生產份數必須為正整數".to_string(),
            ));
        }

        for attempt in 1..=MAX_COMMIT_RETRIES {
            match self.try_execute(request) {
                Ok(receipt) => return Ok(receipt),
                Err(AttemptError::Conflict(id)) => {
                    tracing::debug!(
                        "第 {} 次提交遇到版本衝突（實體 {}），重新驗證",
                        attempt,
                        id
                    );
                    continue;
                }
                Err(AttemptError::Fatal(error)) => return Err(error),
            }
        }

        tracing::warn!(
            "成品 {} 的生產請求在 {} 次重試後仍衝突",
            request.finished_good_id,
            MAX_COMMIT_RETRIES
        );
        Err(ProductionError::Ledger(StockError::TooManyConflicts))
    }

    /// 單輪「讀取-驗證-提交」
    fn try_execute(
        &self,
        request: &ProductionRequest,
    ) -> Result<ProductionReceipt, AttemptError> {
        // Step 1: 成品必須存在
        let good = self
            .ledger
            .read_finished_good(request.finished_good_id)
            .map_err(|_| {
                AttemptError::Fatal(ProductionError::InvalidInput(format!(
                    "找不到成品 {}",
                    request.finished_good_id
                )))
            })?;

        // Step 2: 快速路徑——既有成品庫存優先滿足需求，
        // 不讀取也不扣任何原料（確認過的業務規則：先賣現成的）
        if good.entity.covers(request.quantity) {
            tracing::info!(
                "成品 {} 既有庫存 {} 足以滿足 {} 份，未消耗原料",
                good.entity.id,
                good.entity.stock,
                request.quantity
            );
            return Ok(ProductionReceipt::from_existing_stock(
                good.entity.id,
                request.quantity,
            ));
        }

        // Step 3: 解析配方
        let lines = match self.recipes.resolve(request.finished_good_id) {
            RecipeResolution::Resolved(lines) => lines,
            RecipeResolution::NoRecipe => {
                return Err(AttemptError::Fatal(ProductionError::NoRecipe(
                    request.finished_good_id,
                )))
            }
            RecipeResolution::EmptyRecipe => {
                return Err(AttemptError::Fatal(ProductionError::EmptyRecipe(
                    request.finished_good_id,
                )))
            }
        };

        // Step 4: 逐明細驗證，收齊所有短缺後才回報（不提早中斷）
        let requested = Decimal::from(request.quantity);
        let mut plan = CommitPlan::new();
        let mut consumed = Vec::new();
        let mut shortfalls = Vec::new();

        for line in &lines {
            let required = line.quantity_per_unit * requested;
            if required <= Decimal::ZERO {
                // 退化明細：不影響生產
                continue;
            }

            let material = self
                .ledger
                .read_raw_material(line.raw_material_id)
                .map_err(|e| AttemptError::Fatal(ProductionError::Ledger(e)))?;
            let available = material.entity.quantity;

            if available < required {
                shortfalls.push(Shortfall {
                    raw_material_id: material.entity.id,
                    name: material.entity.name.clone(),
                    required,
                    available,
                });
            } else {
                plan.write_raw_material(material.entity.id, material.version, available - required);
                consumed.push(ConsumedLine {
                    raw_material_id: material.entity.id,
                    name: material.entity.name.clone(),
                    consumed: required,
                });
            }
        }

        // Step 5: 任一短缺即失敗，此時尚未發生任何寫入
        if !shortfalls.is_empty() {
            tracing::info!(
                "成品 {} 的生產請求因 {} 項原料短缺而拒絕",
                request.finished_good_id,
                shortfalls.len()
            );
            return Err(AttemptError::Fatal(ProductionError::InsufficientRawMaterial(
                shortfalls,
            )));
        }

        // Step 6: 提交——先扣原料、後加成品，由帳本一次套用
        let new_stock = good.entity.stock.checked_add(request.quantity).ok_or_else(|| {
            AttemptError::Fatal(ProductionError::InvalidInput(format!(
                "成品 {} 的庫存份數溢位",
                request.finished_good_id
            )))
        })?;
        plan.write_finished_good(good.entity.id, good.version, new_stock);

        match self.ledger.commit_production(plan) {
            Ok(()) => {}
            // 版本衝突是唯一的重試訊號
            Err(StockError::VersionConflict(id)) => return Err(AttemptError::Conflict(id)),
            Err(error) => return Err(AttemptError::Fatal(ProductionError::Ledger(error))),
        }

        tracing::info!(
            "成品 {} 生產 {} 份完成，扣用原料 {} 項",
            request.finished_good_id,
            request.quantity,
            consumed.len()
        );
        Ok(ProductionReceipt::new(
            request.finished_good_id,
            request.quantity,
            consumed,
        ))
    }
}

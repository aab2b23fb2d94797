//! 原料模型

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EntityState, RawMaterialId, Result, StockError};

/// 計量單位（封閉枚舉，對應登記表單的固定選項）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    /// 個
    Unit,
    /// 公斤
    Kilogram,
    /// 公克
    Gram,
    /// 公升
    Liter,
    /// 毫升
    Milliliter,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Unit => "unit",
            UnitOfMeasure::Kilogram => "kilogram",
            UnitOfMeasure::Gram => "gram",
            UnitOfMeasure::Liter => "liter",
            UnitOfMeasure::Milliliter => "milliliter",
        }
    }
}

impl std::str::FromStr for UnitOfMeasure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "unit" => Ok(UnitOfMeasure::Unit),
            "kilogram" => Ok(UnitOfMeasure::Kilogram),
            "gram" => Ok(UnitOfMeasure::Gram),
            "liter" => Ok(UnitOfMeasure::Liter),
            "milliliter" => Ok(UnitOfMeasure::Milliliter),
            other => Err(format!("未知的計量單位: {}", other)),
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原料
///
/// 數量只能由生產引擎（扣減）或進貨入庫（增加）修改，
/// 且一律經過 StockLedger 的單一寫入點。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterial {
    /// 原料ID
    pub id: RawMaterialId,

    /// 名稱
    pub name: String,

    /// 計量單位
    pub unit: UnitOfMeasure,

    /// 現有數量（不可為負）
    pub quantity: Decimal,

    /// 最低庫存
    pub minimum_stock: Decimal,

    /// 補貨點：數量低於此值即列入臨界庫存
    pub reposition_point: Decimal,

    /// 最高庫存（可不設定）
    pub maximum_stock: Option<Decimal>,

    /// 每包容量（例：一箱 6 瓶、一袋 2 公斤；可不設定）
    pub pack_capacity: Option<Decimal>,

    /// 生命週期狀態
    pub state: EntityState,
}

impl RawMaterial {
    /// 創建新的原料
    pub fn new(
        id: RawMaterialId,
        name: impl Into<String>,
        unit: UnitOfMeasure,
        quantity: Decimal,
        minimum_stock: Decimal,
        reposition_point: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit,
            quantity,
            minimum_stock,
            reposition_point,
            maximum_stock: None,
            pack_capacity: None,
            state: EntityState::Active,
        }
    }

    /// 建構器模式：設置最高庫存
    pub fn with_maximum_stock(mut self, maximum: Decimal) -> Self {
        self.maximum_stock = Some(maximum);
        self
    }

    /// 建構器模式：設置每包容量
    pub fn with_pack_capacity(mut self, capacity: Decimal) -> Self {
        self.pack_capacity = Some(capacity);
        self
    }

    /// 建構器模式：設置生命週期狀態
    pub fn with_state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    /// 驗證不變式
    ///
    /// - 數量與各門檻不可為負
    /// - 最低庫存 < 補貨點
    /// - 補貨點 < 最高庫存（若有設定）
    pub fn validate(&self) -> Result<()> {
        if self.quantity < Decimal::ZERO {
            return Err(StockError::NegativeQuantity {
                id: self.id,
                requested: self.quantity,
            });
        }
        if self.minimum_stock < Decimal::ZERO || self.reposition_point < Decimal::ZERO {
            return Err(StockError::InvalidThresholds(format!(
                "原料 {} 的庫存門檻不可為負",
                self.name
            )));
        }
        if self.minimum_stock >= self.reposition_point {
            return Err(StockError::InvalidThresholds(format!(
                "原料 {} 的最低庫存 {} 必須小於補貨點 {}",
                self.name, self.minimum_stock, self.reposition_point
            )));
        }
        if let Some(maximum) = self.maximum_stock {
            if self.reposition_point >= maximum {
                return Err(StockError::InvalidThresholds(format!(
                    "原料 {} 的補貨點 {} 必須小於最高庫存 {}",
                    self.name, self.reposition_point, maximum
                )));
            }
        }
        Ok(())
    }

    /// 檢查是否為啟用狀態
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// 檢查數量是否低於補貨點（嚴格小於）
    pub fn is_below_reposition(&self) -> bool {
        self.quantity < self.reposition_point
    }

    /// 現有庫存可組成的完整包數
    ///
    /// 例：每包 6、庫存 13 → 2 包完整（12）加 1 個零散。
    /// 未設定容量（或容量為 0）時回傳 None。
    pub fn full_packs(&self) -> Option<u64> {
        let capacity = self.pack_capacity.filter(|c| !c.is_zero())?;
        (self.quantity / capacity).trunc().to_u64()
    }

    /// 組完所有完整包之後剩下的零散數量
    pub fn loose_units(&self) -> Option<Decimal> {
        let capacity = self.pack_capacity.filter(|c| !c.is_zero())?;
        let packs = Decimal::from(self.full_packs()?);
        Some(self.quantity - packs * capacity)
    }

    /// 等值包數（無條件進位）
    ///
    /// 例：每包 6、庫存 5 → 1 包等值。
    pub fn equivalent_packs(&self) -> Option<u64> {
        let capacity = self.pack_capacity.filter(|c| !c.is_zero())?;
        (self.quantity / capacity).ceil().to_u64()
    }
}

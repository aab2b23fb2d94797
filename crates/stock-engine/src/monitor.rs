//! 臨界庫存監視：低於補貨點的啟用原料

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stock_core::RawMaterialId;

use crate::ledger::StockLedger;

/// 臨界庫存警示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalStockAlert {
    /// 原料ID
    pub raw_material_id: RawMaterialId,

    /// 原料名稱
    pub name: String,

    /// 現有數量
    pub quantity: Decimal,

    /// 補貨點
    pub reposition_point: Decimal,

    /// 最高庫存（若有設定）
    pub maximum_stock: Option<Decimal>,
}

impl CriticalStockAlert {
    /// 距離補貨點的缺口
    pub fn shortage(&self) -> Decimal {
        self.reposition_point - self.quantity
    }

    /// 建議補貨量：補到最高庫存；未設定最高庫存時補到補貨點
    pub fn replenishment_suggestion(&self) -> Decimal {
        let target = self.maximum_stock.unwrap_or(self.reposition_point);
        target - self.quantity
    }
}

/// 臨界庫存監視器
///
/// 純衍生視圖：每次查詢都從帳本重新計算，不保存任何狀態。
pub struct CriticalStockMonitor {
    ledger: Arc<StockLedger>,
}

impl CriticalStockMonitor {
    /// 創建新的監視器
    pub fn new(ledger: Arc<StockLedger>) -> Self {
        Self { ledger }
    }

    /// 取得臨界庫存清單
    ///
    /// 條件：啟用中且數量「嚴格小於」補貨點；依原料ID排序。
    pub fn critical_stock(&self) -> Vec<CriticalStockAlert> {
        self.ledger
            .raw_materials()
            .into_iter()
            .filter(|m| m.is_active() && m.is_below_reposition())
            .map(|m| CriticalStockAlert {
                raw_material_id: m.id,
                name: m.name,
                quantity: m.quantity,
                reposition_point: m.reposition_point,
                maximum_stock: m.maximum_stock,
            })
            .collect()
    }
}

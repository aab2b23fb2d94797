//! 庫存帳本：數量與門檻的唯一寫入點

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;
use stock_core::{
    EntityState, FinishedGood, FinishedGoodId, RawMaterial, RawMaterialId, Result, StockError,
};

/// 帳本列：實體加上單調遞增的版本號
///
/// 版本號在每次寫入時 +1，供樂觀並發的提交檢查使用。
#[derive(Debug, Clone)]
struct Row<T> {
    entity: T,
    version: u64,
}

impl<T> Row<T> {
    fn new(entity: T) -> Self {
        Self { entity, version: 0 }
    }
}

/// 讀取快照：實體與讀取當下的版本號，同一次上鎖內取得
#[derive(Debug, Clone)]
pub struct StockSnapshot<T> {
    pub entity: T,
    pub version: u64,
}

/// 生產交易的寫入計劃
///
/// 先扣原料、後加成品；提交時整組套用或整組放棄。
#[derive(Debug, Default)]
pub struct CommitPlan {
    raw_material_writes: Vec<QuantityWrite>,
    finished_good_write: Option<StockWrite>,
}

#[derive(Debug)]
struct QuantityWrite {
    id: RawMaterialId,
    expected_version: u64,
    new_quantity: Decimal,
}

#[derive(Debug)]
struct StockWrite {
    id: FinishedGoodId,
    expected_version: u64,
    new_stock: u32,
}

impl CommitPlan {
    /// 創建空的寫入計劃
    pub fn new() -> Self {
        Self::default()
    }

    /// 排入一筆原料數量寫入
    pub fn write_raw_material(
        &mut self,
        id: RawMaterialId,
        expected_version: u64,
        new_quantity: Decimal,
    ) {
        self.raw_material_writes.push(QuantityWrite {
            id,
            expected_version,
            new_quantity,
        });
    }

    /// 排入成品庫存寫入
    pub fn write_finished_good(&mut self, id: FinishedGoodId, expected_version: u64, new_stock: u32) {
        self.finished_good_write = Some(StockWrite {
            id,
            expected_version,
            new_stock,
        });
    }

    /// 計劃涉及的原料寫入筆數
    pub fn raw_material_write_count(&self) -> usize {
        self.raw_material_writes.len()
    }
}

/// 兩類庫存共用一把鎖，生產提交對任何讀取方而言都是原子的：
/// 不會觀察到「原料已扣、成品未加」的中間狀態。
#[derive(Debug, Default)]
struct LedgerInner {
    raw_materials: BTreeMap<RawMaterialId, Row<RawMaterial>>,
    finished_goods: BTreeMap<FinishedGoodId, Row<FinishedGood>>,
}

/// 庫存帳本
///
/// 所有數量異動（生產扣料、進貨入庫、出餐扣庫）都必須經過這裡，
/// 非負不變式與版本紀律才能集中在單一點執行。
#[derive(Debug, Default)]
pub struct StockLedger {
    inner: RwLock<LedgerInner>,
}

impl StockLedger {
    /// 創建空的帳本
    pub fn new() -> Self {
        Self::default()
    }

    /// 登記原料（驗證門檻不變式，拒絕重複ID）
    pub fn register_raw_material(&self, material: RawMaterial) -> Result<()> {
        material.validate()?;
        let mut inner = self.write_lock();
        if inner.raw_materials.contains_key(&material.id) {
            return Err(StockError::DuplicateId(material.id));
        }
        inner.raw_materials.insert(material.id, Row::new(material));
        Ok(())
    }

    /// 登記成品（拒絕重複ID）
    pub fn register_finished_good(&self, good: FinishedGood) -> Result<()> {
        let mut inner = self.write_lock();
        if inner.finished_goods.contains_key(&good.id) {
            return Err(StockError::DuplicateId(good.id));
        }
        inner.finished_goods.insert(good.id, Row::new(good));
        Ok(())
    }

    /// 取得原料
    pub fn get_raw_material(&self, id: RawMaterialId) -> Result<RawMaterial> {
        let inner = self.read_lock();
        inner
            .raw_materials
            .get(&id)
            .map(|row| row.entity.clone())
            .ok_or(StockError::RawMaterialNotFound(id))
    }

    /// 取得成品
    pub fn get_finished_good(&self, id: FinishedGoodId) -> Result<FinishedGood> {
        let inner = self.read_lock();
        inner
            .finished_goods
            .get(&id)
            .map(|row| row.entity.clone())
            .ok_or(StockError::FinishedGoodNotFound(id))
    }

    /// 讀取原料快照（實體與版本在同一次上鎖內取得）
    pub fn read_raw_material(&self, id: RawMaterialId) -> Result<StockSnapshot<RawMaterial>> {
        let inner = self.read_lock();
        inner
            .raw_materials
            .get(&id)
            .map(|row| StockSnapshot {
                entity: row.entity.clone(),
                version: row.version,
            })
            .ok_or(StockError::RawMaterialNotFound(id))
    }

    /// 讀取成品快照
    pub fn read_finished_good(&self, id: FinishedGoodId) -> Result<StockSnapshot<FinishedGood>> {
        let inner = self.read_lock();
        inner
            .finished_goods
            .get(&id)
            .map(|row| StockSnapshot {
                entity: row.entity.clone(),
                version: row.version,
            })
            .ok_or(StockError::FinishedGoodNotFound(id))
    }

    /// 設置原料數量（§4.1 的單一寫入點；負數即 NegativeQuantity）
    pub fn set_raw_material_quantity(&self, id: RawMaterialId, quantity: Decimal) -> Result<()> {
        let mut inner = self.write_lock();
        let row = inner
            .raw_materials
            .get_mut(&id)
            .ok_or(StockError::RawMaterialNotFound(id))?;
        Self::apply_raw_material_quantity(row, quantity)
    }

    /// 設置成品庫存
    ///
    /// 份數以 u32 表示，型別上即不可能為負；保留與原料對稱的寫入點，
    /// 讓出餐扣庫同樣走集中路徑。
    pub fn set_finished_good_quantity(&self, id: FinishedGoodId, stock: u32) -> Result<()> {
        let mut inner = self.write_lock();
        let row = inner
            .finished_goods
            .get_mut(&id)
            .ok_or(StockError::FinishedGoodNotFound(id))?;
        row.entity.stock = stock;
        row.version += 1;
        Ok(())
    }

    /// 切換原料生命週期狀態（呼叫端須先通過引用守衛）
    pub fn set_raw_material_state(&self, id: RawMaterialId, state: EntityState) -> Result<()> {
        let mut inner = self.write_lock();
        let row = inner
            .raw_materials
            .get_mut(&id)
            .ok_or(StockError::RawMaterialNotFound(id))?;
        row.entity.state = state;
        row.version += 1;
        Ok(())
    }

    /// 切換成品生命週期狀態
    pub fn set_finished_good_state(&self, id: FinishedGoodId, state: EntityState) -> Result<()> {
        let mut inner = self.write_lock();
        let row = inner
            .finished_goods
            .get_mut(&id)
            .ok_or(StockError::FinishedGoodNotFound(id))?;
        row.entity.state = state;
        row.version += 1;
        Ok(())
    }

    /// 列出全部原料（依ID排序）
    pub fn raw_materials(&self) -> Vec<RawMaterial> {
        let inner = self.read_lock();
        inner
            .raw_materials
            .values()
            .map(|row| row.entity.clone())
            .collect()
    }

    /// 列出全部成品（依ID排序）
    pub fn finished_goods(&self) -> Vec<FinishedGood> {
        let inner = self.read_lock();
        inner
            .finished_goods
            .values()
            .map(|row| row.entity.clone())
            .collect()
    }

    /// 提交生產交易
    ///
    /// 單次上鎖內完成：先逐筆核對版本與非負不變式，任何一筆不符即
    /// 整組放棄（VersionConflict 由呼叫端重新驗證後重試）；全數通過
    /// 才套用寫入。讀取方看到的是提交前或提交後，不會有中間狀態。
    pub fn commit_production(&self, plan: CommitPlan) -> Result<()> {
        let mut inner = self.write_lock();

        // 驗證階段：不做任何寫入
        for write in &plan.raw_material_writes {
            let row = inner
                .raw_materials
                .get(&write.id)
                .ok_or(StockError::RawMaterialNotFound(write.id))?;
            if row.version != write.expected_version {
                return Err(StockError::VersionConflict(write.id));
            }
            if write.new_quantity < Decimal::ZERO {
                return Err(StockError::NegativeQuantity {
                    id: write.id,
                    requested: write.new_quantity,
                });
            }
        }
        if let Some(write) = &plan.finished_good_write {
            let row = inner
                .finished_goods
                .get(&write.id)
                .ok_or(StockError::FinishedGoodNotFound(write.id))?;
            if row.version != write.expected_version {
                return Err(StockError::VersionConflict(write.id));
            }
        }

        // 套用階段：驗證已全數通過，逐筆寫入
        for write in &plan.raw_material_writes {
            let row = inner
                .raw_materials
                .get_mut(&write.id)
                .ok_or(StockError::RawMaterialNotFound(write.id))?;
            Self::apply_raw_material_quantity(row, write.new_quantity)?;
        }
        if let Some(write) = &plan.finished_good_write {
            let row = inner
                .finished_goods
                .get_mut(&write.id)
                .ok_or(StockError::FinishedGoodNotFound(write.id))?;
            row.entity.stock = write.new_stock;
            row.version += 1;
        }

        tracing::debug!(
            "生產提交完成：原料寫入 {} 筆",
            plan.raw_material_writes.len()
        );
        Ok(())
    }

    /// 原料數量的內部寫入點：集中執行非負不變式
    fn apply_raw_material_quantity(row: &mut Row<RawMaterial>, quantity: Decimal) -> Result<()> {
        if quantity < Decimal::ZERO {
            return Err(StockError::NegativeQuantity {
                id: row.entity.id,
                requested: quantity,
            });
        }
        row.entity.quantity = quantity;
        row.version += 1;
        Ok(())
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, LedgerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, LedgerInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

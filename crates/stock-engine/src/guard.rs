//! 引用守衛：被在途單據引用的實體不得變更狀態

use std::sync::Arc;

use stock_core::{FinishedGoodId, RawMaterialId, RecipeId, SupplierId};

use crate::recipes::RecipeBook;

/// 進貨單據的邊界介面（子系統外部實作，這裡只問存在性）
pub trait PurchaseDocuments {
    /// 指定供應商的任何進貨單（不分狀態）是否包含該原料
    fn references_raw_material(
        &self,
        supplier_id: SupplierId,
        raw_material_id: RawMaterialId,
    ) -> bool;

    /// 是否有「進行中」的進貨單包含該原料
    fn in_progress_with_raw_material(&self, raw_material_id: RawMaterialId) -> bool;
}

/// 訂單單據的邊界介面
pub trait OrderDocuments {
    /// 任何訂單是否包含該成品
    fn references_finished_good(&self, finished_good_id: FinishedGoodId) -> bool;
}

/// 守衛否決：帶有可呈現給使用者的具體原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferentialVeto {
    #[error("原料 {raw_material_id} 仍被啟用中的配方 {recipe_id} 引用，無法停用")]
    RawMaterialInActiveRecipe {
        raw_material_id: RawMaterialId,
        recipe_id: RecipeId,
    },

    #[error("原料 {raw_material_id} 出現在供應商 {supplier_id} 的進貨紀錄中，無法解除關聯")]
    RawMaterialInPurchaseHistory {
        supplier_id: SupplierId,
        raw_material_id: RawMaterialId,
    },

    #[error("原料 {raw_material_id} 出現在進行中的進貨單，暫時無法修改供應價格")]
    RawMaterialInOpenPurchase { raw_material_id: RawMaterialId },

    #[error("成品 {finished_good_id} 仍出現在訂單中，配方 {recipe_id} 無法停用")]
    FinishedGoodInOrders {
        recipe_id: RecipeId,
        finished_good_id: FinishedGoodId,
    },
}

/// 引用守衛
///
/// 每條規則獨立判斷，任一成立即否決；只回答「可不可以」與原因，
/// 實際的狀態切換由呼叫端在通過檢查後執行。
pub struct ReferentialGuard<P, O> {
    recipes: Arc<RecipeBook>,
    purchases: P,
    orders: O,
}

impl<P: PurchaseDocuments, O: OrderDocuments> ReferentialGuard<P, O> {
    /// 創建新的引用守衛
    pub fn new(recipes: Arc<RecipeBook>, purchases: P, orders: O) -> Self {
        Self {
            recipes,
            purchases,
            orders,
        }
    }

    /// 原料停用檢查：被任何啟用中配方引用即否決
    pub fn check_raw_material_deactivation(
        &self,
        raw_material_id: RawMaterialId,
    ) -> Result<(), ReferentialVeto> {
        if let Some(recipe_id) = self.recipes.active_recipe_referencing(raw_material_id) {
            return Err(ReferentialVeto::RawMaterialInActiveRecipe {
                raw_material_id,
                recipe_id,
            });
        }
        Ok(())
    }

    /// 供應商關聯解除檢查：出現在該供應商任何進貨單（不分狀態）即否決
    pub fn check_supplier_unlink(
        &self,
        supplier_id: SupplierId,
        raw_material_id: RawMaterialId,
    ) -> Result<(), ReferentialVeto> {
        if self
            .purchases
            .references_raw_material(supplier_id, raw_material_id)
        {
            return Err(ReferentialVeto::RawMaterialInPurchaseHistory {
                supplier_id,
                raw_material_id,
            });
        }
        Ok(())
    }

    /// 供應價格修改檢查：只被「進行中」的進貨單阻擋（比解除關聯窄）
    pub fn check_supplier_price_edit(
        &self,
        raw_material_id: RawMaterialId,
    ) -> Result<(), ReferentialVeto> {
        if self.purchases.in_progress_with_raw_material(raw_material_id) {
            return Err(ReferentialVeto::RawMaterialInOpenPurchase { raw_material_id });
        }
        Ok(())
    }

    /// 配方停用檢查：所屬成品仍出現在任何訂單即否決
    ///
    /// 配方不存在時無可否決，回傳通過；停用動作本身會回報找不到。
    pub fn check_recipe_deactivation(&self, recipe_id: RecipeId) -> Result<(), ReferentialVeto> {
        let Some(recipe) = self.recipes.get(recipe_id) else {
            return Ok(());
        };
        if self.orders.references_finished_good(recipe.finished_good_id) {
            return Err(ReferentialVeto::FinishedGoodInOrders {
                recipe_id,
                finished_good_id: recipe.finished_good_id,
            });
        }
        Ok(())
    }
}

//! 配方登錄簿與配方解析

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use stock_core::{EntityState, FinishedGoodId, RawMaterialId, Recipe, RecipeId, RecipeLine};

/// 配方登錄簿錯誤
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecipeBookError {
    #[error("找不到配方: {0}")]
    RecipeNotFound(RecipeId),

    #[error("成品 {finished_good_id} 已有啟用中的配方 {existing_recipe_id}")]
    DuplicateActiveRecipe {
        finished_good_id: FinishedGoodId,
        existing_recipe_id: RecipeId,
    },
}

/// 配方解析結果
///
/// 「沒有配方」與「空配方」是兩種明確、終局的結果：
/// 兩者都會阻擋生產，但呼叫端要能呈現不同的訊息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeResolution {
    /// 解析成功：回傳有序的配方明細
    Resolved(Vec<RecipeLine>),
    /// 成品沒有啟用中的配方
    NoRecipe,
    /// 配方存在但沒有任何明細
    EmptyRecipe,
}

/// 配方登錄簿
///
/// 配方查找只有這一條路徑；每個成品最多一個啟用中的配方，於寫入時把關。
#[derive(Debug, Default)]
pub struct RecipeBook {
    inner: RwLock<BTreeMap<RecipeId, Recipe>>,
}

impl RecipeBook {
    /// 創建空的登錄簿
    pub fn new() -> Self {
        Self::default()
    }

    /// 寫入（新增或整份覆蓋）配方
    ///
    /// 啟用中的配方若與既有另一份啟用配方指向同一成品即拒絕。
    pub fn upsert(&self, recipe: Recipe) -> Result<(), RecipeBookError> {
        let mut inner = self.write_lock();
        if recipe.is_active() {
            if let Some(existing) = inner.values().find(|r| {
                r.id != recipe.id && r.is_active() && r.finished_good_id == recipe.finished_good_id
            }) {
                return Err(RecipeBookError::DuplicateActiveRecipe {
                    finished_good_id: recipe.finished_good_id,
                    existing_recipe_id: existing.id,
                });
            }
        }
        inner.insert(recipe.id, recipe);
        Ok(())
    }

    /// 停用配方（呼叫端須先通過引用守衛）
    pub fn deactivate(&self, recipe_id: RecipeId) -> Result<(), RecipeBookError> {
        let mut inner = self.write_lock();
        let recipe = inner
            .get_mut(&recipe_id)
            .ok_or(RecipeBookError::RecipeNotFound(recipe_id))?;
        recipe.state = EntityState::Inactive;
        Ok(())
    }

    /// 取得配方
    pub fn get(&self, recipe_id: RecipeId) -> Option<Recipe> {
        self.read_lock().get(&recipe_id).cloned()
    }

    /// 取得成品的啟用中配方
    pub fn active_recipe_for(&self, finished_good_id: FinishedGoodId) -> Option<Recipe> {
        self.read_lock()
            .values()
            .find(|r| r.is_active() && r.finished_good_id == finished_good_id)
            .cloned()
    }

    /// 解析成品配方
    ///
    /// 純讀取、可重入：同樣的登錄簿狀態必得同樣的結果。
    pub fn resolve(&self, finished_good_id: FinishedGoodId) -> RecipeResolution {
        match self.active_recipe_for(finished_good_id) {
            None => RecipeResolution::NoRecipe,
            Some(recipe) if recipe.is_empty() => RecipeResolution::EmptyRecipe,
            Some(recipe) => RecipeResolution::Resolved(recipe.lines),
        }
    }

    /// 找出任一引用指定原料的啟用中配方（引用守衛用）
    pub fn active_recipe_referencing(&self, raw_material_id: RawMaterialId) -> Option<RecipeId> {
        self.read_lock()
            .values()
            .find(|r| r.is_active() && r.references_raw_material(raw_material_id))
            .map(|r| r.id)
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<RecipeId, Recipe>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<RecipeId, Recipe>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn pizza_recipe() -> Recipe {
        Recipe::new(1, 10).with_lines(vec![
            RecipeLine::new(1, Decimal::from(3)),
            RecipeLine::new(2, Decimal::new(500, 3)),
        ])
    }

    #[test]
    fn test_resolve_active_recipe() {
        let book = RecipeBook::new();
        book.upsert(pizza_recipe()).unwrap();

        match book.resolve(10) {
            RecipeResolution::Resolved(lines) => {
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[0].raw_material_id, 1);
            }
            other => panic!("預期解析成功，得到 {:?}", other),
        }
    }

    #[test]
    fn test_resolve_distinguishes_missing_and_empty() {
        let book = RecipeBook::new();

        // 完全沒有配方
        assert_eq!(book.resolve(10), RecipeResolution::NoRecipe);

        // 有配方但沒有明細
        book.upsert(Recipe::new(1, 10)).unwrap();
        assert_eq!(book.resolve(10), RecipeResolution::EmptyRecipe);
    }

    #[test]
    fn test_inactive_recipe_does_not_resolve() {
        let book = RecipeBook::new();
        book.upsert(pizza_recipe()).unwrap();
        book.deactivate(1).unwrap();

        assert_eq!(book.resolve(10), RecipeResolution::NoRecipe);
    }

    #[test]
    fn test_one_active_recipe_per_finished_good() {
        let book = RecipeBook::new();
        book.upsert(pizza_recipe()).unwrap();

        let second = Recipe::new(2, 10).with_lines(vec![RecipeLine::new(3, Decimal::ONE)]);
        assert!(matches!(
            book.upsert(second),
            Err(RecipeBookError::DuplicateActiveRecipe {
                finished_good_id: 10,
                existing_recipe_id: 1,
            })
        ));

        // 同一份配方整份覆蓋則允許
        let replacement = pizza_recipe().with_description("versión 2");
        assert!(book.upsert(replacement).is_ok());
    }

    #[test]
    fn test_active_recipe_referencing() {
        let book = RecipeBook::new();
        book.upsert(pizza_recipe()).unwrap();

        assert_eq!(book.active_recipe_referencing(1), Some(1));
        assert_eq!(book.active_recipe_referencing(99), None);

        book.deactivate(1).unwrap();
        assert_eq!(book.active_recipe_referencing(1), None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let book = RecipeBook::new();
        book.upsert(pizza_recipe()).unwrap();

        let first = book.resolve(10);
        let second = book.resolve(10);
        assert_eq!(first, second);
    }
}

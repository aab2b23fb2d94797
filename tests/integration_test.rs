//! 集成測試：規格情境與並發安全

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;
use stock_core::{
    EntityState, FinishedGood, FinishedGoodId, RawMaterial, RawMaterialId, Recipe, RecipeLine,
    SupplierId, UnitOfMeasure,
};
use stock_engine::{
    CriticalStockMonitor, OrderDocuments, ProductionEngine, ProductionError, ProductionRequest,
    PurchaseDocuments, RecipeBook, ReferentialGuard, ReferentialVeto, StockLedger,
};

/// Queso 10 kg（補貨點 5）、Pizza 每份 3 kg Queso
fn pizzeria() -> (Arc<StockLedger>, Arc<RecipeBook>, ProductionEngine) {
    let ledger = Arc::new(StockLedger::new());
    ledger
        .register_raw_material(
            RawMaterial::new(
                1,
                "Queso",
                UnitOfMeasure::Kilogram,
                Decimal::from(10),
                Decimal::from(2),
                Decimal::from(5),
            )
            .with_maximum_stock(Decimal::from(25)),
        )
        .unwrap();
    ledger
        .register_finished_good(FinishedGood::new(10, "Pizza Muzzarella", Decimal::from(4500), 1))
        .unwrap();

    let recipes = Arc::new(RecipeBook::new());
    recipes
        .upsert(Recipe::new(1, 10).with_lines(vec![RecipeLine::new(1, Decimal::from(3))]))
        .unwrap();

    let engine = ProductionEngine::new(Arc::clone(&ledger), Arc::clone(&recipes));
    (ledger, recipes, engine)
}

#[test]
fn scenario_1_successful_production() {
    // 情境 1：2 份 Pizza 需要 6 kg Queso → Queso 4、Pizza +2
    let (ledger, _recipes, engine) = pizzeria();

    let receipt = engine.execute(&ProductionRequest::new(10, 2)).unwrap();
    assert_eq!(receipt.quantity, 2);
    assert!(receipt.produced_at <= Utc::now());
    assert_eq!(ledger.get_raw_material(1).unwrap().quantity, Decimal::from(4));
    assert_eq!(ledger.get_finished_good(10).unwrap().stock, 2);
}

#[test]
fn scenario_2_insufficient_reports_exact_shortfall() {
    // 情境 2：4 份需要 12 kg、只有 10 → 單項短缺，Queso 原值不動
    let (ledger, _recipes, engine) = pizzeria();

    match engine.execute(&ProductionRequest::new(10, 4)) {
        Err(ProductionError::InsufficientRawMaterial(shortfalls)) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].name, "Queso");
            assert_eq!(shortfalls[0].required, Decimal::from(12));
            assert_eq!(shortfalls[0].available, Decimal::from(10));
        }
        other => panic!("預期原料不足，得到 {:?}", other),
    }
    assert_eq!(ledger.get_raw_material(1).unwrap().quantity, Decimal::from(10));
}

#[test]
fn scenario_3_and_4_no_recipe_vs_empty_recipe() {
    let (ledger, recipes, engine) = pizzeria();
    ledger
        .register_finished_good(FinishedGood::new(11, "Faina", Decimal::from(900), 1))
        .unwrap();

    // 情境 3：完全沒有配方
    assert!(matches!(
        engine.execute(&ProductionRequest::new(11, 1)),
        Err(ProductionError::NoRecipe(11))
    ));

    // 情境 4：配方存在但沒有明細
    recipes.upsert(Recipe::new(2, 11)).unwrap();
    assert!(matches!(
        engine.execute(&ProductionRequest::new(11, 1)),
        Err(ProductionError::EmptyRecipe(11))
    ));
}

#[test]
fn scenario_5_existing_stock_satisfies_without_ingredients() {
    // 情境 5：Pizza 已有 5 份、要 3 份 → 快速路徑，原料不動
    let (ledger, _recipes, engine) = pizzeria();
    ledger.set_finished_good_quantity(10, 5).unwrap();

    let receipt = engine.execute(&ProductionRequest::new(10, 3)).unwrap();
    assert!(receipt.from_existing_stock);
    assert!(receipt.consumed.is_empty());
    assert_eq!(ledger.get_raw_material(1).unwrap().quantity, Decimal::from(10));
}

#[derive(Default)]
struct NoDocuments;

impl PurchaseDocuments for NoDocuments {
    fn references_raw_material(&self, _: SupplierId, _: RawMaterialId) -> bool {
        false
    }
    fn in_progress_with_raw_material(&self, _: RawMaterialId) -> bool {
        false
    }
}

impl OrderDocuments for NoDocuments {
    fn references_finished_good(&self, _: FinishedGoodId) -> bool {
        false
    }
}

#[test]
fn scenario_6_deactivation_vetoed_then_allowed() {
    // 情境 6：Queso 被 Pizza 的啟用配方引用 → 否決；配方停用後放行
    let (ledger, recipes, _engine) = pizzeria();
    let guard = ReferentialGuard::new(Arc::clone(&recipes), NoDocuments, NoDocuments);

    let veto = guard.check_raw_material_deactivation(1).unwrap_err();
    assert!(matches!(
        veto,
        ReferentialVeto::RawMaterialInActiveRecipe {
            raw_material_id: 1,
            recipe_id: 1,
        }
    ));
    // 否決原因可直接呈現給使用者
    assert!(!veto.to_string().is_empty());

    recipes.deactivate(1).unwrap();
    guard.check_raw_material_deactivation(1).unwrap();
    ledger
        .set_raw_material_state(1, EntityState::Inactive)
        .unwrap();
    assert!(!ledger.get_raw_material(1).unwrap().is_active());
}

#[test]
fn production_feeds_critical_stock_monitor() {
    // 生產把 Queso 降到補貨點以下 → 監視器上榜並給出補貨建議
    let (ledger, _recipes, engine) = pizzeria();
    let monitor = CriticalStockMonitor::new(Arc::clone(&ledger));

    assert!(monitor.critical_stock().is_empty());

    engine.execute(&ProductionRequest::new(10, 2)).unwrap();

    let alerts = monitor.critical_stock();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].name, "Queso");
    assert_eq!(alerts[0].quantity, Decimal::from(4));
    assert_eq!(alerts[0].shortage(), Decimal::ONE);
    // 最高庫存 25 → 建議補 21
    assert_eq!(alerts[0].replenishment_suggestion(), Decimal::from(21));
}

#[test]
fn concurrent_requests_never_double_spend() {
    // 八個執行緒對共用 Queso 的兩個成品輪番下生產請求；
    // 帳本數量永不為負，且成功扣用的總量與期初庫存守恆
    let ledger = Arc::new(StockLedger::new());
    ledger
        .register_raw_material(RawMaterial::new(
            1,
            "Queso",
            UnitOfMeasure::Kilogram,
            Decimal::from(30),
            Decimal::from(2),
            Decimal::from(5),
        ))
        .unwrap();
    let recipes = Arc::new(RecipeBook::new());
    for (recipe_id, good_id, name) in [(1u32, 10u32, "Pizza"), (2, 11, "Calzone")] {
        ledger
            .register_finished_good(FinishedGood::new(good_id, name, Decimal::from(4500), 1))
            .unwrap();
        recipes
            .upsert(
                Recipe::new(recipe_id, good_id)
                    .with_lines(vec![RecipeLine::new(1, Decimal::from(2))]),
            )
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = ProductionEngine::new(Arc::clone(&ledger), Arc::clone(&recipes));
            let good_id = if i % 2 == 0 { 10 } else { 11 };
            std::thread::spawn(move || engine.execute(&ProductionRequest::new(good_id, 3)))
        })
        .collect();

    let mut produced_portions: u32 = 0;
    let mut successes = 0usize;
    let mut receipt_ids: HashSet<Uuid> = HashSet::new();
    for handle in handles {
        match handle.join().unwrap() {
            Ok(receipt) => {
                if receipt.from_existing_stock {
                    assert!(receipt.consumed.is_empty());
                } else {
                    produced_portions += receipt.quantity;
                }
                successes += 1;
                receipt_ids.insert(receipt.id);
            }
            Err(ProductionError::InsufficientRawMaterial(shortfalls)) => {
                assert!(!shortfalls.is_empty());
            }
            Err(other) => panic!("非預期的失敗: {:?}", other),
        }
    }

    // 回執ID必須唯一
    assert_eq!(receipt_ids.len(), successes);

    let cheese = ledger.get_raw_material(1).unwrap().quantity;
    assert!(cheese >= Decimal::ZERO);
    // 每份扣 2 kg：期初 30 減去實際產出 × 2 必須等於剩餘
    assert_eq!(Decimal::from(30) - Decimal::from(produced_portions * 2), cheese);
}

proptest! {
    /// 任意順序的請求序列之後，庫存永不為負且總量守恆
    #[test]
    fn prop_no_negative_stock(requests in prop::collection::vec(1u32..=3u32, 1..20)) {
        let (ledger, _recipes, engine) = pizzeria();

        let mut produced: u32 = 0;
        for quantity in requests {
            // 先清掉成品庫存，讓每一筆請求都真正走配方
            ledger.set_finished_good_quantity(10, 0).unwrap();
            if engine.execute(&ProductionRequest::new(10, quantity)).is_ok() {
                produced += quantity;
            }
        }

        let cheese = ledger.get_raw_material(1).unwrap().quantity;
        prop_assert!(cheese >= Decimal::ZERO);
        prop_assert_eq!(Decimal::from(10) - Decimal::from(produced * 3), cheese);
    }
}

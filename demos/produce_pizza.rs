//! 生產流程示例：依配方把原料庫存轉成 Pizza 庫存

use std::sync::Arc;

use chrono::Local;
use rust_decimal::Decimal;
use stock_core::{FinishedGood, RawMaterial, Recipe, RecipeLine, UnitOfMeasure};
use stock_engine::{ProductionEngine, ProductionError, ProductionRequest, RecipeBook, StockLedger};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 生產流程示例 ===\n");

    // 建立帳本與原料
    let ledger = Arc::new(StockLedger::new());
    ledger.register_raw_material(
        RawMaterial::new(
            1,
            "Queso",
            UnitOfMeasure::Kilogram,
            Decimal::from(10),
            Decimal::from(2),
            Decimal::from(5),
        )
        .with_maximum_stock(Decimal::from(25)),
    )?;
    ledger.register_raw_material(RawMaterial::new(
        2,
        "Harina",
        UnitOfMeasure::Kilogram,
        Decimal::from(8),
        Decimal::ONE,
        Decimal::from(3),
    ))?;
    ledger.register_finished_good(FinishedGood::new(10, "Pizza Muzzarella", Decimal::from(4500), 1))?;

    // 配方：每份 3 kg Queso + 0.5 kg Harina
    let recipes = Arc::new(RecipeBook::new());
    recipes
        .upsert(Recipe::new(1, 10).with_lines(vec![
            RecipeLine::new(1, Decimal::from(3)),
            RecipeLine::new(2, Decimal::new(500, 3)),
        ]))?;

    let engine = ProductionEngine::new(Arc::clone(&ledger), Arc::clone(&recipes));

    // 生產 2 份
    let receipt = engine.execute(&ProductionRequest::new(10, 2))?;
    println!(
        "生產成功，回執 {}（{}）：",
        receipt.id,
        receipt.produced_at.with_timezone(&Local)
    );
    for line in &receipt.consumed {
        println!("  - 扣用 {} {}", line.consumed, line.name);
    }

    println!("\n生產後庫存:");
    for material in ledger.raw_materials() {
        println!("  - {}: {} {}", material.name, material.quantity, material.unit);
    }
    for good in ledger.finished_goods() {
        println!("  - {}: {} 份", good.name, good.stock);
    }

    // 再要 4 份：原料不足，完整列出短缺
    println!("\n再生產 4 份:");
    match engine.execute(&ProductionRequest::new(10, 4)) {
        Err(ProductionError::InsufficientRawMaterial(shortfalls)) => {
            println!("原料不足:");
            for shortfall in &shortfalls {
                println!("  - {}", shortfall);
            }
        }
        other => println!("非預期的結果: {:?}", other.map(|r| r.id)),
    }

    Ok(())
}

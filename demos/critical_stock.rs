//! 臨界庫存監視示例

use std::sync::Arc;

use rust_decimal::Decimal;
use stock_core::{RawMaterial, UnitOfMeasure};
use stock_engine::{CriticalStockMonitor, StockLedger};

fn main() -> anyhow::Result<()> {
    println!("=== 臨界庫存監視示例 ===\n");

    let ledger = Arc::new(StockLedger::new());
    ledger.register_raw_material(
        RawMaterial::new(
            1,
            "Queso",
            UnitOfMeasure::Kilogram,
            Decimal::from(3),
            Decimal::from(2),
            Decimal::from(5),
        )
        .with_maximum_stock(Decimal::from(20)),
    )?;
    ledger.register_raw_material(RawMaterial::new(
        2,
        "Harina",
        UnitOfMeasure::Kilogram,
        Decimal::from(12),
        Decimal::ONE,
        Decimal::from(4),
    ))?;
    ledger.register_raw_material(RawMaterial::new(
        3,
        "Aceitunas",
        UnitOfMeasure::Gram,
        Decimal::from(150),
        Decimal::from(100),
        Decimal::from(400),
    ))?;

    let monitor = CriticalStockMonitor::new(Arc::clone(&ledger));

    println!("臨界庫存（低於補貨點）:");
    for alert in monitor.critical_stock() {
        println!(
            "  - {}: 現有 {}、補貨點 {}、建議補貨 {}",
            alert.name,
            alert.quantity,
            alert.reposition_point,
            alert.replenishment_suggestion()
        );
    }

    // 進貨入庫後重新查詢：純衍生視圖即時反映帳本
    ledger.set_raw_material_quantity(1, Decimal::from(9))?;
    println!("\nQueso 進貨後:");
    let alerts = monitor.critical_stock();
    if alerts.is_empty() {
        println!("  （無）");
    }
    for alert in alerts {
        println!("  - {}: 現有 {}", alert.name, alert.quantity);
    }

    Ok(())
}

//! 整單備料與報價示例
//!
//! 執行：`cargo run --example plan_order`

use alu_quote::prelude::*;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== 整單備料示例 ===\n");

    let lines = vec![
        OrderLine::with_dimensions(Decimal::from(100), Decimal::from(100), 4),
        OrderLine::with_dimensions(Decimal::from(120), Decimal::from(110), 2),
        OrderLine::new(
            WindowSpecs::new(Decimal::new(1455, 1), Decimal::from(90)).with_color(WindowColor::Gray),
            1,
        ),
        // 樘數為零，會被拒絕
        OrderLine::with_dimensions(Decimal::from(80), Decimal::from(60), 0),
    ];

    let plan = BatchStockPlanner::standard().plan(&lines);

    println!("窗戶樘數: {}", plan.total_windows);
    for (name, stock) in [("外框", &plan.frame), ("扇", &plan.sash)] {
        println!(
            "{}: 需求 {} cm，採購 {} 支，餘料 {} cm，利用率 {}% ({:?})",
            name,
            stock.total_required_length,
            stock.bars_needed,
            stock.waste_length,
            stock.utilization_pct.round_dp(1),
            stock.grade()
        );
    }
    println!(
        "合計 {} 支，平均利用率 {}%",
        plan.total_bars(),
        plan.average_utilization().round_dp(1)
    );
    if plan.has_reusable_offcut() {
        println!("提示：餘料超過 500 cm，可用於另一樘小窗");
    }
    for rejected in &plan.rejected {
        println!("拒絕訂單行 {}: {}", rejected.line_id, rejected.error);
    }

    // 空目錄：全部使用備用價格
    let calculator = CostCalculator::standard(MaterialCatalog::default());
    let order = calculator.calculate_order(&lines, Decimal::new(30, 2))?;

    println!("\n訂單總價: {} TND", order.total_cost.round_dp(2));
    println!("失敗訂單行: {}", order.failed().count());
    println!("\n{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}

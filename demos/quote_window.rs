//! 單樘窗報價示例
//!
//! 執行：`RUST_LOG=debug cargo run --example quote_window`

use alu_quote::prelude::*;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

const CATALOG_JSON: &str = r#"[
    {"ref": "9",   "designation": "40100 dormant pral fbois",  "prixUMoyen": "95"},
    {"ref": "11",  "designation": "40404 ouvrant pral fbois",  "prixUMoyen": "70"},
    {"ref": "96",  "designation": "40112 séparateur fbois",    "prixUMoyen": "55"},
    {"ref": "43",  "designation": "Équerre en tôle",           "prixUMoyen": "1.25"},
    {"ref": "239", "designation": "Équerre PM boîte de 100",   "prixUMoyen": "5"},
    {"ref": "36",  "designation": "Paumelle king noir",        "prixUMoyen": "3.8"},
    {"ref": "63",  "designation": "Crémone KNG noir",          "prixUMoyen": "10.5"}
]"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 單樘窗報價示例 ===\n");

    let catalog = MaterialCatalog::from_json(CATALOG_JSON)?;
    let calculator = CostCalculator::new(catalog, ReferenceResolver::standard(), PricingConfig::default())?;

    let specs = WindowSpecs::new(Decimal::from(120), Decimal::from(110))
        .with_color(WindowColor::Woodgrain)
        .with_frame_style("pral")
        .with_sash("40404", "pral")
        .with_glass_type("double");

    let quote = calculator.calculate_with_default_margin(&specs)?;

    for group in CostGroup::ORDERED {
        println!("{:?}:", group);
        for item in quote.breakdown.group(group) {
            println!(
                "  - {:<32} {:>20}  {:>10}",
                item.name,
                item.quantity_description,
                item.total_cost.round_dp(2)
            );
        }
    }
    println!("\n總價: {} TND", quote.total_cost().round_dp(2));

    if quote.has_warnings() {
        println!("\n警告:");
        for warning in &quote.warnings {
            println!("  - {}", warning.message);
        }
    }

    println!("\n{}", serde_json::to_string_pretty(&quote.breakdown)?);

    Ok(())
}

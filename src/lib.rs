//! # alu-quote
//!
//! 鋁窗報價引擎：材料目錄、參照解析、幾何推導、型材估算、成本明細與批量備料。
//!
//! ```
//! use alu_quote::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let calculator = CostCalculator::standard(MaterialCatalog::default());
//! let specs = WindowSpecs::new(Decimal::from(100), Decimal::from(100));
//! let quote = calculator.calculate(&specs, Decimal::new(30, 2)).unwrap();
//! assert_eq!(quote.total_cost(), quote.breakdown.items().map(|i| i.total_cost).sum::<Decimal>());
//! ```

pub use quote_calc;
pub use quote_core;

/// 常用類型
pub mod prelude {
    pub use quote_calc::{
        BatchStockPlan, BatchStockPlanner, CostCalculator, OrderQuote, QuoteWarning, ReferenceResolver,
        ReferenceTables, WindowGeometry, WindowQuote,
    };
    pub use quote_core::{
        CostBreakdown, CostGroup, CostItem, EfficiencyGrade, Material, MaterialCatalog, OrderLine, PricingConfig,
        QuoteError, WindowColor, WindowSpecs,
    };
}

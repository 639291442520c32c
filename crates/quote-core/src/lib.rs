//! # Quote Core
//!
//! 鋁窗報價核心資料模型與類型定義

pub mod config;
pub mod cost;
pub mod material;
pub mod stock;
pub mod window;

use rust_decimal::Decimal;

// Re-export 主要類型
pub use config::{FallbackPrices, PriceRole, PricingConfig};
pub use cost::{CostBreakdown, CostGroup, CostItem};
pub use material::{CatalogSummary, Material, MaterialCatalog, MaterialCategory, PriceSource, PricedRef};
pub use stock::{BarUsage, EfficiencyGrade, StockPlan};
pub use window::{HardwareColor, OrderLine, SeparatorFinish, WindowColor, WindowSpecs};

/// 報價錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("參照表 {table} 無對應項目: {key}")]
    UnresolvedReference { table: String, key: String },

    #[error("材料目錄中找不到參照: {0}")]
    MaterialNotFound(String),

    #[error("無效的尺寸 {field} = {value}: {reason}")]
    InvalidDimensions {
        field: String,
        value: Decimal,
        reason: String,
    },

    #[error("利潤率不可為負: {0}")]
    InvalidMargin(Decimal),

    #[error("訂單行 {line} 的數量無效: {quantity}")]
    InvalidQuantity { line: String, quantity: u32 },

    #[error("型材長度必須大於零: {0}")]
    InvalidBarLength(Decimal),

    #[error("材料 {reference} 單價無效: {price}")]
    InvalidPrice { reference: String, price: Decimal },

    #[error("數值溢位: {0}")]
    Overflow(String),

    #[error("材料參照重複: {0}")]
    DuplicateMaterial(String),

    #[error("無效的參照表: {0}")]
    InvalidReferenceTable(String),

    #[error("解析錯誤: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

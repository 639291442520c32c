//! # Quote Calculation Engine
//!
//! 鋁窗成本計算引擎：參照解析、幾何推導、型材估算、成本明細與批量備料

pub mod bar_stock;
pub mod batch;
pub mod calculator;
pub mod geometry;
pub mod resolver;

use quote_core::{BarUsage, CostBreakdown, PriceRole, PricedRef, QuoteError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export 主要類型
pub use bar_stock::{BarStockEstimator, STANDARD_BAR_LENGTH_CM};
pub use batch::{BatchStockPlan, BatchStockPlanner, RejectedLine, REUSABLE_OFFCUT_CM};
pub use calculator::CostCalculator;
pub use geometry::WindowGeometry;
pub use resolver::{HardwareRefs, RefTable, ReferenceResolver, ReferenceTables, Resolution, ResolvedReferences};

/// 單樘窗報價結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowQuote {
    /// 成本明細
    pub breakdown: CostBreakdown,

    /// 幾何量
    pub geometry: WindowGeometry,

    /// 型材用量（僅供明細數量顯示）
    pub profile_usage: ProfileUsage,

    /// 稽核警告（預設參照、備用價格）
    pub warnings: Vec<QuoteWarning>,
}

impl WindowQuote {
    pub fn total_cost(&self) -> Decimal {
        self.breakdown.total_cost
    }

    /// 是否有任何預設參照或備用價格
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// 單樘窗三種型材的用量
///
/// 每項皆以向上取整後的支數計算餘料與利用率，與批量備料同一公式。
/// 舊版報價工具逐窗固定回報零餘料與 100% 利用率，此處不沿用。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileUsage {
    pub frame: BarUsage,
    pub sash: BarUsage,
    pub separator: BarUsage,
}

/// 稽核警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteWarning {
    /// 相關的目錄參照
    pub reference: String,
    pub kind: WarningKind,
    pub message: String,
}

/// 警告類型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WarningKind {
    /// 參照表缺項，採用預設參照
    DefaultReference { table: RefTable, key: String },
    /// 目錄缺項，採用備用價格
    FallbackPrice { role: PriceRole, price: Decimal },
}

impl QuoteWarning {
    pub fn default_reference(resolution: &Resolution) -> Self {
        Self {
            reference: resolution.reference.clone(),
            kind: WarningKind::DefaultReference {
                table: resolution.table,
                key: resolution.key.clone(),
            },
            message: format!(
                "{} 表無 {}，改用預設參照 {}",
                resolution.table, resolution.key, resolution.reference
            ),
        }
    }

    pub fn fallback_price(role: PriceRole, priced: &PricedRef) -> Self {
        Self {
            reference: priced.reference.clone(),
            kind: WarningKind::FallbackPrice {
                role,
                price: priced.unit_price,
            },
            message: format!(
                "目錄無參照 {}，{:?} 改用備用價格 {}",
                priced.reference, role, priced.unit_price
            ),
        }
    }

    pub fn is_default_reference(&self) -> bool {
        matches!(self.kind, WarningKind::DefaultReference { .. })
    }

    pub fn is_fallback_price(&self) -> bool {
        matches!(self.kind, WarningKind::FallbackPrice { .. })
    }
}

/// 訂單報價結果
#[derive(Debug, Clone, PartialEq)]
pub struct OrderQuote {
    /// 各訂單行結果（與輸入順序相同）
    pub lines: Vec<LineQuote>,

    /// 成功訂單行的總價（單樘總價 × 樘數）
    pub total_cost: Decimal,
}

impl OrderQuote {
    /// 計算失敗的訂單行
    pub fn failed(&self) -> impl Iterator<Item = &LineQuote> {
        self.lines.iter().filter(|line| line.result.is_err())
    }
}

/// 單一訂單行的報價結果
#[derive(Debug, Clone, PartialEq)]
pub struct LineQuote {
    pub line_id: Uuid,
    pub quantity: u32,
    pub result: Result<WindowQuote, QuoteError>,
}

impl LineQuote {
    /// 此行小計（失敗或溢位為 None）
    pub fn line_total(&self) -> Option<Decimal> {
        self.result
            .as_ref()
            .ok()
            .and_then(|quote| quote.total_cost().checked_mul(Decimal::from(self.quantity)))
    }
}

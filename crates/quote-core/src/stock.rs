//! 型材用料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一長度需求的型材用量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarUsage {
    /// 需求長度（公分）
    pub required_length: Decimal,

    /// 型材長度（公分）
    pub bar_length: Decimal,

    /// 精確支數（需求長度 / 型材長度）
    pub exact_bars_needed: Decimal,

    /// 實際採購支數（向上取整）
    pub actual_bars_needed: u32,

    /// 餘料長度（公分）
    pub waste_length: Decimal,

    /// 利用率（%）
    pub utilization_pct: Decimal,
}

impl BarUsage {
    /// 採購總長度
    pub fn purchased_length(&self) -> Decimal {
        Decimal::from(self.actual_bars_needed) * self.bar_length
    }
}

/// 利用率等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficiencyGrade {
    /// ≥ 90%
    Good,
    /// ≥ 75%
    Fair,
    /// < 75%
    Poor,
}

impl EfficiencyGrade {
    pub fn for_utilization(utilization_pct: Decimal) -> Self {
        if utilization_pct >= Decimal::from(90) {
            EfficiencyGrade::Good
        } else if utilization_pct >= Decimal::from(75) {
            EfficiencyGrade::Fair
        } else {
            EfficiencyGrade::Poor
        }
    }
}

/// 整張訂單某一型材族的備料計劃
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockPlan {
    /// 總需求長度（公分）
    pub total_required_length: Decimal,

    /// 需採購支數
    pub bars_needed: u32,

    /// 餘料長度（公分）
    pub waste_length: Decimal,

    /// 利用率（%）
    pub utilization_pct: Decimal,
}

impl StockPlan {
    pub fn grade(&self) -> EfficiencyGrade {
        EfficiencyGrade::for_utilization(self.utilization_pct)
    }
}

impl From<BarUsage> for StockPlan {
    fn from(usage: BarUsage) -> Self {
        Self {
            total_required_length: usage.required_length,
            bars_needed: usage.actual_bars_needed,
            waste_length: usage.waste_length,
            utilization_pct: usage.utilization_pct,
        }
    }
}

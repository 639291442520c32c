//! 批量備料規劃
//!
//! 整張訂單的外框型材與扇型材分別彙總後估算支數，
//! 同一型材族內允許跨窗共用型材；中梃與五金不在此列。

use quote_core::{BarUsage, OrderLine, QuoteError, StockPlan};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::{BarStockEstimator, WindowGeometry};

/// 餘料可重複利用的門檻（公分）
pub const REUSABLE_OFFCUT_CM: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// 被拒絕的訂單行
///
/// 序列化時 `error` 輸出為錯誤訊息文字。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedLine {
    pub line_id: Uuid,
    #[serde(serialize_with = "error_message")]
    pub error: QuoteError,
}

fn error_message<S: Serializer>(error: &QuoteError, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// 整張訂單的備料計劃
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStockPlan {
    /// 外框型材
    pub frame: StockPlan,

    /// 扇型材
    pub sash: StockPlan,

    /// 計入的窗戶樘數
    pub total_windows: u32,

    /// 被拒絕的訂單行（不計入彙總）
    pub rejected: Vec<RejectedLine>,
}

impl BatchStockPlan {
    /// 是否有任一型材族的餘料足以再利用
    pub fn has_reusable_offcut(&self) -> bool {
        self.frame.waste_length > REUSABLE_OFFCUT_CM || self.sash.waste_length > REUSABLE_OFFCUT_CM
    }

    /// 外框與扇型材合計支數
    pub fn total_bars(&self) -> u64 {
        u64::from(self.frame.bars_needed) + u64::from(self.sash.bars_needed)
    }

    /// 外框與扇型材利用率的平均（百分比）
    pub fn average_utilization(&self) -> Decimal {
        (self.frame.utilization_pct + self.sash.utilization_pct) / Decimal::TWO
    }

    pub fn is_empty(&self) -> bool {
        self.total_windows == 0
    }
}

/// 單行的長度需求
struct LineDemand {
    line_id: Uuid,
    frame: Decimal,
    sash: Decimal,
    windows: u32,
}

/// 累計中的用料
struct Running {
    frame: BarUsage,
    sash: BarUsage,
    windows: u32,
}

/// 批量備料規劃器
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchStockPlanner {
    estimator: BarStockEstimator,
}

impl BatchStockPlanner {
    pub fn new(bar_length: Decimal) -> quote_core::Result<Self> {
        Ok(Self {
            estimator: BarStockEstimator::new(bar_length)?,
        })
    }

    pub fn standard() -> Self {
        Self::default()
    }

    pub fn bar_length(&self) -> Decimal {
        self.estimator.bar_length()
    }

    /// 規劃整張訂單
    ///
    /// 不合法的訂單行（樘數為零、尺寸無效或使累計量溢位）個別拒絕，其餘照常彙總。
    pub fn plan(&self, lines: &[OrderLine]) -> BatchStockPlan {
        tracing::info!("開始批量備料：{} 行", lines.len());

        // 各行獨立驗證與推導
        let demands: Vec<std::result::Result<LineDemand, RejectedLine>> =
            lines.par_iter().map(Self::line_demand).collect();

        let mut running = Running {
            frame: self.estimator.empty_usage(),
            sash: self.estimator.empty_usage(),
            windows: 0,
        };
        let mut rejected = Vec::new();

        for demand in demands {
            let next = demand.and_then(|d| {
                self.absorb(&running, &d).map_err(|error| RejectedLine {
                    line_id: d.line_id,
                    error,
                })
            });
            match next {
                Ok(r) => running = r,
                Err(r) => {
                    tracing::warn!("訂單行 {} 被拒絕: {}", r.line_id, r.error);
                    rejected.push(r);
                }
            }
        }

        tracing::debug!(
            "外框 {} cm → {} 支，扇 {} cm → {} 支",
            running.frame.required_length,
            running.frame.actual_bars_needed,
            running.sash.required_length,
            running.sash.actual_bars_needed
        );
        tracing::info!(
            "批量備料完成：{} 樘，拒絕 {} 行",
            running.windows,
            rejected.len()
        );

        BatchStockPlan {
            frame: StockPlan::from(running.frame),
            sash: StockPlan::from(running.sash),
            total_windows: running.windows,
            rejected,
        }
    }

    /// 把一行需求併入累計，任何一項超出範圍則整行不計入
    fn absorb(&self, running: &Running, demand: &LineDemand) -> quote_core::Result<Running> {
        let frame_total = running
            .frame
            .required_length
            .checked_add(demand.frame)
            .ok_or_else(|| QuoteError::Overflow("外框型材累計長度超出可表示範圍".to_string()))?;
        let sash_total = running
            .sash
            .required_length
            .checked_add(demand.sash)
            .ok_or_else(|| QuoteError::Overflow("扇型材累計長度超出可表示範圍".to_string()))?;
        let windows = running
            .windows
            .checked_add(demand.windows)
            .ok_or_else(|| QuoteError::Overflow(format!("窗戶樘數累計超過 {}", u32::MAX)))?;

        Ok(Running {
            frame: self.estimator.estimate(frame_total)?,
            sash: self.estimator.estimate(sash_total)?,
            windows,
        })
    }

    fn line_demand(line: &OrderLine) -> std::result::Result<LineDemand, RejectedLine> {
        let reject = |error| RejectedLine {
            line_id: line.id,
            error,
        };

        if line.quantity == 0 {
            return Err(reject(QuoteError::InvalidQuantity {
                line: line.id.to_string(),
                quantity: line.quantity,
            }));
        }

        let geometry = WindowGeometry::compute(&line.specs).map_err(reject)?;
        let quantity = Decimal::from(line.quantity);
        let scaled = |length: Decimal, what: &str| {
            length.checked_mul(quantity).ok_or_else(|| {
                reject(QuoteError::Overflow(format!(
                    "{}乘以樘數 {} 超出可表示範圍",
                    what, quantity
                )))
            })
        };

        Ok(LineDemand {
            line_id: line.id,
            frame: scaled(geometry.frame_perimeter, "外框周長")?,
            sash: scaled(geometry.total_sash_length, "扇型材長度")?,
            windows: line.quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{EfficiencyGrade, WindowSpecs};

    use crate::STANDARD_BAR_LENGTH_CM;

    fn line(length: i64, width: i64, quantity: u32) -> OrderLine {
        OrderLine::with_dimensions(Decimal::from(length), Decimal::from(width), quantity)
    }

    #[test]
    fn test_two_line_order() {
        let plan = BatchStockPlanner::standard().plan(&[line(100, 100, 1), line(120, 110, 1)]);

        assert_eq!(plan.total_windows, 2);
        assert!(plan.rejected.is_empty());

        // 400 + 460
        assert_eq!(plan.frame.total_required_length, Decimal::from(860));
        assert_eq!(plan.frame.bars_needed, 2);
        assert_eq!(plan.frame.waste_length, Decimal::from(440));

        // 574.6 + 674.6
        assert_eq!(plan.sash.total_required_length, Decimal::new(12492, 1));
        assert_eq!(plan.sash.bars_needed, 2);
        assert_eq!(plan.sash.waste_length, Decimal::new(508, 1));
        assert_eq!(plan.sash.grade(), EfficiencyGrade::Good);

        assert!(!plan.has_reusable_offcut());
    }

    #[test]
    fn test_quantity_multiplies_demand() {
        let planner = BatchStockPlanner::standard();
        let once = planner.plan(&[line(100, 100, 1)]);
        let thrice = planner.plan(&[line(100, 100, 3)]);

        assert_eq!(thrice.total_windows, 3);
        assert_eq!(
            thrice.frame.total_required_length,
            once.frame.total_required_length * Decimal::from(3)
        );
        // 1200 cm → 2 支
        assert_eq!(thrice.frame.bars_needed, 2);
        assert_eq!(thrice.frame.waste_length, Decimal::from(100));
    }

    #[test]
    fn test_invalid_lines_are_rejected_individually() {
        let bad_quantity = line(100, 100, 0);
        let bad_size = line(3, 100, 2);
        let lines = vec![line(100, 100, 1), bad_quantity.clone(), bad_size.clone()];

        let plan = BatchStockPlanner::standard().plan(&lines);

        assert_eq!(plan.total_windows, 1);
        assert_eq!(plan.frame.total_required_length, Decimal::from(400));
        assert_eq!(plan.rejected.len(), 2);
        assert_eq!(plan.rejected[0].line_id, bad_quantity.id);
        assert!(matches!(plan.rejected[0].error, QuoteError::InvalidQuantity { quantity: 0, .. }));
        assert_eq!(plan.rejected[1].line_id, bad_size.id);
        assert!(matches!(plan.rejected[1].error, QuoteError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_empty_order() {
        let plan = BatchStockPlanner::standard().plan(&[]);

        assert!(plan.is_empty());
        assert_eq!(plan.frame.bars_needed, 0);
        assert_eq!(plan.sash.bars_needed, 0);
        assert_eq!(plan.frame.waste_length, Decimal::ZERO);
        assert!(!plan.has_reusable_offcut());
    }

    #[test]
    fn test_reusable_offcut() {
        // 外框 2 × (200 + 130) = 660 → 2 支，餘 640
        let plan = BatchStockPlanner::standard().plan(&[line(200, 130, 1)]);
        assert_eq!(plan.frame.waste_length, Decimal::from(640));
        assert!(plan.has_reusable_offcut());
    }

    #[test]
    fn test_custom_bar_length() {
        let planner = BatchStockPlanner::new(Decimal::from(600)).unwrap();
        let plan = planner.plan(&[line(100, 100, 1), line(120, 110, 1)]);

        assert_eq!(planner.bar_length(), Decimal::from(600));
        assert_eq!(plan.frame.bars_needed, 2);
        assert_eq!(plan.frame.waste_length, Decimal::from(340));
        assert!(BatchStockPlanner::new(Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn test_oversized_line_is_rejected_others_planned() {
        let huge = OrderLine::new(WindowSpecs::new(Decimal::MAX, Decimal::from(100)), 1);
        let lines = vec![line(100, 100, 1), huge.clone()];

        let plan = BatchStockPlanner::standard().plan(&lines);

        assert_eq!(plan.total_windows, 1);
        assert_eq!(plan.frame.total_required_length, Decimal::from(400));
        assert_eq!(plan.frame.bars_needed, 1);
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.rejected[0].line_id, huge.id);
        assert!(matches!(plan.rejected[0].error, QuoteError::Overflow(_)));
    }

    #[test]
    fn test_bar_count_overflow_keeps_plan_consistent() {
        // 單行 400 × u32::MAX cm 需要約 26 億支外框型材，第二行會使支數超出 u32
        let first = line(100, 100, u32::MAX);
        let second = line(100, 100, u32::MAX);

        let plan = BatchStockPlanner::standard().plan(&[first, second.clone()]);

        assert_eq!(plan.total_windows, u32::MAX);
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.rejected[0].line_id, second.id);
        assert!(matches!(plan.rejected[0].error, QuoteError::Overflow(_)));

        for stock in [&plan.frame, &plan.sash] {
            let purchased = Decimal::from(stock.bars_needed) * STANDARD_BAR_LENGTH_CM;
            assert!(stock.total_required_length <= purchased);
            assert_eq!(stock.waste_length, purchased - stock.total_required_length);
        }
    }

    #[test]
    fn test_window_count_overflow_is_rejected() {
        let lines = vec![line(100, 100, u32::MAX), line(100, 100, 1)];
        let plan = BatchStockPlanner::standard().plan(&lines);

        assert_eq!(plan.total_windows, u32::MAX);
        assert_eq!(plan.rejected.len(), 1);
        assert!(matches!(plan.rejected[0].error, QuoteError::Overflow(_)));
    }

    #[test]
    fn test_order_summary_figures() {
        let plan = BatchStockPlanner::standard().plan(&[line(100, 100, 1), line(120, 110, 1)]);

        assert_eq!(plan.total_bars(), 4);
        // (860 / 1300 + 1249.2 / 1300) × 100 / 2
        let expected = (Decimal::from(860) / Decimal::from(1300) * Decimal::ONE_HUNDRED
            + Decimal::new(12492, 1) / Decimal::from(1300) * Decimal::ONE_HUNDRED)
            / Decimal::TWO;
        assert_eq!(plan.average_utilization(), expected);
        assert_eq!(plan.average_utilization().round_dp(2), Decimal::new(8113, 2));
    }

    #[test]
    fn test_rejected_lines_are_serialized() {
        let bad = line(100, 100, 0);
        let plan = BatchStockPlanner::standard().plan(&[line(100, 100, 1), bad.clone()]);

        let json = serde_json::to_value(&plan).unwrap();
        let rejected = json["rejected"].as_array().unwrap();

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0]["line_id"], bad.id.to_string());
        assert_eq!(rejected[0]["error"], plan.rejected[0].error.to_string());
    }
}

//! 型材支數估算
//!
//! 以容量向上取整近似：假設任何需求段都能從任何一支型材切出，
//! 不考慮切割排版、鋸縫損耗，也不跨品項重用餘料。

use quote_core::{BarUsage, QuoteError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 標準型材長度（公分）
pub const STANDARD_BAR_LENGTH_CM: Decimal = Decimal::from_parts(650, 0, 0, false, 0);

/// 型材支數估算器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStockEstimator {
    bar_length: Decimal,
}

impl BarStockEstimator {
    /// 以指定型材長度創建估算器
    pub fn new(bar_length: Decimal) -> quote_core::Result<Self> {
        if bar_length <= Decimal::ZERO {
            return Err(QuoteError::InvalidBarLength(bar_length));
        }
        Ok(Self { bar_length })
    }

    /// 650 公分標準型材
    pub fn standard() -> Self {
        Self {
            bar_length: STANDARD_BAR_LENGTH_CM,
        }
    }

    pub fn bar_length(&self) -> Decimal {
        self.bar_length
    }

    /// 零需求的用量（0 支、0 餘料、0% 利用率）
    pub fn empty_usage(&self) -> BarUsage {
        BarUsage {
            required_length: Decimal::ZERO,
            bar_length: self.bar_length,
            exact_bars_needed: Decimal::ZERO,
            actual_bars_needed: 0,
            waste_length: Decimal::ZERO,
            utilization_pct: Decimal::ZERO,
        }
    }

    /// 估算需求長度的用料
    ///
    /// 需求長度不為正時回傳零用量；所需支數超出 `u32` 或中間量溢位時回傳 `Overflow`。
    pub fn estimate(&self, required_length: Decimal) -> quote_core::Result<BarUsage> {
        if required_length <= Decimal::ZERO {
            return Ok(self.empty_usage());
        }

        let exact_bars_needed = required_length
            .checked_div(self.bar_length)
            .ok_or_else(|| self.overflow(required_length))?;
        let bars = exact_bars_needed.ceil();
        let actual_bars_needed = bars.to_u32().ok_or_else(|| self.overflow(required_length))?;
        let purchased = bars
            .checked_mul(self.bar_length)
            .ok_or_else(|| self.overflow(required_length))?;

        Ok(BarUsage {
            required_length,
            bar_length: self.bar_length,
            exact_bars_needed,
            actual_bars_needed,
            waste_length: purchased - required_length,
            utilization_pct: required_length / purchased * Decimal::ONE_HUNDRED,
        })
    }

    fn overflow(&self, required_length: Decimal) -> QuoteError {
        QuoteError::Overflow(format!(
            "需求長度 {} 以 {} 公分型材計算超出可表示支數",
            required_length, self.bar_length
        ))
    }
}

impl Default for BarStockEstimator {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_estimate_frame_of_square_window() {
        let usage = BarStockEstimator::standard().estimate(Decimal::from(400)).unwrap();

        assert_eq!(usage.actual_bars_needed, 1);
        assert_eq!(usage.exact_bars_needed, Decimal::from(400) / Decimal::from(650));
        assert_eq!(usage.waste_length, Decimal::from(250));
        assert_eq!(usage.purchased_length(), Decimal::from(650));
    }

    #[rstest]
    #[case(Decimal::from(650), 1, Decimal::ZERO)]
    #[case(Decimal::from(860), 2, Decimal::from(440))]
    #[case(Decimal::new(5746, 1), 1, Decimal::new(754, 1))]
    #[case(Decimal::new(12492, 1), 2, Decimal::new(508, 1))]
    #[case(Decimal::from(1301), 3, Decimal::from(649))]
    fn test_estimate_cases(#[case] required: Decimal, #[case] bars: u32, #[case] waste: Decimal) {
        let usage = BarStockEstimator::standard().estimate(required).unwrap();
        assert_eq!(usage.actual_bars_needed, bars);
        assert_eq!(usage.waste_length, waste);
    }

    #[test]
    fn test_exact_fit_is_full_utilization() {
        let usage = BarStockEstimator::standard().estimate(Decimal::from(1300)).unwrap();
        assert_eq!(usage.utilization_pct, Decimal::ONE_HUNDRED);
        assert_eq!(usage.waste_length, Decimal::ZERO);
    }

    #[test]
    fn test_zero_requirement() {
        let usage = BarStockEstimator::standard().estimate(Decimal::ZERO).unwrap();
        assert_eq!(usage.actual_bars_needed, 0);
        assert_eq!(usage.waste_length, Decimal::ZERO);
        assert_eq!(usage.utilization_pct, Decimal::ZERO);
    }

    #[test]
    fn test_negative_requirement_is_empty() {
        let estimator = BarStockEstimator::standard();
        assert_eq!(estimator.estimate(Decimal::from(-5)).unwrap(), estimator.empty_usage());
    }

    #[test]
    fn test_bar_count_beyond_u32_is_rejected() {
        let estimator = BarStockEstimator::standard();
        let max_bars = Decimal::from(u32::MAX);

        let at_limit = estimator.estimate(max_bars * STANDARD_BAR_LENGTH_CM).unwrap();
        assert_eq!(at_limit.actual_bars_needed, u32::MAX);
        assert_eq!(at_limit.waste_length, Decimal::ZERO);

        let past_limit = max_bars * STANDARD_BAR_LENGTH_CM + Decimal::ONE;
        assert!(matches!(estimator.estimate(past_limit), Err(QuoteError::Overflow(_))));
    }

    #[test]
    fn test_tiny_bar_with_huge_requirement() {
        let estimator = BarStockEstimator::new(Decimal::new(1, 28)).unwrap();
        assert!(matches!(
            estimator.estimate(Decimal::from(1_000_000)),
            Err(QuoteError::Overflow(_))
        ));
    }

    #[test]
    fn test_invalid_bar_length() {
        assert_eq!(
            BarStockEstimator::new(Decimal::ZERO),
            Err(QuoteError::InvalidBarLength(Decimal::ZERO))
        );
        assert_eq!(BarStockEstimator::new(Decimal::from(600)).unwrap().bar_length(), Decimal::from(600));
    }

    proptest! {
        #[test]
        fn prop_bar_usage_invariant(tenths in 1i64..10_000_000) {
            let required = Decimal::new(tenths, 1);
            let bar = STANDARD_BAR_LENGTH_CM;
            let usage = BarStockEstimator::standard().estimate(required).unwrap();
            let bars = Decimal::from(usage.actual_bars_needed);

            prop_assert_eq!(bars, (required / bar).ceil());
            prop_assert!((bars - Decimal::ONE) * bar < required);
            prop_assert!(required <= bars * bar);
            prop_assert_eq!(usage.waste_length, bars * bar - required);
            prop_assert!(usage.waste_length >= Decimal::ZERO);
            prop_assert!(usage.utilization_pct > Decimal::ZERO);
            prop_assert!(usage.utilization_pct <= Decimal::ONE_HUNDRED);
        }
    }
}

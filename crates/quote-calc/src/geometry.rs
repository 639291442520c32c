//! 幾何推導（尺寸 → 型材長度與玻璃面積）
//!
//! 除特別註明外，單位皆為公分。

use quote_core::{QuoteError, WindowSpecs};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 扇高扣減（公分）
pub const SASH_LENGTH_CLEARANCE_CM: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// 兩扇合計的寬度扣減（公分）
pub const SASH_WIDTH_CLEARANCE_CM: Decimal = Decimal::from_parts(47, 0, 0, false, 1);

/// 玻璃入槽扣減（公分）
pub const GLASS_REBATE_CM: Decimal = Decimal::ONE;

/// 每樘窗的扇數
pub const SASH_COUNT: Decimal = Decimal::TWO;

const CM2_PER_M2: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
const CM_PER_M: Decimal = Decimal::ONE_HUNDRED;

/// 單樘窗的幾何量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// 外框周長
    pub frame_perimeter: Decimal,
    /// 單扇高度
    pub sash_length: Decimal,
    /// 單扇寬度
    pub sash_width: Decimal,
    /// 單扇周長
    pub sash_perimeter_single: Decimal,
    /// 兩扇型材總長
    pub total_sash_length: Decimal,
    /// 中梃長度
    pub separator_length: Decimal,
    /// 單扇玻璃高度
    pub glass_length: Decimal,
    /// 單扇玻璃寬度
    pub glass_width: Decimal,
    /// 單扇玻璃面積（平方米）
    pub glass_area_per_sash_m2: Decimal,
    /// 玻璃總面積（平方米）
    pub total_glass_area_m2: Decimal,
    /// 碰口膠條長度（米）
    pub joint_battement_m: Decimal,
    /// 玻璃壓條膠條長度（米，兩面）
    pub joint_plat_m: Decimal,
    /// 傳動桿長度（米）
    pub rod_length_m: Decimal,
}

impl WindowGeometry {
    /// 由窗戶規格推導幾何量
    ///
    /// 尺寸不足以留下正的扇與玻璃尺寸時回傳 `InvalidDimensions`。
    pub fn compute(specs: &WindowSpecs) -> quote_core::Result<Self> {
        Self::from_dimensions(specs.length_cm, specs.width_cm)
    }

    /// 由高度與寬度推導幾何量
    ///
    /// 尺寸大到中間量超出 `Decimal` 範圍時回傳 `Overflow`。
    pub fn from_dimensions(length: Decimal, width: Decimal) -> quote_core::Result<Self> {
        Self::validate(length, width)?;

        let frame_perimeter = Self::frame_perimeter(length, width)?;
        let sash_length = Self::sash_length(length);
        let sash_width = Self::sash_width(width);
        let sash_perimeter_single = sash_length
            .checked_add(sash_width)
            .and_then(|sum| sum.checked_mul(Decimal::TWO))
            .ok_or_else(|| overflow("單扇周長"))?;
        let total_sash_length = sash_perimeter_single
            .checked_mul(SASH_COUNT)
            .ok_or_else(|| overflow("兩扇型材總長"))?;

        let glass_length = sash_length - GLASS_REBATE_CM;
        let glass_width = sash_width - GLASS_REBATE_CM;
        let glass_area_per_sash_m2 = glass_length
            .checked_mul(glass_width)
            .ok_or_else(|| overflow("玻璃面積"))?
            / CM2_PER_M2;
        let total_glass_area_m2 = glass_area_per_sash_m2
            .checked_mul(SASH_COUNT)
            .ok_or_else(|| overflow("玻璃總面積"))?;

        let joint_battement_m = frame_perimeter
            .checked_add(total_sash_length)
            .ok_or_else(|| overflow("碰口膠條長度"))?
            / CM_PER_M;
        let joint_plat_m = total_sash_length
            .checked_mul(Decimal::TWO)
            .ok_or_else(|| overflow("壓條膠條長度"))?
            / CM_PER_M;

        Ok(Self {
            frame_perimeter,
            sash_length,
            sash_width,
            sash_perimeter_single,
            total_sash_length,
            separator_length: sash_length,
            glass_length,
            glass_width,
            glass_area_per_sash_m2,
            total_glass_area_m2,
            joint_battement_m,
            joint_plat_m,
            rod_length_m: length / CM_PER_M,
        })
    }

    /// 外框周長 `2 × (高 + 寬)`
    pub fn frame_perimeter(length: Decimal, width: Decimal) -> quote_core::Result<Decimal> {
        length
            .checked_add(width)
            .and_then(|sum| sum.checked_mul(Decimal::TWO))
            .ok_or_else(|| overflow("外框周長"))
    }

    /// 單扇高度 `高 − 4`
    pub fn sash_length(length: Decimal) -> Decimal {
        length - SASH_LENGTH_CLEARANCE_CM
    }

    /// 單扇寬度 `(寬 − 4.7) / 2`
    pub fn sash_width(width: Decimal) -> Decimal {
        (width - SASH_WIDTH_CLEARANCE_CM) / SASH_COUNT
    }

    /// 檢查尺寸：高寬必須為正，且扣減後扇與玻璃尺寸仍為正
    pub fn validate(length: Decimal, width: Decimal) -> quote_core::Result<()> {
        if length <= Decimal::ZERO {
            return Err(invalid("length_cm", length, "高度必須大於零"));
        }
        if width <= Decimal::ZERO {
            return Err(invalid("width_cm", width, "寬度必須大於零"));
        }

        let sash_length = Self::sash_length(length);
        let sash_width = Self::sash_width(width);
        if sash_length <= Decimal::ZERO {
            return Err(invalid("length_cm", length, "扇高度扣減後不為正"));
        }
        if sash_width <= Decimal::ZERO {
            return Err(invalid("width_cm", width, "扇寬度扣減後不為正"));
        }
        if sash_length - GLASS_REBATE_CM <= Decimal::ZERO {
            return Err(invalid("length_cm", length, "玻璃高度扣減後不為正"));
        }
        if sash_width - GLASS_REBATE_CM <= Decimal::ZERO {
            return Err(invalid("width_cm", width, "玻璃寬度扣減後不為正"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: Decimal, reason: &str) -> QuoteError {
    QuoteError::InvalidDimensions {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    }
}

fn overflow(quantity: &str) -> QuoteError {
    QuoteError::Overflow(format!("{}超出可表示範圍", quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn cm(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_square_window_geometry() {
        let g = WindowGeometry::from_dimensions(cm(100), cm(100)).unwrap();

        assert_eq!(g.frame_perimeter, cm(400));
        assert_eq!(g.sash_length, cm(96));
        assert_eq!(g.sash_width, Decimal::new(4765, 2));
        assert_eq!(g.sash_perimeter_single, Decimal::new(2873, 1));
        assert_eq!(g.total_sash_length, Decimal::new(5746, 1));
        assert_eq!(g.separator_length, cm(96));
        assert_eq!(g.glass_length, cm(95));
        assert_eq!(g.glass_width, Decimal::new(4665, 2));
        // 2 × (95 × 46.65) / 10000
        assert_eq!(g.total_glass_area_m2, Decimal::new(88635, 5));
        // (400 + 574.6) / 100
        assert_eq!(g.joint_battement_m, Decimal::new(9746, 3));
        // 574.6 × 2 / 100
        assert_eq!(g.joint_plat_m, Decimal::new(11492, 3));
        assert_eq!(g.rod_length_m, Decimal::ONE);
    }

    #[test]
    fn test_length_and_width_are_not_interchangeable() {
        let a = WindowGeometry::from_dimensions(cm(120), cm(80)).unwrap();
        let b = WindowGeometry::from_dimensions(cm(80), cm(120)).unwrap();

        assert_eq!(a.frame_perimeter, b.frame_perimeter);
        assert_eq!(a.sash_length, cm(116));
        assert_eq!(b.sash_length, cm(76));
        assert_eq!(a.sash_width, Decimal::new(3765, 2));
        assert_eq!(b.sash_width, Decimal::new(5765, 2));
        assert_ne!(a.total_sash_length, b.total_sash_length);
    }

    #[rstest]
    #[case(cm(0), cm(100), "length_cm")]
    #[case(cm(-10), cm(100), "length_cm")]
    #[case(cm(100), cm(0), "width_cm")]
    #[case(cm(4), cm(100), "length_cm")]
    #[case(cm(5), cm(100), "length_cm")]
    #[case(cm(100), Decimal::new(47, 1), "width_cm")]
    #[case(cm(100), Decimal::new(67, 1), "width_cm")]
    fn test_invalid_dimensions(#[case] length: Decimal, #[case] width: Decimal, #[case] field: &str) {
        match WindowGeometry::from_dimensions(length, width) {
            Err(QuoteError::InvalidDimensions { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }

    #[test]
    fn test_smallest_valid_window() {
        let g = WindowGeometry::from_dimensions(Decimal::new(51, 1), Decimal::new(68, 1)).unwrap();
        assert!(g.glass_length > Decimal::ZERO);
        assert!(g.glass_width > Decimal::ZERO);
        assert!(g.total_glass_area_m2 > Decimal::ZERO);
    }

    #[rstest]
    #[case(Decimal::MAX, cm(100))]
    #[case(cm(100), Decimal::MAX)]
    #[case(Decimal::MAX / Decimal::TWO, Decimal::MAX / Decimal::TWO)]
    fn test_huge_dimensions_overflow(#[case] length: Decimal, #[case] width: Decimal) {
        assert!(matches!(
            WindowGeometry::from_dimensions(length, width),
            Err(QuoteError::Overflow(_))
        ));
    }

    #[test]
    fn test_frame_perimeter_overflow() {
        assert!(matches!(
            WindowGeometry::frame_perimeter(Decimal::MAX, Decimal::ONE),
            Err(QuoteError::Overflow(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_frame_perimeter_symmetric(l in 1i64..100_000, w in 1i64..100_000) {
            let length = Decimal::new(l, 1);
            let width = Decimal::new(w, 1);
            prop_assert_eq!(
                WindowGeometry::frame_perimeter(length, width).unwrap(),
                WindowGeometry::frame_perimeter(width, length).unwrap()
            );
        }

        #[test]
        fn prop_valid_geometry_is_positive(l in 51i64..50_000, w in 68i64..50_000) {
            let g = WindowGeometry::from_dimensions(Decimal::new(l, 1), Decimal::new(w, 1)).unwrap();
            prop_assert!(g.sash_length > Decimal::ZERO);
            prop_assert!(g.sash_width > Decimal::ZERO);
            prop_assert!(g.total_glass_area_m2 > Decimal::ZERO);
            prop_assert_eq!(g.total_sash_length, g.sash_perimeter_single * Decimal::TWO);
        }
    }
}

//! 報價配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{QuoteError, Result};

/// 計價角色（每個角色對應一個目錄參照與一個備用價格）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRole {
    /// 外框型材（40100）
    FrameProfile,
    /// 扇型材
    SashProfile,
    /// 中梃型材（40112）
    SeparatorProfile,
    /// 角碼（équerre en tôle）
    CornerBracket,
    /// 外框對位角碼 PM
    AlignmentBracketPm,
    /// 扇對位角碼 GM
    AlignmentBracketGm,
    /// 合頁（paumelle）
    Hinge,
    /// 碰口膠條（joint de battement）
    WeatherStrip,
    /// 玻璃壓條膠條（joint plat）
    GlazingGasket,
    /// 天地鎖（crémone）
    Cremone,
    /// 天地鎖配件包
    CremoneKit,
    /// 鎖扣配件包
    LockKit,
    /// 傳動桿（tringle）
    CurtainRod,
}

impl PriceRole {
    pub const ALL: [PriceRole; 13] = [
        PriceRole::FrameProfile,
        PriceRole::SashProfile,
        PriceRole::SeparatorProfile,
        PriceRole::CornerBracket,
        PriceRole::AlignmentBracketPm,
        PriceRole::AlignmentBracketGm,
        PriceRole::Hinge,
        PriceRole::WeatherStrip,
        PriceRole::GlazingGasket,
        PriceRole::Cremone,
        PriceRole::CremoneKit,
        PriceRole::LockKit,
        PriceRole::CurtainRod,
    ];

    /// 目錄缺項時的標準備用價格
    pub fn standard_fallback(self) -> Decimal {
        match self {
            PriceRole::FrameProfile => Decimal::from(74),
            PriceRole::SashProfile => Decimal::new(5767, 2),
            PriceRole::SeparatorProfile => Decimal::new(493, 1),
            PriceRole::CornerBracket => Decimal::new(12, 1),
            PriceRole::AlignmentBracketPm => Decimal::new(45, 1),
            PriceRole::AlignmentBracketGm => Decimal::new(55, 1),
            PriceRole::Hinge => Decimal::new(333, 2),
            PriceRole::WeatherStrip => Decimal::from(16),
            PriceRole::GlazingGasket => Decimal::new(2263, 2),
            PriceRole::Cremone => Decimal::new(963, 2),
            PriceRole::CremoneKit => Decimal::new(27, 1),
            PriceRole::LockKit => Decimal::new(276, 2),
            PriceRole::CurtainRod => Decimal::new(17, 1),
        }
    }

    /// 目錄單價對應的包裝數量（對位角碼每盒 100 件，膠條每卷 50 米）
    pub fn pack_size(self) -> Decimal {
        match self {
            PriceRole::AlignmentBracketPm | PriceRole::AlignmentBracketGm => Decimal::ONE_HUNDRED,
            PriceRole::WeatherStrip | PriceRole::GlazingGasket => Decimal::from(50),
            _ => Decimal::ONE,
        }
    }
}

/// 備用價格表
///
/// 未覆寫的角色使用 [`PriceRole::standard_fallback`]。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackPrices {
    overrides: BTreeMap<PriceRole, Decimal>,
}

impl FallbackPrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：覆寫某角色的備用價格
    pub fn with_price(mut self, role: PriceRole, price: Decimal) -> Self {
        self.overrides.insert(role, price);
        self
    }

    /// 取得某角色的備用價格
    pub fn price(&self, role: PriceRole) -> Decimal {
        self.overrides
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.standard_fallback())
    }
}

/// 報價參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// 型材長度（公分）
    pub bar_length_cm: Decimal,

    /// 玻璃每平方米單價
    pub glass_price_per_m2: Decimal,

    /// 預設利潤率（0.30 = 30%）
    pub default_margin: Decimal,

    /// 是否嚴格檢查參照
    /// - false: 參照表缺項時採用預設參照並記錄警告（預設）
    /// - true: 參照表缺項時直接拒絕計算
    pub strict_references: bool,

    /// 備用價格表
    pub fallback_prices: FallbackPrices,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            bar_length_cm: Decimal::from(650),
            glass_price_per_m2: Decimal::new(3125, 2),
            default_margin: Decimal::new(30, 2),
            strict_references: false,
            fallback_prices: FallbackPrices::default(),
        }
    }
}

impl PricingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入，缺少的欄位取預設值
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置型材長度
    pub fn with_bar_length(mut self, bar_length_cm: Decimal) -> Self {
        self.bar_length_cm = bar_length_cm;
        self
    }

    /// 建構器模式：設置玻璃單價
    pub fn with_glass_price(mut self, price_per_m2: Decimal) -> Self {
        self.glass_price_per_m2 = price_per_m2;
        self
    }

    /// 建構器模式：設置預設利潤率
    pub fn with_default_margin(mut self, margin: Decimal) -> Self {
        self.default_margin = margin;
        self
    }

    /// 建構器模式：設置是否嚴格檢查參照
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    /// 建構器模式：設置備用價格表
    pub fn with_fallback_prices(mut self, fallback_prices: FallbackPrices) -> Self {
        self.fallback_prices = fallback_prices;
        self
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.bar_length_cm <= Decimal::ZERO {
            return Err(QuoteError::InvalidBarLength(self.bar_length_cm));
        }
        if self.default_margin < Decimal::ZERO {
            return Err(QuoteError::InvalidMargin(self.default_margin));
        }
        Ok(())
    }
}

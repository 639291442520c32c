//! 窗戶規格模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 窗戶顏色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowColor {
    /// 白色
    #[serde(alias = "blanc")]
    White,
    /// 木紋
    #[serde(alias = "fbois")]
    Woodgrain,
    /// 灰色
    #[serde(alias = "gris")]
    Gray,
}

impl WindowColor {
    pub const ALL: [WindowColor; 3] = [WindowColor::White, WindowColor::Woodgrain, WindowColor::Gray];

    /// 五金配件顏色：木紋與灰色窗配深色，其餘配淺色
    pub fn hardware_color(self) -> HardwareColor {
        match self {
            WindowColor::Woodgrain | WindowColor::Gray => HardwareColor::Dark,
            WindowColor::White => HardwareColor::Light,
        }
    }

    /// 目錄品名用的顏色代碼
    pub fn code(self) -> &'static str {
        match self {
            WindowColor::White => "blanc",
            WindowColor::Woodgrain => "fbois",
            WindowColor::Gray => "gris",
        }
    }
}

impl fmt::Display for WindowColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 五金配件顏色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareColor {
    /// 淺色（白）
    Light,
    /// 深色（黑）
    Dark,
}

impl HardwareColor {
    pub fn code(self) -> &'static str {
        match self {
            HardwareColor::Light => "blanc",
            HardwareColor::Dark => "noir",
        }
    }
}

/// 中梃（40112）表面處理
///
/// `Economy` 不對應任何 [`WindowColor`]，只能經由直接呼叫 API 取得。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorFinish {
    White,
    Woodgrain,
    Gray,
    Economy,
}

impl SeparatorFinish {
    pub fn code(self) -> &'static str {
        match self {
            SeparatorFinish::White => "blanc",
            SeparatorFinish::Woodgrain => "fbois",
            SeparatorFinish::Gray => "gris",
            SeparatorFinish::Economy => "economique",
        }
    }
}

impl From<WindowColor> for SeparatorFinish {
    fn from(color: WindowColor) -> Self {
        match color {
            WindowColor::White => SeparatorFinish::White,
            WindowColor::Woodgrain => SeparatorFinish::Woodgrain,
            WindowColor::Gray => SeparatorFinish::Gray,
        }
    }
}

/// 窗戶規格（單樘）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpecs {
    /// 高度（公分）
    pub length_cm: Decimal,

    /// 寬度（公分）
    pub width_cm: Decimal,

    /// 顏色
    pub color: WindowColor,

    /// 外框款式（如 eurosist、pral）
    pub frame_style: String,

    /// 扇型材系列（如 6007、40404）
    pub sash_style: String,

    /// 扇型材子型號
    pub sash_subtype: String,

    /// 玻璃種類
    pub glass_type: String,
}

impl WindowSpecs {
    /// 創建新的窗戶規格，預設為白色 eurosist 外框、6007 inoforme 扇、單層玻璃
    pub fn new(length_cm: Decimal, width_cm: Decimal) -> Self {
        Self {
            length_cm,
            width_cm,
            color: WindowColor::White,
            frame_style: "eurosist".to_string(),
            sash_style: "6007".to_string(),
            sash_subtype: "inoforme".to_string(),
            glass_type: "simple".to_string(),
        }
    }

    /// 建構器模式：設置顏色
    pub fn with_color(mut self, color: WindowColor) -> Self {
        self.color = color;
        self
    }

    /// 建構器模式：設置外框款式
    pub fn with_frame_style(mut self, frame_style: impl Into<String>) -> Self {
        self.frame_style = frame_style.into();
        self
    }

    /// 建構器模式：設置扇型材系列與子型號
    pub fn with_sash(mut self, sash_style: impl Into<String>, sash_subtype: impl Into<String>) -> Self {
        self.sash_style = sash_style.into();
        self.sash_subtype = sash_subtype.into();
        self
    }

    /// 建構器模式：設置玻璃種類
    pub fn with_glass_type(mut self, glass_type: impl Into<String>) -> Self {
        self.glass_type = glass_type.into();
        self
    }
}

/// 訂單行（批量備料用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 訂單行ID
    pub id: Uuid,

    /// 窗戶規格
    pub specs: WindowSpecs,

    /// 樘數
    pub quantity: u32,
}

impl OrderLine {
    /// 創建新的訂單行
    pub fn new(specs: WindowSpecs, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            specs,
            quantity,
        }
    }

    /// 只有尺寸的訂單行（其餘規格取預設值）
    pub fn with_dimensions(length_cm: Decimal, width_cm: Decimal, quantity: u32) -> Self {
        Self::new(WindowSpecs::new(length_cm, width_cm), quantity)
    }
}

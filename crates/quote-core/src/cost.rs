//! 成本明細模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::material::PriceSource;
use crate::{QuoteError, Result};

/// 成本分組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostGroup {
    /// 外框（dormant）
    Frame,
    /// 扇（ouvrants）
    Sashes,
    /// 中梃
    Separator,
    /// 玻璃
    Glass,
    /// 五金
    Hardware,
}

impl CostGroup {
    /// 明細的固定輸出順序
    pub const ORDERED: [CostGroup; 5] = [
        CostGroup::Frame,
        CostGroup::Sashes,
        CostGroup::Separator,
        CostGroup::Glass,
        CostGroup::Hardware,
    ];
}

/// 成本項目（已含利潤）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    /// 品名
    pub name: String,

    /// 計價數量（型材為整數支數）
    pub quantity: Decimal,

    /// 數量說明（支數、件數、米數或面積）
    pub quantity_description: String,

    /// 單價
    pub unit_price: Decimal,

    /// 總價（已加利潤）
    pub total_cost: Decimal,

    /// 備註
    pub specifications: Option<String>,

    /// 計價所用的目錄參照
    pub reference: Option<String>,

    /// 單價來源
    pub price_source: PriceSource,
}

impl CostItem {
    /// 創建新的成本項目，`total_cost` 為 `quantity × unit_price × (1 + margin)`
    ///
    /// 乘積超出 `Decimal` 範圍時回傳 `Overflow`。
    pub fn new(
        name: impl Into<String>,
        quantity: Decimal,
        quantity_description: impl Into<String>,
        unit_price: Decimal,
        margin: Decimal,
    ) -> Result<Self> {
        let name = name.into();
        let total_cost = quantity
            .checked_mul(unit_price)
            .and_then(|raw| apply_margin(raw, margin))
            .ok_or_else(|| QuoteError::Overflow(format!("{} 總價超出可表示範圍", name)))?;

        Ok(Self {
            name,
            quantity,
            quantity_description: quantity_description.into(),
            unit_price,
            total_cost,
            specifications: None,
            reference: None,
            price_source: PriceSource::Configured,
        })
    }

    /// 建構器模式：設置備註
    pub fn with_specifications(mut self, specifications: impl Into<String>) -> Self {
        self.specifications = Some(specifications.into());
        self
    }

    /// 建構器模式：設置目錄參照與價格來源
    pub fn with_reference(mut self, reference: impl Into<String>, source: PriceSource) -> Self {
        self.reference = Some(reference.into());
        self.price_source = source;
        self
    }
}

/// 加上利潤：`raw × (1 + margin)`，溢位時為 `None`
pub fn apply_margin(raw_cost: Decimal, margin: Decimal) -> Option<Decimal> {
    Decimal::ONE
        .checked_add(margin)
        .and_then(|factor| raw_cost.checked_mul(factor))
}

/// 單樘窗成本明細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub frame: Vec<CostItem>,
    pub sashes: Vec<CostItem>,
    pub separator: Vec<CostItem>,
    pub glass: Vec<CostItem>,
    pub hardware: Vec<CostItem>,

    /// 所有項目總價之和
    pub total_cost: Decimal,
}

impl CostBreakdown {
    /// 由五組項目建立明細並計算總價
    pub fn new(
        frame: Vec<CostItem>,
        sashes: Vec<CostItem>,
        separator: Vec<CostItem>,
        glass: Vec<CostItem>,
        hardware: Vec<CostItem>,
    ) -> Result<Self> {
        let mut breakdown = Self {
            frame,
            sashes,
            separator,
            glass,
            hardware,
            total_cost: Decimal::ZERO,
        };
        let total_cost = breakdown
            .items()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total_cost))
            .ok_or_else(|| QuoteError::Overflow("明細總價超出可表示範圍".to_string()))?;
        breakdown.total_cost = total_cost;
        Ok(breakdown)
    }

    /// 取得某一組的項目
    pub fn group(&self, group: CostGroup) -> &[CostItem] {
        match group {
            CostGroup::Frame => &self.frame,
            CostGroup::Sashes => &self.sashes,
            CostGroup::Separator => &self.separator,
            CostGroup::Glass => &self.glass,
            CostGroup::Hardware => &self.hardware,
        }
    }

    /// 某一組的小計
    pub fn group_total(&self, group: CostGroup) -> Decimal {
        self.group(group).iter().map(|item| item.total_cost).sum()
    }

    /// 依固定順序迭代所有項目
    pub fn items(&self) -> impl Iterator<Item = &CostItem> {
        CostGroup::ORDERED
            .into_iter()
            .flat_map(move |group| self.group(group).iter())
    }

    /// 使用備用價格計價的項目
    pub fn fallback_items(&self) -> impl Iterator<Item = &CostItem> {
        self.items()
            .filter(|item| item.price_source == PriceSource::Fallback)
    }
}

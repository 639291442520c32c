//! 成本明細主計算器

use quote_core::{
    BarUsage, CostBreakdown, CostItem, FallbackPrices, MaterialCatalog, OrderLine, PriceRole, PricedRef, PricingConfig,
    QuoteError, WindowSpecs,
};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::{
    BarStockEstimator, LineQuote, OrderQuote, ProfileUsage, QuoteWarning, RefTable, ReferenceResolver,
    WindowGeometry, WindowQuote,
};

/// 成本計算器
///
/// 材料目錄、參照表與配置皆為唯讀輸入，計算之間不共享可變狀態。
#[derive(Debug, Clone)]
pub struct CostCalculator {
    /// 材料目錄
    catalog: MaterialCatalog,

    /// 參照解析器
    resolver: ReferenceResolver,

    /// 報價配置
    config: PricingConfig,

    /// 型材估算器（依配置的型材長度）
    estimator: BarStockEstimator,
}

impl CostCalculator {
    /// 創建新的成本計算器
    pub fn new(
        catalog: MaterialCatalog,
        resolver: ReferenceResolver,
        config: PricingConfig,
    ) -> quote_core::Result<Self> {
        config.validate()?;
        let estimator = BarStockEstimator::new(config.bar_length_cm)?;
        Ok(Self {
            catalog,
            resolver,
            config,
            estimator,
        })
    }

    /// 使用標準參照表與預設配置
    pub fn standard(catalog: MaterialCatalog) -> Self {
        Self {
            catalog,
            resolver: ReferenceResolver::standard(),
            config: PricingConfig::default(),
            estimator: BarStockEstimator::standard(),
        }
    }

    /// 單樘窗成本計算入口
    pub fn calculate(&self, specs: &WindowSpecs, margin: Decimal) -> quote_core::Result<WindowQuote> {
        tracing::info!(
            "開始報價計算：{} × {} cm，顏色 {}，利潤率 {}",
            specs.length_cm,
            specs.width_cm,
            specs.color,
            margin
        );

        if margin < Decimal::ZERO {
            return Err(QuoteError::InvalidMargin(margin));
        }

        // Step 1: 幾何推導（含尺寸檢查）
        tracing::debug!("Step 1: 幾何推導");
        let geometry = WindowGeometry::compute(specs)?;

        // Step 2: 參照解析
        tracing::debug!("Step 2: 參照解析");
        let refs = self.resolver.resolve(specs);
        if self.config.strict_references {
            if let Some(resolution) = refs.defaulted().next() {
                return Err(resolution.to_error());
            }
        }

        let mut pricer = Pricer::new(&self.catalog, &self.config.fallback_prices, margin);
        for resolution in refs.defaulted() {
            tracing::warn!(
                "{} 表無 {}，改用預設參照 {}",
                resolution.table,
                resolution.key,
                resolution.reference
            );
            pricer.warnings.push(QuoteWarning::default_reference(resolution));
        }

        // Step 3: 型材用量
        tracing::debug!("Step 3: 型材用量");
        let profile_usage = ProfileUsage {
            frame: self.estimator.estimate(geometry.frame_perimeter)?,
            sash: self.estimator.estimate(geometry.total_sash_length)?,
            separator: self.estimator.estimate(geometry.separator_length)?,
        };

        // Step 4: 組裝明細
        tracing::debug!("Step 4: 組裝明細");
        let color = specs.color;
        let hardware_color = refs.hardware_color;
        let corner_ref = self.fixed_reference(PriceRole::CornerBracket)?;

        let frame_profile = pricer.profile(
            PriceRole::FrameProfile,
            &refs.frame.reference,
            format!("40100 {} {}", color, specs.frame_style),
            &profile_usage.frame,
        )?;

        let frame = vec![
            frame_profile,
            pricer.pieces(PriceRole::CornerBracket, corner_ref, "Équerre en tôle (dormant)", 4)?,
            pricer.pieces(
                PriceRole::AlignmentBracketPm,
                self.fixed_reference(PriceRole::AlignmentBracketPm)?,
                "Équerre d'alignement PM",
                4,
            )?,
        ];

        let sash_profile = pricer.profile(
            PriceRole::SashProfile,
            &refs.sash.reference,
            format!("{} {} {} (2 ouvrants)", specs.sash_style, specs.sash_subtype, color),
            &profile_usage.sash,
        )?;

        let sashes = vec![
            sash_profile,
            pricer.pieces(PriceRole::CornerBracket, corner_ref, "Équerre en tôle (ouvrants)", 8)?,
            pricer.pieces(
                PriceRole::AlignmentBracketGm,
                self.fixed_reference(PriceRole::AlignmentBracketGm)?,
                "Équerre d'alignement GM",
                8,
            )?,
        ];

        let separator = vec![pricer.profile(
            PriceRole::SeparatorProfile,
            &refs.separator.reference,
            format!("40112 séparateur {}", color),
            &profile_usage.separator,
        )?];

        let glass = vec![
            CostItem::new(
                format!("Vitrage 4 mm {}", specs.glass_type),
                geometry.total_glass_area_m2,
                format!("{} m²", dp(geometry.total_glass_area_m2, 2)),
                self.config.glass_price_per_m2,
                margin,
            )?
            .with_specifications(format!(
                "2 ouvrants {} × {} cm",
                dp(geometry.glass_length, 1),
                dp(geometry.glass_width, 1)
            )),
            pricer
                .item(
                    PriceRole::GlazingGasket,
                    self.fixed_reference(PriceRole::GlazingGasket)?,
                    "Joint plat",
                    geometry.joint_plat_m,
                    format!("{} m", dp(geometry.joint_plat_m, 1)),
                )?
                .with_specifications("Deux faces"),
        ];

        let shade = format!("Teinte {} pour fenêtre {}", hardware_color.code(), color);
        let hardware = vec![
            pricer
                .pieces(
                    PriceRole::Hinge,
                    &refs.hardware.hinge,
                    &format!("Paumelle king {}", hardware_color.code()),
                    4,
                )?
                .with_specifications(shade.clone()),
            pricer.item(
                PriceRole::WeatherStrip,
                self.fixed_reference(PriceRole::WeatherStrip)?,
                "Joint de battement",
                geometry.joint_battement_m,
                format!("{} m", dp(geometry.joint_battement_m, 1)),
            )?,
            pricer
                .pieces(
                    PriceRole::Cremone,
                    &refs.hardware.cremone,
                    &format!("Crémone KNG {}", hardware_color.code()),
                    1,
                )?
                .with_specifications(shade),
            pricer.pieces(
                PriceRole::CremoneKit,
                self.fixed_reference(PriceRole::CremoneKit)?,
                "Kit crémone",
                1,
            )?,
            pricer.pieces(
                PriceRole::LockKit,
                self.fixed_reference(PriceRole::LockKit)?,
                "Kit verrou",
                1,
            )?,
            pricer.item(
                PriceRole::CurtainRod,
                self.fixed_reference(PriceRole::CurtainRod)?,
                "Tringle",
                geometry.rod_length_m,
                format!("{} m", dp(geometry.rod_length_m, 2)),
            )?,
        ];

        // Step 5: 加總
        let breakdown = CostBreakdown::new(frame, sashes, separator, glass, hardware)?;

        tracing::info!(
            "報價完成：總價 {}，警告 {} 筆",
            breakdown.total_cost,
            pricer.warnings.len()
        );

        Ok(WindowQuote {
            breakdown,
            geometry,
            profile_usage,
            warnings: pricer.warnings,
        })
    }

    /// 使用配置中的預設利潤率計算
    pub fn calculate_with_default_margin(&self, specs: &WindowSpecs) -> quote_core::Result<WindowQuote> {
        self.calculate(specs, self.config.default_margin)
    }

    /// 整張訂單報價
    ///
    /// 各訂單行並行計算，單行失敗不影響其他行；總價只計入成功的行。
    pub fn calculate_order(&self, lines: &[OrderLine], margin: Decimal) -> quote_core::Result<OrderQuote> {
        if margin < Decimal::ZERO {
            return Err(QuoteError::InvalidMargin(margin));
        }

        tracing::info!("開始訂單報價：{} 行", lines.len());

        let quotes: Vec<LineQuote> = lines
            .par_iter()
            .map(|line| {
                let result = if line.quantity == 0 {
                    Err(QuoteError::InvalidQuantity {
                        line: line.id.to_string(),
                        quantity: line.quantity,
                    })
                } else {
                    self.calculate(&line.specs, margin).and_then(|quote| {
                        // 小計必須可表示，否則整行視為失敗
                        line_subtotal(&quote, line.quantity)?;
                        Ok(quote)
                    })
                };

                if let Err(err) = &result {
                    tracing::warn!("訂單行 {} 計算失敗: {}", line.id, err);
                }

                LineQuote {
                    line_id: line.id,
                    quantity: line.quantity,
                    result,
                }
            })
            .collect();

        let total_cost = quotes
            .iter()
            .filter_map(LineQuote::line_total)
            .try_fold(Decimal::ZERO, |sum, subtotal| sum.checked_add(subtotal))
            .ok_or_else(|| QuoteError::Overflow("訂單總價超出可表示範圍".to_string()))?;

        tracing::info!("訂單報價完成，總價 {}", total_cost);

        Ok(OrderQuote {
            lines: quotes,
            total_cost,
        })
    }

    fn fixed_reference(&self, role: PriceRole) -> quote_core::Result<&str> {
        self.resolver
            .fixed_reference(role)
            .ok_or_else(|| QuoteError::UnresolvedReference {
                table: RefTable::Fixed.to_string(),
                key: format!("{:?}", role),
            })
    }

    /// 獲取材料目錄引用
    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// 獲取參照解析器引用
    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// 獲取配置引用
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }
}

/// 單樘總價 × 樘數
fn line_subtotal(quote: &WindowQuote, quantity: u32) -> quote_core::Result<Decimal> {
    quote
        .total_cost()
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| {
            QuoteError::Overflow(format!(
                "總價 {} 乘以樘數 {} 超出可表示範圍",
                quote.total_cost(),
                quantity
            ))
        })
}

/// 四捨五入到指定小數位並補足位數
fn dp(value: Decimal, places: u32) -> String {
    format!("{:.*}", places as usize, value.round_dp(places))
}

/// 單次計算的查價器，收集備用價格警告
struct Pricer<'a> {
    catalog: &'a MaterialCatalog,
    fallbacks: &'a FallbackPrices,
    margin: Decimal,
    warnings: Vec<QuoteWarning>,
}

impl<'a> Pricer<'a> {
    fn new(catalog: &'a MaterialCatalog, fallbacks: &'a FallbackPrices, margin: Decimal) -> Self {
        Self {
            catalog,
            fallbacks,
            margin,
            warnings: Vec::new(),
        }
    }

    /// 查價並換算為每件（或每米）單價
    fn unit_price(&mut self, role: PriceRole, reference: &str) -> PricedRef {
        let mut priced = self.catalog.price_or(reference, self.fallbacks.price(role));
        if priced.is_fallback() {
            tracing::warn!(
                "目錄無參照 {}，{:?} 改用備用價格 {}",
                reference,
                role,
                priced.unit_price
            );
            self.warnings.push(QuoteWarning::fallback_price(role, &priced));
        }
        priced.unit_price /= role.pack_size();
        priced
    }

    fn item(
        &mut self,
        role: PriceRole,
        reference: &str,
        name: impl Into<String>,
        quantity: Decimal,
        description: impl Into<String>,
    ) -> quote_core::Result<CostItem> {
        let priced = self.unit_price(role, reference);
        Ok(CostItem::new(name, quantity, description, priced.unit_price, self.margin)?
            .with_reference(priced.reference, priced.source))
    }

    /// 型材項目：以實際支數計價，說明顯示精確支數與消耗長度
    fn profile(
        &mut self,
        role: PriceRole,
        reference: &str,
        name: String,
        usage: &BarUsage,
    ) -> quote_core::Result<CostItem> {
        let item = self.item(
            role,
            reference,
            name,
            Decimal::from(usage.actual_bars_needed),
            format!(
                "{} barres ({} cm)",
                dp(usage.exact_bars_needed, 1),
                usage.required_length.normalize()
            ),
        )?;
        let note = format!(
            "Consommation : {} cm - Prix : {} barres × {} TND",
            usage.required_length, usage.actual_bars_needed, item.unit_price
        );
        Ok(item.with_specifications(note))
    }

    /// 固定件數的項目
    fn pieces(&mut self, role: PriceRole, reference: &str, name: &str, count: u32) -> quote_core::Result<CostItem> {
        let description = if count == 1 {
            "1 pièce".to_string()
        } else {
            format!("{} pièces", count)
        };
        self.item(role, reference, name, Decimal::from(count), description)
    }
}

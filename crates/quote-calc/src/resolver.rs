//! 參照解析（款式選擇 → 目錄參照）
//!
//! 所有參照表皆為全函數：查無對應時回傳該表的預設參照，並以
//! [`Resolution::defaulted`] 標記，供稽核使用。

use quote_core::{HardwareColor, PriceRole, QuoteError, SeparatorFinish, WindowColor, WindowSpecs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 參照表類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefTable {
    Frame,
    Sash,
    Separator,
    Fixed,
}

impl fmt::Display for RefTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefTable::Frame => "frame",
            RefTable::Sash => "sash",
            RefTable::Separator => "separator",
            RefTable::Fixed => "fixed",
        };
        f.write_str(name)
    }
}

/// 單次解析結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub table: RefTable,
    /// 查詢鍵（如 `blanc_eurosist`）
    pub key: String,
    pub reference: String,
    /// 是否採用預設參照
    pub defaulted: bool,
}

impl Resolution {
    fn lookup(table: RefTable, key: String, hit: Option<&String>, default: &str) -> Self {
        match hit {
            Some(reference) => Self {
                table,
                key,
                reference: reference.clone(),
                defaulted: false,
            },
            None => Self {
                table,
                key,
                reference: default.to_string(),
                defaulted: true,
            },
        }
    }

    /// 轉為錯誤（嚴格模式用）
    pub fn to_error(&self) -> QuoteError {
        QuoteError::UnresolvedReference {
            table: self.table.to_string(),
            key: self.key.clone(),
        }
    }
}

/// 五金配件參照（依五金顏色）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareRefs {
    /// 合頁（paumelle）
    pub hinge: String,
    /// 天地鎖（crémone）
    pub cremone: String,
    /// 把手（poignée）
    pub handle: String,
}

/// 單樘窗的全部參照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub frame: Resolution,
    pub sash: Resolution,
    pub separator: Resolution,
    pub hardware_color: HardwareColor,
    pub hardware: HardwareRefs,
}

impl ResolvedReferences {
    /// 採用預設參照的解析結果
    pub fn defaulted(&self) -> impl Iterator<Item = &Resolution> {
        [&self.frame, &self.sash, &self.separator]
            .into_iter()
            .filter(|r| r.defaulted)
    }
}

type FrameKey = (WindowColor, String);
type SashKey = (String, String, WindowColor);

/// 參照決策表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReferenceTablesFile", into = "ReferenceTablesFile")]
pub struct ReferenceTables {
    frame: BTreeMap<FrameKey, String>,
    frame_default: String,
    sash: BTreeMap<SashKey, String>,
    sash_default: String,
    separator: BTreeMap<SeparatorFinish, String>,
    separator_default: String,
    hardware: BTreeMap<HardwareColor, HardwareRefs>,
    fixed: BTreeMap<PriceRole, String>,
}

/// 需要固定參照的計價角色
const FIXED_ROLES: [PriceRole; 8] = [
    PriceRole::CornerBracket,
    PriceRole::AlignmentBracketPm,
    PriceRole::AlignmentBracketGm,
    PriceRole::WeatherStrip,
    PriceRole::GlazingGasket,
    PriceRole::CremoneKit,
    PriceRole::LockKit,
    PriceRole::CurtainRod,
];

impl ReferenceTables {
    /// 內建的標準參照表
    pub fn standard() -> Self {
        use WindowColor::{Gray, White, Woodgrain};

        let frame = [
            (White, "eurosist", "3"),
            (White, "inoforme", "7"),
            (White, "eco_loranzo", "216"),
            (Woodgrain, "eurosist", "3"),
            (Woodgrain, "pral", "9"),
            (Woodgrain, "inter", "97"),
            (Gray, "losanzo", "208"),
        ]
        .into_iter()
        .map(|(color, style, reference)| ((color, style.to_string()), reference.to_string()))
        .collect();

        let sash = [
            ("6007", "inoforme", White, "12"),
            ("6007", "inoforme_alt", White, "112"),
            ("6007", "gris", Gray, "313"),
            ("40404", "eurosist", White, "94"),
            ("40404", "inter", White, "4"),
            ("40404", "pral", Woodgrain, "11"),
            ("40404", "technoline", Woodgrain, "156"),
            ("40404", "eurosist", Woodgrain, "400"),
        ]
        .into_iter()
        .map(|(style, subtype, color, reference)| {
            ((style.to_string(), subtype.to_string(), color), reference.to_string())
        })
        .collect();

        let separator = [
            (SeparatorFinish::White, "289"),
            (SeparatorFinish::Woodgrain, "96"),
            (SeparatorFinish::Gray, "289"),
            (SeparatorFinish::Economy, "1250"),
        ]
        .into_iter()
        .map(|(finish, reference)| (finish, reference.to_string()))
        .collect();

        let hardware = BTreeMap::from([
            (
                HardwareColor::Light,
                HardwareRefs {
                    hinge: "35".to_string(),
                    cremone: "62".to_string(),
                    handle: "54".to_string(),
                },
            ),
            (
                HardwareColor::Dark,
                HardwareRefs {
                    hinge: "36".to_string(),
                    cremone: "63".to_string(),
                    handle: "55".to_string(),
                },
            ),
        ]);

        let fixed = [
            (PriceRole::CornerBracket, "43"),
            (PriceRole::AlignmentBracketPm, "239"),
            (PriceRole::AlignmentBracketGm, "91"),
            (PriceRole::WeatherStrip, "90"),
            (PriceRole::GlazingGasket, "89"),
            (PriceRole::CremoneKit, "31"),
            (PriceRole::LockKit, "32"),
            (PriceRole::CurtainRod, "61"),
        ]
        .into_iter()
        .map(|(role, reference)| (role, reference.to_string()))
        .collect();

        Self {
            frame,
            frame_default: "3".to_string(),
            sash,
            sash_default: "12".to_string(),
            separator,
            separator_default: "289".to_string(),
            hardware,
            fixed,
        }
    }

    /// 從 JSON 載入
    pub fn from_json(json: &str) -> quote_core::Result<Self> {
        let file: ReferenceTablesFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// 匯出為 JSON
    pub fn to_json(&self) -> quote_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 建構器模式：新增或覆寫外框參照
    pub fn with_frame(mut self, color: WindowColor, frame_style: &str, reference: &str) -> Self {
        self.frame
            .insert((color, frame_style.to_string()), reference.to_string());
        self
    }

    /// 建構器模式：移除外框參照
    pub fn without_frame(mut self, color: WindowColor, frame_style: &str) -> Self {
        self.frame.remove(&(color, frame_style.to_string()));
        self
    }

    /// 建構器模式：新增或覆寫扇參照
    pub fn with_sash(mut self, sash_style: &str, sash_subtype: &str, color: WindowColor, reference: &str) -> Self {
        self.sash.insert(
            (sash_style.to_string(), sash_subtype.to_string(), color),
            reference.to_string(),
        );
        self
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::standard()
    }
}

/// 參照解析器
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    tables: ReferenceTables,
}

impl ReferenceResolver {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }

    pub fn standard() -> Self {
        Self::new(ReferenceTables::standard())
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// 外框參照，鍵為（顏色, 外框款式）
    pub fn resolve_frame(&self, color: WindowColor, frame_style: &str) -> Resolution {
        let hit = self.tables.frame.get(&(color, frame_style.to_string()));
        Resolution::lookup(
            RefTable::Frame,
            format!("{}_{}", color, frame_style),
            hit,
            &self.tables.frame_default,
        )
    }

    /// 扇參照，鍵為（扇系列, 子型號, 顏色）
    ///
    /// 同一系列與顏色有多個子型號時不做選擇，呼叫端必須給出完整子型號。
    pub fn resolve_sash(&self, sash_style: &str, sash_subtype: &str, color: WindowColor) -> Resolution {
        let key = (sash_style.to_string(), sash_subtype.to_string(), color);
        let hit = self.tables.sash.get(&key);
        Resolution::lookup(
            RefTable::Sash,
            format!("{}_{}_{}", sash_style, sash_subtype, color),
            hit,
            &self.tables.sash_default,
        )
    }

    /// 中梃參照（依窗戶顏色）
    pub fn resolve_separator(&self, color: WindowColor) -> Resolution {
        self.resolve_separator_finish(SeparatorFinish::from(color))
    }

    /// 中梃參照（依表面處理，可取得經濟款）
    pub fn resolve_separator_finish(&self, finish: SeparatorFinish) -> Resolution {
        Resolution::lookup(
            RefTable::Separator,
            finish.code().to_string(),
            self.tables.separator.get(&finish),
            &self.tables.separator_default,
        )
    }

    /// 五金配件參照（依窗戶顏色推導五金顏色）
    pub fn hardware_refs(&self, color: WindowColor) -> &HardwareRefs {
        let hardware_color = color.hardware_color();
        // 載入時已確認兩種五金顏色都存在
        &self.tables.hardware[&hardware_color]
    }

    /// 固定參照（角碼、膠條、配件包、傳動桿）
    pub fn fixed_reference(&self, role: PriceRole) -> Option<&str> {
        self.tables.fixed.get(&role).map(String::as_str)
    }

    /// 解析單樘窗的全部參照
    pub fn resolve(&self, specs: &WindowSpecs) -> ResolvedReferences {
        ResolvedReferences {
            frame: self.resolve_frame(specs.color, &specs.frame_style),
            sash: self.resolve_sash(&specs.sash_style, &specs.sash_subtype, specs.color),
            separator: self.resolve_separator(specs.color),
            hardware_color: specs.color.hardware_color(),
            hardware: self.hardware_refs(specs.color).clone(),
        }
    }

    /// 檢查款式組合是否在參照表中，回傳第一個缺項
    pub fn check_compatibility(&self, specs: &WindowSpecs) -> quote_core::Result<()> {
        match self.resolve(specs).defaulted().next() {
            Some(resolution) => Err(resolution.to_error()),
            None => Ok(()),
        }
    }

    /// 某顏色可選的外框款式
    pub fn frame_styles_for(&self, color: WindowColor) -> Vec<&str> {
        self.tables
            .frame
            .keys()
            .filter(|(c, _)| *c == color)
            .map(|(_, style)| style.as_str())
            .collect()
    }

    /// 某顏色可選的扇系列
    pub fn sash_styles_for(&self, color: WindowColor) -> Vec<&str> {
        let mut styles: Vec<&str> = self
            .tables
            .sash
            .keys()
            .filter(|(_, _, c)| *c == color)
            .map(|(style, _, _)| style.as_str())
            .collect();
        styles.dedup();
        styles
    }

    /// 某扇系列在某顏色下可選的子型號
    pub fn sash_subtypes_for(&self, sash_style: &str, color: WindowColor) -> Vec<&str> {
        self.tables
            .sash
            .keys()
            .filter(|(style, _, c)| style == sash_style && *c == color)
            .map(|(_, subtype, _)| subtype.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameRule {
    color: WindowColor,
    frame_style: String,
    reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SashRule {
    sash_style: String,
    sash_subtype: String,
    color: WindowColor,
    reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeparatorRule {
    finish: SeparatorFinish,
    reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HardwareRule {
    hardware_color: HardwareColor,
    #[serde(flatten)]
    refs: HardwareRefs,
}

/// 參照表的檔案格式（規則清單）
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReferenceTablesFile {
    frame: Vec<FrameRule>,
    frame_default: String,
    sash: Vec<SashRule>,
    sash_default: String,
    separator: Vec<SeparatorRule>,
    separator_default: String,
    hardware: Vec<HardwareRule>,
    fixed: BTreeMap<PriceRole, String>,
}

fn insert_unique<K: Ord + fmt::Debug, V>(map: &mut BTreeMap<K, V>, key: K, value: V, table: &str) -> quote_core::Result<()> {
    if map.contains_key(&key) {
        return Err(QuoteError::InvalidReferenceTable(format!(
            "{} 表重複的鍵: {:?}",
            table, key
        )));
    }
    map.insert(key, value);
    Ok(())
}

impl TryFrom<ReferenceTablesFile> for ReferenceTables {
    type Error = QuoteError;

    fn try_from(file: ReferenceTablesFile) -> quote_core::Result<Self> {
        let mut frame = BTreeMap::new();
        for rule in file.frame {
            insert_unique(&mut frame, (rule.color, rule.frame_style), rule.reference, "frame")?;
        }

        let mut sash = BTreeMap::new();
        for rule in file.sash {
            insert_unique(
                &mut sash,
                (rule.sash_style, rule.sash_subtype, rule.color),
                rule.reference,
                "sash",
            )?;
        }

        let mut separator = BTreeMap::new();
        for rule in file.separator {
            insert_unique(&mut separator, rule.finish, rule.reference, "separator")?;
        }

        let mut hardware = BTreeMap::new();
        for rule in file.hardware {
            insert_unique(&mut hardware, rule.hardware_color, rule.refs, "hardware")?;
        }
        for color in [HardwareColor::Light, HardwareColor::Dark] {
            if !hardware.contains_key(&color) {
                return Err(QuoteError::InvalidReferenceTable(format!(
                    "hardware 表缺少 {:?}",
                    color
                )));
            }
        }

        for role in FIXED_ROLES {
            if !file.fixed.contains_key(&role) {
                return Err(QuoteError::InvalidReferenceTable(format!(
                    "fixed 表缺少 {:?}",
                    role
                )));
            }
        }

        Ok(Self {
            frame,
            frame_default: file.frame_default,
            sash,
            sash_default: file.sash_default,
            separator,
            separator_default: file.separator_default,
            hardware,
            fixed: file.fixed,
        })
    }
}

impl From<ReferenceTables> for ReferenceTablesFile {
    fn from(tables: ReferenceTables) -> Self {
        Self {
            frame: tables
                .frame
                .into_iter()
                .map(|((color, frame_style), reference)| FrameRule {
                    color,
                    frame_style,
                    reference,
                })
                .collect(),
            frame_default: tables.frame_default,
            sash: tables
                .sash
                .into_iter()
                .map(|((sash_style, sash_subtype, color), reference)| SashRule {
                    sash_style,
                    sash_subtype,
                    color,
                    reference,
                })
                .collect(),
            sash_default: tables.sash_default,
            separator: tables
                .separator
                .into_iter()
                .map(|(finish, reference)| SeparatorRule { finish, reference })
                .collect(),
            separator_default: tables.separator_default,
            hardware: tables
                .hardware
                .into_iter()
                .map(|(hardware_color, refs)| HardwareRule {
                    hardware_color,
                    refs,
                })
                .collect(),
            fixed: tables.fixed,
        }
    }
}

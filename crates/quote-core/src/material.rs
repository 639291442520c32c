//! 材料目錄模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{QuoteError, Result};

/// 材料（目錄中的一筆價格）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 參照代碼（唯一鍵）
    #[serde(rename = "ref")]
    pub reference: String,

    /// 品名
    pub designation: String,

    /// 單價
    #[serde(alias = "prixUMoyen")]
    pub unit_price: Decimal,
}

impl Material {
    /// 創建新的材料
    pub fn new(reference: impl Into<String>, designation: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            reference: reference.into(),
            designation: designation.into(),
            unit_price,
        }
    }

    /// 依參照代碼推斷分類
    pub fn category(&self) -> MaterialCategory {
        MaterialCategory::for_reference(&self.reference)
    }
}

/// 材料分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    /// 型材
    Profiles,
    /// 五金配件
    Hardware,
    /// 玻璃
    Glass,
    /// 膠條
    Joints,
}

impl MaterialCategory {
    /// 依參照代碼分類：40/22/60 開頭為型材，其餘依關鍵字判斷（區分大小寫）
    pub fn for_reference(reference: &str) -> Self {
        if ["40", "22", "60"].iter().any(|p| reference.starts_with(p)) {
            return MaterialCategory::Profiles;
        }
        if reference.contains("joint") || reference.contains("plat") {
            MaterialCategory::Joints
        } else if reference.contains("glass") || reference.contains("زجاج") {
            MaterialCategory::Glass
        } else {
            MaterialCategory::Hardware
        }
    }
}

/// 價格來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceSource {
    /// 取自材料目錄
    Catalog,
    /// 目錄缺項，使用呼叫端提供的備用價格
    Fallback,
    /// 不經目錄的固定價格（如每平方米玻璃單價）
    Configured,
}

/// 查價結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRef {
    pub reference: String,
    pub unit_price: Decimal,
    pub source: PriceSource,
}

impl PricedRef {
    pub fn is_fallback(&self) -> bool {
        self.source == PriceSource::Fallback
    }
}

/// 目錄統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub profiles: usize,
    pub hardware: usize,
    pub joints: usize,
    pub glass: usize,
    /// 平均單價（空目錄為 None）
    pub average_price: Option<Decimal>,
}

/// 材料目錄（唯讀價格表，依參照代碼索引）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Material>", into = "Vec<Material>")]
pub struct MaterialCatalog {
    materials: Vec<Material>,
    index: HashMap<String, usize>,
}

impl MaterialCatalog {
    /// 由有序材料清單建立目錄
    ///
    /// 參照重複或單價為負時拒絕。
    pub fn new(materials: Vec<Material>) -> Result<Self> {
        let mut index = HashMap::with_capacity(materials.len());
        for (pos, material) in materials.iter().enumerate() {
            if material.unit_price < Decimal::ZERO {
                return Err(QuoteError::InvalidPrice {
                    reference: material.reference.clone(),
                    price: material.unit_price,
                });
            }
            if index.insert(material.reference.clone(), pos).is_some() {
                return Err(QuoteError::DuplicateMaterial(material.reference.clone()));
            }
        }
        Ok(Self { materials, index })
    }

    /// 從 JSON 陣列載入
    pub fn from_json(json: &str) -> Result<Self> {
        let materials: Vec<Material> = serde_json::from_str(json)?;
        Self::new(materials)
    }

    /// 查找材料
    pub fn lookup(&self, reference: &str) -> Option<&Material> {
        self.index.get(reference).map(|&pos| &self.materials[pos])
    }

    /// 查詢單價，找不到時回傳 `MaterialNotFound`
    pub fn unit_price(&self, reference: &str) -> Result<Decimal> {
        self.lookup(reference)
            .map(|m| m.unit_price)
            .ok_or_else(|| QuoteError::MaterialNotFound(reference.to_string()))
    }

    /// 查詢單價，找不到時採用呼叫端的備用價格並標記來源
    pub fn price_or(&self, reference: &str, fallback: Decimal) -> PricedRef {
        match self.lookup(reference) {
            Some(material) => PricedRef {
                reference: reference.to_string(),
                unit_price: material.unit_price,
                source: PriceSource::Catalog,
            },
            None => PricedRef {
                reference: reference.to_string(),
                unit_price: fallback,
                source: PriceSource::Fallback,
            },
        }
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.index.contains_key(reference)
    }

    /// 依原始順序迭代
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// 統計各分類數量與平均單價
    pub fn summary(&self) -> CatalogSummary {
        let count = |category: MaterialCategory| {
            self.materials.iter().filter(|m| m.category() == category).count()
        };

        let average_price = if self.materials.is_empty() {
            None
        } else {
            let n = Decimal::from(self.materials.len());
            let prices = || self.materials.iter().map(|m| m.unit_price);
            // 總和溢位時改為先除後加
            let average = match prices().try_fold(Decimal::ZERO, |sum, p| sum.checked_add(p)) {
                Some(sum) => sum / n,
                None => prices().fold(Decimal::ZERO, |acc, p| acc.saturating_add(p / n)),
            };
            Some(average)
        };

        CatalogSummary {
            total: self.materials.len(),
            profiles: count(MaterialCategory::Profiles),
            hardware: count(MaterialCategory::Hardware),
            joints: count(MaterialCategory::Joints),
            glass: count(MaterialCategory::Glass),
            average_price,
        }
    }
}

impl TryFrom<Vec<Material>> for MaterialCatalog {
    type Error = QuoteError;

    fn try_from(materials: Vec<Material>) -> Result<Self> {
        Self::new(materials)
    }
}

impl From<MaterialCatalog> for Vec<Material> {
    fn from(catalog: MaterialCatalog) -> Self {
        catalog.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_catalog() -> MaterialCatalog {
        MaterialCatalog::new(vec![
            Material::new("3", "40100 blanc eurosist", Decimal::new(7850, 2)),
            Material::new("43", "Équerre en tôle", Decimal::new(125, 2)),
            Material::new("4010", "Profil 4010", Decimal::from(60)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_and_unit_price() {
        let catalog = sample_catalog();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.lookup("3").unwrap().designation, "40100 blanc eurosist");
        assert_eq!(catalog.unit_price("43").unwrap(), Decimal::new(125, 2));
        assert_eq!(
            catalog.unit_price("999"),
            Err(QuoteError::MaterialNotFound("999".to_string()))
        );
    }

    #[test]
    fn test_price_or_marks_fallback() {
        let catalog = sample_catalog();

        let hit = catalog.price_or("3", Decimal::from(74));
        assert_eq!(hit.unit_price, Decimal::new(7850, 2));
        assert_eq!(hit.source, PriceSource::Catalog);

        let miss = catalog.price_or("216", Decimal::from(74));
        assert_eq!(miss.unit_price, Decimal::from(74));
        assert!(miss.is_fallback());
    }

    #[test]
    fn test_duplicate_reference_rejected() {
        let result = MaterialCatalog::new(vec![
            Material::new("3", "a", Decimal::ONE),
            Material::new("3", "b", Decimal::TWO),
        ]);

        assert_eq!(result, Err(QuoteError::DuplicateMaterial("3".to_string())));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = MaterialCatalog::new(vec![Material::new("3", "a", Decimal::NEGATIVE_ONE)]);
        assert_eq!(
            result,
            Err(QuoteError::InvalidPrice {
                reference: "3".to_string(),
                price: Decimal::NEGATIVE_ONE,
            })
        );

        // 合法 JSON 但單價為負，不是解析錯誤
        let json = r#"[{"ref": "43", "designation": "Équerre", "unit_price": "-1.2"}]"#;
        assert!(matches!(
            MaterialCatalog::from_json(json),
            Err(QuoteError::InvalidPrice { ref reference, .. }) if reference == "43"
        ));
    }

    #[test]
    fn test_from_json_accepts_legacy_price_field() {
        let json = r#"[
            {"ref": "35", "designation": "Paumelle king blanc", "prixUMoyen": "3.40"},
            {"ref": "36", "designation": "Paumelle king noir", "unit_price": "3.55"}
        ]"#;

        let catalog = MaterialCatalog::from_json(json).unwrap();
        assert_eq!(catalog.unit_price("35").unwrap(), Decimal::new(340, 2));
        assert_eq!(catalog.unit_price("36").unwrap(), Decimal::new(355, 2));
    }

    #[rstest]
    #[case("40100", MaterialCategory::Profiles)]
    #[case("2204", MaterialCategory::Profiles)]
    #[case("6007", MaterialCategory::Profiles)]
    #[case("joint-90", MaterialCategory::Joints)]
    #[case("plat-89", MaterialCategory::Joints)]
    #[case("PLAT-89", MaterialCategory::Hardware)]
    #[case("Joint-90", MaterialCategory::Hardware)]
    #[case("زجاج-4", MaterialCategory::Glass)]
    #[case("glass-4mm", MaterialCategory::Glass)]
    #[case("43", MaterialCategory::Hardware)]
    fn test_category_for_reference(#[case] reference: &str, #[case] expected: MaterialCategory) {
        assert_eq!(MaterialCategory::for_reference(reference), expected);
    }

    #[test]
    fn test_summary() {
        let summary = sample_catalog().summary();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.profiles, 1);
        assert_eq!(summary.hardware, 2);
        // (78.50 + 1.25 + 60) / 3
        assert_eq!(summary.average_price, Some(Decimal::new(13975, 2) / Decimal::from(3)));

        assert_eq!(MaterialCatalog::default().summary().average_price, None);

        let huge = MaterialCatalog::new(vec![
            Material::new("1", "a", Decimal::MAX),
            Material::new("2", "b", Decimal::MAX),
        ])
        .unwrap();
        let average = huge.summary().average_price.unwrap();
        assert!(average > Decimal::MAX - Decimal::ONE_HUNDRED);
    }
}

// ==========================================
// 器具移动导入 - 参考目录
// ==========================================
// 职责: 地点目录 / 器具类型目录（只读参考数据）
// 约束: 每次导入加载一次，目录顺序即匹配时的遍历顺序
// ==========================================

use crate::domain::types::LocationType;
use serde::{Deserialize, Serialize};

/// 地点目录条目（门店或配送中心）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCatalogEntry {
    pub location_id: String,
    pub name: String, // 规范名称
}

/// 器具类型目录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTypeCatalogEntry {
    pub asset_type_id: String,
    pub name: String, // 规范名称
    pub code: String, // 短代码（如 CXG）
}

/// 可按名称参与匹配的目录条目
pub trait CatalogName {
    fn catalog_name(&self) -> &str;
}

impl CatalogName for LocationCatalogEntry {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

impl CatalogName for AssetTypeCatalogEntry {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

// ==========================================
// Catalog - 一次导入所用的全部参考数据
// ==========================================
// 使用 Vec 保序: 相同置信度时取遍历顺序靠前者
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub stores: Vec<LocationCatalogEntry>,
    pub centers: Vec<LocationCatalogEntry>,
    pub asset_types: Vec<AssetTypeCatalogEntry>,
}

impl Catalog {
    pub fn new(
        stores: Vec<LocationCatalogEntry>,
        centers: Vec<LocationCatalogEntry>,
        asset_types: Vec<AssetTypeCatalogEntry>,
    ) -> Self {
        Self {
            stores,
            centers,
            asset_types,
        }
    }

    pub fn locations(&self, location_type: LocationType) -> &[LocationCatalogEntry] {
        match location_type {
            LocationType::Store => &self.stores,
            LocationType::Center => &self.centers,
        }
    }

    pub fn find_center(&self, location_id: &str) -> Option<&LocationCatalogEntry> {
        self.centers.iter().find(|c| c.location_id == location_id)
    }
}

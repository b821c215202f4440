// ==========================================
// 器具移动导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod catalog;
pub mod movement;
pub mod report;
pub mod types;

// 重导出核心类型
pub use catalog::{AssetTypeCatalogEntry, Catalog, CatalogName, LocationCatalogEntry};
pub use movement::{
    AssetSlot, NewAssetLine, NewMovementHeader, ParsedMovement, RawRow, ResolvedAssetLine,
    ResolvedMovement, MAX_ASSET_SLOTS,
};
pub use report::{CreatedMovement, ImportOutcome, ImportReport, RowError};
pub use types::{LocationType, MovementKind, MovementStatus};

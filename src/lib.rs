// ==========================================
// 器具移动导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 表格批量导入门店/配送中心之间的器具移动
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析、匹配、校验、落库
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/建表/参考目录）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{LocationType, MovementKind, MovementStatus};

// 领域实体
pub use domain::{Catalog, ImportReport, ResolvedMovement, RowError};

// 导入
pub use importer::{
    ImportContext, ImportError, MovementImporter, MovementImporterImpl, MovementTemplate,
    SimilarityMatcher,
};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "asset-movement-import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

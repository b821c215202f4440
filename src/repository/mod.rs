// ==========================================
// 器具移动导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog_repo;
pub mod error;
pub mod movement_repo;
pub mod movement_repo_impl;

// 重导出核心仓储
pub use catalog_repo::{CatalogRepository, CatalogRepositoryImpl};
pub use error::{RepositoryError, RepositoryResult};
pub use movement_repo::MovementRepository;
pub use movement_repo_impl::{AssetLineEntity, MovementEntity, MovementRepositoryImpl};

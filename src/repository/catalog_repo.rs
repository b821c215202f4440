// ==========================================
// 器具移动导入 - 参考目录 Repository
// ==========================================
// 职责: 读取地点目录 / 器具类型目录（只读）
// 约束: 按 sort_order 排序返回，保证匹配的平局规则可复现
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{AssetTypeCatalogEntry, Catalog, LocationCatalogEntry};
use crate::domain::types::LocationType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogRepository Trait
// ==========================================
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// 列出某类地点
    async fn list_locations(
        &self,
        location_type: LocationType,
    ) -> RepositoryResult<Vec<LocationCatalogEntry>>;

    /// 列出器具类型
    async fn list_asset_types(&self) -> RepositoryResult<Vec<AssetTypeCatalogEntry>>;

    /// 一次性加载完整目录
    async fn load_catalog(&self) -> RepositoryResult<Catalog> {
        let stores = self.list_locations(LocationType::Store).await?;
        let centers = self.list_locations(LocationType::Center).await?;
        let asset_types = self.list_asset_types().await?;
        Ok(Catalog::new(stores, centers, asset_types))
    }
}

// ==========================================
// CatalogRepositoryImpl
// ==========================================
pub struct CatalogRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn list_locations(
        &self,
        location_type: LocationType,
    ) -> RepositoryResult<Vec<LocationCatalogEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT location_id, name
            FROM location
            WHERE location_type = ?1
            ORDER BY sort_order, name
            "#,
        )?;

        let entries = stmt
            .query_map(params![location_type.as_db_str()], |row| {
                Ok(LocationCatalogEntry {
                    location_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn list_asset_types(&self) -> RepositoryResult<Vec<AssetTypeCatalogEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT asset_type_id, name, code
            FROM asset_type
            ORDER BY sort_order, name
            "#,
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok(AssetTypeCatalogEntry {
                    asset_type_id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

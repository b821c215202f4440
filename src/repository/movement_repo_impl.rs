// ==========================================
// 器具移动导入 - 移动 Repository 实现
// ==========================================
// 职责: 实现移动写入（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::movement::{NewAssetLine, NewMovementHeader};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::movement_repo::MovementRepository;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// 已落库的移动表头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntity {
    pub movement_id: String,
    pub code: String,
    pub kind: String,
    pub origin: String,
    pub destination: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub created_ip: String,
}

/// 已落库的器具明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLineEntity {
    pub line_id: String,
    pub movement_id: String,
    pub asset_type_id: String,
    pub quantity: u32,
}

// ==========================================
// MovementRepositoryImpl
// ==========================================
pub struct MovementRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl MovementRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 ID 查询移动表头
    pub fn find_by_id(&self, movement_id: &str) -> RepositoryResult<Option<MovementEntity>> {
        let conn = self.lock()?;
        let entity = conn
            .query_row(
                r#"
                SELECT movement_id, code, kind, origin, destination, status, notes,
                       created_by, created_at, created_ip
                FROM movement
                WHERE movement_id = ?1
                "#,
                params![movement_id],
                |row| {
                    Ok(MovementEntity {
                        movement_id: row.get(0)?,
                        code: row.get(1)?,
                        kind: row.get(2)?,
                        origin: row.get(3)?,
                        destination: row.get(4)?,
                        status: row.get(5)?,
                        notes: row.get(6)?,
                        created_by: row.get(7)?,
                        created_at: row.get(8)?,
                        created_ip: row.get(9)?,
                    })
                },
            )
            .optional()?;
        Ok(entity)
    }

    /// 查询移动的器具明细
    pub fn list_asset_lines(&self, movement_id: &str) -> RepositoryResult<Vec<AssetLineEntity>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT line_id, movement_id, asset_type_id, quantity
            FROM movement_asset_line
            WHERE movement_id = ?1
            ORDER BY rowid
            "#,
        )?;

        let lines = stmt
            .query_map(params![movement_id], |row| {
                Ok(AssetLineEntity {
                    line_id: row.get(0)?,
                    movement_id: row.get(1)?,
                    asset_type_id: row.get(2)?,
                    quantity: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// 移动表头总数
    pub fn count_movements(&self) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM movement", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[async_trait]
impl MovementRepository for MovementRepositoryImpl {
    async fn create_movement_header(&self, header: &NewMovementHeader) -> RepositoryResult<String> {
        let conn = self.lock()?;
        insert_header(&conn, header)
    }

    async fn create_asset_lines(
        &self,
        movement_id: &str,
        lines: &[NewAssetLine],
    ) -> RepositoryResult<usize> {
        ensure_lines(movement_id, lines)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let count = insert_lines(&tx, movement_id, lines)?;
        tx.commit()?;
        Ok(count)
    }

    async fn delete_movement_header(&self, movement_id: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "DELETE FROM movement WHERE movement_id = ?1",
            params![movement_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "movement".to_string(),
                id: movement_id.to_string(),
            });
        }
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    async fn create_movement_with_lines(
        &self,
        header: &NewMovementHeader,
        lines: &[NewAssetLine],
    ) -> RepositoryResult<String> {
        ensure_lines(&header.code, lines)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let movement_id = insert_header(&tx, header)?;
        insert_lines(&tx, &movement_id, lines)?;
        tx.commit()?;
        Ok(movement_id)
    }
}

// ==========================================
// SQL 辅助函数（Connection 与 Transaction 共用）
// ==========================================

fn ensure_lines(owner: &str, lines: &[NewAssetLine]) -> RepositoryResult<()> {
    if lines.is_empty() {
        return Err(RepositoryError::ValidationError(format!(
            "movement {} has no asset lines",
            owner
        )));
    }
    Ok(())
}

fn insert_header(conn: &Connection, header: &NewMovementHeader) -> RepositoryResult<String> {
    let movement_id = Uuid::new_v4().to_string();
    conn.execute(
        r#"
        INSERT INTO movement (
            movement_id, code, kind, origin, destination, status, notes,
            created_by, created_at, created_ip
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            movement_id,
            header.code,
            header.kind.as_str(),
            header.origin,
            header.destination,
            header.status.to_string(),
            header.notes,
            header.created_by,
            header.created_at.to_rfc3339(),
            header.created_ip,
        ],
    )?;
    Ok(movement_id)
}

fn insert_lines(
    conn: &Connection,
    movement_id: &str,
    lines: &[NewAssetLine],
) -> RepositoryResult<usize> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO movement_asset_line (line_id, movement_id, asset_type_id, quantity)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )?;

    let mut count = 0;
    for line in lines {
        stmt.execute(params![
            Uuid::new_v4().to_string(),
            movement_id,
            line.asset_type_id,
            line.quantity,
        ])?;
        count += 1;
    }
    Ok(count)
}

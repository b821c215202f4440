// ==========================================
// 器具移动导入 - 移动 Repository Trait
// ==========================================
// 职责: 移动表头 / 器具明细的写入接口（不包含业务逻辑）
// 约束: 每个调用自身原子；仅 supports_transactions() 时提供跨表事务
// ==========================================

use crate::domain::movement::{NewAssetLine, NewMovementHeader};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;

// ==========================================
// MovementRepository Trait
// ==========================================
// 实现者: MovementRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// 创建移动表头
    ///
    /// # 返回
    /// - Ok(String): 新表头 ID
    async fn create_movement_header(&self, header: &NewMovementHeader) -> RepositoryResult<String>;

    /// 为表头创建器具明细（全部成功或全部失败）
    ///
    /// # 返回
    /// - Ok(usize): 写入的明细条数
    async fn create_asset_lines(
        &self,
        movement_id: &str,
        lines: &[NewAssetLine],
    ) -> RepositoryResult<usize>;

    /// 删除移动表头（明细写入失败时回滚用）
    async fn delete_movement_header(&self, movement_id: &str) -> RepositoryResult<()>;

    /// 是否支持在单个事务中写入表头 + 明细
    fn supports_transactions(&self) -> bool {
        false
    }

    /// 单事务写入表头 + 明细（仅当 supports_transactions() 为 true 时调用）
    async fn create_movement_with_lines(
        &self,
        _header: &NewMovementHeader,
        _lines: &[NewAssetLine],
    ) -> RepositoryResult<String> {
        Err(RepositoryError::InternalError(
            "transactional create is not supported by this repository".to_string(),
        ))
    }
}

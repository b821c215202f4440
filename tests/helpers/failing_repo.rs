// ==========================================
// 可注入故障的移动仓储 - 用于回滚/隔离测试
// ==========================================
// 包装真实的 SQLite 仓储，但不声明事务能力，
// 使落库走 表头 → 明细 → 失败删表头 的路径。
// ==========================================

use asset_movement_import::domain::{NewAssetLine, NewMovementHeader};
use asset_movement_import::repository::{
    MovementRepository, MovementRepositoryImpl, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct FailingLinesRepo {
    pub inner: MovementRepositoryImpl,
    fail_destination: String,
    pub rollbacks: AtomicUsize,
}

impl FailingLinesRepo {
    /// 目的地为 fail_destination 的移动写明细时失败
    pub fn new(inner: MovementRepositoryImpl, fail_destination: &str) -> Self {
        Self {
            inner,
            fail_destination: fail_destination.to_string(),
            rollbacks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MovementRepository for FailingLinesRepo {
    async fn create_movement_header(&self, header: &NewMovementHeader) -> RepositoryResult<String> {
        self.inner.create_movement_header(header).await
    }

    async fn create_asset_lines(
        &self,
        movement_id: &str,
        lines: &[NewAssetLine],
    ) -> RepositoryResult<usize> {
        let header = self.inner.find_by_id(movement_id)?;
        if header.map(|h| h.destination) == Some(self.fail_destination.clone()) {
            return Err(RepositoryError::DatabaseQueryError(
                "simulated asset line failure".to_string(),
            ));
        }
        self.inner.create_asset_lines(movement_id, lines).await
    }

    async fn delete_movement_header(&self, movement_id: &str) -> RepositoryResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_movement_header(movement_id).await
    }
}

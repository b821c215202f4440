// ==========================================
// 器具移动导入 - 批量落库编排
// ==========================================
// 职责: 每个有效行写入 表头 + 明细，作为一个逻辑单元
// 规则:
// - 仓储支持事务 → 单事务写入
// - 否则 表头 → 明细；明细失败时删除刚写入的表头
// - 行与行之间相互独立，一行失败不影响其它行
// - 整批截止时间到达后，尚未开始的行直接判定超时
// - 事务写入受截止时间约束；非事务的 表头 → 明细 一经开始即执行完毕
// ==========================================

use crate::domain::movement::{NewAssetLine, NewMovementHeader, ResolvedMovement};
use crate::domain::types::{MovementKind, MovementStatus};
use crate::importer::movement_importer_trait::ImportContext;
use crate::repository::error::RepositoryError;
use crate::repository::movement_repo::MovementRepository;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, warn};

/// 来源地址缺失时写入的占位值
pub const UNKNOWN_NETWORK_ADDRESS: &str = "unknown";

/// 生成移动编号: 前缀 + 当前毫秒时间戳低 6 位
///
/// 同一毫秒内的多次生成会得到相同编号；编号不是唯一键。
pub fn generate_movement_code(kind: MovementKind, now: DateTime<Utc>) -> String {
    format!(
        "{}-{:06}",
        kind.code_prefix(),
        now.timestamp_millis().rem_euclid(1_000_000)
    )
}

/// 已落库的移动
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMovement {
    pub movement_id: String,
    pub code: String,
}

/// 单行落库失败原因
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("line {0} is not eligible for persistence")]
    NotPersistable(usize),

    #[error("movement header create failed: {0}")]
    HeaderCreateFailed(RepositoryError),

    #[error("asset lines create failed (header rolled back: {rolled_back}): {source}")]
    LinesCreateFailed {
        source: RepositoryError,
        rolled_back: bool,
    },

    #[error("movement create failed: {0}")]
    TransactionFailed(RepositoryError),

    #[error("batch deadline exceeded before the row was persisted")]
    DeadlineExceeded,
}

// ==========================================
// BatchPersister
// ==========================================
pub struct BatchPersister<'a, R: MovementRepository> {
    repo: &'a R,
    concurrency: usize,
    timeout: Duration,
}

impl<'a, R: MovementRepository> BatchPersister<'a, R> {
    /// # 参数
    /// - concurrency: 同时落库的行数上限（至少为 1）
    /// - timeout: 整批截止时间
    pub fn new(repo: &'a R, concurrency: usize, timeout: Duration) -> Self {
        Self {
            repo,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// 落库单个移动（不设截止时间）
    pub async fn persist(
        &self,
        movement: &ResolvedMovement,
        context: &ImportContext,
    ) -> Result<PersistedMovement, PersistError> {
        self.persist_until(movement, context, None).await
    }

    /// 落库单个移动
    ///
    /// 事务路径受 deadline 约束：超时即放弃未提交的事务。
    /// 表头 → 明细 路径不在中途取消，避免留下无明细的表头。
    async fn persist_until(
        &self,
        movement: &ResolvedMovement,
        context: &ImportContext,
        deadline: Option<Instant>,
    ) -> Result<PersistedMovement, PersistError> {
        let header = build_header(movement, context)
            .ok_or(PersistError::NotPersistable(movement.line))?;
        let lines: Vec<NewAssetLine> = movement.assets.iter().map(NewAssetLine::from).collect();

        if self.repo.supports_transactions() {
            let create = self.repo.create_movement_with_lines(&header, &lines);
            let created = match deadline {
                Some(deadline) => timeout_at(deadline, create)
                    .await
                    .map_err(|_| PersistError::DeadlineExceeded)?,
                None => create.await,
            };
            let movement_id = created.map_err(PersistError::TransactionFailed)?;
            return Ok(PersistedMovement {
                movement_id,
                code: header.code,
            });
        }

        let movement_id = self
            .repo
            .create_movement_header(&header)
            .await
            .map_err(PersistError::HeaderCreateFailed)?;

        if let Err(source) = self.repo.create_asset_lines(&movement_id, &lines).await {
            let rolled_back = match self.repo.delete_movement_header(&movement_id).await {
                Ok(()) => true,
                Err(e) => {
                    error!(
                        line = movement.line,
                        movement_id = %movement_id,
                        error = %e,
                        "明细写入失败后回滚表头失败"
                    );
                    false
                }
            };
            return Err(PersistError::LinesCreateFailed {
                source,
                rolled_back,
            });
        }

        Ok(PersistedMovement {
            movement_id,
            code: header.code,
        })
    }

    /// 批内单行：截止时间已到则不再开始
    async fn persist_one(
        &self,
        movement: &ResolvedMovement,
        context: &ImportContext,
        deadline: Instant,
    ) -> (usize, Result<PersistedMovement, PersistError>) {
        if Instant::now() >= deadline {
            warn!(line = movement.line, "截止时间已到，跳过落库");
            return (movement.line, Err(PersistError::DeadlineExceeded));
        }

        let result = self.persist_until(movement, context, Some(deadline)).await;
        match &result {
            Err(e) => warn!(line = movement.line, error = %e, "行落库失败"),
            Ok(_) => debug!(line = movement.line, "行落库成功"),
        }
        (movement.line, result)
    }

    /// 并发落库一批移动
    ///
    /// 截止时间到达后，未开始的行判定超时；事务型仓储的进行中写入同样被截断。
    /// 非事务仓储的进行中写入会执行完毕（含失败回滚），截止时间对其不生效。
    ///
    /// # 返回
    /// - (行号, 结果) 列表，按行号升序
    pub async fn persist_batch(
        &self,
        movements: &[ResolvedMovement],
        context: &ImportContext,
    ) -> Vec<(usize, Result<PersistedMovement, PersistError>)> {
        let deadline = Instant::now() + self.timeout;

        let pending: Vec<_> = movements
            .iter()
            .map(|movement| self.persist_one(movement, context, deadline))
            .collect();

        let mut results: Vec<(usize, Result<PersistedMovement, PersistError>)> =
            stream::iter(pending)
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        results.sort_by_key(|(line, _)| *line);
        results
    }
}

/// 组装表头；行不满足落库前提时返回 None
fn build_header(movement: &ResolvedMovement, context: &ImportContext) -> Option<NewMovementHeader> {
    if !movement.is_persistable() {
        return None;
    }

    let now = Utc::now();
    let notes = Some(movement.notes.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Some(NewMovementHeader {
        code: generate_movement_code(movement.kind, now),
        kind: movement.kind,
        origin: movement.origin.clone()?,
        destination: movement.destination.clone()?,
        status: MovementStatus::InTransit,
        notes,
        created_by: context.actor_id.clone(),
        created_at: now,
        created_ip: context
            .network_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_NETWORK_ADDRESS)
            .to_string(),
    })
}

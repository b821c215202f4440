// ==========================================
// 器具移动导入 - 结果汇总
// ==========================================
// 职责: 校验结果 + 落库结果 → ImportReport（按源文件行序）
// 约束: 落库失败的行以通用文案计入 errors，不得静默丢弃
// ==========================================

use crate::domain::movement::ResolvedMovement;
use crate::domain::report::{CreatedMovement, ImportOutcome, ImportReport, RowError};
use crate::importer::persister::{PersistError, PersistedMovement};

pub const PERSIST_FAILURE_MESSAGE: &str = "failed to save movement to the database";
pub const DEADLINE_MESSAGE: &str = "import timed out before the movement was saved";

#[derive(Debug, Default)]
pub struct ResultAggregator {
    total_rows: usize,
    rows_parsed: usize,
    outcomes: Vec<ImportOutcome>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录校验阶段：每个非空行计入总数，带错误的行直接记为失败
    pub fn record_validation(&mut self, movements: &[ResolvedMovement]) {
        for movement in movements {
            self.total_rows += 1;
            if movement.errors.is_empty() {
                self.rows_parsed += 1;
            } else {
                self.outcomes
                    .push(ImportOutcome::failed(movement.line, movement.errors.clone()));
            }
        }
    }

    /// 记录落库阶段
    pub fn record_persistence(
        &mut self,
        results: Vec<(usize, Result<PersistedMovement, PersistError>)>,
    ) {
        for (line, result) in results {
            let outcome = match result {
                Ok(created) => ImportOutcome::created(line, created.movement_id, created.code),
                Err(PersistError::DeadlineExceeded) => {
                    ImportOutcome::failed(line, vec![DEADLINE_MESSAGE.to_string()])
                }
                Err(_) => ImportOutcome::failed(line, vec![PERSIST_FAILURE_MESSAGE.to_string()]),
            };
            self.outcomes.push(outcome);
        }
    }

    pub fn finish(mut self) -> ImportReport {
        self.outcomes.sort_by_key(|o| o.line);

        let mut report = ImportReport {
            total_rows: self.total_rows,
            rows_parsed: self.rows_parsed,
            ..Default::default()
        };

        for outcome in self.outcomes {
            match (outcome.movement_id, outcome.movement_code) {
                (Some(movement_id), Some(code)) => report.created.push(CreatedMovement {
                    line: outcome.line,
                    movement_id,
                    code,
                }),
                _ => report.errors.push(RowError {
                    line: outcome.line,
                    messages: outcome.errors,
                }),
            }
        }
        report.rows_created = report.created.len();
        report
    }
}

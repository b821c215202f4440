// ==========================================
// 器具移动导入 - 导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 结构检查 → 加载配置/目录 → 映射 + 校验 → 落库 → 汇总
// 错误: 结构错误整批中止；行级错误进入报告，不中止
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::report::ImportReport;
use crate::domain::types::MovementKind;
use crate::importer::aggregator::ResultAggregator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawSheet;
use crate::importer::matcher::SimilarityMatcher;
use crate::importer::movement_importer_trait::{
    FieldMapper, FileParser, ImportContext, MovementImporter,
};
use crate::importer::persister::BatchPersister;
use crate::importer::row_validator::RowValidator;
use crate::repository::{CatalogRepository, MovementRepository};
use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 表头 + 至少一行数据
const MIN_SHEET_ROWS: usize = 2;

// ==========================================
// MovementImporterImpl
// ==========================================
pub struct MovementImporterImpl<C, M, G>
where
    C: CatalogRepository,
    M: MovementRepository,
    G: ImportConfigReader,
{
    // 数据访问层
    catalog_repo: C,
    movement_repo: M,

    // 配置读取器
    config: G,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
}

impl<C, M, G> MovementImporterImpl<C, M, G>
where
    C: CatalogRepository,
    M: MovementRepository,
    G: ImportConfigReader,
{
    pub fn new(
        catalog_repo: C,
        movement_repo: M,
        config: G,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            catalog_repo,
            movement_repo,
            config,
            file_parser,
            field_mapper,
        }
    }

    pub fn movement_repo(&self) -> &M {
        &self.movement_repo
    }
}

#[async_trait]
impl<C, M, G> MovementImporter for MovementImporterImpl<C, M, G>
where
    C: CatalogRepository,
    M: MovementRepository,
    G: ImportConfigReader,
{
    #[instrument(skip(self, file_path, context), fields(kind = %kind))]
    async fn import_file(
        &self,
        file_path: &Path,
        kind: MovementKind,
        context: &ImportContext,
    ) -> ImportResult<ImportReport> {
        info!(file_path = %file_path.display(), "开始解析导入文件");

        let sheet = self.file_parser.parse_to_sheet(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;

        self.import_sheet(sheet, kind, context).await
    }

    #[instrument(skip(self, sheet, context), fields(kind = %kind, batch_id))]
    async fn import_sheet(
        &self,
        sheet: RawSheet,
        kind: MovementKind,
        context: &ImportContext,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        // === 步骤 1: 结构检查 ===
        let row_count = sheet.row_count();
        if row_count < MIN_SHEET_ROWS {
            warn!(row_count, "文件行数不足，整批中止");
            return Err(ImportError::TooFewRows(row_count));
        }

        // === 步骤 2: 配置与参考目录 ===
        let settings = ImportSettings::load(&self.config).await?;
        debug!(?settings, "导入配置已加载");

        let catalog = self
            .catalog_repo
            .load_catalog()
            .await
            .map_err(|e| ImportError::CatalogLoadError(e.to_string()))?;

        let own_center = catalog
            .find_center(&context.own_center_id)
            .cloned()
            .ok_or_else(|| ImportError::UnknownOwnCenter(context.own_center_id.clone()))?;

        info!(
            actor_id = %context.actor_id,
            own_center = %own_center.name,
            stores = catalog.stores.len(),
            centers = catalog.centers.len(),
            asset_types = catalog.asset_types.len(),
            "参考目录已加载"
        );

        // === 步骤 3: 映射 + 校验 ===
        let validator = RowValidator::new(SimilarityMatcher::new(settings.match_threshold));
        let movements = validator.parse_rows(
            self.field_mapper.as_ref(),
            &sheet,
            kind,
            &own_center,
            &catalog,
        );

        let mut aggregator = ResultAggregator::new();
        aggregator.record_validation(&movements);

        let valid: Vec<_> = movements
            .into_iter()
            .filter(|m| m.errors.is_empty())
            .collect();
        info!(valid_rows = valid.len(), "行校验完成");

        // === 步骤 4: 落库 ===
        let persister = BatchPersister::new(
            &self.movement_repo,
            settings.persist_concurrency,
            Duration::from_secs(settings.batch_timeout_secs),
        );
        let results = persister.persist_batch(&valid, context).await;
        aggregator.record_persistence(results);

        // === 步骤 5: 汇总 ===
        let report = aggregator.finish();
        info!(
            total_rows = report.total_rows,
            rows_parsed = report.rows_parsed,
            rows_created = report.rows_created,
            error_rows = report.errors.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入完成"
        );

        Ok(report)
    }
}

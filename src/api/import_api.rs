// ==========================================
// 器具移动导入API
// ==========================================
// 职责: 封装批量导入与模板生成，校验调用参数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::report::ImportReport;
use crate::domain::types::MovementKind;
use crate::importer::{
    FieldMapperImpl, ImportContext, MovementImporter, MovementImporterImpl, MovementTemplate,
    UniversalFileParser,
};
use crate::repository::{CatalogRepository, CatalogRepositoryImpl, MovementRepositoryImpl};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 批量导入移动
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv / .xlsx / .xls）
    /// - kind_str: shipment / return / transfer
    /// - own_center_id: 导入人所属配送中心 ID
    /// - actor_id: 导入人
    /// - network_address: 来源地址（可选）
    ///
    /// # 返回
    /// - Ok(ImportReport): 完整导入报告
    /// - Err(ApiError::InvalidInput): 参数错误
    /// - Err(ApiError::ImportError): 文件结构错误，未处理任何行
    pub async fn import_movements(
        &self,
        file_path: &str,
        kind_str: &str,
        own_center_id: &str,
        actor_id: &str,
        network_address: Option<&str>,
    ) -> ApiResult<ImportReport> {
        let kind = parse_kind(kind_str)?;

        let actor_id = actor_id.trim();
        if actor_id.is_empty() {
            return Err(ApiError::InvalidInput("actor is required".to_string()));
        }
        let own_center_id = own_center_id.trim();
        if own_center_id.is_empty() {
            return Err(ApiError::InvalidInput(
                "own distribution center is required".to_string(),
            ));
        }

        let mut context = ImportContext::new(actor_id, own_center_id);
        if let Some(address) = network_address {
            context = context.with_network_address(address);
        }

        let importer = self.create_importer()?;
        let report = importer
            .import_file(Path::new(file_path), kind, &context)
            .await?;

        info!(
            file_path,
            kind = %kind,
            rows_created = report.rows_created,
            error_rows = report.errors.len(),
            "导入请求完成"
        );
        Ok(report)
    }

    /// 生成导入模板
    pub async fn build_template(&self, kind_str: &str) -> ApiResult<MovementTemplate> {
        let kind = parse_kind(kind_str)?;
        let catalog = CatalogRepositoryImpl::new(&self.db_path)?
            .load_catalog()
            .await?;
        Ok(MovementTemplate::for_kind(kind, &catalog))
    }

    fn create_importer(
        &self,
    ) -> ApiResult<MovementImporterImpl<CatalogRepositoryImpl, MovementRepositoryImpl, ConfigManager>>
    {
        let catalog_repo = CatalogRepositoryImpl::new(&self.db_path)?;
        let movement_repo = MovementRepositoryImpl::new(&self.db_path)?;
        let config = ConfigManager::new(&self.db_path)?;

        Ok(MovementImporterImpl::new(
            catalog_repo,
            movement_repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
        ))
    }
}

fn parse_kind(kind_str: &str) -> ApiResult<MovementKind> {
    MovementKind::from_str(kind_str).map_err(ApiError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_bad_arguments_before_touching_the_database() {
        let api = ImportApi::new("/nonexistent/dir/db.sqlite".to_string());

        let result = api
            .import_movements("a.csv", "delivery", "1", "u1", None)
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));

        let result = api
            .import_movements("a.csv", "shipment", "1", "  ", None)
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(ref m)) if m.contains("actor")));

        let result = api.build_template("unknown").await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}

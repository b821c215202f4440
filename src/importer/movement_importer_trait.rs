// ==========================================
// 器具移动导入 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::movement::{ParsedMovement, RawRow};
use crate::domain::report::ImportReport;
use crate::domain::types::MovementKind;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RawSheet, SheetRow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// ImportContext - 导入人上下文
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportContext {
    pub actor_id: String,                // 导入人
    pub own_center_id: String,           // 导入人所属配送中心
    pub network_address: Option<String>, // 来源地址（可选）
}

impl ImportContext {
    pub fn new(actor_id: impl Into<String>, own_center_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            own_center_id: own_center_id.into(),
            network_address: None,
        }
    }

    pub fn with_network_address(mut self, address: impl Into<String>) -> Self {
        self.network_address = Some(address.into());
        self
    }
}

// ==========================================
// MovementImporter Trait
// ==========================================
// 用途: 批量移动导入主接口
// 实现者: MovementImporterImpl
#[async_trait]
pub trait MovementImporter: Send + Sync {
    /// 从文件导入（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(ImportReport): 完整导入报告（行级错误在报告内）
    /// - Err: 结构错误（文件不可读、少于 2 行、本中心不存在等），整批中止
    async fn import_file(
        &self,
        file_path: &Path,
        kind: MovementKind,
        context: &ImportContext,
    ) -> ImportResult<ImportReport>;

    /// 从已解析的表格导入
    ///
    /// # 导入流程
    /// 1. 结构检查
    /// 2. 加载配置与参考目录
    /// 3. 逐行映射 + 校验 + 地点/器具解析
    /// 4. 有效行落库（表头 + 明细，失败回滚表头）
    /// 5. 汇总报告（按源文件行序）
    async fn import_sheet(
        &self,
        sheet: RawSheet,
        kind: MovementKind,
        context: &ImportContext,
    ) -> ImportResult<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件 → 表格（表头 + 数据行）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    fn parse_to_sheet(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 表头 → 字段键；数据行 → ParsedMovement
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 表头单元格 → 字段键（小写 + trim）
    fn map_header(&self, header_row: &[String]) -> Vec<String>;

    /// 按字段键组装原始行
    fn to_raw_row(&self, header_keys: &[String], row: &SheetRow) -> RawRow;

    /// 原始行 → 候选移动（收集该行全部解析错误，不在首个错误处停止）
    ///
    /// # 参数
    /// - own_center_name: 导入人所属中心的规范名称（固定一侧地点）
    fn map_to_parsed_movement(
        &self,
        row: &RawRow,
        kind: MovementKind,
        own_center_name: &str,
    ) -> ParsedMovement;
}

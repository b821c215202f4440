// ==========================================
// 器具移动导入 - 导入层
// ==========================================
// 职责: 表格 → 移动记录
// 支持: Excel, CSV
// 流程: 解析 → 映射 → 匹配/校验 → 落库 → 汇总
// ==========================================

// 模块声明
pub mod aggregator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod matcher;
pub mod movement_importer_impl;
pub mod movement_importer_trait;
pub mod normalizer;
pub mod persister;
pub mod row_validator;
pub mod template;

// 重导出核心类型
pub use aggregator::ResultAggregator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, RawSheet, SheetRow, UniversalFileParser};
pub use matcher::{MatchResult, SimilarityMatcher, DEFAULT_MATCH_THRESHOLD};
pub use movement_importer_impl::MovementImporterImpl;
pub use normalizer::normalize;
pub use persister::{generate_movement_code, BatchPersister, PersistError, PersistedMovement};
pub use row_validator::RowValidator;
pub use template::MovementTemplate;

// 重导出 Trait 接口
pub use movement_importer_trait::{FieldMapper, FileParser, ImportContext, MovementImporter};

// ==========================================
// 器具移动导入 - 导入结果
// ==========================================
// 用途: 导入接口返回值（按源文件行序）
// ==========================================

use serde::{Deserialize, Serialize};

/// 单行处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub line: usize,
    pub movement_id: Option<String>,
    pub movement_code: Option<String>,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    pub fn created(line: usize, movement_id: String, movement_code: String) -> Self {
        Self {
            line,
            movement_id: Some(movement_id),
            movement_code: Some(movement_code),
            errors: Vec::new(),
        }
    }

    pub fn failed(line: usize, errors: Vec<String>) -> Self {
        Self {
            line,
            movement_id: None,
            movement_code: None,
            errors,
        }
    }

    pub fn is_created(&self) -> bool {
        self.movement_id.is_some()
    }
}

/// 错误行（对外格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub line: usize,
    pub messages: Vec<String>,
}

/// 已创建的移动（对外格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMovement {
    pub line: usize,
    pub movement_id: String,
    pub code: String,
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_rows: usize,   // 非空行数
    pub rows_parsed: usize,  // 校验通过行数
    pub rows_created: usize, // 实际落库行数
    pub errors: Vec<RowError>,
    #[serde(default)]
    pub created: Vec<CreatedMovement>,
}

impl ImportReport {
    pub fn error_for_line(&self, line: usize) -> Option<&RowError> {
        self.errors.iter().find(|e| e.line == line)
    }
}

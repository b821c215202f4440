// ==========================================
// 器具移动导入 - 移动实体
// ==========================================
// 流程: RawRow → ParsedMovement → ResolvedMovement → NewMovementHeader + NewAssetLine
// 约束: 每个阶段产出新值，不回写上一阶段
// ==========================================

use crate::domain::catalog::AssetTypeCatalogEntry;
use crate::domain::types::{MovementKind, MovementStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 每行最多的器具槽位数
pub const MAX_ASSET_SLOTS: usize = 3;

// ==========================================
// RawRow - 原始行（列名 → 单元格文本）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize, // 源文件行号（1 起，表头为第 1 行）
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    /// 取第一个与 key 同名的单元格（已 trim）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// ==========================================
// ParsedMovement - 解析后的候选移动
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSlot {
    pub slot: usize,        // 槽位号 1..=3
    pub asset_text: String, // 表格中填写的器具类型
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMovement {
    pub kind: MovementKind,
    pub origin_text: String,
    pub destination_text: String,
    pub notes: String,
    pub assets: Vec<AssetSlot>,
    pub line: usize,
    pub errors: Vec<String>, // 解析阶段的行错误
}

impl ParsedMovement {
    /// 表格中填写的那一侧地点文本
    pub fn location_text(&self) -> &str {
        if self.kind.own_center_is_origin() {
            &self.destination_text
        } else {
            &self.origin_text
        }
    }
}

// ==========================================
// ResolvedMovement - 地点/器具已映射到目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAssetLine {
    pub asset_type: AssetTypeCatalogEntry,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMovement {
    pub kind: MovementKind,
    pub origin: Option<String>,      // 规范名称
    pub destination: Option<String>, // 规范名称
    pub notes: String,
    pub assets: Vec<ResolvedAssetLine>,
    pub line: usize,
    pub match_confidence: Option<f64>, // 地点匹配置信度
    pub errors: Vec<String>,
}

impl ResolvedMovement {
    /// 可落库: 无错误、两端地点已确定、至少一条器具明细
    pub fn is_persistable(&self) -> bool {
        self.errors.is_empty()
            && self.origin.is_some()
            && self.destination.is_some()
            && !self.assets.is_empty()
    }
}

// ==========================================
// 落库记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovementHeader {
    pub code: String,
    pub kind: MovementKind,
    pub origin: String,
    pub destination: String,
    pub status: MovementStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub created_ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssetLine {
    pub asset_type_id: String,
    pub quantity: u32,
}

impl From<&ResolvedAssetLine> for NewAssetLine {
    fn from(line: &ResolvedAssetLine) -> Self {
        Self {
            asset_type_id: line.asset_type.asset_type_id.clone(),
            quantity: line.quantity,
        }
    }
}

// ==========================================
// 器具移动导入 - 领域类型定义
// ==========================================
// 职责: 移动类型 / 状态 / 地点类型等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 移动类型 (Movement Kind)
// ==========================================
// Shipment: 配送中心 → 门店
// Return:   门店 → 配送中心
// Transfer: 配送中心 → 配送中心
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Shipment,
    Return,
    Transfer,
}

impl MovementKind {
    pub const ALL: [MovementKind; 3] = [
        MovementKind::Shipment,
        MovementKind::Return,
        MovementKind::Transfer,
    ];

    /// 移动编码前缀（3 位）
    pub fn code_prefix(&self) -> &'static str {
        match self {
            MovementKind::Shipment => "REM",
            MovementKind::Return => "REG",
            MovementKind::Transfer => "TRF",
        }
    }

    /// 需要从表格读取的地点列（另一侧固定为导入人所属中心）
    pub fn location_column(&self) -> &'static str {
        match self {
            MovementKind::Shipment | MovementKind::Transfer => "destination-location",
            MovementKind::Return => "origin-location",
        }
    }

    /// 表格地点列所匹配的目录
    pub fn counterpart_location_type(&self) -> LocationType {
        match self {
            MovementKind::Shipment | MovementKind::Return => LocationType::Store,
            MovementKind::Transfer => LocationType::Center,
        }
    }

    /// 本中心是否作为起点
    pub fn own_center_is_origin(&self) -> bool {
        !matches!(self, MovementKind::Return)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Shipment => "shipment",
            MovementKind::Return => "return",
            MovementKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shipment" | "remessa" => Ok(MovementKind::Shipment),
            "return" | "regresso" => Ok(MovementKind::Return),
            "transfer" | "transferencia" => Ok(MovementKind::Transfer),
            other => Err(format!(
                "unknown movement kind: {} (expected shipment/return/transfer)",
                other
            )),
        }
    }
}

// ==========================================
// 移动状态 (Movement Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementStatus {
    InTransit, // 在途（导入创建时的初始状态）
    Completed, // 已签收
    Cancelled, // 已取消
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementStatus::InTransit => write!(f, "IN_TRANSIT"),
            MovementStatus::Completed => write!(f, "COMPLETED"),
            MovementStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// ==========================================
// 地点类型 (Location Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Store,  // 门店
    Center, // 配送中心
}

impl LocationType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            LocationType::Store => "STORE",
            LocationType::Center => "CENTER",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

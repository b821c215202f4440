// ==========================================
// 器具移动导入 - 字段映射器实现
// ==========================================
// 职责: 表头 → 字段键；单行 → ParsedMovement（含解析阶段行错误）
// 规则:
// - 地点列按移动类型决定（另一侧固定为导入人所属中心）
// - 槽位 1..=3: 类型与数量须同时填写；数量须为正整数
// - 数量为 0 的槽位视为未填写
// ==========================================

use crate::domain::movement::{AssetSlot, ParsedMovement, RawRow, MAX_ASSET_SLOTS};
use crate::domain::types::MovementKind;
use crate::importer::file_parser::SheetRow;
use crate::importer::movement_importer_trait::FieldMapper as FieldMapperTrait;

pub const NOTES_COLUMN: &str = "notes";

pub fn asset_type_column(slot: usize) -> String {
    format!("asset-type-{}", slot)
}

pub fn quantity_column(slot: usize) -> String {
    format!("quantity-{}", slot)
}

/// 数量单元格解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityCell {
    Empty,
    Zero,
    Positive(u32),
    Invalid,
}

/// 解析数量（接受 "50" 与 "50.0" 这类整值小数）
pub fn parse_quantity(raw: &str) -> QuantityCell {
    let value = raw.trim();
    if value.is_empty() {
        return QuantityCell::Empty;
    }

    let parsed = value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    });

    match parsed {
        Some(0) => QuantityCell::Zero,
        Some(n) if n > 0 => u32::try_from(n)
            .map(QuantityCell::Positive)
            .unwrap_or(QuantityCell::Invalid),
        _ => QuantityCell::Invalid,
    }
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_header(&self, header_row: &[String]) -> Vec<String> {
        header_row
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect()
    }

    fn to_raw_row(&self, header_keys: &[String], row: &SheetRow) -> RawRow {
        let cells = header_keys
            .iter()
            .enumerate()
            .map(|(idx, key)| {
                let value = row
                    .cells
                    .get(idx)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();
                (key.clone(), value)
            })
            .collect();

        RawRow {
            line: row.line,
            cells,
        }
    }

    fn map_to_parsed_movement(
        &self,
        row: &RawRow,
        kind: MovementKind,
        own_center_name: &str,
    ) -> ParsedMovement {
        let mut errors = Vec::new();

        let location_column = kind.location_column();
        let location_text = self.get_string(row, location_column).unwrap_or_default();
        if location_text.is_empty() {
            errors.push(format!("{} is required", location_column));
        }

        let (origin_text, destination_text) = if kind.own_center_is_origin() {
            (own_center_name.to_string(), location_text)
        } else {
            (location_text, own_center_name.to_string())
        };

        let mut assets = Vec::new();
        for slot in 1..=MAX_ASSET_SLOTS {
            let asset_text = self.get_string(row, &asset_type_column(slot));
            let quantity_raw = self.get_string(row, &quantity_column(slot));
            let quantity = parse_quantity(quantity_raw.as_deref().unwrap_or(""));

            match (asset_text, quantity) {
                (None, QuantityCell::Empty) | (_, QuantityCell::Zero) => continue,
                (None, _) => {
                    errors.push(format!(
                        "slot {}: quantity given without asset type",
                        slot
                    ));
                }
                (Some(text), QuantityCell::Empty) => {
                    errors.push(format!(
                        "slot {}: asset type \"{}\" given without quantity",
                        slot, text
                    ));
                }
                (Some(text), QuantityCell::Invalid) => {
                    errors.push(format!(
                        "invalid quantity for {}: \"{}\"",
                        text,
                        quantity_raw.unwrap_or_default()
                    ));
                }
                (Some(text), QuantityCell::Positive(quantity)) => {
                    assets.push(AssetSlot {
                        slot,
                        asset_text: text,
                        quantity,
                    });
                }
            }
        }

        ParsedMovement {
            kind,
            origin_text,
            destination_text,
            notes: self.get_string(row, NOTES_COLUMN).unwrap_or_default(),
            assets,
            line: row.line,
            errors,
        }
    }
}

impl FieldMapper {
    /// 提取字符串字段，支持别名（旧版模板列名）；空串视为缺失
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        let legacy_slot = |prefix: &str, canonical_prefix: &str| {
            key.strip_prefix(canonical_prefix)
                .map(|n| format!("{}{}", prefix, n))
        };

        let mut aliases: Vec<String> = vec![key.to_string(), key.replace('-', "_")];
        match key {
            "destination-location" => {
                aliases.push("loja_destino".to_string());
                aliases.push("cd_destino".to_string());
            }
            "origin-location" => aliases.push("loja_origem".to_string()),
            NOTES_COLUMN => aliases.push("observacoes".to_string()),
            _ => {
                if let Some(alias) = legacy_slot("tipo_ativo_", "asset-type-") {
                    aliases.push(alias);
                }
                if let Some(alias) = legacy_slot("quantidade_", "quantity-") {
                    aliases.push(alias);
                }
            }
        }

        aliases.iter().find_map(|alias| {
            row.get(alias)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    }
}

// ==========================================
// 器具移动导入 - 行校验器实现
// ==========================================
// 职责: ParsedMovement → ResolvedMovement
// - 地点文本 → 目录规范名称（相似度匹配）
// - 器具文本 → 器具类型目录（名称或代码，规范化后相等）
// - 同行重复器具类型、零明细行
// 约束: 行内全部错误收集后再判定，不在首个错误处停止
// ==========================================

use crate::domain::catalog::{AssetTypeCatalogEntry, Catalog, LocationCatalogEntry};
use crate::domain::movement::{ParsedMovement, ResolvedAssetLine, ResolvedMovement};
use crate::domain::types::{LocationType, MovementKind};
use crate::importer::file_parser::RawSheet;
use crate::importer::matcher::SimilarityMatcher;
use crate::importer::movement_importer_trait::FieldMapper;
use crate::importer::normalizer::normalize;
use tracing::debug;

pub const AT_LEAST_ONE_ASSET: &str = "at least one asset required";

/// 按名称或短代码解析器具类型（取目录顺序第一个）
pub fn resolve_asset_type<'a>(
    text: &str,
    asset_types: &'a [AssetTypeCatalogEntry],
) -> Option<&'a AssetTypeCatalogEntry> {
    let needle = normalize(text);
    if needle.is_empty() {
        return None;
    }
    asset_types
        .iter()
        .find(|t| normalize(&t.name) == needle || normalize(&t.code) == needle)
}

fn location_miss_message(location_type: LocationType, text: &str) -> String {
    match location_type {
        LocationType::Store => format!("store not found: \"{}\"", text),
        LocationType::Center => format!("distribution center not found: \"{}\"", text),
    }
}

pub struct RowValidator {
    matcher: SimilarityMatcher,
}

impl RowValidator {
    pub fn new(matcher: SimilarityMatcher) -> Self {
        Self { matcher }
    }

    /// 解析并校验单行
    pub fn resolve(
        &self,
        parsed: &ParsedMovement,
        own_center: &LocationCatalogEntry,
        catalog: &Catalog,
    ) -> ResolvedMovement {
        let mut errors = parsed.errors.clone();

        // ===== 地点 =====
        let location_type = parsed.kind.counterpart_location_type();
        let location_text = parsed.location_text();
        let mut match_confidence = None;
        let counterpart = if location_text.is_empty() {
            // 缺失已在映射阶段记录
            None
        } else {
            let result = self
                .matcher
                .best_match(location_text, catalog.locations(location_type));
            match result.matched {
                Some(name) => {
                    debug!(
                        line = parsed.line,
                        input = %location_text,
                        matched = %name,
                        confidence = result.confidence,
                        exact = result.exact_match,
                        "地点匹配成功"
                    );
                    match_confidence = Some(result.confidence);
                    Some(name)
                }
                None => {
                    errors.push(location_miss_message(location_type, location_text));
                    None
                }
            }
        };

        let own = Some(own_center.name.clone());
        let (origin, destination) = if parsed.kind.own_center_is_origin() {
            (own, counterpart)
        } else {
            (counterpart, own)
        };

        // ===== 器具明细 =====
        let mut assets: Vec<ResolvedAssetLine> = Vec::new();
        for slot in &parsed.assets {
            let Some(asset_type) = resolve_asset_type(&slot.asset_text, &catalog.asset_types)
            else {
                errors.push(format!("asset type not found: \"{}\"", slot.asset_text));
                continue;
            };

            if assets
                .iter()
                .any(|a| a.asset_type.asset_type_id == asset_type.asset_type_id)
            {
                errors.push(format!("duplicate asset type: \"{}\"", slot.asset_text));
                continue;
            }

            assets.push(ResolvedAssetLine {
                asset_type: asset_type.clone(),
                quantity: slot.quantity,
            });
        }

        if assets.is_empty() {
            errors.push(AT_LEAST_ONE_ASSET.to_string());
        }

        ResolvedMovement {
            kind: parsed.kind,
            origin,
            destination,
            notes: parsed.notes.clone(),
            assets,
            line: parsed.line,
            match_confidence,
            errors,
        }
    }

    /// 解析整张表格（跳过空白行，空白行不计入总行数）
    ///
    /// # 返回
    /// - 每个非空行一个 ResolvedMovement，按源文件行序
    pub fn parse_rows(
        &self,
        mapper: &dyn FieldMapper,
        sheet: &RawSheet,
        kind: MovementKind,
        own_center: &LocationCatalogEntry,
        catalog: &Catalog,
    ) -> Vec<ResolvedMovement> {
        let header_keys = mapper.map_header(&sheet.header);

        sheet
            .rows
            .iter()
            .filter(|row| !row.is_blank())
            .map(|row| mapper.to_raw_row(&header_keys, row))
            .map(|raw| {
                let parsed = mapper.map_to_parsed_movement(&raw, kind, &own_center.name);
                self.resolve(&parsed, own_center, catalog)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;

    fn location(id: &str, name: &str) -> LocationCatalogEntry {
        LocationCatalogEntry {
            location_id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn asset(id: &str, name: &str, code: &str) -> AssetTypeCatalogEntry {
        AssetTypeCatalogEntry {
            asset_type_id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                location("1", "MACAE"),
                location("2", "CABO FRIO"),
                location("3", "BOTAFOGO"),
            ],
            vec![
                location("c1", "CD PAVUNA"),
                location("c2", "CD SÃO PAULO"),
            ],
            vec![
                asset("a1", "CAIXA HNT G", "CXG"),
                asset("a2", "CAIXA HNT P", "CXP"),
                asset("a3", "SACO BAG", "BAG"),
            ],
        )
    }

    fn sheet(header: &[&str], rows: &[&[&str]]) -> RawSheet {
        let mut grid = vec![header.iter().map(|s| s.to_string()).collect::<Vec<_>>()];
        for r in rows {
            grid.push(r.iter().map(|s| s.to_string()).collect());
        }
        RawSheet::from_grid(grid)
    }

    const SHIPMENT_HEADER: &[&str] = &[
        "destination-location",
        "notes",
        "asset-type-1",
        "quantity-1",
        "asset-type-2",
        "quantity-2",
        "asset-type-3",
        "quantity-3",
    ];

    fn run(kind: MovementKind, header: &[&str], rows: &[&[&str]]) -> Vec<ResolvedMovement> {
        let catalog = catalog();
        let own = catalog.centers[0].clone();
        RowValidator::new(SimilarityMatcher::default()).parse_rows(
            &FieldMapperImpl,
            &sheet(header, rows),
            kind,
            &own,
            &catalog,
        )
    }

    #[test]
    fn test_resolve_asset_type_by_name_or_code() {
        let catalog = catalog();
        assert_eq!(
            resolve_asset_type("caixa hnt g", &catalog.asset_types).map(|a| a.asset_type_id.as_str()),
            Some("a1")
        );
        assert_eq!(
            resolve_asset_type("bag", &catalog.asset_types).map(|a| a.asset_type_id.as_str()),
            Some("a3")
        );
        assert!(resolve_asset_type("PALLET", &catalog.asset_types).is_none());
        assert!(resolve_asset_type("", &catalog.asset_types).is_none());
    }

    #[test]
    fn test_valid_shipment_row() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[&["cabofrio", "weekly", "CAIXA HNT G", "50", "bag", "100", "", ""]],
        );

        assert_eq!(resolved.len(), 1);
        let movement = &resolved[0];
        assert!(movement.errors.is_empty(), "{:?}", movement.errors);
        assert!(movement.is_persistable());
        assert_eq!(movement.origin.as_deref(), Some("CD PAVUNA"));
        assert_eq!(movement.destination.as_deref(), Some("CABO FRIO"));
        assert_eq!(movement.assets.len(), 2);
        assert_eq!(movement.assets[1].asset_type.name, "SACO BAG");
        assert_eq!(movement.line, 2);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[
                &["MACAE", "", "CXG", "1", "", "", "", ""],
                &["", " ", "", "", "", "", "", ""],
                &["BOTAFOGO", "", "CXP", "2", "", "", "", ""],
            ],
        );

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].line, 2);
        assert_eq!(resolved[1].line, 4);
    }

    #[test]
    fn test_text_outside_header_columns_is_not_blank() {
        let resolved = run(
            MovementKind::Shipment,
            &["destination-location", "asset-type-1", "quantity-1"],
            &[&["MACAE", "CXG", "5"], &["", "", "", "CABO FRIO CXG 5"]],
        );

        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].errors.is_empty());
        assert_eq!(resolved[1].line, 3);
        assert_eq!(
            resolved[1].errors,
            vec![
                "destination-location is required".to_string(),
                AT_LEAST_ONE_ASSET.to_string(),
            ]
        );
    }

    #[test]
    fn test_zero_quantities_yield_single_error() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[&["MACAE", "", "CXG", "0", "CXP", "0", "BAG", "0"]],
        );

        assert_eq!(resolved[0].errors, vec![AT_LEAST_ONE_ASSET.to_string()]);
        assert!(!resolved[0].is_persistable());
    }

    #[test]
    fn test_unresolved_store_names_text_verbatim() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[&["Lugar Nenhum", "", "CXG", "3", "", "", "", ""]],
        );

        assert_eq!(
            resolved[0].errors,
            vec!["store not found: \"Lugar Nenhum\"".to_string()]
        );
        assert_eq!(resolved[0].destination, None);
    }

    #[test]
    fn test_duplicate_asset_keeps_first() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[&["MACAE", "", "CAIXA HNT G", "5", "CXG", "7", "", ""]],
        );

        let movement = &resolved[0];
        assert_eq!(movement.assets.len(), 1);
        assert_eq!(movement.assets[0].quantity, 5);
        assert_eq!(movement.errors, vec!["duplicate asset type: \"CXG\"".to_string()]);
    }

    #[test]
    fn test_collects_every_error_in_row() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[&["", "", "PALLET", "5", "CXG", "-1", "", "9"]],
        );

        let errors = &resolved[0].errors;
        assert_eq!(errors.len(), 5, "{:?}", errors);
        assert_eq!(errors[0], "destination-location is required");
        assert!(errors.iter().any(|e| e.starts_with("invalid quantity for CXG")));
        assert!(errors.iter().any(|e| e.starts_with("slot 3")));
        assert!(errors.contains(&"asset type not found: \"PALLET\"".to_string()));
        assert_eq!(errors.last().map(String::as_str), Some(AT_LEAST_ONE_ASSET));
    }

    #[test]
    fn test_return_fixes_destination() {
        let resolved = run(
            MovementKind::Return,
            &["origin-location", "asset-type-1", "quantity-1"],
            &[&["Macaé", "CXP", "15"]],
        );

        let movement = &resolved[0];
        assert!(movement.errors.is_empty());
        assert_eq!(movement.origin.as_deref(), Some("MACAE"));
        assert_eq!(movement.destination.as_deref(), Some("CD PAVUNA"));
        assert_eq!(movement.match_confidence, Some(1.0));
    }

    #[test]
    fn test_transfer_matches_center_catalog() {
        let resolved = run(
            MovementKind::Transfer,
            &["destination-location", "asset-type-1", "quantity-1"],
            &[&["cd sao paulo", "CXG", "100"], &["MACAE", "CXG", "1"]],
        );

        assert_eq!(resolved[0].destination.as_deref(), Some("CD SÃO PAULO"));
        assert!(resolved[0].errors.is_empty());
        assert_eq!(
            resolved[1].errors,
            vec!["distribution center not found: \"MACAE\"".to_string()]
        );
    }

    #[test]
    fn test_accepted_rows_are_persistable() {
        let resolved = run(
            MovementKind::Shipment,
            SHIPMENT_HEADER,
            &[
                &["MACAE", "", "CXG", "1", "", "", "", ""],
                &["BOTAFOGO", "x", "CXP", "2", "BAG", "3", "CXG", "4"],
                &["nowhere at all", "", "CXG", "1", "", "", "", ""],
                &["CABO FRIO", "", "", "", "", "", "", ""],
            ],
        );

        for movement in &resolved {
            assert_eq!(movement.errors.is_empty(), movement.is_persistable());
        }
    }
}

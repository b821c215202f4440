// ==========================================
// 器具移动导入 - 导入模板
// ==========================================
// 职责: 按移动类型生成导入模板（表头、示例行、参考清单、填写说明）
// 说明: 纯描述性内容，不调用匹配/校验逻辑
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::movement::MAX_ASSET_SLOTS;
use crate::domain::types::MovementKind;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{asset_type_column, quantity_column, NOTES_COLUMN};
use crate::importer::matcher::DEFAULT_MATCH_THRESHOLD;
use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 地点参考行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationReference {
    pub name: String,
    pub accepted_variations: String,
}

/// 器具类型参考行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTypeReference {
    pub name: String,
    pub code: String,
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTemplate {
    pub kind: MovementKind,
    pub header: Vec<String>,
    pub example_rows: Vec<Vec<String>>,
    pub stores: Vec<LocationReference>,
    pub centers: Vec<String>, // 仅转运模板
    pub asset_types: Vec<AssetTypeReference>,
    pub instructions: Vec<String>,
}

impl MovementTemplate {
    pub fn for_kind(kind: MovementKind, catalog: &Catalog) -> Self {
        let mut header = vec![kind.location_column().to_string(), NOTES_COLUMN.to_string()];
        for slot in 1..=MAX_ASSET_SLOTS {
            header.push(asset_type_column(slot));
            header.push(quantity_column(slot));
        }

        let stores = catalog
            .stores
            .iter()
            .map(|s| LocationReference {
                name: s.name.clone(),
                accepted_variations: variations_of(&s.name),
            })
            .collect();

        let centers = match kind {
            MovementKind::Transfer => catalog.centers.iter().map(|c| c.name.clone()).collect(),
            _ => Vec::new(),
        };

        let asset_types = catalog
            .asset_types
            .iter()
            .map(|t| AssetTypeReference {
                name: t.name.clone(),
                code: t.code.clone(),
                usage: format!("use \"{}\" or \"{}\" in the sheet", t.name, t.code),
            })
            .collect();

        Self {
            kind,
            example_rows: example_rows(kind, header.len()),
            header,
            stores,
            centers,
            asset_types,
            instructions: instructions(kind),
        }
    }

    /// 下载文件名，如 template_shipment_2024-01-15.csv
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("template_{}_{}.csv", self.kind, date.format("%Y-%m-%d"))
    }

    /// 写出主表（表头 + 示例行）
    pub fn write_csv<W: Write>(&self, writer: W) -> ImportResult<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.header)?;
        for row in &self.example_rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 门店参考表（名称 + 可接受写法）
    pub fn write_stores_csv<W: Write>(&self, writer: W) -> ImportResult<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(["store", "accepted variations"])?;
        for store in &self.stores {
            wtr.write_record([store.name.as_str(), store.accepted_variations.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 配送中心参考表（仅转运模板有内容）
    pub fn write_centers_csv<W: Write>(&self, writer: W) -> ImportResult<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(["distribution center"])?;
        for center in &self.centers {
            wtr.write_record([center.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 器具类型参考表
    pub fn write_asset_types_csv<W: Write>(&self, writer: W) -> ImportResult<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(["asset type", "code", "usage"])?;
        for asset in &self.asset_types {
            wtr.write_record([asset.name.as_str(), asset.code.as_str(), asset.usage.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 填写说明（纯文本，每行一条）
    pub fn write_instructions<W: Write>(&self, mut writer: W) -> ImportResult<()> {
        for line in &self.instructions {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 写出主表及参考表，参考表与主表同目录，文件名为 主表名_后缀
    ///
    /// # 返回
    /// - 已写出的全部文件路径（主表在前）
    pub fn write_files(&self, main_path: &Path) -> ImportResult<Vec<PathBuf>> {
        let stem = main_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template")
            .to_string();
        let sibling = |suffix: &str| main_path.with_file_name(format!("{}_{}", stem, suffix));

        let mut written = Vec::new();

        self.write_csv(BufWriter::new(File::create(main_path)?))?;
        written.push(main_path.to_path_buf());

        let stores_path = sibling("stores.csv");
        self.write_stores_csv(BufWriter::new(File::create(&stores_path)?))?;
        written.push(stores_path);

        if !self.centers.is_empty() {
            let centers_path = sibling("centers.csv");
            self.write_centers_csv(BufWriter::new(File::create(&centers_path)?))?;
            written.push(centers_path);
        }

        let assets_path = sibling("asset_types.csv");
        self.write_asset_types_csv(BufWriter::new(File::create(&assets_path)?))?;
        written.push(assets_path);

        let instructions_path = sibling("instructions.txt");
        self.write_instructions(BufWriter::new(File::create(&instructions_path)?))?;
        written.push(instructions_path);

        Ok(written)
    }
}

/// 名称的常见写法：小写 / 去空格小写 / 前 4 个字符
fn variations_of(name: &str) -> String {
    let lower = name.to_lowercase();
    let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();
    let prefix: String = lower.chars().take(4).collect();
    format!("{}, {}, {}", lower, compact, prefix)
}

fn example_rows(kind: MovementKind, width: usize) -> Vec<Vec<String>> {
    let rows: &[&[&str]] = match kind {
        MovementKind::Shipment => &[
            &["BOTAFOGO", "weekly shipment", "CAIXA HNT G", "50", "SACO BAG", "100"],
            &["macae", "urgent", "CAIXA HNT P", "30"],
            &["CABO FRIO", "", "PALLET PBR", "15", "CAIXA BASCULHANTE", "25"],
        ],
        MovementKind::Return => &[
            &["TIJUCA", "monthly return", "CAIXA HNT G", "20", "SACO BAG", "40"],
            &["grajau", "", "CAIXA HNT P", "15"],
            &["FLAMENGO", "check condition", "PALLET PBR", "10"],
        ],
        MovementKind::Transfer => &[
            &["CD SÃO PAULO", "scheduled transfer", "CAIXA HNT G", "100", "SACO BAG", "200"],
            &["CD ESPIRITO SANTO", "", "CAIXA HNT P", "50", "PALLET PBR", "25"],
        ],
    };

    rows.iter()
        .map(|cells| {
            let mut row: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
            row.resize(width, String::new());
            row
        })
        .collect()
}

fn instructions(kind: MovementKind) -> Vec<String> {
    let location_column = kind.location_column();
    let location_hint = match kind {
        MovementKind::Shipment => "destination store name (variations accepted)",
        MovementKind::Return => "origin store name (variations accepted)",
        MovementKind::Transfer => "destination distribution center name",
    };

    vec![
        format!("UPLOAD INSTRUCTIONS: {}", kind.as_str().to_uppercase()),
        String::new(),
        "1. REQUIRED:".to_string(),
        format!("   - {}: {}", location_column, location_hint),
        format!("   - {}: name or code of the first asset type", asset_type_column(1)),
        format!("   - {}: quantity of the first asset (whole number)", quantity_column(1)),
        String::new(),
        "2. OPTIONAL:".to_string(),
        format!("   - {}: free-text comments", NOTES_COLUMN),
        format!(
            "   - {}, {}: second asset type",
            asset_type_column(2),
            quantity_column(2)
        ),
        format!(
            "   - {}, {}: third asset type",
            asset_type_column(3),
            quantity_column(3)
        ),
        String::new(),
        "3. RULES:".to_string(),
        "   - Do not rename the columns".to_string(),
        "   - Quantities must be whole numbers greater than zero".to_string(),
        "   - Each asset type may appear only once per row".to_string(),
        "   - Blank rows are ignored".to_string(),
        String::new(),
        "4. LOCATION MATCHING:".to_string(),
        "   - Accents and letter case are ignored".to_string(),
        "   - Example: \"MACAE\", \"macaé\" and \"maca\" all resolve to MACAE".to_string(),
        format!(
            "   - Minimum confidence: {:.0}%",
            DEFAULT_MATCH_THRESHOLD * 100.0
        ),
        String::new(),
        "5. ERRORS:".to_string(),
        "   - Errors are reported per line; fix them and upload again".to_string(),
        "   - Delete the example rows before uploading".to_string(),
    ]
}

// ==========================================
// 器具移动导入 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: RawSheet（表头 + 数据行，行号为源文件行号）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::movement_importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ==========================================
// RawSheet - 解析后的表格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    pub line: usize, // 源文件行号（1 起）
    pub cells: Vec<String>,
}

impl SheetRow {
    /// 整行所有单元格均为空白（含表头以外的列）
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub header: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl RawSheet {
    /// 由二维文本构造（第 0 行为表头，行号按 1 起连续编号）
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut iter = grid.into_iter();
        let header = iter.next().unwrap_or_default();
        let rows = iter
            .enumerate()
            .map(|(idx, cells)| SheetRow {
                line: idx + 2,
                cells,
            })
            .collect();
        Self { header, rows }
    }

    /// 总行数（含表头）
    pub fn row_count(&self) -> usize {
        if self.header.is_empty() && self.rows.is_empty() {
            0
        } else {
            self.rows.len() + 1
        }
    }
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意 Reader 解析（上传内容不落盘时使用）
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<RawSheet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);
            let cells: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            if header.is_none() {
                header = Some(cells);
            } else {
                rows.push(SheetRow { line, cells });
            }
        }

        Ok(RawSheet {
            header: header.unwrap_or_default(),
            rows,
        })
    }
}

impl FileParser for CsvParser {
    fn parse_to_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 只读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::SheetNotFound)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // Range 从第一个非空单元格开始，行号需加上起始偏移
        let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut rows_iter = range.rows();
        let header: Vec<String> = match rows_iter.next() {
            Some(cells) => cells.iter().map(|c| c.to_string().trim().to_string()).collect(),
            None => return Ok(RawSheet::default()),
        };

        let rows = rows_iter
            .enumerate()
            .map(|(idx, cells)| SheetRow {
                line: first_line + idx + 1,
                cells: cells.iter().map(|c| c.to_string().trim().to_string()).collect(),
            })
            .collect();

        Ok(RawSheet { header, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_sheet(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_sheet(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

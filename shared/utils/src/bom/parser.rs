//! BOM File Parser
//!
//! Multi-format parser for spreadsheet and CSV bills of materials. The first
//! row of the first worksheet is the header; every later row becomes one
//! dataset row aligned to it.

use anyhow::{anyhow, Context, Result};
use bomcode_models::{CellValue, Dataset};
use calamine::{open_workbook_from_rs, DataType, Ods, Range, Reader, Xls, Xlsx};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{BomcodeError, BomcodeResult};

/// Supported BOM file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomFormat {
    Csv,
    Xlsx, // XLSX/XLSM
    Xls,
    Ods,
}

impl BomFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "XLSX",
            Self::Xls => "XLS",
            Self::Ods => "ODS",
        }
    }
}

/// Parsed BOM with the file it came from
#[derive(Debug, Clone)]
pub struct ParsedBom {
    pub filename: String,
    pub format: BomFormat,
    pub dataset: Dataset,
    pub parse_warnings: Vec<String>,
}

impl ParsedBom {
    pub fn total_rows(&self) -> usize {
        self.dataset.len()
    }
}

/// Main BOM parser
#[derive(Debug, Clone, Default)]
pub struct BomParser;

impl BomParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a BOM file from disk. Every failure is a workbook or
    /// I/O error naming the path.
    pub fn parse_path(&self, path: &Path) -> BomcodeResult<ParsedBom> {
        let display = path.display().to_string();
        let format = BomFormat::from_extension(path).ok_or_else(|| {
            BomcodeError::workbook(&display, "Unsupported file extension (expected xlsx, xlsm, xls, ods or csv)")
        })?;

        let data = std::fs::read(path).map_err(|e| BomcodeError::io(&display, e.to_string()))?;

        self.parse_bytes(&display, &data, Some(format))
            .map_err(|e| BomcodeError::workbook(&display, format!("{:#}", e)))
    }

    /// Parse BOM file from bytes
    pub fn parse_bytes(&self, filename: &str, data: &[u8], format: Option<BomFormat>) -> Result<ParsedBom> {
        let format = format
            .or_else(|| BomFormat::from_extension(Path::new(filename)))
            .context("Could not determine file format")?;

        match format {
            BomFormat::Csv => self.parse_csv(filename, data),
            BomFormat::Xlsx => {
                let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e| anyhow!("Failed to open XLSX workbook: {}", e))?;
                self.parse_workbook::<Cursor<&[u8]>, _>(filename, format, workbook)
            }
            BomFormat::Xls => {
                let workbook: Xls<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e| anyhow!("Failed to open XLS workbook: {}", e))?;
                self.parse_workbook::<Cursor<&[u8]>, _>(filename, format, workbook)
            }
            BomFormat::Ods => {
                let workbook: Ods<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e| anyhow!("Failed to open ODS workbook: {}", e))?;
                self.parse_workbook::<Cursor<&[u8]>, _>(filename, format, workbook)
            }
        }
    }

    /// Parse CSV format
    fn parse_csv(&self, filename: &str, data: &[u8]) -> Result<ParsedBom> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader.headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(anyhow!("CSV file has no header row"));
        }

        let mut dataset = Dataset::new(headers);
        let mut warnings = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    if record.len() > dataset.columns.len() {
                        warnings.push(format!(
                            "Row {}: {} extra values ignored",
                            idx + 2,
                            record.len() - dataset.columns.len()
                        ));
                    }
                    let row = record.iter()
                        .map(|v| if v.is_empty() { CellValue::Empty } else { CellValue::text(v) })
                        .collect();
                    dataset.push_row(row);
                }
                Err(e) => {
                    warnings.push(format!("Row {}: Parse error - {}", idx + 2, e));
                }
            }
        }

        Ok(ParsedBom {
            filename: filename.to_string(),
            format: BomFormat::Csv,
            dataset,
            parse_warnings: warnings,
        })
    }

    /// Parse the first worksheet of any calamine workbook
    fn parse_workbook<RS, R>(&self, filename: &str, format: BomFormat, mut workbook: R) -> Result<ParsedBom>
    where
        RS: Read + Seek,
        R: Reader<RS>,
        R::Error: std::fmt::Display,
    {
        let range = workbook.worksheet_range_at(0)
            .context("No sheets found in workbook")?
            .map_err(|e| anyhow!("Failed to read worksheet: {}", e))?;

        let dataset = range_to_dataset(&range)?;

        Ok(ParsedBom {
            filename: filename.to_string(),
            format,
            dataset,
            parse_warnings: Vec::new(),
        })
    }
}

fn range_to_dataset(range: &Range<DataType>) -> Result<Dataset> {
    let mut rows_iter = range.rows();

    // First row is headers
    let headers: Vec<String> = rows_iter.next()
        .context("Empty worksheet")?
        .iter()
        .map(|cell: &DataType| cell.to_string())
        .collect();

    let mut dataset = Dataset::new(headers);
    for row in rows_iter {
        dataset.push_row(row.iter().map(cell_value).collect());
    }
    Ok(dataset)
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) if s.is_empty() => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Int(*i),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Bool(b) => CellValue::Bool(*b),
        // Serial date values keep their number
        DataType::DateTime(f) => CellValue::Number(*f),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(BomFormat::from_extension(Path::new("BOM.csv")), Some(BomFormat::Csv));
        assert_eq!(BomFormat::from_extension(Path::new("BOM.xlsx")), Some(BomFormat::Xlsx));
        assert_eq!(BomFormat::from_extension(Path::new("BOM.XLSM")), Some(BomFormat::Xlsx));
        assert_eq!(BomFormat::from_extension(Path::new("BOM.xls")), Some(BomFormat::Xls));
        assert_eq!(BomFormat::from_extension(Path::new("BOM.ods")), Some(BomFormat::Ods));
        assert_eq!(BomFormat::from_extension(Path::new("BOM.txt")), None);
        assert_eq!(BomFormat::from_extension(Path::new("BOM")), None);
    }

    #[test]
    fn test_csv_parsing_keeps_header_case() {
        let csv_data = b"Designator,Manufacturer Part #,Quantity\nR1,RC0603FR-0710KL,4\nU1,,1";

        let parser = BomParser::new();
        let result = parser.parse_csv("BOM.csv", csv_data).unwrap();

        assert_eq!(result.total_rows(), 2);
        assert_eq!(result.dataset.columns, vec!["Designator", "Manufacturer Part #", "Quantity"]);
        assert_eq!(result.dataset.rows[0][1], CellValue::text("RC0603FR-0710KL"));
        assert_eq!(result.dataset.rows[1][1], CellValue::Empty);
    }

    #[test]
    fn test_header_text_is_kept_verbatim() {
        let csv_data = b" Designator ,Manufacturer Part # \nR1,NE555\n";
        let result = BomParser::new().parse_csv("BOM.csv", csv_data).unwrap();

        assert_eq!(result.dataset.columns, vec![" Designator ", "Manufacturer Part # "]);
        assert_eq!(result.dataset.column_index("Manufacturer Part #"), Some(1));
    }

    #[test]
    fn test_csv_short_and_long_rows() {
        let csv_data = b"A,B\n1\n2,3,4";
        let result = BomParser::new().parse_csv("BOM.csv", csv_data).unwrap();

        assert_eq!(result.dataset.rows[0], vec![CellValue::text("1"), CellValue::Empty]);
        assert_eq!(result.dataset.rows[1], vec![CellValue::text("2"), CellValue::text("3")]);
        assert_eq!(result.parse_warnings.len(), 1);
    }

    #[test]
    fn test_garbage_workbook_is_rejected() {
        let parser = BomParser::new();
        let err = parser.parse_bytes("BOM.xlsx", b"not a zip archive", None).unwrap_err();
        assert!(err.to_string().contains("Failed to open XLSX workbook"));
    }

    #[test]
    fn test_unknown_extension_is_workbook_error() {
        let err = BomParser::new().parse_path(Path::new("BOM.txt")).unwrap_err();
        assert_eq!(err.error_code(), "WORKBOOK_ERROR");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BomParser::new()
            .parse_path(Path::new("definitely/not/here/BOM.xlsx"))
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&DataType::Empty), CellValue::Empty);
        assert_eq!(cell_value(&DataType::String(String::new())), CellValue::Empty);
        assert_eq!(cell_value(&DataType::Float(0.1)), CellValue::Number(0.1));
        assert_eq!(cell_value(&DataType::Int(7)), CellValue::Int(7));
    }

    proptest! {
        /// Every CSV data line becomes exactly one dataset row, in order
        #[test]
        fn prop_csv_row_count_and_order(parts in prop::collection::vec("[A-Z]{2}[0-9]{3,6}", 1..30)) {
            let mut csv = String::from("Manufacturer Part #\n");
            for part in &parts {
                csv.push_str(part);
                csv.push('\n');
            }
            let result = BomParser::new().parse_csv("BOM.csv", csv.as_bytes()).unwrap();

            prop_assert_eq!(result.total_rows(), parts.len());
            for (row, part) in result.dataset.rows.iter().zip(&parts) {
                prop_assert_eq!(&row[0], &CellValue::Text(part.clone()));
            }
        }
    }
}

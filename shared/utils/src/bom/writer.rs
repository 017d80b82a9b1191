//! BOM File Writer
//!
//! Writes a dataset as XLSX or CSV. Output goes to a temporary file in the
//! destination directory which is then renamed over the target, so readers
//! never see a half-written file.

use bomcode_models::{CellValue, Dataset};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::parser::BomFormat;
use crate::error::{BomcodeError, BomcodeResult};

const SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Default)]
pub struct BomWriter;

impl BomWriter {
    pub fn new() -> Self {
        Self
    }

    /// Output format for `path`; only XLSX and CSV can be written
    pub fn output_format(path: &Path) -> BomcodeResult<BomFormat> {
        match BomFormat::from_extension(path) {
            Some(format @ (BomFormat::Xlsx | BomFormat::Csv)) => Ok(format),
            _ => Err(BomcodeError::validation(
                "output_path",
                format!("Cannot write {}: output must be .xlsx or .csv", path.display()),
            )),
        }
    }

    pub fn write(&self, dataset: &Dataset, path: &Path) -> BomcodeResult<()> {
        let target = path.display().to_string();
        let format = Self::output_format(path)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| BomcodeError::io(&target, e.to_string()))?;

        match format {
            BomFormat::Csv => write_csv(dataset, tmp.as_file_mut())
                .map_err(|e| BomcodeError::io(&target, e.to_string()))?,
            _ => write_xlsx(dataset, tmp.path())
                .map_err(|e| BomcodeError::workbook(&target, e.to_string()))?,
        }

        tmp.persist(path)
            .map_err(|e| BomcodeError::io(&target, e.error.to_string()))?;

        tracing::debug!(path = %target, rows = dataset.len(), format = format.name(), "Wrote dataset");
        Ok(())
    }
}

fn write_csv<W: Write>(dataset: &Dataset, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&dataset.columns)?;
    for row in &dataset.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(dataset: &Dataset, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in dataset.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col)?, name.as_str(), &header)?;
    }

    for (idx, row) in dataset.rows.iter().enumerate() {
        let row_number = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_number, column_number(col)?, cell)?;
        }
    }

    workbook.save(path)
}

fn column_number(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        CellValue::Int(value) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        CellValue::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        CellValue::Text(value) => {
            worksheet.write_string(row, col, value.as_str())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::BomParser;

    fn sample() -> Dataset {
        let mut dataset = Dataset::new(vec![
            "Designator".to_string(),
            "Manufacturer Part #".to_string(),
            "Qty".to_string(),
            "ComponentCode".to_string(),
        ]);
        dataset.push_row(vec!["R1".into(), "RC0603FR-0710KL".into(), CellValue::Int(4), "C98220".into()]);
        dataset.push_row(vec!["U1".into(), "UNKNOWN-999".into(), CellValue::Number(1.5), CellValue::Empty]);
        dataset
    }

    #[test]
    fn test_output_format() {
        assert_eq!(BomWriter::output_format(Path::new("out.xlsx")).unwrap(), BomFormat::Xlsx);
        assert_eq!(BomWriter::output_format(Path::new("out.csv")).unwrap(), BomFormat::Csv);
        assert!(BomWriter::output_format(Path::new("out.xls")).is_err());
        assert!(BomWriter::output_format(Path::new("out")).is_err());
    }

    #[test]
    fn test_xlsx_written_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        BomWriter::new().write(&sample(), &path).unwrap();
        let parsed = BomParser::new().parse_path(&path).unwrap();

        assert_eq!(parsed.dataset.columns, sample().columns);
        assert_eq!(parsed.dataset.len(), 2);
        assert_eq!(parsed.dataset.rows[0][1], CellValue::text("RC0603FR-0710KL"));
        assert_eq!(parsed.dataset.rows[0][2], CellValue::Number(4.0));
        assert_eq!(parsed.dataset.rows[0][3], CellValue::text("C98220"));
        assert_eq!(parsed.dataset.rows[1][3], CellValue::Empty);
    }

    #[test]
    fn test_csv_written_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        BomWriter::new().write(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Designator,Manufacturer Part #,Qty,ComponentCode"));
        assert_eq!(lines.next(), Some("R1,RC0603FR-0710KL,4,C98220"));
        assert_eq!(lines.next(), Some("U1,UNKNOWN-999,1.5,"));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        BomWriter::new().write(&sample(), &path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = BomWriter::new().write(&sample(), &path).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("out.csv"));
    }
}

//! Part Number Extractor
//!
//! Pulls the lookup identifier out of every BOM row and deduplicates them, so
//! the lookup stage knows how many distinct searches a batch needs.

use std::collections::HashSet;

use bomcode_models::Dataset;

/// Identifier of one BOM row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartEntry {
    /// 1-based spreadsheet row, the header being row 1
    pub row_number: usize,
    /// `None` when the cell was blank
    pub identifier: Option<String>,
}

/// Extraction result
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// One entry per dataset row, in row order
    pub entries: Vec<PartEntry>,
    /// Distinct identifiers in first-seen order
    pub distinct: Vec<String>,
    pub duplicate_count: usize,
    pub blank_count: usize,
    pub warnings: Vec<String>,
}

/// Identifier extractor with deduplication
#[derive(Debug, Clone, Default)]
pub struct PartNumberExtractor;

impl PartNumberExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract identifiers from the column at `column_index`
    pub fn extract(&self, dataset: &Dataset, column_index: usize) -> ExtractionResult {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(dataset.len());
        let mut distinct = Vec::new();
        let mut warnings = Vec::new();
        let mut duplicate_count = 0;
        let mut blank_count = 0;

        for (idx, row) in dataset.rows.iter().enumerate() {
            let row_number = idx + 2;
            let identifier = row.get(column_index).and_then(|cell| cell.as_identifier());

            match &identifier {
                Some(id) => {
                    if seen.insert(id.clone()) {
                        distinct.push(id.clone());
                    } else {
                        duplicate_count += 1;
                    }
                }
                None => {
                    blank_count += 1;
                    warnings.push(format!("Row {}: Missing part number, skipped", row_number));
                }
            }

            entries.push(PartEntry { row_number, identifier });
        }

        ExtractionResult {
            entries,
            distinct,
            duplicate_count,
            blank_count,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomcode_models::CellValue;

    #[test]
    fn test_duplicates_are_counted_once() {
        let mut dataset = Dataset::new(vec!["Manufacturer Part #".to_string()]);
        for part in ["ACME-100", "ACME-100", "UNKNOWN-999"] {
            dataset.push_row(vec![part.into()]);
        }
        dataset.push_row(vec![CellValue::Empty]);

        let result = PartNumberExtractor::new().extract(&dataset, 0);

        assert_eq!(result.entries.len(), 4);
        assert_eq!(result.distinct, vec!["ACME-100", "UNKNOWN-999"]);
        assert_eq!(result.duplicate_count, 1);
        assert_eq!(result.blank_count, 1);
        assert_eq!(result.entries[3], PartEntry { row_number: 5, identifier: None });
        assert_eq!(result.warnings, vec!["Row 5: Missing part number, skipped"]);
    }

    #[test]
    fn test_numeric_part_numbers() {
        let mut dataset = Dataset::new(vec!["Manufacturer Part #".to_string()]);
        dataset.push_row(vec![CellValue::Number(2222.0)]);
        let result = PartNumberExtractor::new().extract(&dataset, 0);
        assert_eq!(result.entries[0].identifier.as_deref(), Some("2222"));
    }
}

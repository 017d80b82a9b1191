//! BOM Validator
//!
//! Checks that a parsed BOM can be enriched: the part number column must be
//! present, and part numbers the search will see differently than written are
//! reported. Blank rows are reported by the extractor.

use bomcode_models::Dataset;

use super::parser::ParsedBom;
use crate::error::{BomcodeError, BomcodeResult};

/// Characters passed through to the search URL without escaping
const UNESCAPED_RESERVED: &[char] = &['#', '&', '+', '/', '?', '%'];

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

/// Single validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub row: Option<usize>,
    pub field: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Validation result for a BOM
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub error_count: usize,
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
}

/// BOM validator
#[derive(Debug, Clone)]
pub struct BomValidator {
    identifier_column: String,
}

impl Default for BomValidator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_IDENTIFIER_COLUMN)
    }
}

impl BomValidator {
    pub fn new(identifier_column: impl Into<String>) -> Self {
        Self {
            identifier_column: identifier_column.into(),
        }
    }

    pub fn identifier_column(&self) -> &str {
        &self.identifier_column
    }

    /// Hard precondition: the identifier column exists. Returns its index.
    pub fn require_identifier_column(&self, dataset: &Dataset) -> BomcodeResult<usize> {
        dataset
            .column_index(&self.identifier_column)
            .ok_or_else(|| BomcodeError::missing_column(&self.identifier_column, &dataset.columns))
    }

    /// Validate parsed BOM
    pub fn validate(&self, bom: &ParsedBom) -> ValidationResult {
        let mut issues = Vec::new();
        let dataset = &bom.dataset;

        match dataset.column_index(&self.identifier_column) {
            None => issues.push(ValidationIssue {
                severity: ValidationSeverity::Error,
                row: None,
                field: Some(self.identifier_column.clone()),
                message: format!("Missing required column '{}'", self.identifier_column),
                suggestion: Some(format!(
                    "Rename the part number column to '{}' or pass --identifier-column",
                    self.identifier_column
                )),
            }),
            Some(idx) => {
                for (i, row) in dataset.rows.iter().enumerate() {
                    let Some(identifier) = row.get(idx).and_then(|cell| cell.as_identifier()) else {
                        continue;
                    };
                    if identifier.contains(UNESCAPED_RESERVED) {
                        issues.push(ValidationIssue {
                            severity: ValidationSeverity::Info,
                            row: Some(i + 2),
                            field: Some(self.identifier_column.clone()),
                            message: format!("Part number '{}' contains URL reserved characters", identifier),
                            suggestion: Some("Only spaces are escaped; the search may match a different part".to_string()),
                        });
                    } else if identifier.trim() != identifier {
                        issues.push(ValidationIssue {
                            severity: ValidationSeverity::Warning,
                            row: Some(i + 2),
                            field: Some(self.identifier_column.clone()),
                            message: format!("Part number '{}' has leading or trailing whitespace", identifier),
                            suggestion: Some("The part number is searched exactly as written; trim the cell".to_string()),
                        });
                    }
                }
            }
        }

        if dataset.is_empty() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Warning,
                row: None,
                field: None,
                message: "BOM has no data rows".to_string(),
                suggestion: None,
            });
        }

        let error_count = issues.iter().filter(|i| i.severity == ValidationSeverity::Error).count();
        let warning_count = issues.iter().filter(|i| i.severity == ValidationSeverity::Warning).count();

        ValidationResult {
            error_count,
            warning_count,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::BomParser;

    fn parse(csv: &str) -> ParsedBom {
        BomParser::new().parse_bytes("BOM.csv", csv.as_bytes(), None).unwrap()
    }

    #[test]
    fn test_missing_column_is_error() {
        let bom = parse("Designator,Part\nR1,RC0603\n");
        let validator = BomValidator::default();
        let result = validator.validate(&bom);

        assert_eq!(result.error_count, 1);
        let issue = &result.issues[0];
        assert_eq!(issue.field.as_deref(), Some("Manufacturer Part #"));
        assert!(issue.suggestion.as_deref().unwrap().contains("--identifier-column"));

        let err = validator.require_identifier_column(&bom.dataset).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_COLUMN");
        assert!(err.to_string().contains("'Manufacturer Part #'"));
        assert!(err.to_string().contains("Designator, Part"));
    }

    #[test]
    fn test_reserved_and_padded_identifiers() {
        let bom = parse("Designator,Manufacturer Part #\nR1,RC0603\nR2,\nJ1,USB C/F#2\nU1, NE555\n");
        let result = BomValidator::default().validate(&bom);

        assert_eq!(result.error_count, 0);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].severity, ValidationSeverity::Info);
        assert_eq!(result.issues[0].row, Some(4));
        assert_eq!(result.issues[1].severity, ValidationSeverity::Warning);
        assert_eq!(result.issues[1].row, Some(5));
        assert_eq!(result.warning_count, 1);
    }

    #[test]
    fn test_custom_column_name() {
        let bom = parse("MPN\nNE555\n");
        let validator = BomValidator::new("MPN");
        assert_eq!(validator.require_identifier_column(&bom.dataset).unwrap(), 0);
        assert_eq!(validator.validate(&bom).error_count, 0);
    }
}

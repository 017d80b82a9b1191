//! BOM (Bill of Materials) Processing Module
//!
//! Reads BOM sheets into a [`Dataset`](bomcode_models::Dataset), checks the
//! part number column, pulls out the identifiers to look up, and writes the
//! enriched sheet back out.
//! Supports Excel (XLSX/XLSM/XLS), OpenDocument (ODS) and CSV input;
//! XLSX and CSV output.

pub mod parser;
pub mod extractor;
pub mod validator;
pub mod writer;

pub use parser::{BomParser, BomFormat, ParsedBom};
pub use extractor::{PartNumberExtractor, PartEntry, ExtractionResult};
pub use validator::{BomValidator, ValidationResult, ValidationIssue, ValidationSeverity};
pub use writer::BomWriter;

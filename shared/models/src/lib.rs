//! # bomcode Domain Models
//!
//! Data types shared by the BOM utilities and the component lookup service.
//!
//! ## Key Models
//!
//! - **Dataset / CellValue**: an in-memory BOM sheet, header plus ordered rows
//! - **LookupOutcome**: a completed lookup, either a component code or not found
//! - **LookupFailure**: a classified lookup that never reached extraction
//! - **RowStatus**: what enrichment recorded for one row
//! - **EnrichmentReport**: totals, failures and cache counters of a run

pub mod component;
pub mod dataset;
pub mod report;


pub use component::*;
pub use dataset::*;
pub use report::*;

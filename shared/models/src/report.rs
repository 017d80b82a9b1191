//! Enrichment run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::{LookupFailure, RowStatus};

/// Cache counters captured at the end of a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A row whose lookup failed but did not abort the batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowFailure {
    /// 1-based spreadsheet row, counting the header as row 1
    pub row_number: usize,
    pub failure: LookupFailure,
}

/// Summary of one enrichment pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub run_id: Uuid,
    pub input_path: String,
    pub output_path: String,
    pub identifier_column: String,
    pub result_column: String,
    pub total_rows: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub failed: usize,
    pub distinct_identifiers: usize,
    pub failures: Vec<RowFailure>,
    pub cache: CacheStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EnrichmentReport {
    pub fn new(
        input_path: impl Into<String>,
        output_path: impl Into<String>,
        identifier_column: impl Into<String>,
        result_column: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            identifier_column: identifier_column.into(),
            result_column: result_column.into(),
            total_rows: 0,
            resolved: 0,
            not_found: 0,
            skipped: 0,
            failed: 0,
            distinct_identifiers: 0,
            failures: Vec::new(),
            cache: CacheStats::default(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Tallies one row. `row_number` is the spreadsheet row of the entry.
    pub fn record(&mut self, row_number: usize, status: &RowStatus) {
        self.total_rows += 1;
        match status {
            RowStatus::Resolved { .. } => self.resolved += 1,
            RowStatus::NotFound => self.not_found += 1,
            RowStatus::Skipped => self.skipped += 1,
            RowStatus::Failed { failure } => {
                self.failed += 1;
                self.failures.push(RowFailure {
                    row_number,
                    failure: failure.clone(),
                });
            }
        }
    }

    pub fn finish(&mut self, cache: CacheStats) {
        self.cache = cache;
        self.finished_at = Utc::now();
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

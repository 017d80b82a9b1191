//! Enrichment Service
//!
//! Core batch logic: load a BOM, check the part number column, resolve every
//! row to a component code and write the sheet back with the codes appended.

use bomcode_models::{CellValue, EnrichmentReport, RowStatus};
use bomcode_utils::{
    AppConfig, BomParser, BomValidator, BomWriter, BomcodeError, BomcodeResult, FailurePolicy,
    PartEntry, PartNumberExtractor, ValidationSeverity,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

use crate::backend::SearchBackend;
use crate::jlc_client::JlcSearchClient;
use crate::resolver::ComponentResolver;

pub struct EnrichmentService {
    resolver: ComponentResolver,
    parser: BomParser,
    validator: BomValidator,
    extractor: PartNumberExtractor,
    writer: BomWriter,
    result_column: String,
    max_concurrency: usize,
    failure_policy: FailurePolicy,
}

impl EnrichmentService {
    pub fn new(config: &AppConfig, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            resolver: ComponentResolver::new(backend, config.lookup.cache_capacity),
            parser: BomParser::new(),
            validator: BomValidator::new(config.enrichment.identifier_column.clone()),
            extractor: PartNumberExtractor::new(),
            writer: BomWriter::new(),
            result_column: config.enrichment.result_column.clone(),
            max_concurrency: config.lookup.max_concurrency.max(1),
            failure_policy: config.enrichment.on_lookup_failure,
        }
    }

    /// Service backed by the live JLCPCB search client
    pub fn from_config(config: &AppConfig) -> BomcodeResult<Self> {
        let client = JlcSearchClient::new(&config.lookup)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Enrich `input` into `output`. Every call rereads the input; only
    /// individual lookups are cached.
    pub async fn enrich(&self, input: &Path, output: &Path) -> BomcodeResult<EnrichmentReport> {
        let mut report = EnrichmentReport::new(
            input.display().to_string(),
            output.display().to_string(),
            self.validator.identifier_column(),
            self.result_column.as_str(),
        );
        let span = tracing::info_span!("enrich", run_id = %report.run_id);

        self.run(input, output, &mut report).instrument(span).await?;
        Ok(report)
    }

    async fn run(&self, input: &Path, output: &Path, report: &mut EnrichmentReport) -> BomcodeResult<()> {
        BomWriter::output_format(output)?;

        let parsed = self.parser.parse_path(input)?;
        for warning in &parsed.parse_warnings {
            tracing::warn!(path = %input.display(), "{}", warning);
        }

        let column_index = self.validator.require_identifier_column(&parsed.dataset)?;
        let validation = self.validator.validate(&parsed);
        for issue in &validation.issues {
            let column = issue.field.as_deref();
            let hint = issue.suggestion.as_deref();
            match issue.severity {
                ValidationSeverity::Error => tracing::error!(row = ?issue.row, field = column, suggestion = hint, "{}", issue.message),
                ValidationSeverity::Warning => tracing::warn!(row = ?issue.row, field = column, suggestion = hint, "{}", issue.message),
                ValidationSeverity::Info => tracing::info!(row = ?issue.row, field = column, suggestion = hint, "{}", issue.message),
            }
        }

        let extraction = self.extractor.extract(&parsed.dataset, column_index);
        for warning in &extraction.warnings {
            tracing::warn!(path = %input.display(), "{}", warning);
        }

        report.distinct_identifiers = extraction.distinct.len();
        tracing::info!(
            path = %input.display(),
            format = parsed.format.name(),
            rows = parsed.total_rows(),
            distinct = extraction.distinct.len(),
            duplicates = extraction.duplicate_count,
            blank = extraction.blank_count,
            validation_errors = validation.error_count,
            validation_warnings = validation.warning_count,
            "Resolving component codes"
        );

        let statuses = self.resolve_entries(&extraction.entries).await?;

        let mut values = Vec::with_capacity(statuses.len());
        for (entry, status) in extraction.entries.iter().zip(&statuses) {
            report.record(entry.row_number, status);
            values.push(CellValue::from(status.code().map(str::to_string)));
        }

        let mut dataset = parsed.dataset;
        dataset
            .set_column(self.result_column.as_str(), values)
            .map_err(|e| BomcodeError::validation("result_column", e.to_string()))?;

        self.writer.write(&dataset, output)?;
        report.finish(self.resolver.cache_stats());

        tracing::info!(
            resolved = report.resolved,
            not_found = report.not_found,
            skipped = report.skipped,
            failed = report.failed,
            "Results saved to {}",
            output.display()
        );
        Ok(())
    }

    /// Resolve all rows with at most `max_concurrency` lookups in flight.
    /// Statuses come back in row order.
    async fn resolve_entries(&self, entries: &[PartEntry]) -> BomcodeResult<Vec<RowStatus>> {
        stream::iter(entries)
            .map(|entry| self.resolve_entry(entry))
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }

    async fn resolve_entry(&self, entry: &PartEntry) -> BomcodeResult<RowStatus> {
        let Some(identifier) = entry.identifier.as_deref() else {
            return Ok(RowStatus::Skipped);
        };

        match self.resolver.resolve(identifier).await {
            Ok(outcome) => Ok(outcome.into()),
            Err(failure) => match self.failure_policy {
                FailurePolicy::Abort => {
                    tracing::error!(row = entry.row_number, error = %failure, "Lookup failed, aborting batch");
                    Err(failure.into())
                }
                FailurePolicy::Skip => {
                    tracing::warn!(
                        row = entry.row_number,
                        identifier = %identifier,
                        kind = %failure.kind,
                        "Lookup failed, leaving row empty: {}",
                        failure.message
                    );
                    Ok(RowStatus::Failed { failure })
                }
            },
        }
    }
}

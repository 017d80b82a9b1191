//! bomcode CLI
//!
//! Adds JLCPCB component codes to a BOM spreadsheet.

use anyhow::{Context, Result};
use bomcode_lookup::EnrichmentService;
use bomcode_models::EnrichmentReport;
use bomcode_utils::{init_logging, validate_config, AppConfig, BomcodeError, FailurePolicy};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "bomcode", version, about = "Add JLCPCB component codes to a BOM spreadsheet")]
struct Cli {
    /// Input BOM (xlsx, xlsm, xls, ods or csv)
    input: PathBuf,

    /// Where to write the enriched BOM (xlsx or csv)
    output: PathBuf,

    /// Extra configuration file, layered over config/default
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Column holding the manufacturer part numbers
    #[arg(long, value_name = "NAME")]
    identifier_column: Option<String>,

    /// Maximum number of cached lookups
    #[arg(long, value_name = "N")]
    cache_capacity: Option<usize>,

    /// Maximum number of lookups in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Abort the whole batch on the first failed lookup
    #[arg(long)]
    fail_fast: bool,

    /// Also write the run report as JSON
    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "bomcode_lookup=trace"
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(column) = &self.identifier_column {
            config.enrichment.identifier_column = column.clone();
        }
        if let Some(capacity) = self.cache_capacity {
            config.lookup.cache_capacity = capacity;
        }
        if let Some(concurrency) = self.concurrency {
            config.lookup.max_concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout_secs {
            config.lookup.timeout_seconds = timeout;
        }
        if self.fail_fast {
            config.enrichment.on_lookup_failure = FailurePolicy::Abort;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "bomcode failed");
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<BomcodeError>()
                .map(BomcodeError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load_with(cli.config.as_deref()).map_err(BomcodeError::from)?;
    cli.apply(&mut config);
    validate_config(&config)?;

    init_logging(&config.logging)?;
    info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        cache_capacity = config.lookup.cache_capacity,
        concurrency = config.lookup.max_concurrency,
        "Starting bomcode"
    );

    let service = EnrichmentService::from_config(&config)?;
    let report = service.enrich(&cli.input, &cli.output).await?;

    print_summary(&report);

    if let Some(path) = &cli.summary_json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    Ok(())
}

fn print_summary(report: &EnrichmentReport) {
    println!("Results saved to {}", report.output_path);
    println!(
        "{} rows ({} distinct part numbers): {} resolved, {} not found, {} skipped, {} failed",
        report.total_rows,
        report.distinct_identifiers,
        report.resolved,
        report.not_found,
        report.skipped,
        report.failed
    );
    if report.has_failures() {
        println!("Failed lookups:");
        for row in &report.failures {
            println!("  row {}: {}", row.row_number, row.failure);
        }
    }
    println!(
        "Cache: {} hits, {} misses, {} evictions ({:.0}% hit rate), finished in {} ms",
        report.cache.hits,
        report.cache.misses,
        report.cache.evictions,
        report.cache.hit_rate() * 100.0,
        report.duration_ms()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_required() {
        assert!(Cli::try_parse_from(["bomcode"]).is_err());
        assert!(Cli::try_parse_from(["bomcode", "BOM.xlsx"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "bomcode",
            "BOM.xlsx",
            "out.xlsx",
            "--identifier-column",
            "MPN",
            "--cache-capacity",
            "500",
            "--concurrency",
            "1",
            "--timeout-secs",
            "0",
            "--fail-fast",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(cli.input, PathBuf::from("BOM.xlsx"));
        assert_eq!(config.enrichment.identifier_column, "MPN");
        assert_eq!(config.lookup.cache_capacity, 500);
        assert_eq!(config.lookup.max_concurrency, 1);
        assert_eq!(config.lookup.timeout_seconds, 0);
        assert_eq!(config.enrichment.on_lookup_failure, FailurePolicy::Abort);
    }

    #[test]
    fn test_defaults_untouched_without_flags() {
        let cli = Cli::try_parse_from(["bomcode", "BOM.xlsx", "out.xlsx"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.lookup.cache_capacity, 100);
        assert_eq!(config.enrichment.on_lookup_failure, FailurePolicy::Skip);
    }
}

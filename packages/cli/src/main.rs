#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the case desk.
//!
//! Every command takes the acting user's role first. Scope is computed
//! before any filter flag is considered, and a denied scope stops the
//! command before any report is read or any option is fetched.

mod args;
mod config;
mod input;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use casewatch_analytics::aggregate_canonical;
use casewatch_analytics_models::Distribution;
use casewatch_export::{compose, write_csv};
use casewatch_filter::matching::{filter_reports, sort_reports};
use casewatch_filter::normalize::{split_multi, to_array_form};
use casewatch_filter::options::{CityCascade, ResolvedOptions, match_cities};
use casewatch_filter::provider::{HttpOptionProvider, OptionProvider, SnapshotOptionProvider};
use casewatch_filter::scope::{require_scope, submit};
use casewatch_filter_models::{FilterDimension, FilterSelection};
use casewatch_report::canonicalize_all;
use casewatch_report_models::Report;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use crate::args::{ExporterArgs, FilterArgs, ScopeArgs};
use crate::config::{CliConfig, ProviderSection};

#[derive(Parser)]
#[command(name = "casewatch", about = "Missing-persons case report tool")]
struct Cli {
    /// Path to a TOML config file (defaults to `CASEWATCH_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a report collection and compose an export document
    Export {
        /// JSON file with the report collection
        input: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Rows per page (overrides config)
        #[arg(long)]
        page_size: Option<usize>,
        /// Document title (overrides config)
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        exporter: ExporterArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Filter a report collection and print its aggregate summary
    Aggregate {
        /// JSON file with the report collection
        input: PathBuf,
        /// Print one distribution as a table instead of the full summary
        #[arg(long, value_parser = parse_distribution)]
        by: Option<Distribution>,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Print the scoped filter in the flat form sent to the backend
    Wire {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Resolve barangay and police-station options for cities
    Options {
        /// Comma-separated city names or codes
        #[arg(long)]
        cities: Option<String>,
        /// Address/station service root (overrides config)
        #[arg(long)]
        provider_url: Option<String>,
        /// JSON option snapshot (overrides config)
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[command(flatten)]
        scope: ScopeArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            input,
            format,
            output,
            page_size,
            title,
            exporter,
            filters,
            scope,
        } => {
            let mut options = config.export_options();
            if let Some(page_size) = page_size {
                options.page_size = page_size;
            }
            if let Some(title) = title {
                options.title = title;
            }
            if options.page_size == 0 {
                return Err("--page-size must be greater than 0".into());
            }

            let (selection, reports) = scoped_reports(&scope, &filters, &input)?;
            let document = compose(
                &reports,
                &selection,
                &exporter.profile(),
                &options,
                Utc::now(),
            );

            let mut out = open_output(output.as_deref())?;
            match format {
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &document)?;
                    writeln!(out)?;
                }
                OutputFormat::Csv => {
                    let rows: Vec<_> = document.rows().cloned().collect();
                    write_csv(&mut out, &rows)?;
                }
            }
            out.flush()?;
        }
        Commands::Aggregate {
            input,
            by,
            filters,
            scope,
        } => {
            let (_, reports) = scoped_reports(&scope, &filters, &input)?;
            let summary =
                aggregate_canonical(&canonicalize_all(&reports), config.export.top_cities);

            if let Some(distribution) = by {
                println!("{distribution} ({} reports)", summary.total);
                for bucket in summary.distribution(distribution) {
                    println!("{}\t{}\t{:.1}%", bucket.label, bucket.count, bucket.percent);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        Commands::Wire { filters, scope } => {
            let wire = submit(&scope.decision(), &filters.selection())?;
            println!("{}", serde_json::to_string_pretty(&wire)?);
            for (key, value) in wire.to_query_pairs() {
                log::debug!("{key}={value}");
            }
        }
        Commands::Options {
            cities,
            provider_url,
            snapshot,
            scope,
        } => {
            let mut provider_config = config.provider.clone();
            if provider_url.is_some() {
                provider_config.base_url = provider_url;
            }
            if snapshot.is_some() {
                provider_config.file = snapshot;
            }

            let resolved = resolve_options(&scope, cities.as_deref(), &provider_config).await?;
            for failure in &resolved.failures {
                eprintln!(
                    "warning: {:?} for {} unavailable: {}",
                    failure.kind, failure.city, failure.message
                );
            }
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
    }

    Ok(())
}

/// Applies the user's scope to the filter flags, then loads, filters, and
/// sorts the report collection with the scoped selection.
fn scoped_reports(
    scope: &ScopeArgs,
    filters: &FilterArgs,
    input: &Path,
) -> Result<(FilterSelection, Vec<Report>), Box<dyn std::error::Error>> {
    let wire = submit(&scope.decision(), &filters.selection())?;
    let selection = to_array_form(&wire);

    let reports = filter_reports(input::load_reports(input)?, &selection);
    let reports = sort_reports(
        reports,
        selection.sort_by.as_deref(),
        selection.sort_order.as_deref(),
    );
    log::info!("{} reports match the scoped filter", reports.len());

    Ok((selection, reports))
}

async fn resolve_options(
    scope: &ScopeArgs,
    cities: Option<&str>,
    config: &ProviderSection,
) -> Result<ResolvedOptions, Box<dyn std::error::Error>> {
    let decision = scope.decision();
    let locked = require_scope(&decision)?
        .forced_value(FilterDimension::City)
        .is_some();
    let wanted = split_multi(cities.unwrap_or_default());
    if !locked && wanted.is_empty() {
        return Ok(ResolvedOptions::default());
    }

    let provider = build_provider(config)?;
    let all = provider.cities().await?;
    let (mut cascade, initial) = CityCascade::for_scope(&decision, &all)?;

    let request = if let Some(request) = initial {
        if !wanted.is_empty() {
            log::warn!("City selection is fixed by the assigned city; ignoring --cities");
        }
        request
    } else {
        match cascade.select_cities(match_cities(&all, &wanted))? {
            Some(request) => request,
            None => return Ok(cascade.options().clone()),
        }
    };

    let response = request.resolve(provider.as_ref(), config.timeout()).await;
    cascade.apply(response);
    Ok(cascade.options().clone())
}

/// Parses a distribution name such as `status` or `ageCategory`.
fn parse_distribution(raw: &str) -> Result<Distribution, String> {
    raw.trim().parse().map_err(|_| {
        let names: Vec<&str> = Distribution::all().iter().map(AsRef::<str>::as_ref).collect();
        format!("unknown distribution {raw:?}, expected one of {}", names.join(", "))
    })
}

fn build_provider(
    config: &ProviderSection,
) -> Result<Box<dyn OptionProvider>, Box<dyn std::error::Error>> {
    if let Some(path) = &config.file {
        log::info!("Serving options from snapshot {}", path.display());
        return Ok(Box::new(SnapshotOptionProvider::from_path(path)?));
    }
    if let Some(url) = &config.base_url {
        log::info!("Fetching options from {url}");
        return Ok(Box::new(HttpOptionProvider::new(url.clone())));
    }
    Err("no option provider configured: set provider.base_url or provider.file".into())
}

fn open_output(path: Option<&Path>) -> std::io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            log::info!("Writing to {}", path.display());
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

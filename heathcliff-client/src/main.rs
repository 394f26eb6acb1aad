//! HEATHCLIFF entry point.
//!
//! Loads configuration, runs one command and writes the resulting table to
//! stdout as JSON lines.

use heathcliff_client::api_client::SearchAdsClient;
use heathcliff_client::command::{Command, Invocation};
use heathcliff_client::config::ClientConfig;
use heathcliff_client::error::CliError;
use heathcliff_core::ReportTable;
use heathcliff_reporting::{IoReporter, SearchAdsReporter};
use std::io::{self, Write};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Invocation {
        command,
        config_path,
    } = Invocation::from_args(std::env::args().skip(1))?;
    let config = ClientConfig::load(config_path.as_deref())?;
    let client = SearchAdsClient::new(&config.api)?;
    tracing::info!(base_url = %client.base_url(), ?command, "Starting HEATHCLIFF");

    let mut reporter = SearchAdsReporter::with_settings(client, config.reporter.clone());
    let report = config.report;
    let table = match command {
        Command::Entities => {
            let mut io = IoReporter::new(reporter);
            if let Some(granularities) = report.granularities.clone() {
                io = io.with_granularities(granularities);
            }
            if let Some(attributes) = report.attributes.clone() {
                io = io.with_attributes(attributes);
            }
            io.run().await?
        }
        Command::Report(kind) => {
            reporter
                .campaign_child_report(
                    kind,
                    &report.window(),
                    report.columns.as_deref(),
                    &report.overrides,
                )
                .await?
        }
    };

    write_json_lines(&table)?;
    tracing::info!(rows = table.len(), "Report written");
    Ok(())
}

fn write_json_lines(table: &ReportTable) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for row in &table.rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

//! Northgate scraper CLI entry point.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use northgate::{DateRange, FilterSpec, NorthgateClient};
use northgate_cli::{resolve_options, write_records, OptionOverrides, OutputFormat};

#[derive(Parser)]
#[command(
    name = "northgate",
    about = "Scrape planning applications from Northgate Planning Explorer portals",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG overrides it.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and write the matching applications as JSON.
    ///
    /// Only one of the received / validated / decided date ranges may be
    /// given per search.
    Scrape(ScrapeArgs),

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct ScrapeArgs {
    /// Absolute URL of the portal's search page
    /// (e.g. https://example.gov.uk/Northgate/PlanningExplorer/GeneralSearch.aspx).
    search_url: String,

    /// Text matched against the proposal description.
    #[arg(long)]
    keywords: Option<String>,

    /// Received on or after (YYYY-MM-DD).
    #[arg(long)]
    received_from: Option<NaiveDate>,
    /// Received on or before (YYYY-MM-DD).
    #[arg(long)]
    received_to: Option<NaiveDate>,

    /// Validated on or after (YYYY-MM-DD).
    #[arg(long)]
    validated_from: Option<NaiveDate>,
    /// Validated on or before (YYYY-MM-DD).
    #[arg(long)]
    validated_to: Option<NaiveDate>,

    /// Decided on or after (YYYY-MM-DD).
    #[arg(long)]
    decided_from: Option<NaiveDate>,
    /// Decided on or before (YYYY-MM-DD).
    #[arg(long)]
    decided_to: Option<NaiveDate>,

    /// Portal status code to filter on.
    #[arg(long)]
    status: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write records here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds. Also reads NORTHGATE_TIMEOUT_SECS.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Results page size. Also reads NORTHGATE_PAGE_SIZE.
    #[arg(long)]
    page_size: Option<u32>,

    /// User-Agent header. Also reads NORTHGATE_USER_AGENT.
    #[arg(long)]
    user_agent: Option<String>,

    /// Accept a non-200 results page instead of failing.
    #[arg(long)]
    no_results_status_check: bool,
}

impl ScrapeArgs {
    fn filter(&self) -> FilterSpec {
        FilterSpec {
            keywords: self.keywords.clone(),
            received: DateRange::new(self.received_from, self.received_to),
            validated: DateRange::new(self.validated_from, self.validated_to),
            decided: DateRange::new(self.decided_from, self.decided_to),
            status: self.status.clone(),
        }
    }

    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            timeout_secs: self.timeout_secs,
            user_agent: self.user_agent.clone(),
            page_size: self.page_size,
            skip_results_status_check: self.no_results_status_check,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scrape(args) => {
            let filter = args.filter();
            if let Err(e) = filter.validate() {
                tracing::error!("refusing search: {e}");
                std::process::exit(2);
            }

            let options = resolve_options(&args.overrides());
            tracing::info!("Using Northgate scraper: {}", args.search_url);

            let client = NorthgateClient::new(options)?;
            let report = match client.scrape(&args.search_url, &filter).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(kind = e.kind(), "scrape failed: {e}");
                    std::process::exit(1);
                }
            };

            if !report.row_errors.is_empty() {
                tracing::warn!("{} row(s) skipped", report.row_errors.len());
            }

            match &args.output {
                Some(path) => {
                    let mut out = BufWriter::new(File::create(path)?);
                    write_records(&mut out, &report.records, args.format)?;
                    tracing::info!("Wrote {} records to {}", report.records.len(), path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut out = stdout.lock();
                    write_records(&mut out, &report.records, args.format)?;
                    out.flush()?;
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "northgate", &mut std::io::stdout());
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use inn_enrich::batch::{summarize, BatchDriver};
use inn_enrich::config::LookupConfig;
use inn_enrich::report;
use inn_enrich::resolver::HttpResolver;
use inn_enrich::source::{self, SourceOptions};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "inn-enrich")]
#[command(about = "Enrich INN tax identifiers with company names from a public lookup service")]
struct Args {
    /// Input spreadsheet or CSV with one identifier per row
    #[arg(short, long, default_value = "inn_numbers.xlsx")]
    input: PathBuf,

    /// Report path (.xlsx or .csv); overwritten if it exists
    #[arg(short, long, default_value = "scraped_companies.xlsx")]
    output: PathBuf,

    /// Optional JSON file with the lookup configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lookup service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Query parameter carrying the identifier
    #[arg(long)]
    query_param: Option<String>,

    /// CSS selector for the element holding the display name
    #[arg(long)]
    selector: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// User-Agent header sent with each lookup
    #[arg(long)]
    user_agent: Option<String>,

    /// Number of concurrent lookups (1 = sequential)
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Worksheet holding the identifiers (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Zero-based column holding the identifiers
    #[arg(long, default_value_t = 0)]
    column: usize,

    /// Skip the first input row (header)
    #[arg(long)]
    skip_header: bool,
}

impl Args {
    fn lookup_config(&self) -> Result<LookupConfig> {
        let mut config = match &self.config {
            Some(path) => LookupConfig::load(path)?,
            None => LookupConfig::default(),
        };

        config.apply_env_overrides();

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(query_param) = &self.query_param {
            config.query_param = query_param.clone();
        }
        if let Some(selector) = &self.selector {
            config.selector = selector.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn source_options(&self) -> SourceOptions {
        SourceOptions {
            sheet: self.sheet.clone(),
            column: self.column,
            skip_header: self.skip_header,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("Starting the enrichment run...");

    // Load identifiers
    let identifiers = source::load_identifiers(&args.input, &args.source_options())?;
    info!("Loaded {} identifiers from {}", identifiers.len(), args.input.display());

    // Resolve the batch
    let config = args.lookup_config()?;
    let resolver = HttpResolver::new(config)?;
    let driver = BatchDriver::with_workers(resolver, args.workers);

    let started = Instant::now();
    let results = driver.run(&identifiers).await;

    // Write the report
    report::write_report(&args.output, &results)?;
    info!("Report written to {}", args.output.display());

    let summary = summarize(&results);
    println!("\n=== Enrichment Summary ===");
    println!("Identifiers:  {}", results.len());
    println!("Resolved:     {}", summary.resolved);
    println!("Not found:    {}", summary.not_found);
    println!("Fetch errors: {}", summary.fetch_errors);
    println!("Elapsed:      {:.2?}", started.elapsed());

    Ok(())
}

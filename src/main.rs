//! Trawl: Configurable Web-Crawling Engine
//!
//! Command-line front end for the crawl engine library.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use trawl::config::StoreBackend;
use trawl::{Config, CrawlReport, LogListener, Spider};

#[derive(Parser)]
#[command(name = "trawl")]
#[command(about = "Configurable web-crawling engine")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "trawl.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a crawl from the configured seed
    Crawl {
        /// Seed URL (overrides crawl.seed from the config file)
        #[arg(short, long)]
        seed: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Crawl { seed } => run_crawl(&cli.config, seed),
        Commands::Init { path } => init_config(&path),
    }
}

fn run_crawl(config_path: &Path, seed_override: Option<String>) -> Result<()> {
    // The seed override is applied before validation so a config file that
    // leaves crawl.seed to the command line still passes
    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(config_path)?;
        toml::from_str::<Config>(&content).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            )
        })?
    } else {
        Config::default()
    };

    if let Some(seed) = seed_override {
        config.crawl.seed = seed;
    }
    config.validate()?;

    let mut spider = Spider::from_config(&config)?;
    spider.subscribe(Box::new(LogListener));

    let run_id = spider.run_id().to_string();
    info!("Crawling {} (run {})", spider.seed_url(), run_id);

    let report = spider.crawl();
    print_report(&report);

    if let StoreBackend::File = config.store.backend {
        println!(
            "\nResources saved to: {}",
            config.store.root.join(&run_id).display()
        );
    }

    Ok(())
}

fn print_report(report: &CrawlReport) {
    println!("\nCrawl complete!");
    println!("===============");
    println!("Resources persisted: {}", report.persisted_count());
    println!("Resources filtered:  {}", report.filtered_count());
    println!("Requests failed:     {}", report.failed_count());

    if !report.filtered.is_empty() {
        println!("\nFiltered:");
        for (url, filter) in &report.filtered {
            println!("  {} ({})", url, filter);
        }
    }

    if !report.failed.is_empty() {
        println!("\nFailed:");
        for (url, error) in &report.failed {
            println!("  {}: {}", url, error);
        }
    }
}

fn init_config(path: &Path) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("trawl.toml");

    let toml_content = format!(
        r#"# Trawl Configuration

[crawl]
seed = ""
max_depth = {}
max_queue_size = {}
max_downloads = {}
traversal = "depth-first"
link_selector = "{}"

[fetch]
user_agent = "{}"
timeout_secs = {}
connect_timeout_secs = {}
max_redirects = {}
max_content_size = {}

[filter]
allowed_hosts = []
allow_subdomains = false
allowed_schemes = ["http", "https"]
allowed_ports = []
restrict_to_seed = false
skip_fragments = false
skip_queries = false
# max_age_secs = 86400

[politeness]
delay_ms = {}

[store]
backend = "memory"
root = "{}"
"#,
        config.crawl.max_depth,
        config.crawl.max_queue_size,
        config.crawl.max_downloads,
        config.crawl.link_selector,
        config.fetch.user_agent,
        config.fetch.timeout_secs,
        config.fetch.connect_timeout_secs,
        config.fetch.max_redirects,
        config.fetch.max_content_size,
        config.politeness.delay_ms,
        config.store.root.display(),
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}

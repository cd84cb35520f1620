//! CLI command definitions, routing, and tracing setup.

use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docdex_core::DocService;
use docdex_crawler::{IndexBuilder, SourceRegistry};
use docdex_shared::{AppConfig, CrawlLimits, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docdex — local search over vendor documentation.
#[derive(Parser)]
#[command(
    name = "docdex",
    version,
    about = "Crawl vendor documentation into locally searchable corpora.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl a documentation source and write its index artifact.
    Build {
        /// Source identifier (see `docdex sources`).
        #[arg(short, long)]
        source: String,

        /// Version label to crawl and tag the artifact with.
        #[arg(long, default_value = "2025")]
        version: String,

        /// Override the configured page cap.
        #[arg(long)]
        max_pages: Option<usize>,

        /// Override the configured depth ceiling.
        #[arg(long)]
        depth: Option<u32>,

        /// Abort the crawl after this many seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Search the loaded corpora.
    Search {
        /// Query string.
        query: String,

        /// Restrict to these source identifiers (repeatable).
        #[arg(short, long)]
        source: Vec<String>,

        /// Filter by version label.
        #[arg(long)]
        version: Option<String>,

        /// Filter by programming language (e.g. Java).
        #[arg(short, long)]
        language: Option<String>,

        /// Maximum results.
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
    },

    /// Fetch and print one documentation page as plain text.
    Page {
        /// Page URL.
        url: String,
    },

    /// List documentation sections with page counts.
    Sections {
        /// Filter by version label.
        #[arg(long)]
        version: Option<String>,

        /// Filter by programming language.
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List the registered documentation sources.
    Sources,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docdex=info",
        1 => "docdex=debug",
        _ => "docdex=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            source,
            version,
            max_pages,
            depth,
            deadline_secs,
        } => cmd_build(&source, &version, max_pages, depth, deadline_secs).await,
        Command::Search {
            query,
            source,
            version,
            language,
            max_results,
        } => {
            cmd_search(
                &query,
                &source,
                version.as_deref(),
                language.as_deref(),
                max_results,
            )
            .await
        }
        Command::Page { url } => cmd_page(&url).await,
        Command::Sections { version, language } => {
            cmd_sections(version.as_deref(), language.as_deref()).await
        }
        Command::Sources => cmd_sources(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    source: &str,
    version: &str,
    max_pages: Option<usize>,
    depth: Option<u32>,
    deadline_secs: Option<u64>,
) -> Result<()> {
    let config = load_config()?;
    let registry = SourceRegistry::new();

    let adapter = registry
        .get(source)
        .ok_or_else(|| eyre!("unknown source '{source}' (try `docdex sources`)"))?;

    let mut limits = CrawlLimits::from(&config);
    if let Some(pages) = max_pages {
        limits.max_pages = pages;
    }
    if let Some(d) = depth {
        limits.max_depth = d;
    }
    limits.deadline = deadline_secs.map(Duration::from_secs);

    info!(source, version, "building index");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
    );
    spinner.set_message(format!("crawling {}", adapter.display_name()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let builder = IndexBuilder::new(adapter, limits)?;
    let (artifact, summary) = builder.build(version).await?;

    spinner.finish_and_clear();

    let data_dir = docdex_shared::data_dir(&config)?;
    let path = data_dir.join(source).join(format!("index_{version}.json"));
    artifact.save(&path)?;

    println!();
    println!("  Index built for {source} {version}");
    println!("  Pages:   {}", summary.pages_indexed);
    println!("  Fetched: {}", summary.urls_fetched);
    println!("  Errors:  {}", summary.errors.len());
    println!("  Time:    {:.1}s", summary.duration.as_secs_f64());
    println!("  Path:    {}", path.display());
    println!();

    Ok(())
}

async fn cmd_search(
    query: &str,
    sources: &[String],
    version: Option<&str>,
    language: Option<&str>,
    max_results: Option<usize>,
) -> Result<()> {
    let config = load_config()?;
    let service = load_service(&config)?;

    let max = max_results.unwrap_or(config.defaults.max_results);
    let source_filter = (!sources.is_empty()).then_some(sources);
    let hits = service.search(query, source_filter, version, language, max);

    if hits.is_empty() {
        println!("No results for '{query}'.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} [{} / {} / {}] (score {:.2})",
            i + 1,
            hit.title,
            hit.vendor,
            hit.section,
            hit.language,
            hit.score
        );
        println!("   {}", hit.url);
        if !hit.content_preview.is_empty() {
            println!("   {}", hit.content_preview);
        }
    }

    Ok(())
}

async fn cmd_page(url: &str) -> Result<()> {
    let config = load_config()?;
    let service = load_service(&config)?;

    match service.fetch_page(url).await? {
        Some(page) => {
            println!("# {} ({})", page.title, page.vendor);
            if let Some(section) = &page.section {
                println!("Section: {section}");
            }
            println!();
            println!("{}", page.content);
        }
        None => println!("Page not found or not covered by any source: {url}"),
    }

    Ok(())
}

async fn cmd_sections(version: Option<&str>, language: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let service = load_service(&config)?;

    let sections = service.list_sections(version, language);
    if sections.is_empty() {
        println!("No sections loaded. Build an index first with `docdex build`.");
        return Ok(());
    }

    for section in sections {
        println!(
            "{:40} {:16} {:>4} pages",
            section.name, section.vendor, section.page_count
        );
    }

    Ok(())
}

fn cmd_sources() -> Result<()> {
    let registry = SourceRegistry::new();
    for adapter in registry.all() {
        println!(
            "{:10} {:16} versions: {:?}  languages: {:?}",
            adapter.source_id(),
            adapter.display_name(),
            adapter.supported_versions(),
            adapter.supported_languages(),
        );
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Load the query service over every configured source.
fn load_service(config: &AppConfig) -> Result<DocService> {
    let registry = SourceRegistry::new();
    Ok(DocService::load(&registry, config)?)
}

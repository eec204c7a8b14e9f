//! worker-impact - COVID-19 Worker Impact pages
//!
//! A CLI tool that fetches crowdsourced survey responses from a published
//! Google Sheets feed, groups them by industry and tag, and renders one
//! page of the site as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Page rendered
//!   1 - Runtime error (config, output file, invalid route, etc.)
//!   2 - Page rendered as "Loading..." or "Sorry, nothing found."

mod catalog;
mod cli;
mod config;
mod feed;
mod models;
mod report;
mod routes;
mod site;

use anyhow::{Context, Result};
use catalog::{apply_filter, ResponseSchema};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use report::PageStatus;
use routes::Route;
use site::{ResponsesSource, SiteLoader, SiteState};
use std::time::{Duration, Instant};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("worker-impact v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .worker-impact.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the sheet, tabs, survey answers and sections.");
    Ok(())
}

/// Initialize logging. RUST_LOG wins over the verbosity flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(args.log_level()).into())
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load the feeds and render the requested page. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let route = Route::parse(&args.route).map_err(anyhow::Error::msg)?;
    let schema = ResponseSchema::from(&config.survey);

    let responses = match args.feed_file {
        Some(ref path) => ResponsesSource::File(path.clone()),
        None => ResponsesSource::Tab(config.feed.responses_tab),
    };

    let loader = SiteLoader::new(&config.feed, responses, schema.clone(), config.site.clone())
        .context("Failed to set up feed loader")?;

    // Handle --dry-run: show what would be fetched and exit
    if args.dry_run {
        return handle_dry_run(&loader, &args);
    }

    // Step 1: Load every configured tab
    println!("📥 Loading survey data from sheet {}", config.feed.sheet_id);
    let spinner = loading_spinner(args.quiet);
    let mut state = SiteState::new();
    let failed = loader.load_into(&mut state).await;
    spinner.finish_and_clear();

    for source in &failed {
        warn!("{} unavailable for this run", source);
    }

    // Step 2: Filter and resolve the page
    let view = state.catalog().map(|catalog| apply_filter(catalog, &args.query));
    let page = report::build_page(&config.site.title, &state, view.as_ref(), &route);

    // Step 3: Generate and save the page
    println!("📝 Rendering {}...", route);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&page)?,
        OutputFormat::Markdown => report::generate_markdown_report(&page, &schema),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write page to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Summary:");
    match state.catalog() {
        Some(catalog) => {
            println!("   Responses: {}", catalog.responses.len());
            println!(
                "   Industries: {} | Tags: {}",
                catalog.industries.len(),
                catalog.tags.len()
            );
            if !catalog.skipped.is_empty() {
                println!("   Skipped rows: {}", catalog.skipped.len());
            }
        }
        None => println!("   Responses: not loaded"),
    }
    if let Some(summaries) = state.summaries().filter(|s| !s.is_empty()) {
        println!("   Industry summaries: {}", summaries.len());
    }
    if let Some(view) = &view {
        if !view.query.is_empty() {
            println!("   Matching \"{}\": {}", view.query, view.visible_count());
        }
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Page saved to: {}", args.output.display());

    match page.status() {
        PageStatus::Found => Ok(0),
        PageStatus::Loading => {
            eprintln!("\n⛔ Survey data did not load; page shows \"Loading...\" (exit code 2).");
            Ok(2)
        }
        PageStatus::NotFound => {
            eprintln!("\n⛔ Nothing found for {} (exit code 2).", route);
            Ok(2)
        }
    }
}

/// Handle --dry-run: print the feeds that would be requested, exit.
fn handle_dry_run(loader: &SiteLoader, args: &Args) -> Result<i32> {
    println!("\n🔍 Dry run: no feeds will be fetched.\n");

    if let Some(ref path) = args.feed_file {
        println!("   responses: {}", path.display());
    }
    for (source, url) in loader.planned_urls() {
        println!("   {}: {}", source, url);
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Spinner shown while feeds load; hidden in quiet mode.
fn loading_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Fetching feeds...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

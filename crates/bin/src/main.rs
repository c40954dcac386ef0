//! RIGRA CLI binary.
//!
//! Prints the pages of the resident survey dashboard.

mod integration;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager::{open_sheet_cache, sheet_cache_path};
use integration::settings::load_config;
use rigra::SurveyDashboard;
use rigra_data::{
    CsvDirSource, DataConfig, GoogleSheetsSource, Sentiment, SheetSource, SurveyDataProvider,
    SurveyTable,
};
use rigra_metrics::{ExplorerFilter, MetricKind, ValueRange, available_metrics};
use rigra_output::{
    ExplorerPage, ExportFormat, ReportBuilder, SurveySummaryPage, TopicsPage, write_page_exports,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,rigra=info";

#[derive(Parser)]
#[command(name = "rigra")]
#[command(about = "RIGRA: resident survey reporting", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: <config dir>/rigra/config.toml)
    #[arg(long, env = "RIGRA_CONFIG")]
    config: Option<PathBuf>,

    /// Read the sheets from CSV files in this directory instead of Google Sheets
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Disable the persistent cache (always fetch fresh data)
    #[arg(long)]
    no_cache: bool,

    /// Force refresh cached data
    #[arg(long)]
    refresh: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Responses, feedback and sentiment overview
    Summary,

    /// Explore the free-text answers
    Explorer {
        /// Keep one feedback category
        #[arg(long)]
        category: Option<String>,

        /// Keep one building
        #[arg(long)]
        building: Option<String>,

        /// Keep a sentiment (repeatable; default: all)
        #[arg(long = "sentiment", value_name = "SENTIMENT")]
        sentiments: Vec<Sentiment>,

        /// Polarity range, MIN..MAX within -1..1
        #[arg(long, value_name = "MIN..MAX")]
        polarity: Option<String>,

        /// Subjectivity range, MIN..MAX within 0..1
        #[arg(long, value_name = "MIN..MAX")]
        subjectivity: Option<String>,

        /// Maximum number of answers to print
        #[arg(long, default_value = "20")]
        rows: usize,

        /// List the selectable categories and buildings instead
        #[arg(long)]
        options: bool,
    },

    /// Top words per topic
    Topics {
        /// Show one feedback category only
        #[arg(long)]
        category: Option<String>,
    },

    /// Print a single dashboard metric
    Metric {
        /// Metric name (see --list)
        name: Option<String>,

        /// List all metrics
        #[arg(long)]
        list: bool,
    },

    /// Export every table of the summary and explorer pages
    Export {
        /// Output directory
        #[arg(long)]
        out: PathBuf,

        /// File format
        #[arg(long, value_enum, default_value_t = FileFormat::Csv)]
        format: FileFormat,
    },

    /// Inspect or clear the sheet cache
    Cache {
        /// Show cache location and contents
        #[arg(long)]
        info: bool,

        /// Remove every cached sheet
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FileFormat {
    Csv,
    Json,
}

impl From<FileFormat> for ExportFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Csv => Self::Csv,
            FileFormat::Json => Self::PrettyJson,
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // Commands that need no survey data
    match &cli.command {
        Commands::Cache { info, clear } => {
            return cache_command(&config, *info, *clear, cli.format);
        }
        Commands::Metric { name: None, .. } | Commands::Metric { list: true, .. } => {
            return list_metrics(cli.format);
        }
        _ => {}
    }

    if let Some(dir) = &cli.data_dir {
        debug!(dir = %dir.display(), "Reading sheets from directory");
        let label = format!("csv-dir:{}", dir.display());
        execute(&cli, &config, CsvDirSource::new(dir), &label).await
    } else {
        let source = GoogleSheetsSource::new(config.sheets.clone(), config.request_timeout())?;
        execute(&cli, &config, source, "google-sheets").await
    }
}

async fn execute<S: SheetSource>(
    cli: &Cli,
    config: &DataConfig,
    source: S,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut provider = SurveyDataProvider::new(source, config);
    if !cli.no_cache {
        provider = provider.with_store(open_sheet_cache(config)?);
    }
    if cli.refresh {
        provider.invalidate_all()?;
    }

    let mut dashboard = SurveyDashboard::new(provider);
    preload(&mut dashboard).await?;

    match &cli.command {
        Commands::Summary => {
            let page = dashboard.summary_page().await?;
            print_page(
                cli.format,
                "summary",
                label,
                &page,
                SurveySummaryPage::to_ascii_table,
                SurveySummaryPage::to_markdown,
            )?;
        }
        Commands::Explorer {
            category,
            building,
            sentiments,
            polarity,
            subjectivity,
            rows,
            options,
        } => {
            if *options {
                let (categories, buildings) =
                    dashboard.explorer_options(category.as_deref()).await?;
                print_options(cli.format, &categories, &buildings)?;
                return Ok(());
            }

            let filter = build_filter(
                category.as_deref(),
                building.as_deref(),
                sentiments,
                polarity.as_deref(),
                subjectivity.as_deref(),
            )?;
            let page = dashboard.explorer_page(&filter, Some(*rows)).await?;
            print_page(
                cli.format,
                "explorer",
                label,
                &page,
                ExplorerPage::to_ascii_table,
                ExplorerPage::to_markdown,
            )?;
        }
        Commands::Topics { category } => {
            let page = match category {
                Some(category) => TopicsPage::new(vec![dashboard.topics_for(category).await?]),
                None => dashboard.topics().await?,
            };
            print_page(
                cli.format,
                "topics",
                label,
                &page,
                TopicsPage::to_ascii_table,
                TopicsPage::to_markdown,
            )?;
        }
        Commands::Metric { name, .. } => {
            let kind: MetricKind = name.as_deref().unwrap_or_default().parse()?;
            let value = dashboard.metric(kind).await?;
            let info = kind.info();
            match cli.format {
                OutputFormat::Text => println!("{}: {}", info.title, value),
                OutputFormat::Markdown => println!("- **{}:** {}", info.title, value),
                OutputFormat::Json => {
                    let report = ReportBuilder::new()
                        .page("metric")
                        .source(label)
                        .contents(json!({ "metric": info, "value": value }))
                        .build();
                    println!("{}", report.to_json()?);
                }
            }
        }
        Commands::Export { out, format } => {
            let summary = dashboard.summary_page().await?;
            let explorer = dashboard.explorer_page(&ExplorerFilter::new(), None).await?;
            let written = write_page_exports(&summary, Some(&explorer), out, (*format).into())?;
            info!(files = written.len(), dir = %out.display(), "Exported survey tables");
            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::Cache { .. } => {}
    }

    Ok(())
}

/// Load every sheet up front behind a spinner; later page calls hit the memo.
async fn preload<S: SheetSource>(dashboard: &mut SurveyDashboard<S>) -> rigra::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading survey sheets...");

    match dashboard.data().await {
        Ok(data) => {
            pb.finish_and_clear();
            debug!(
                feedback_rows = data.feedback.height(),
                sentiment_rows = data.sentiment.height(),
                "Survey loaded"
            );
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e)
        }
    }
}

fn build_filter(
    category: Option<&str>,
    building: Option<&str>,
    sentiments: &[Sentiment],
    polarity: Option<&str>,
    subjectivity: Option<&str>,
) -> Result<ExplorerFilter, Box<dyn std::error::Error>> {
    let mut filter = ExplorerFilter::new();
    if let Some(category) = category {
        filter = filter.with_category(category);
    }
    if let Some(building) = building {
        filter = filter.with_building(building);
    }
    if !sentiments.is_empty() {
        filter = filter.with_sentiments(sentiments.iter().copied());
    }
    if let Some(range) = polarity {
        filter = filter.with_polarity(range.parse::<ValueRange>()?);
    }
    if let Some(range) = subjectivity {
        filter = filter.with_subjectivity(range.parse::<ValueRange>()?);
    }
    filter.validate()?;
    Ok(filter)
}

fn print_page<T: Serialize>(
    format: OutputFormat,
    name: &str,
    source: &str,
    page: &T,
    text: fn(&T) -> String,
    markdown: fn(&T) -> String,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Text => print!("{}", text(page)),
        OutputFormat::Markdown => print!("{}", markdown(page)),
        OutputFormat::Json => {
            let report = ReportBuilder::new()
                .page(name)
                .source(source)
                .page_contents(page)?
                .build();
            println!("{}", report.to_json()?);
        }
    }
    Ok(())
}

fn print_options(
    format: OutputFormat,
    categories: &[String],
    buildings: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            let output = json!({ "categories": categories, "buildings": buildings });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            println!("Categories:");
            for category in categories {
                println!("  {}", category);
            }
            println!("\nBuildings:");
            for building in buildings {
                println!("  {}", building);
            }
        }
    }
    Ok(())
}

fn list_metrics(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = available_metrics();

    match format {
        OutputFormat::Text => {
            println!("{:<34} {:<10} {:<8} Title", "Name", "Page", "Unit");
            println!("{}", "-".repeat(80));
            for m in &metrics {
                println!(
                    "{:<34} {:<10} {:<8} {}",
                    m.name,
                    m.page.as_str(),
                    m.unit.as_str(),
                    m.title
                );
            }
        }
        OutputFormat::Markdown => {
            println!("| Name | Page | Unit | Description |");
            println!("|------|------|------|-------------|");
            for m in &metrics {
                println!(
                    "| `{}` | {} | {} | {} |",
                    m.name, m.page, m.unit, m.description
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
    }

    Ok(())
}

/// `--clear` empties the cache; information is shown with `--info` or when no flag is given.
fn cache_command(
    config: &DataConfig,
    show_info: bool,
    clear: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = sheet_cache_path(config);

    if clear {
        open_sheet_cache(config)?.clear_all()?;
        info!(path = %path.display(), "Cleared sheet cache");
        println!("Cleared cache at {}", path.display());
        if !show_info {
            return Ok(());
        }
    }

    let stats = if path.exists() {
        Some(open_sheet_cache(config)?.get_stats()?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let output = json!({ "path": path, "stats": stats });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            println!("Cache location: {}", path.display());
            match stats {
                Some(stats) => {
                    println!("Cached sheets:  {}", stats.sheets);
                    println!("Payload size:   {} bytes", stats.total_bytes);
                    if let Some(oldest) = stats.oldest_fetch {
                        println!("Oldest fetch:   {}", oldest);
                    }
                    if let Some(newest) = stats.newest_fetch {
                        println!("Newest fetch:   {}", newest);
                    }
                }
                None => println!("Cache is empty"),
            }
        }
    }

    Ok(())
}

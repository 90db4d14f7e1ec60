mod table;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use prodsift_config::AppConfig;
use prodsift_llm::{GeminiClient, answer_question};
use prodsift_report::Report;
use prodsift_scrape::{ScrapeBatch, Scraper};

#[derive(Debug, Parser)]
#[command(
    name = "prodsift",
    version,
    about = "Scrape product pages from a URL spreadsheet and analyze field completeness"
)]
struct Cli {
    /// Path to the config file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every URL in the input file and print the records and report.
    Scan {
        /// Spreadsheet (xlsx/xls/ods) or csv/tsv with a `book_urls` column.
        input: PathBuf,
        /// Emit records, report, and split as JSON instead of the table view.
        #[arg(long)]
        json: bool,
    },
    /// Scrape the input file, then ask Gemini a question about one record.
    Ask {
        /// Spreadsheet (xlsx/xls/ods) or csv/tsv with a `book_urls` column.
        input: PathBuf,
        /// Zero-based id of the record to ask about.
        #[arg(long)]
        product_id: usize,
        /// The question to ask.
        #[arg(long)]
        question: String,
        /// Gemini API key; falls back to the GEMINI_API_KEY environment
        /// variable (a .env file is honored).
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    // RUST_LOG wins; the configured level is the fallback.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Scan { input, json } => run_scan(&config, &input, json).await,
        Commands::Ask {
            input,
            product_id,
            question,
            api_key,
        } => run_ask(&config, &input, product_id, &question, api_key).await,
    }
}

async fn scrape_input(config: &AppConfig, input: &Path) -> Result<ScrapeBatch> {
    let scraper = Scraper::new(&config.scrape)?;
    Ok(scraper.run(input).await)
}

async fn run_scan(config: &AppConfig, input: &Path, as_json: bool) -> Result<()> {
    let batch = scrape_input(config, input).await?;
    let report = Report::from_records(&batch.records);
    let split = report.completion_split();

    if as_json {
        let payload = json!({
            "records": batch.records,
            "report": report,
            "split": split,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if batch.is_empty() {
        println!("No records scraped. Check that the input has a `{}` column.", config.scrape.url_column);
        return Ok(());
    }

    println!("{}", table::render(&batch.records));
    println!();
    println!("Report Summary");
    println!("  Total Records:      {}", report.total);
    println!("  Complete Records:   {}", report.complete);
    println!("  Incomplete Records: {}", report.incomplete);
    println!(
        "  Completion:         {:.1}% complete / {:.1}% incomplete",
        split.complete_pct, split.incomplete_pct
    );
    Ok(())
}

async fn run_ask(
    config: &AppConfig,
    input: &Path,
    product_id: usize,
    question: &str,
    api_key: Option<String>,
) -> Result<()> {
    // Resolve the credential up front: explicit flag, then env.  It is passed
    // down as a plain parameter; nothing below reads the environment.
    let api_key = api_key
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        println!("Enter an API key (--api-key or GEMINI_API_KEY) to ask about a product.");
        return Ok(());
    }

    let batch = scrape_input(config, input).await?;
    if batch.is_empty() {
        println!("No records scraped; nothing to ask about.");
        return Ok(());
    }

    let max_id = batch.len() - 1;
    if product_id > max_id {
        bail!("product id {product_id} out of range (0..={max_id})");
    }

    let client = GeminiClient::new(config.llm.clone());
    match answer_question(&client, api_key.as_deref(), &batch, product_id, question).await {
        Some(answer) => println!("Gemini's answer:\n\n{answer}"),
        None => println!("Could not fetch answer."),
    }
    Ok(())
}

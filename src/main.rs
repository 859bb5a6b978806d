//! DCC Collector - Command line entry point
//!
//! - `collect`: crawl a wiki category and write one record per page
//! - `validate`: re-check every stored record against the schema
//! - `refresh-images`: re-resolve image URLs in stored records

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dcc_collector::application::services::{
    CollectOptions, CollectionService, ImageRefreshService, MediaResolver, ReconciliationService,
    RecordValidationService,
};
use dcc_collector::infrastructure::config::AppConfig;
use dcc_collector::infrastructure::mediawiki::{MediaWikiClient, MediaWikiSettings};
use dcc_collector::infrastructure::openai::OpenAiClient;
use dcc_collector::infrastructure::persistence::FileStore;
use dcc_collector::infrastructure::schema_validator::JsonSchemaValidator;

#[derive(Parser)]
#[command(name = "dcc-collector", about = "DCC items collector")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a category and write one record per page
    Collect {
        /// MediaWiki category to crawl (defaults to CATEGORY_ROOT)
        #[arg(long)]
        category: Option<String>,
        /// Max pages to process (0 = no limit)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Title to resume after
        #[arg(long)]
        resume_from: Option<String>,
    },
    /// Validate every stored record against the schema
    Validate,
    /// Re-resolve image URLs in stored records
    RefreshImages,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dcc_collector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    tracing::debug!(wiki = %config.wiki_api, data_dir = %config.data_dir.display(), "Configuration loaded");

    let store = FileStore::new(&config.data_dir, &config.raw_dir, &config.tmp_dir);
    let validator = JsonSchemaValidator::from_path(&config.schema_path)
        .with_context(|| format!("failed to load schema {}", config.schema_path.display()))?;

    match cli.command {
        Command::Collect {
            category,
            limit,
            resume_from,
        } => {
            let wiki = MediaWikiClient::new(MediaWikiSettings::from_config(&config))?;
            let llm = OpenAiClient::new(
                &config.openai_base_url,
                config.require_api_key()?,
                &config.openai_model,
                config.http_timeout,
            )?;
            let engine = ReconciliationService::new(llm, MediaResolver::new(wiki.clone()), validator)
                .with_series(config.record_series.clone());
            let service = CollectionService::new(wiki, store, engine);

            let options = CollectOptions {
                category: category.unwrap_or_else(|| config.category_root.clone()),
                limit,
                resume_from: resume_from.filter(|title| !title.trim().is_empty()),
            };
            let summary = service.collect(&options).await?;
            println!(
                "Done. written={} skipped={} failed={}",
                summary.written, summary.skipped, summary.failed
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate => {
            let service = RecordValidationService::new(store, validator);
            let checks = service.validate_all().await?;

            let mut failed = false;
            for check in &checks {
                if check.is_valid() {
                    println!("[OK] {}", check.path.display());
                    continue;
                }
                failed = true;
                println!("[FAIL] {}", check.path.display());
                for issue in &check.issues {
                    println!("  - {}", issue);
                }
            }
            if failed {
                return Ok(ExitCode::FAILURE);
            }
            println!("[OK] All records validate.");
            Ok(ExitCode::SUCCESS)
        }
        Command::RefreshImages => {
            let wiki = MediaWikiClient::new(MediaWikiSettings::from_config(&config))?;
            let service = ImageRefreshService::new(store, MediaResolver::new(wiki));
            let changed = service.refresh_all().await?;
            println!("Updated images in {} item(s)", changed);
            Ok(ExitCode::SUCCESS)
        }
    }
}

use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use deck_core::catalog::{self, Catalog, parse_uploaded_at};
use deck_core::config::{CatalogConfig, DEFAULT_CONFIG_FILE};
use deck_core::schema::Deck;
use deck_core::store;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "decks")]
#[command(about = "Slide deck archive catalog tools", long_about = None)]
struct Cli {
    /// Catalog configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export JSON Schemas for the persisted formats
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Inspect the merged deck catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for deck records and the legacy stats table
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List decks, most recent first
    List {
        /// Print the merged records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one deck by slug or short ID
    Show { key: String },
    /// List every tag in use
    Tags,
    /// Report duplicate keys and unparseable timestamps
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Catalog { command } => match command {
            CatalogCommands::List { json } => catalog_list(&cli.config, json),
            CatalogCommands::Show { key } => catalog_show(&cli.config, &key),
            CatalogCommands::Tags => catalog_tags(&cli.config),
            CatalogCommands::Check => catalog_check(&cli.config),
        },
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let record_schema = schema_for!(deck_core::schema::DeckRecord);
    let record_json = serde_json::to_string_pretty(&record_schema)?;
    fs::write(out_dir.join("DeckRecord.schema.json"), record_json)?;

    let stats_schema = schema_for!(deck_core::stats::LegacyStatsDocument);
    let stats_json = serde_json::to_string_pretty(&stats_schema)?;
    fs::write(out_dir.join("LegacyStatsTable.schema.json"), stats_json)?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

fn open_catalog(config_path: &Path) -> Result<&'static Catalog> {
    let config = CatalogConfig::load_or_default(config_path)?;
    let loaded = store::load_catalog(&config)?;
    Ok(catalog::install_global(loaded)?)
}

fn catalog_list(config_path: &Path, json: bool) -> Result<()> {
    let catalog = open_catalog(config_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.decks())?);
        return Ok(());
    }

    for deck in catalog.decks() {
        println!(
            "{}\t{}\t{}",
            deck.slug(),
            upload_date(deck),
            deck.display_title()
        );
    }
    Ok(())
}

fn catalog_show(config_path: &Path, key: &str) -> Result<()> {
    let catalog = open_catalog(config_path)?;

    let deck =
        find_deck(catalog, key).ok_or_else(|| anyhow!("no deck with slug or short ID '{key}'"))?;

    println!("{}", serde_json::to_string_pretty(deck)?);
    Ok(())
}

/// A numeric key is tried as a short ID before it is tried as a slug.
fn find_deck<'a>(catalog: &'a Catalog, key: &str) -> Option<&'a Deck> {
    key.parse::<u32>()
        .ok()
        .and_then(|id| catalog.find_by_short_id(id))
        .or_else(|| catalog.find_by_slug(key))
}

fn catalog_tags(config_path: &Path) -> Result<()> {
    let catalog = open_catalog(config_path)?;
    for tag in catalog.all_tags() {
        println!("{tag}");
    }
    Ok(())
}

fn catalog_check(config_path: &Path) -> Result<()> {
    let mut config = CatalogConfig::load_or_default(config_path)?;
    // Report every issue instead of stopping at the strict-mode error.
    config.integrity.strict = false;
    let catalog = store::load_catalog(&config)?;

    if catalog.issues().is_empty() {
        println!("{} decks, no issues", catalog.len());
        return Ok(());
    }
    for issue in catalog.issues() {
        println!("- {issue}");
    }
    bail!(
        "{} issue(s) across {} decks",
        catalog.issues().len(),
        catalog.len()
    )
}

fn upload_date(deck: &Deck) -> String {
    deck.record
        .uploaded_at
        .as_deref()
        .and_then(parse_uploaded_at)
        .and_then(|ts| ts.format(format_description!("[year]-[month]-[day]")).ok())
        .unwrap_or_else(|| "-".to_string())
}

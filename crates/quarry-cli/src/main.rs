use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quarry_core::document::ValueSource;
use quarry_core::{FieldDefinition, FieldMap, ScraperConfig};

#[derive(Parser)]
#[command(name = "quarry", version, about = "Declarative HTML extraction with schema validation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract structured data from an HTML document
    Extract {
        /// Path to the scraper configuration (JSON)
        #[arg(short, long, env = "QUARRY_CONFIG")]
        config: PathBuf,

        /// HTML file to read (reads stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print compact JSON instead of pretty-printed output
        #[arg(long, default_value_t = false)]
        compact: bool,
    },

    /// Load a configuration and print its field tree
    Check {
        /// Path to the scraper configuration (JSON)
        #[arg(short, long, env = "QUARRY_CONFIG")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("quarry=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            config,
            input,
            compact,
        } => {
            let html = read_input(input.as_deref())?;
            let output = cmd_extract(&config, &html, compact).await?;
            println!("{output}");
        }
        Commands::Check { config } => {
            for line in cmd_check(&config)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ScraperConfig> {
    ScraperConfig::load(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read HTML from stdin")?;
            Ok(html)
        }
    }
}

async fn cmd_extract(config_path: &Path, html: &str, compact: bool) -> Result<String> {
    let config = load_config(config_path)?;
    let scraper = config.build().context("Invalid scraper configuration")?;

    tracing::info!(
        fields = scraper.fields().len(),
        bytes = html.len(),
        "Extracting"
    );

    let data = scraper.scrape(html).await?;

    tracing::info!("Extraction complete");

    let output = if compact {
        serde_json::to_string(&data)?
    } else {
        serde_json::to_string_pretty(&data)?
    };
    Ok(output)
}

fn cmd_check(config_path: &Path) -> Result<Vec<String>> {
    let config = load_config(config_path)?;
    let fields = config.field_map().context("Invalid field configuration")?;
    config.validator().context("Invalid schema")?;

    let mut lines = Vec::new();
    describe(&fields, 0, &mut lines);
    lines.push(String::new());
    lines.push(format!(
        "{} top-level fields, schema: {}",
        fields.len(),
        if config.schema.is_some() { "yes" } else { "none" }
    ));
    Ok(lines)
}

fn describe(fields: &FieldMap, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for (name, definition) in fields.iter() {
        match definition {
            FieldDefinition::Leaf(field) => {
                let source = match field.source() {
                    ValueSource::Text => "text".to_string(),
                    ValueSource::Attribute(attr) => format!("@{attr}"),
                    ValueSource::InnerHtml => "inner html".to_string(),
                    ValueSource::OuterHtml => "outer html".to_string(),
                };
                let multiple = if field.is_multiple() { " [multiple]" } else { "" };
                lines.push(format!("{indent}{name}: {} ({source}){multiple}", field.selector()));
            }
            FieldDefinition::Nested(nested) => {
                lines.push(format!("{indent}{name}:"));
                describe(nested, depth + 1, lines);
            }
            FieldDefinition::Scoped(scoped) => {
                let multiple = if scoped.is_multiple() { " [multiple]" } else { "" };
                lines.push(format!("{indent}{name}: within {}{multiple}", scoped.selector()));
                describe(scoped.fields(), depth + 1, lines);
            }
        }
    }
}

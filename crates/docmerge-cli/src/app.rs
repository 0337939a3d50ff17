//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use docmerge_core::{
    export_schema, extract_placeholders, generate_documents, CollisionPolicy, MergeSettings,
    MissingValuePolicy,
};
use docmerge_data::DataEngine;

/// Output format for placeholder listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

/// Handling of duplicate output filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    /// Later rows replace earlier documents with the same name
    Overwrite,
    /// Later rows get their row number appended
    Suffix,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
            CollisionArg::Suffix => CollisionPolicy::Suffix,
        }
    }
}

#[derive(Parser)]
#[command(name = "docmerge")]
#[command(author, version, about = "Mail merge for Word templates", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./docmerge.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the placeholders of a DOCX template
    Placeholders {
        /// Template DOCX/DOTX file
        template: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a spreadsheet with one column per placeholder
    Extract {
        /// Template DOCX/DOTX file
        template: PathBuf,

        /// Output XLSX file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Render one document per spreadsheet row into a ZIP archive
    Generate {
        /// Template DOCX/DOTX file
        template: PathBuf,

        /// Filled-in XLSX, CSV or TSV file
        data: PathBuf,

        /// Output ZIP file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column used to name the generated documents
        #[arg(long)]
        name_column: Option<String>,

        /// Worksheet to read (first sheet by default)
        #[arg(long)]
        sheet: Option<String>,

        /// Fail when a placeholder has no value
        #[arg(long)]
        strict: bool,

        /// What to do when two rows produce the same filename
        #[arg(long, value_enum)]
        on_collision: Option<CollisionArg>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Placeholders { template, format } => {
            placeholders_command(&template, format)?;
        }
        Commands::Extract {
            template,
            output,
            format,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&settings.output.schema_file));
            extract_command(&template, &output, format)?;
        }
        Commands::Generate {
            template,
            data,
            output,
            name_column,
            sheet,
            strict,
            on_collision,
        } => {
            let settings = apply_overrides(settings, name_column, sheet, strict, on_collision);
            let output = output.unwrap_or_else(|| PathBuf::from(&settings.output.archive_file));
            generate_command(&template, &data, &output, &settings)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the level.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load settings from an explicit file, or from `./docmerge.toml` if present
pub fn load_settings(config: Option<&Path>) -> Result<MergeSettings> {
    match config {
        Some(path) => MergeSettings::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => {
            let cwd = env::current_dir().context("Failed to read working directory")?;
            MergeSettings::discover(&cwd).context("Failed to load docmerge.toml")
        }
    }
}

/// Apply `generate` flags on top of the loaded settings
pub fn apply_overrides(
    mut settings: MergeSettings,
    name_column: Option<String>,
    sheet: Option<String>,
    strict: bool,
    on_collision: Option<CollisionArg>,
) -> MergeSettings {
    if let Some(name_column) = name_column {
        settings.name_column = name_column;
    }
    if sheet.is_some() {
        settings.sheet = sheet;
    }
    if strict {
        settings.missing_values = MissingValuePolicy::Strict;
    }
    if let Some(on_collision) = on_collision {
        settings.on_collision = on_collision.into();
    }
    settings
}

/// Execute the placeholders command
pub fn placeholders_command(template: &Path, format: OutputFormat) -> Result<()> {
    let names = read_placeholders(template)?;

    match format {
        OutputFormat::Text => {
            if names.is_empty() {
                println!("No placeholders found in {}", template.display());
            }
            for name in &names {
                println!("{}", name);
            }
        }
        OutputFormat::Json => {
            let report = json!({
                "template": template.display().to_string(),
                "placeholders": names,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Execute the extract command
pub fn extract_command(template: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    let names = read_placeholders(template)?;

    let schema = export_schema(&names).context("Failed to build schema workbook")?;
    fs::write(output, schema)
        .with_context(|| format!("Failed to write schema file: {}", output.display()))?;

    match format {
        OutputFormat::Text => {
            println!("docmerge v{}", docmerge_core::VERSION);
            println!("Extracting: {}", template.display());
            println!("  {} placeholders", names.len());
            println!("  Created: {}", output.display());
        }
        OutputFormat::Json => {
            let report = json!({
                "template": template.display().to_string(),
                "output": output.display().to_string(),
                "placeholders": names,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Execute the generate command
pub fn generate_command(
    template: &Path,
    data: &Path,
    output: &Path,
    settings: &MergeSettings,
) -> Result<()> {
    println!("docmerge v{}", docmerge_core::VERSION);
    println!("Generating: {} x {}", template.display(), data.display());

    let template_bytes = read_template(template)?;
    let table = DataEngine::read_records(data, settings.sheet.as_deref())
        .with_context(|| format!("Failed to read records: {}", data.display()))?;
    if table.is_empty() {
        tracing::warn!(path = %data.display(), "no records found");
    }

    let bundle = generate_documents(&template_bytes, &table, settings.clone())
        .with_context(|| format!("Failed to render documents from: {}", template.display()))?;

    let archive = bundle
        .to_zip_bytes()
        .context("Failed to build output archive")?;
    fs::write(output, archive)
        .with_context(|| format!("Failed to write archive: {}", output.display()))?;

    println!("  {} rows, {} documents", table.len(), bundle.len());
    if !bundle.replaced().is_empty() {
        println!(
            "  {} documents replaced by later rows with the same name",
            bundle.replaced().len()
        );
    }
    println!("  Created: {}", output.display());

    Ok(())
}

fn read_template(template: &Path) -> Result<Vec<u8>> {
    if !template.exists() {
        anyhow::bail!("Template file not found: {}", template.display());
    }
    fs::read(template)
        .with_context(|| format!("Failed to read template: {}", template.display()))
}

fn read_placeholders(template: &Path) -> Result<Vec<String>> {
    let bytes = read_template(template)?;
    extract_placeholders(&bytes)
        .with_context(|| format!("Failed to read placeholders: {}", template.display()))
}

//! appwrite-erd - entity-relationship diagrams from `appwrite.config.json`.
//!
//! # Usage
//!
//! ```bash
//! appwrite-erd appwrite.config.json
//! appwrite-erd --database todo -o todo.mmd appwrite.config.json
//! appwrite-erd --view diagram --watch appwrite.config.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use appwrite_erd::app::{App, ViewMode};
use appwrite_erd::compiler::{CardinalityStyle, CompileOptions};
use appwrite_erd::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use appwrite_erd::render::MermaidCli;
use appwrite_erd::schema;

/// Render an entity-relationship diagram from an Appwrite config file
#[derive(Parser, Debug)]
#[command(name = "appwrite-erd", version, about, long_about = None)]
struct Cli {
    /// Appwrite config file (appwrite.config.json)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Database to draw (default: the first one listed)
    #[arg(short, long, value_name = "ID")]
    database: Option<String>,

    /// Print the databases in FILE as JSON and exit
    #[arg(long)]
    list_databases: bool,

    /// Output to produce: markup source or rendered SVG picture
    #[arg(long, value_enum)]
    view: Option<ViewMode>,

    /// Export path (default: stdout for source, "<database> (<id>).svg" for diagram)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Copy the diagram markup to the clipboard
    #[arg(long)]
    copy: bool,

    /// Pretty-print FILE in place before compiling
    #[arg(long)]
    format_json: bool,

    /// Watch FILE and recompile on change
    #[arg(short, long)]
    watch: bool,

    /// Diagram theme for rendered pictures
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Draw single relationship ends as zero-or-one instead of exactly-one
    #[arg(long)]
    optional_ends: bool,

    /// Mermaid CLI binary used to render pictures (default: $APPWRITE_ERD_MMDC or mmdc)
    #[arg(long, value_name = "PATH")]
    mmdc: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn list_databases(path: &std::path::Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = schema::parse(&source)?;
    println!("{}", serde_json::to_string_pretty(&document.databases)?);
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    if cli.list_databases {
        return list_databases(&cli.file);
    }

    let options = CompileOptions {
        cardinality_style: if effective.optional_ends {
            CardinalityStyle::Optional
        } else {
            CardinalityStyle::Strict
        },
    };
    let theme = effective.theme.unwrap_or(ThemeMode::Auto).diagram_theme();

    let app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_database(cli.database)
        .with_view_mode(effective.view.unwrap_or_default())
        .with_output(cli.output)
        .with_copy(cli.copy)
        .with_format_json(cli.format_json)
        .with_theme(theme)
        .with_compile_options(options)
        .with_renderer(Box::new(MermaidCli::from_override(effective.mmdc)));

    app.run()
}

//! Tally: Combined HTML report builder CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tally::options::{load_options, RenderOptions};
use tally::render::ReportRenderer;
use tally::snapshot::write_snapshot;
use tally::store::CombinedStore;
use tally::{aggregate_and_render, MetaData};
use tracing_subscriber::EnvFilter;

/// Tally: Combined HTML report builder for parallel test runs
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug-level log events)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append one run's metadata to the combined store and re-render the report
    Add {
        /// JSON file holding the finished run's metadata object
        #[arg(long)]
        meta: PathBuf,

        /// Suite description fragment; repeat per nesting level
        #[arg(long = "description", value_name = "TEXT")]
        descriptions: Vec<String>,

        #[command(flatten)]
        render: RenderFlags,

        /// Report output directory (holds combined.json and the artifacts)
        target_dir: PathBuf,
    },

    /// Write one run's metadata to a standalone snapshot file
    Snapshot {
        /// JSON file holding the finished run's metadata object
        #[arg(long)]
        meta: PathBuf,

        /// Snapshot destination file
        #[arg(long)]
        out: PathBuf,

        /// Suite description fragment; repeat per nesting level
        #[arg(long = "description", value_name = "TEXT")]
        descriptions: Vec<String>,
    },

    /// Re-render the report from the combined store as it stands
    Render {
        #[command(flatten)]
        render: RenderFlags,

        /// Report output directory (holds combined.json and the artifacts)
        target_dir: PathBuf,
    },
}

/// Render settings shared by `add` and `render`. Flags win over values
/// from the options file.
#[derive(clap::Args, Debug)]
struct RenderFlags {
    /// Report file name (default: report.html)
    #[arg(long)]
    doc_name: Option<String>,

    /// Title text shown in the report header
    #[arg(long)]
    doc_title: Option<String>,

    /// Stylesheet href replacing the bundled default
    #[arg(long)]
    css_override_file: Option<String>,

    /// JavaScript comparator source spliced into the result ordering
    #[arg(long, value_name = "JS")]
    sort_function: Option<String>,

    /// Serve results via combined.json instead of embedding them
    #[arg(long)]
    use_ajax: bool,

    /// Publish the bundled assets next to the report
    #[arg(long)]
    prepare_assets: bool,

    /// Directory of replacement templates (default: compiled-in set)
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Path to options file (default: .tallyrc.json in the target directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Add {
            meta,
            descriptions,
            render,
            target_dir,
        } => {
            let mut meta = read_meta(&meta)?;
            if !descriptions.is_empty() {
                meta.insert(
                    "description".to_string(),
                    serde_json::Value::String(descriptions.join("|")),
                );
            }
            let options = resolve_options(&target_dir, render)?;
            let report_path = target_dir.join(&options.doc_name);
            aggregate_and_render(meta, &target_dir, &options);
            println!("{}: {}", "Report".green(), report_path.display());
        }
        Commands::Snapshot {
            meta,
            out,
            descriptions,
        } => {
            let mut meta = read_meta(&meta)?;
            let descriptions: Vec<Option<String>> = descriptions.into_iter().map(Some).collect();
            write_snapshot(&mut meta, &out, &descriptions);
            println!("{}: {}", "Snapshot".green(), out.display());
        }
        Commands::Render { render, target_dir } => {
            let options = resolve_options(&target_dir, render)?;
            let dataset = CombinedStore::new(&target_dir).load_or_empty();
            let renderer = match &options.template_dir {
                Some(dir) => ReportRenderer::with_template_dir(dir),
                None => ReportRenderer::new(),
            };
            renderer.render(&dataset, &target_dir, &options);
            println!(
                "{}: {}",
                "Report".green(),
                target_dir.join(&options.doc_name).display()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Read one run's metadata object. Anything but a JSON object is a
/// usage error, reported before any file in the target directory is
/// touched.
fn read_meta(path: &Path) -> Result<MetaData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in metadata file {}", path.display()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!(
            "Metadata file {} must hold a JSON object",
            path.display()
        ),
    }
}

fn resolve_options(target_dir: &Path, flags: RenderFlags) -> Result<RenderOptions> {
    let options = load_options(target_dir, flags.config.as_deref())?;
    Ok(options.merge_with_cli(
        flags.doc_name,
        flags.doc_title,
        flags.css_override_file,
        flags.sort_function,
        flags.use_ajax,
        flags.prepare_assets,
        flags.template_dir,
    ))
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("TALLY_LOG").unwrap_or_else(|_| {
        if verbose {
            "tally=debug".to_string()
        } else {
            "tally=info".to_string()
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

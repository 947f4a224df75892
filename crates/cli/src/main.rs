//! Inject CLI
//!
//! Scans a Go module for `// @A provide|inject|invoke` annotations, builds the
//! dependency graph and writes one wiring module per graph vertex under
//! `gen/inject/`.
//!
//! ## Usage
//!
//! ```text
//! inject [PATH] [--manifest entries.yaml] [--out DIR] [--module NAME]
//!        [--strict] [--dump] [--dot graph.gv] [--print-entries]
//!        [--gofmt] [--tidy] [-v]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod config;
mod pipeline;

use pipeline::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "inject", version, about = "Annotation-driven dependency injection compiler")]
struct Cli {
    /// Module directory to scan (defaults to the current directory)
    path: Option<PathBuf>,

    /// Read entries from a YAML/JSON manifest instead of scanning sources
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Directory the generated tree is written to
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Module identity for generated import paths (default: go.mod)
    #[arg(long)]
    module: Option<String>,

    /// Config file (default: <PATH>/inject.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail on any tolerated irregularity (duplicate providers, stray annotations)
    #[arg(long)]
    strict: bool,

    /// Print the dependency graph
    #[arg(long)]
    dump: bool,

    /// Export the dependency graph in Graphviz format
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Print the collected entries as YAML
    #[arg(long)]
    print_entries: bool,

    /// Format generated files with gofmt
    #[arg(long)]
    gofmt: bool,

    /// Run `go mod tidy` and `go mod vendor` afterwards
    #[arg(long)]
    tidy: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let root = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to resolve working directory")?,
    };
    log::info!("current path is {}", root.display());

    let opts = RunOptions {
        root,
        config_path: cli.config,
        manifest: cli.manifest,
        out: cli.out,
        module: cli.module,
        strict: cli.strict,
        dump: cli.dump,
        dot: cli.dot,
        print_entries: cli.print_entries,
        gofmt: cli.gofmt,
        tidy: cli.tidy,
    };

    let summary = pipeline::run(&opts)?;
    log::info!(
        "{} module files generated, {} roots failed",
        summary.unique_files().len(),
        summary.failures.len()
    );
    Ok(())
}

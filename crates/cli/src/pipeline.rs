use crate::config::InjectConfig;
use anyhow::{bail, Context, Result};
use inject_codegen::{CommandFormatter, GenerationSummary, Generator};
use inject_collector::{
    Collector, GoModResolver, ManifestCollector, ModuleResolver, SourceCollector,
};
use inject_graph::{BuildOptions, Entry, GraphBuilder, Logger, Strictness};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolved settings for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub module: Option<String>,
    pub strict: bool,
    pub dump: bool,
    pub dot: Option<PathBuf>,
    pub print_entries: bool,
    pub gofmt: bool,
    pub tidy: bool,
}

pub fn run(opts: &RunOptions) -> Result<GenerationSummary> {
    let (config, _) = InjectConfig::load(&opts.root, opts.config_path.as_deref())?;

    let entries = collect(opts, &config)?;
    if opts.print_entries {
        print!("{}", serde_yaml::to_string(&entries)?);
    }

    let strictness = if opts.strict {
        Strictness::Strict
    } else {
        config.build.strictness
    };
    let output = GraphBuilder::new(BuildOptions { strictness })
        .with_logger(Logger::facade("inject::builder"))
        .build(&entries)
        .context("failed to build dependency graph")?;
    let graph = output.graph;

    if opts.dump {
        print!("{}", graph.dump());
    }
    if let Some(dot) = &opts.dot {
        graph
            .export_dot(dot)
            .with_context(|| format!("failed to export graph to {}", dot.display()))?;
    }

    let module = match &opts.module {
        Some(module) => module.clone(),
        None => GoModResolver::default()
            .with_logger(Logger::facade("inject::collector"))
            .resolve(&opts.root)
            .context("failed to discover module identity (use --module)")?,
    };
    log::info!("module identity is {module}");

    let mut generate = config.generate.clone();
    generate.output_root = match &opts.out {
        Some(out) => out.clone(),
        None if generate.output_root.is_relative() => opts.root.join(&generate.output_root),
        None => generate.output_root.clone(),
    };

    let mut generator = Generator::new(generate, module)
        .context("failed to load module template")?
        .with_logger(Logger::facade("inject::codegen"));
    if opts.gofmt {
        generator = generator.with_formatter(CommandFormatter::new("gofmt"));
    }

    let summary = generator.generate(&graph);
    for failure in &summary.failures {
        log::warn!("root {} skipped: {}", failure.root, failure.error);
    }

    if opts.tidy {
        go_mod(&opts.root, "tidy")?;
        go_mod(&opts.root, "vendor")?;
    }

    Ok(summary)
}

fn collect(opts: &RunOptions, config: &InjectConfig) -> Result<Vec<Entry>> {
    let filters = &config.collect.filters;
    let entries = match &opts.manifest {
        Some(manifest) => ManifestCollector::default()
            .with_logger(Logger::facade("inject::collector"))
            .collect(manifest, filters)
            .with_context(|| format!("failed to load manifest {}", manifest.display()))?,
        None => SourceCollector::new(config.collect.marker.as_str())
            .with_logger(Logger::facade("inject::collector"))
            .collect(&opts.root, filters)
            .with_context(|| format!("failed to collect entries under {}", opts.root.display()))?,
    };
    log::info!("{} annotated entries collected", entries.len());
    Ok(entries)
}

fn go_mod(root: &Path, action: &str) -> Result<()> {
    log::info!("running go mod {action}");
    let status = Command::new("go")
        .args(["mod", action])
        .current_dir(root)
        .status()
        .with_context(|| format!("failed to start go mod {action}"))?;
    if !status.success() {
        bail!("go mod {action} failed: {status}");
    }
    Ok(())
}

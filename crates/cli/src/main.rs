//! `pathfinder-config-manager`: the config-manager build CLI (spec §6).
//!
//! Consumes human-authored input chain TOMLs plus the IBC/wallet registries
//! and emits the two output configs the engine and the UI load.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use pathfinder_config::{BuildOptions, EnrichedConfigBuilder};
use pathfinder_metrics::MetricsCollector;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Toml,
    Json,
    Auto,
}

/// Joins human-authored chain TOML, the public IBC registry, and the wallet
/// registry into the enriched pathfinder runtime config and client-display
/// config (spec §4.4, §6).
#[derive(Debug, Parser)]
#[command(name = "pathfinder-config-manager")]
struct Args {
    /// Directory of human-authored `<chain-id>.toml` files.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the pathfinder runtime config.
    #[arg(long, default_value = "pathfinder.toml")]
    pathfinder_output: PathBuf,

    /// Where to write the client-display config.
    #[arg(long, default_value = "client.json")]
    client_output: PathBuf,

    #[arg(long, value_enum, default_value = "auto")]
    pathfinder_format: OutputFormat,

    #[arg(long, value_enum, default_value = "auto")]
    client_format: OutputFormat,

    /// Local cache directory for the public IBC registry.
    #[arg(long, default_value = "cache/registry")]
    local_registry_cache: PathBuf,

    /// Local cache directory for the wallet registry.
    #[arg(long, default_value = "cache/keplr")]
    local_keplr_cache: PathBuf,

    /// Skip re-downloading the IBC registry; parse the existing cache as-is.
    #[arg(long)]
    use_local_data: bool,

    /// Skip re-downloading the wallet registry; parse the existing cache as-is.
    #[arg(long)]
    use_local_keplr: bool,

    /// Skip endpoint consensus verification against live RPC/REST endpoints.
    #[arg(long)]
    skip_network: bool,

    /// Validate the input chains and exit without writing any output.
    #[arg(long)]
    validate_only: bool,

    /// Copy each chain's token icon files into this directory.
    #[arg(long)]
    copy_icons: Option<PathBuf>,

    /// Write a Prometheus text-format snapshot of the build-phase metrics
    /// here after the build finishes (for a textfile-collector scrape).
    #[arg(long)]
    metrics_output: Option<PathBuf>,
}

fn format_for(requested: OutputFormat, path: &std::path::Path) -> &'static str {
    match requested {
        OutputFormat::Toml => "toml",
        OutputFormat::Json => "json",
        OutputFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
            Some("json") => "json",
            _ => "toml",
        },
    }
}

fn write_output<T: serde::Serialize>(value: &T, path: &std::path::Path, format: &str) -> Result<()> {
    let rendered = match format {
        "json" => serde_json::to_string_pretty(value)?,
        _ => toml::to_string_pretty(value)?,
    };
    std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Copies each input chain's declared token icon files into `dest`, skipping
/// entries that aren't local paths (spec §6: the CLI surface carries this
/// flag even though icon-hosting mechanics are out of scope for the engine).
fn copy_icons(inputs: &[pathfinder_config::InputChainToml], dest: &std::path::Path) -> Result<usize> {
    std::fs::create_dir_all(dest)?;
    let mut copied = 0;
    for chain in inputs {
        for token in &chain.token {
            if token.icon.is_empty() {
                continue;
            }
            let src = std::path::Path::new(&token.icon);
            if !src.is_file() {
                continue;
            }
            let file_name = src.file_name().context("icon path has no file name")?;
            std::fs::copy(src, dest.join(file_name))?;
            copied += 1;
        }
    }
    Ok(copied)
}

async fn run(args: Args, metrics: Arc<MetricsCollector>) -> Result<()> {
    let (inputs, parse_errors) = pathfinder_config::load_input_chains(&args.input)
        .with_context(|| format!("loading input chains from {}", args.input.display()))?;
    if !parse_errors.is_empty() {
        for e in &parse_errors {
            error!("{e}");
        }
        bail!("{} input TOML file(s) failed to parse", parse_errors.len());
    }
    info!(chains = inputs.len(), "loaded input chain definitions");

    let config_errors = pathfinder_config::validate_input_chains(&inputs);
    if !config_errors.is_empty() {
        for e in &config_errors {
            error!("{e}");
        }
        bail!("{} validation error(s)", config_errors.len());
    }
    info!("input chains passed validation");

    if args.validate_only {
        info!("--validate-only set, exiting after validation");
        return Ok(());
    }

    if !args.use_local_data && !args.local_registry_cache.is_dir() {
        warn!(
            path = %args.local_registry_cache.display(),
            "registry cache directory does not exist; re-download it before building"
        );
    }

    let builder = EnrichedConfigBuilder::new(BuildOptions {
        skip_network: args.skip_network,
        registry_dir: args.local_registry_cache.clone(),
        wallet_dir: args.local_keplr_cache.clone(),
    })
    .with_metrics(metrics.clone());

    let (graph, warnings) = builder.build(inputs.clone()).await?;
    for w in &warnings {
        warn!("{}", w.0);
    }
    info!(chains = graph.len(), "enriched config build succeeded");

    if let Some(dest) = &args.metrics_output {
        let snapshot = metrics.export_metrics().context("exporting build-phase metrics")?;
        std::fs::write(dest, snapshot).with_context(|| format!("writing {}", dest.display()))?;
        info!(path = %dest.display(), "wrote build-phase metrics snapshot");
    }

    let generated_at = chrono::Utc::now().to_rfc3339();
    let runtime_config = builder.to_runtime_config(&graph, generated_at.clone());
    let client_config = builder.to_client_config(&graph, &inputs, generated_at)?;

    let pathfinder_format = format_for(args.pathfinder_format, &args.pathfinder_output);
    write_output(&runtime_config, &args.pathfinder_output, pathfinder_format)?;
    info!(path = %args.pathfinder_output.display(), "wrote pathfinder runtime config");

    let client_format = format_for(args.client_format, &args.client_output);
    write_output(&client_config, &args.client_output, client_format)?;
    info!(path = %args.client_output.display(), "wrote client-display config");

    if let Some(dest) = &args.copy_icons {
        let copied = copy_icons(&inputs, dest)?;
        info!(count = copied, path = %dest.display(), "copied token icons");
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let metrics = Arc::new(MetricsCollector::new());
    if let Err(e) = pathfinder_metrics::init_tracing_with_metrics(metrics.clone()) {
        eprintln!("failed to initialize tracing: {e}");
        std::process::exit(1);
    }

    let args = Args::parse();
    if let Err(e) = run(args, metrics).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

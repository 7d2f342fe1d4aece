//! SortBench - LLM list-sorting benchmark CLI
//!
//! The `sortbench` command drives the three benchmark phases:
//!
//! - `generate`: write synthetic unsorted lists to a data directory
//! - `run`: collect model responses for the data, caching results on disk
//! - `score`: evaluate stored responses into a CSV score table

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use sortbench_core::datagen::{benchmark_sizes, generate_benchmark_data, Mode};
use sortbench_core::{
    evaluate_all, export, store, InferenceClient, InferenceConfig, ProviderConfig, ProviderKind,
};

const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-3.5-turbo"];
const ANTHROPIC_MODELS: &[&str] = &["claude-3-5-haiku-20241022", "claude-3-5-sonnet-20241022"];

#[derive(Parser)]
#[command(name = "sortbench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Benchmark LLM list sorting", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic benchmark data
    Generate {
        /// Directory for the generated data files
        #[arg(long, default_value = "benchmark_data")]
        path: PathBuf,

        /// Name of the benchmark data set
        #[arg(long, default_value = "sortbench")]
        name: String,

        /// Benchmark mode: basic or advanced
        #[arg(long, default_value = "basic")]
        mode: String,

        /// Version tag of the benchmark data
        #[arg(long, default_value = "v1.0")]
        version: String,

        /// Random seed (entropy-seeded when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of lists per config
        #[arg(long, default_value_t = 100)]
        num_samples: usize,
    },

    /// Run inference for one or more models over the benchmark data
    Run {
        /// Directory holding the generated data files
        #[arg(long, default_value = "benchmark_data")]
        data_path: PathBuf,

        /// Directory for the result files
        #[arg(long, default_value = "benchmark_results")]
        result_path: PathBuf,

        /// Name of the benchmark data set
        #[arg(long, default_value = "sortbench")]
        name: String,

        /// Benchmark mode: basic or advanced
        #[arg(long, default_value = "basic")]
        mode: String,

        /// Version tag of the benchmark data
        #[arg(long, default_value = "v1.0")]
        version: String,

        /// Models to run
        #[arg(long, num_args = 1.., default_values = ["gpt-4o-mini"])]
        models: Vec<String>,

        /// Extra OpenAI-compatible endpoint URL (key from SORTBENCH_API_KEY)
        #[arg(long)]
        endpoint_url: Option<String>,

        /// Models served by the extra endpoint
        #[arg(long, num_args = 1..)]
        endpoint_models: Vec<String>,
    },

    /// Score stored results into a CSV table
    Score {
        /// Directory holding the result files
        #[arg(long, default_value = "benchmark_results")]
        result_path: PathBuf,

        /// Output CSV file
        #[arg(long, default_value = "benchmark_results.csv")]
        csv_file: PathBuf,

        /// Name of the benchmark data set
        #[arg(long, default_value = "sortbench")]
        name: String,

        /// Benchmark mode: basic or advanced
        #[arg(long, default_value = "basic")]
        mode: String,

        /// Version tag of the benchmark data
        #[arg(long, default_value = "v1.0")]
        version: String,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// Assemble the provider configuration at the program boundary.
///
/// API keys come from the environment here, and only here; everything below
/// this point receives an explicit [`InferenceConfig`].
fn build_inference_config(
    endpoint_url: Option<String>,
    endpoint_models: Vec<String>,
) -> InferenceConfig {
    let mut providers = Vec::new();
    if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
        providers.push(ProviderConfig {
            kind: ProviderKind::OpenAi,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            models: OPENAI_MODELS.iter().map(|m| m.to_string()).collect(),
        });
    }
    if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
        providers.push(ProviderConfig {
            kind: ProviderKind::Anthropic,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            models: ANTHROPIC_MODELS.iter().map(|m| m.to_string()).collect(),
        });
    }
    if let Some(base_url) = endpoint_url {
        providers.push(ProviderConfig {
            kind: ProviderKind::OpenAi,
            api_key: std::env::var("SORTBENCH_API_KEY").unwrap_or_default(),
            base_url,
            models: endpoint_models,
        });
    }
    InferenceConfig {
        providers,
        ..InferenceConfig::default()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    match cli.command {
        Commands::Generate {
            path,
            name,
            mode,
            version,
            seed,
            num_samples,
        } => cmd_generate(&path, &name, &mode, &version, seed, num_samples),
        Commands::Run {
            data_path,
            result_path,
            name,
            mode,
            version,
            models,
            endpoint_url,
            endpoint_models,
        } => {
            let config = build_inference_config(endpoint_url, endpoint_models);
            cmd_run(&data_path, &result_path, &name, &mode, &version, &models, config).await
        }
        Commands::Score {
            result_path,
            csv_file,
            name,
            mode,
            version,
        } => cmd_score(&result_path, &csv_file, &name, &mode, &version),
    }
}

fn cmd_generate(
    path: &std::path::Path,
    name: &str,
    mode: &str,
    version: &str,
    seed: Option<u64>,
    num_samples: usize,
) -> Result<()> {
    let mode: Mode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let written = generate_benchmark_data(
        &mut rng,
        path,
        name,
        mode,
        version,
        num_samples,
        &benchmark_sizes(),
    )
    .context("Failed to generate benchmark data")?;
    info!(configs = written.len(), path = %path.display(), "benchmark data written");
    Ok(())
}

async fn cmd_run(
    data_path: &std::path::Path,
    result_path: &std::path::Path,
    name: &str,
    mode: &str,
    version: &str,
    models: &[String],
    config: InferenceConfig,
) -> Result<()> {
    let client = InferenceClient::new(config);
    for model in models {
        if !client.supports_model(model) {
            bail!("Model {model} is not supported by any configured provider");
        }
    }

    let configs = store::load_benchmark_data(data_path, name, mode, version)
        .context("Failed to load benchmark data")?;
    if configs.is_empty() {
        bail!("No benchmark data found under {}", data_path.display());
    }

    for model in models {
        for (config_name, lists) in &configs {
            if store::has_result(result_path, config_name, model)? {
                info!(config = %config_name, model, "results already available, skipping");
                continue;
            }
            info!(config = %config_name, model, "running inference");
            match client.run_config(model, config_name, lists).await {
                Ok(run) => {
                    let mut results = store::load_single_result(result_path, config_name)?
                        .unwrap_or_else(|| sortbench_core::ConfigResults {
                            unsorted_lists: lists.clone(),
                            results: Vec::new(),
                        });
                    results.results.push(run);
                    store::write_result(result_path, config_name, &results, true)?;
                }
                // One failed pairing does not abort the rest of the run.
                Err(e) => warn!(config = %config_name, model, error = %e, "inference failed"),
            }
        }
    }
    Ok(())
}

fn cmd_score(
    result_path: &std::path::Path,
    csv_file: &std::path::Path,
    name: &str,
    mode: &str,
    version: &str,
) -> Result<()> {
    let config_names = store::fetch_config_names(result_path, name, mode, version)
        .context("Failed to list result files")?;
    let mut results = BTreeMap::new();
    for config_name in config_names {
        if let Some(config_results) = store::load_single_result(result_path, &config_name)? {
            results.insert(config_name, config_results);
        }
    }

    let rows = evaluate_all(&results);
    export::write_csv_file(csv_file, &rows).context("Failed to write CSV")?;
    info!(rows = rows.len(), file = %csv_file.display(), "score table written");
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use foodlens_ai::{OnnxClassifier, Pipeline};
use foodlens_core::config::{DEFAULT_BODY_LIMIT, DEFAULT_HOST, DEFAULT_PORT};
use foodlens_core::{LabelTable, ModelConfig, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod predict;

#[derive(Parser)]
#[command(name = "foodlens", version, about = "Food photo classifier over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the classifier and serve `POST /predict`.
    Serve {
        #[command(flatten)]
        model: ModelArgs,

        /// Address to bind.
        #[arg(long, env = "FOODLENS_HOST", default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, env = "FOODLENS_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Largest accepted request body, in bytes.
        #[arg(long, env = "FOODLENS_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
        body_limit: usize,
    },

    /// Classify local image files and print `path<TAB>label<TAB>score`.
    Predict {
        #[command(flatten)]
        model: ModelArgs,

        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Print the active label table as `index<TAB>label`.
    Labels {
        /// Label file, one class per line in output order.
        #[arg(long, env = "FOODLENS_LABELS")]
        labels: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// ONNX classifier artifact.
    #[arg(long, env = "FOODLENS_MODEL")]
    model: PathBuf,

    /// Label file, one class per line in output order. Defaults to the
    /// built-in food table.
    #[arg(long, env = "FOODLENS_LABELS")]
    labels: Option<PathBuf>,
}

impl ModelArgs {
    fn config(&self) -> ModelConfig {
        let config = ModelConfig::new(&self.model);
        match &self.labels {
            Some(path) => config.with_labels(path),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("foodlens v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve {
            model,
            host,
            port,
            body_limit,
        } => {
            let pipeline = load_pipeline(&model.config()).inspect_err(|e| {
                error!("startup failed: {e:#}");
            })?;
            let config = ServerConfig {
                host,
                port,
                body_limit,
            };
            foodlens_server::serve(&config, pipeline).await
        }
        Command::Predict { model, images } => {
            let pipeline = load_pipeline(&model.config())?;
            predict::run(&pipeline, &images)
        }
        Command::Labels { labels } => {
            let table = match labels {
                Some(path) => LabelTable::load(&path)?,
                None => LabelTable::builtin(),
            };
            for (i, label) in table.iter().enumerate() {
                println!("{i}\t{label}");
            }
            Ok(())
        }
    }
}

/// Load labels and the classifier artifact, and check they agree.
///
/// Called once before serving; any error here is fatal.
fn load_pipeline(config: &ModelConfig) -> anyhow::Result<Pipeline> {
    let labels = config.load_labels().context("loading label table")?;
    let model = OnnxClassifier::load(&config.model_path).with_context(|| {
        format!("loading classifier from {}", config.model_path.display())
    })?;
    Pipeline::new(Arc::new(model), labels).context("classifier does not match the label table")
}

//! Pipeline runner binary.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vpipe_models::ScriptGenerationParams;
use vpipe_pipeline::{PipelineConfig, PipelineOutcome, PipelineRun, VideoPipeline};

#[derive(Parser, Debug)]
#[command(name = "vpipe-run")]
#[command(about = "Run the download, script, crop and assembly pipeline for one task")]
#[command(version)]
struct Cli {
    /// Task identifier; the final video lands in <storage>/tasks/<task-id>
    #[arg(long)]
    task_id: String,

    /// Script file name under <resource>/scripts/
    #[arg(long)]
    script_name: String,

    /// Source URL, used only when the video is not on disk
    #[arg(long)]
    url: Option<String>,

    /// Video file stem under <resource>/videos/
    #[arg(long, default_value = "null")]
    video_name: String,

    #[arg(long, default_value_t = 0)]
    skip_seconds: u32,

    #[arg(long, default_value_t = 30)]
    threshold: u32,

    #[arg(long, default_value_t = 10)]
    vision_batch_size: u32,

    #[arg(long, default_value = "gemini")]
    vision_llm_provider: String,

    #[arg(long, default_value = vpipe_models::assembly::DEFAULT_VOICE_NAME)]
    voice_name: String,

    /// Overrides PIPELINE_SERVICE_URL
    #[arg(long)]
    service_url: Option<String>,
}

impl Cli {
    fn to_run(&self) -> PipelineRun {
        let mut run = PipelineRun::new(&self.task_id, &self.script_name)
            .with_video_name(&self.video_name)
            .with_generation(ScriptGenerationParams {
                skip_seconds: self.skip_seconds,
                threshold: self.threshold,
                vision_batch_size: self.vision_batch_size,
                vision_llm_provider: self.vision_llm_provider.clone(),
            })
            .with_voice(&self.voice_name);
        if let Some(url) = &self.url {
            run = run.with_source_url(url);
        }
        run
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env();
    if let Some(url) = &cli.service_url {
        config.client.base_url = url.clone();
    }
    info!(
        service_url = %config.client.base_url,
        resource_root = %config.resource_root.display(),
        storage_root = %config.storage_root.display(),
        "Starting vpipe-run"
    );

    let pipeline = match VideoPipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = pipeline.run_pipeline(&cli.to_run()).await;

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render outcome: {}", e),
    }

    if let PipelineOutcome::Error { .. } = outcome {
        std::process::exit(1);
    }
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`. Logs go to stderr so
/// stdout carries only the outcome.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "vpipe=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

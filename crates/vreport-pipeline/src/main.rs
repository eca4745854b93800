//! Report generation binary: one source URL in, final document JSON out.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vreport_pipeline::{
    CaptionClient, GeminiClient, LogProgress, PipelineConfig, ReportPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vreport=info".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let Some(source_url) = std::env::args().nth(1) else {
        eprintln!("usage: vreport <youtube-url>");
        std::process::exit(2);
    };

    info!("Starting vreport");

    let config = PipelineConfig::from_env();

    let model = match GeminiClient::new(&config) {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to create model client: {}", e);
            std::process::exit(1);
        }
    };

    let captions = match CaptionClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create caption client: {}", e);
            std::process::exit(1);
        }
    };

    let pipeline = ReportPipeline::new(model, captions, config)
        .with_progress(std::sync::Arc::new(LogProgress));

    let document = pipeline.run(&source_url, None).await;

    let json =
        serde_json::to_string_pretty(&document).context("failed to serialize final document")?;
    println!("{}", json);

    if !document.success {
        std::process::exit(1);
    }
    Ok(())
}

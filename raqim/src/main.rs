use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raqim::{ExtractionConfig, TextExtractor};

#[derive(Parser)]
#[command(name = "raqim")]
#[command(about = "Extract Arabic text from scanned images")]
struct Args {
    /// Image file to process
    image: PathBuf,

    /// Comma-separated language codes, target script first
    #[arg(long, default_value = "ara")]
    languages: String,

    /// Emit the full report as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raqim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExtractionConfig::from_env();
    let languages: Vec<String> = args
        .languages
        .split(',')
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing with the best result so far");
            ctrl_c_cancel.cancel();
        }
    });

    let extractor = TextExtractor::new(config)?.with_cancellation(cancel);
    let report = extractor.extract_from_path(&args.image, &languages).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.text);
        tracing::info!(
            confidence = report.recognition.confidence,
            quality = report.quality.score,
            strategy = %report.recognition.strategy,
            "Done"
        );
        for issue in &report.quality.issues {
            tracing::warn!(issue = %issue, "Quality issue");
        }
    }
    Ok(())
}

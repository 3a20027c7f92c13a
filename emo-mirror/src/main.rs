//! Emotion Mirror (emo-mirror) - Main entry point
//!
//! Runs a number of analyses of one image against the mock classifier, feeds
//! the avatar, environment and bias-feedback consumers from the publisher,
//! and prints what each of them ended up showing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use emo_common::config::load_config;
use emo_common::events::{AnalysisSession, EventBus};
use emo_common::EmotionLabel;
use emo_mirror::avatar::{AvatarReactor, AvatarView};
use emo_mirror::bias::{BiasFeedbackCollector, BiasReport, DemographicTags};
use emo_mirror::classifier::{ImageData, MockClassifier};
use emo_mirror::consumer::run_consumer;
use emo_mirror::environment::{AudioState, DeviceStatus, EnvironmentAdapter, LightState};
use emo_mirror::EmotionStatePublisher;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 1x1 transparent PNG used when no image file is given
const PLACEHOLDER_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Command-line arguments for emo-mirror
#[derive(Parser, Debug)]
#[command(name = "emo-mirror")]
#[command(about = "Emotion score pipeline with avatar, environment and bias-feedback consumers")]
#[command(version)]
struct Args {
    /// Number of analyses to run
    #[arg(short, long, default_value = "3")]
    analyses: u32,

    /// Image file to analyze (png, jpg, gif, webp, bmp)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Seed for reproducible mock scores (overrides config)
    #[arg(long, env = "EMO_MIRROR_SEED")]
    seed: Option<u64>,

    /// Simulated classifier latency in milliseconds (overrides config)
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Connect the simulated environment devices
    #[arg(long)]
    connected: bool,

    /// Enable the smart lights
    #[arg(long)]
    lights: bool,

    /// Enable the audio player
    #[arg(long)]
    audio: bool,

    /// Flag the final prediction as wrong, naming the actual emotion
    #[arg(long, value_name = "LABEL")]
    report: Option<EmotionLabel>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary {
    analyses_requested: u32,
    analyses_completed: u64,
    latest: Option<AnalysisSession>,
    avatar: AvatarView,
    lights: LightState,
    audio: AudioState,
    devices: DeviceStatus,
    recommendation: Option<&'static str>,
    report: Option<BiasReport>,
    total_reports: u64,
    accuracy_rate: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(latency_ms) = args.latency_ms {
        config.classifier.latency_ms = latency_ms;
    }
    if args.seed.is_some() {
        config.classifier.seed = args.seed;
    }

    let level = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("emo_mirror={0},emo_common={0}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Emotion Mirror: {} analyses, {}ms latency",
        args.analyses, config.classifier.latency_ms
    );

    let image = match &args.image {
        Some(path) => ImageData::from_file(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?,
        None => {
            info!("No image given, using built-in placeholder");
            ImageData::from_data_uri(PLACEHOLDER_IMAGE).context("Invalid placeholder image")?
        }
    };

    let classifier = Arc::new(MockClassifier::from_config(&config.classifier));
    let bus = EventBus::new(config.events.capacity);
    info!(
        "Event bus ready ({} events buffered per subscriber)",
        bus.capacity()
    );
    let publisher = EmotionStatePublisher::new(classifier, bus);

    let avatar = Arc::new(Mutex::new(AvatarReactor::new(config.avatar.pulse_duration())));
    let mut adapter = EnvironmentAdapter::new();
    adapter.set_connected(args.connected);
    adapter.set_lights_enabled(args.lights);
    adapter.set_audio_enabled(args.audio);
    let environment = Arc::new(Mutex::new(adapter));
    let bias = Arc::new(Mutex::new(BiasFeedbackCollector::new()));

    let consumers = vec![
        tokio::spawn(run_consumer(publisher.subscribe(), Arc::clone(&avatar))),
        tokio::spawn(run_consumer(publisher.subscribe(), Arc::clone(&environment))),
        tokio::spawn(run_consumer(publisher.subscribe(), Arc::clone(&bias))),
    ];

    for attempt in 1..=args.analyses {
        match publisher.submit(&image).await {
            Ok(session) => info!(
                "Analysis {}/{}: {} ({:.1}%)",
                attempt,
                args.analyses,
                session.top_emotion.label,
                session.top_emotion.percent()
            ),
            Err(e) => warn!("Analysis {}/{} failed: {}", attempt, args.analyses, e),
        }
    }

    let latest = publisher.latest_session();
    let analyses_completed = publisher.analyses_completed();

    // Closing the bus lets every consumer drain its queue and stop
    drop(publisher);
    for consumer in consumers {
        consumer.await.context("Consumer task failed")?;
    }

    let report = match args.report {
        Some(actual) => {
            let mut bias = bias.lock().await;
            match bias.submit_report(actual, DemographicTags::default(), "Reported from the command line") {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("Could not record bias report: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let avatar = avatar.lock().await;
    let environment = environment.lock().await;
    let bias = bias.lock().await;
    let summary = Summary {
        analyses_requested: args.analyses,
        analyses_completed,
        latest,
        avatar: avatar.view_at(Instant::now()),
        lights: environment.lights().clone(),
        audio: environment.audio().clone(),
        devices: environment.device_status(),
        recommendation: environment.recommendation(),
        report,
        total_reports: bias.total_reports(),
        accuracy_rate: bias.accuracy_rate(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "Analyses: {}/{} completed",
        summary.analyses_completed, summary.analyses_requested
    );

    match &summary.latest {
        Some(session) => {
            println!("Session {} at {}", session.session_id, session.completed_at);
            for score in session.distribution.iter() {
                println!("  {:<10} {:>5.1}%", score.label.as_str(), score.percent());
            }
        }
        None => println!("No completed session"),
    }

    println!("Avatar: {}", summary.avatar.message);
    if let Some(caption) = &summary.avatar.caption {
        println!("  {}", caption);
    }

    println!(
        "Devices: {} (lights {}, audio {})",
        if summary.devices.connected { "connected" } else { "disconnected" },
        if summary.devices.lights_active { "Active" } else { "Inactive" },
        if summary.devices.audio_active { "Active" } else { "Inactive" },
    );
    println!(
        "  Lights: {} at {}%",
        summary.lights.color, summary.lights.brightness
    );
    println!(
        "  Audio: '{}' at volume {}",
        summary.audio.current_track, summary.audio.volume
    );
    if let Some(recommendation) = summary.recommendation {
        println!("  {}", recommendation);
    }

    if let Some(report) = &summary.report {
        println!(
            "Bias report {}: predicted {}, actual {}",
            report.report_id, report.predicted_label, report.actual_label
        );
    }
    println!(
        "Reports: {}, accuracy {:.1}%",
        summary.total_reports,
        summary.accuracy_rate * 100.0
    );
}

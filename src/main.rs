//! Replays a scripted annotation session and prints the resulting boxes as JSON.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use spheremark::api::{InlineBackend, SyncBackend, SyncWorker};
use spheremark::config::SessionConfig;
use spheremark::replay::{self, ReplayReport, Script};
use spheremark::session::AnnotationSession;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a scripted panorama annotation session")]
struct Args {
    /// Script file (JSON)
    script: PathBuf,

    /// Config file (default: the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<log::LevelFilter>,

    /// Run service calls on a background thread
    #[arg(long)]
    worker: bool,

    /// Talk to the annotation service at the configured URL instead of the in-memory one
    #[cfg(feature = "http")]
    #[arg(long)]
    remote: bool,

    /// Service URL (implies --remote)
    #[cfg(feature = "http")]
    #[arg(long)]
    api_url: Option<String>,

    /// How long to wait for outstanding requests after the last step, in milliseconds
    #[arg(long, default_value_t = 5000)]
    settle_ms: u64,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(args.log_level.unwrap_or(config.log_level.to_level_filter()))
        .parse_default_env()
        .init();

    let json = std::fs::read_to_string(&args.script)?;
    let script = Script::from_json(&json)?;
    log::info!(
        "Replaying {:?}: image {}, {} steps",
        args.script,
        script.image_id,
        script.steps.len()
    );

    let settle = Duration::from_millis(args.settle_ms);
    let report = run(&args, config, &script, settle)?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", out);

    if report.unanswered > 0 {
        return Err(format!("{} requests unanswered", report.unanswered).into());
    }
    Ok(())
}

fn run(
    args: &Args,
    config: SessionConfig,
    script: &Script,
    settle: Duration,
) -> Result<ReplayReport, Box<dyn std::error::Error>> {
    #[cfg(feature = "http")]
    if args.remote || args.api_url.is_some() {
        let url = args.api_url.clone().unwrap_or_else(|| config.api_url.clone());
        if !script.seed.is_empty() {
            log::warn!("Ignoring {} seed records for remote service", script.seed.len());
        }
        log::info!("Using annotation service at {}", url);
        let worker = SyncWorker::spawn(spheremark::api::HttpApi::new(url))?;
        return Ok(replay_with(worker, config, script, settle));
    }

    let api = script.seeded_api();
    if args.worker {
        let worker = SyncWorker::spawn(api)?;
        Ok(replay_with(worker, config, script, settle))
    } else {
        Ok(replay_with(InlineBackend::new(api), config, script, settle))
    }
}

fn replay_with<B: SyncBackend>(
    backend: B,
    config: SessionConfig,
    script: &Script,
    settle: Duration,
) -> ReplayReport {
    let mut session = AnnotationSession::new(backend, config);
    replay::run(&mut session, script, settle)
}

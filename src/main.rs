//! moodtrack CLI
//!
//! Mood tracking from music listening.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use moodtrack::{
    classify,
    config::Config,
    core::{AnomalyTransition, FeatureSample},
    ingest::{FeedHandle, PlaybackEvent, ReplaySource, SampleFeed},
    snapshot::SnapshotBuilder,
    transparency::{create_shared_log_with_persistence, SessionLog, SharedSessionLog},
    MoodAgent, SampleOutcome, PRIVACY_DECLARATION, VERSION,
};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moodtrack")]
#[command(version = VERSION)]
#[command(about = "Mood tracking from music listening", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single valence/energy pair
    Classify {
        #[arg(long)]
        valence: f64,
        #[arg(long)]
        energy: f64,
    },

    /// Run recorded playback events (JSON Lines) through a session
    Replay {
        /// File with one playback event per line
        file: PathBuf,

        /// Write a mood snapshot when done
        #[arg(long)]
        export: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Read live playback events (JSON Lines) from stdin
    Watch {
        /// Seconds between applying the freshest event
        #[arg(long)]
        interval: Option<u64>,

        /// Write a mood snapshot on exit
        #[arg(long)]
        export: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Show cumulative processing statistics
    Status,

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,
}

/// Overrides for the configured engine settings.
#[derive(Args, Debug, Clone, Default)]
struct EngineArgs {
    /// Baseline smoothing factor in (0, 1]
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Distance above which a sample counts as a mood shift
    #[arg(long)]
    threshold: Option<f64>,

    /// Submit every poll, even repeats of the same track
    #[arg(long)]
    no_dedup: bool,
}

impl EngineArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(rate) = self.learning_rate {
            config.engine.baseline_learning_rate = rate;
        }
        if let Some(threshold) = self.threshold {
            config.engine.anomaly_threshold = threshold;
        }
        if self.no_dedup {
            config.suppress_duplicates = false;
        }
        config.validate().context("invalid engine settings")?;
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify { valence, energy } => cmd_classify(valence, energy),
        Commands::Replay {
            file,
            export,
            engine,
        } => cmd_replay(&file, export, &engine),
        Commands::Watch {
            interval,
            export,
            engine,
        } => cmd_watch(interval, export, &engine),
        Commands::Status => cmd_status(),
        Commands::Privacy => {
            cmd_privacy();
            Ok(())
        }
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_classify(valence: f64, energy: f64) -> Result<()> {
    let sample = FeatureSample::new(valence, energy, 0.0);
    let emotion = classify(&sample);

    println!("Mood: {} (score {:.1})", emotion.label, emotion.score);
    println!("Mood index: {:.3}", sample.mood_index());
    Ok(())
}

fn cmd_replay(file: &Path, export: bool, engine: &EngineArgs) -> Result<()> {
    let mut config = Config::load().unwrap_or_default();
    engine.apply(&mut config)?;

    let log = create_shared_log_with_persistence(config.stats_path());
    let mut agent = MoodAgent::from_config(&config, log.clone());

    let source = ReplaySource::open(file)
        .with_context(|| format!("could not open recording {}", file.display()))?;

    for event in source {
        match event {
            Ok(event) => {
                if let Some(outcome) = agent.handle_event(event) {
                    print_outcome(&outcome);
                }
            }
            Err(e) => warn!("skipping event: {e}"),
        }
    }

    finish_session(&agent, &config, &log, export)
}

fn cmd_watch(interval: Option<u64>, export: bool, engine: &EngineArgs) -> Result<()> {
    let mut config = Config::load().unwrap_or_default();
    if let Some(secs) = interval {
        config.poll_interval = Duration::from_secs(secs);
    }
    engine.apply(&mut config)?;

    println!("moodtrack v{VERSION}");
    println!(
        "  Learning rate: {}  Threshold: {}  Interval: {}s",
        config.engine.baseline_learning_rate,
        config.engine.anomaly_threshold,
        config.poll_interval.as_secs()
    );
    println!("Reading playback events from stdin. Press Ctrl+C to stop");
    println!();

    let log = create_shared_log_with_persistence(config.stats_path());
    let mut agent = MoodAgent::from_config(&config, log.clone());

    let mut feed = SampleFeed::default();
    feed.start()?;

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    let input_done = Arc::new(AtomicBool::new(false));
    spawn_stdin_reader(feed.handle(), input_done.clone());

    let mut last_tick = Instant::now();
    while running.load(Ordering::SeqCst) {
        let finished = input_done.load(Ordering::SeqCst);

        if finished || last_tick.elapsed() >= config.poll_interval {
            if let Some(event) = feed.take_latest() {
                if let Some(outcome) = agent.handle_event(event) {
                    print_outcome(&outcome);
                }
            }
            last_tick = Instant::now();
        }

        if finished {
            debug!("stdin closed");
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }

    println!();
    println!("Stopping...");
    feed.stop();

    finish_session(&agent, &config, &log, export)
}

/// Forward stdin lines into the feed until EOF.
fn spawn_stdin_reader(handle: FeedHandle, done: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("stdin read failed: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PlaybackEvent>(&line) {
                Ok(event) => handle.push(event),
                Err(e) => warn!("ignoring malformed event: {e}"),
            }
        }
        done.store(true, Ordering::SeqCst);
    });
}

fn print_outcome(outcome: &SampleOutcome) {
    let update = &outcome.update;
    println!(
        "[{}] {} | {} ({:.1}) | distance {:.3} | {}",
        outcome.entry.timestamp.format("%H:%M:%S"),
        outcome.entry.label,
        update.emotion.label,
        update.emotion.score,
        update.distance,
        if update.anomalous { "SHIFT" } else { "stable" }
    );
    if update.transition == Some(AnomalyTransition::Raised) {
        println!(
            "  Mood shift detected ({}). How are you feeling right now?",
            update.emotion.label
        );
    }
}

fn finish_session(
    agent: &MoodAgent,
    config: &Config,
    log: &SharedSessionLog,
    export: bool,
) -> Result<()> {
    let session = agent.session();
    let baseline = session.baseline_snapshot();

    println!();
    println!(
        "Baseline: valence {:.3}, energy {:.3} | current mood: {}{}",
        baseline.valence,
        baseline.energy,
        session.latest_emotion_state().label,
        if session.is_anomalous() { " (shifted)" } else { "" }
    );

    if export && !session.history().is_empty() {
        let path = export_snapshot(agent, config)?;
        log.record_snapshot_exported();
        println!("Exported snapshot to {path:?}");
    }

    if let Err(e) = log.save() {
        warn!("could not save session stats: {e}");
    }

    println!();
    println!("{}", log.summary());
    Ok(())
}

fn export_snapshot(agent: &MoodAgent, config: &Config) -> Result<PathBuf> {
    config.ensure_directories()?;

    let session_id = format!("SESS-{}", Utc::now().timestamp_millis());
    let builder = SnapshotBuilder::new().with_session_id(session_id);
    let json = serde_json::to_string_pretty(&builder.build(agent.session()))?;

    let path = config.export_path.join(format!(
        "mood_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::write(&path, json).with_context(|| format!("could not write {}", path.display()))?;
    Ok(path)
}

fn cmd_status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("moodtrack Status");
    println!("================");
    println!();
    println!("Configuration:");
    println!(
        "  Learning rate: {}",
        config.engine.baseline_learning_rate
    );
    println!("  Anomaly threshold: {}", config.engine.anomaly_threshold);
    println!("  History capacity: {}", config.history_capacity);
    println!("  Duplicate suppression: {}", config.suppress_duplicates);
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        let stats = SessionLog::with_persistence(stats_path).stats();
        println!("Cumulative Statistics:");
        println!("  Playback polls received: {}", stats.observations_received);
        println!("  Samples submitted: {}", stats.samples_submitted);
        println!("  Repeated polls suppressed: {}", stats.duplicates_suppressed);
        println!("  Mood shifts detected: {}", stats.anomalies_raised);
        println!("  Snapshots exported: {}", stats.snapshots_exported);
    } else {
        println!("No previous session data found.");
    }
    Ok(())
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("could not install Ctrl+C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_exports_only_on_request() {
        let cli = Cli::try_parse_from(["moodtrack", "watch"]).unwrap();
        assert!(matches!(cli.command, Commands::Watch { export: false, .. }));

        let cli = Cli::try_parse_from(["moodtrack", "watch", "--export", "--interval", "2"]).unwrap();
        match cli.command {
            Commands::Watch {
                interval, export, ..
            } => {
                assert_eq!(interval, Some(2));
                assert!(export);
            }
            _ => panic!("expected watch"),
        }
    }
}

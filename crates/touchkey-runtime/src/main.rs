//! `touchkey` command-line entry point.
//!
//! Two subcommands exercise the whole touch pipeline without a camera:
//!
//! ```text
//! touchkey replay --trace session.tktr [--config touchkey.toml] [--json] [--target-accuracy 0.95]
//! touchkey synthesize --text "hello" --out hello.tktr
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load AppConfig        -- --config path or the platform config file
//!  └─ init tracing          -- RUST_LOG, else [logging] level
//!  └─ replay
//!       ├─ TraceFileSource  (reader thread)
//!       ├─ pump thread      (std mpsc → SessionHandle::blocking_send_sample)
//!       └─ TouchSession     (Tokio task) → TextBufferInjector
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use touchkey_core::{TouchValidationEngine, TraceWriter};
use touchkey_runtime::application::accuracy::{AccuracyReport, DEFAULT_TARGET_ACCURACY};
use touchkey_runtime::application::touch_session::spawn_session;
use touchkey_runtime::infrastructure::injection::TextBufferInjector;
use touchkey_runtime::infrastructure::sample_source::synthetic::{typing_frames, TypingProfile};
use touchkey_runtime::infrastructure::sample_source::trace_file::TraceFileSource;
use touchkey_runtime::infrastructure::sample_source::SampleSource;
use touchkey_runtime::infrastructure::storage::config::{self, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Shadow-based touch keyboard tools.
#[derive(Debug, Parser)]
#[command(
    name = "touchkey",
    about = "Replay and synthesize touch traces for the touchkey validation engine",
    version
)]
struct Cli {
    /// Configuration file.  Defaults to the platform config file; a missing
    /// file means built-in defaults.
    #[arg(long, global = true, env = "TOUCHKEY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a trace through a touch session and report accuracy.
    Replay {
        /// Trace file to replay.
        #[arg(long)]
        trace: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,

        /// Accuracy the replay must reach to pass.  A miss exits with an error.
        #[arg(long, default_value_t = DEFAULT_TARGET_ACCURACY)]
        target_accuracy: f64,
    },
    /// Write a synthetic trace that types the given text.
    Synthesize {
        /// Text to type.  Letters and spaces only on the default layout.
        #[arg(long)]
        text: String,

        /// Output trace file.
        #[arg(long)]
        out: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;

    // Initialise structured logging.  `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.logging.level)),
        )
        .init();

    match cli.command {
        Command::Replay {
            trace,
            json,
            target_accuracy,
        } => replay(&app_config, &trace, json, target_accuracy).await,
        Command::Synthesize { text, out } => synthesize(&app_config, &text, &out),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

async fn replay(
    app_config: &AppConfig,
    trace: &Path,
    json: bool,
    target_accuracy: f64,
) -> anyhow::Result<()> {
    let layout = app_config
        .layout
        .build_layout()
        .context("invalid [layout] configuration")?;
    let engine = TouchValidationEngine::new(app_config.validation.to_engine_config())
        .context("invalid [validation] configuration")?;
    let source = TraceFileSource::open(trace)
        .with_context(|| format!("cannot replay {}", trace.display()))?;

    let injector = Arc::new(TextBufferInjector::new());
    let (handle, session, mut feedback) = spawn_session(
        engine,
        layout,
        injector.clone(),
        app_config.session.channel_capacity,
    );
    info!(session_id = %handle.id(), trace = %source.path().display(), "replay started");

    // Per-frame results are only interesting at debug level.
    let drain = tokio::spawn(async move {
        while let Some(result) = feedback.recv().await {
            debug!(result = result.name(), "frame result");
        }
    });

    // Replay must not drop frames, so the pump waits for channel capacity.
    let frames = source.start()?;
    let pump_handle = handle.clone();
    let pumped = tokio::task::spawn_blocking(move || {
        let mut count = 0u64;
        for frame in frames {
            if pump_handle
                .blocking_send_sample(frame.sample, frame.hand_detected)
                .is_err()
            {
                break;
            }
            count += 1;
        }
        count
    })
    .await
    .context("sample pump panicked")?;

    handle.shutdown().await?;
    let last = session.await.context("touch session panicked")?;
    drain.await.context("feedback drain panicked")?;

    info!(frames = pumped, "replay finished");
    let report = AccuracyReport::from_statistics(&last.statistics, target_accuracy);
    if json {
        let out = serde_json::json!({
            "session_id": last.session_id.to_string(),
            "trace": trace.display().to_string(),
            "frames": last.frames_processed,
            "typed_text": injector.text(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("replayed {} frames from {}", last.frames_processed, trace.display());
        println!("typed: {:?}", injector.text());
        print!("{report}");
    }
    ensure_target(&report)
}

/// Turns a missed accuracy target into an error so the exit status reflects it.
fn ensure_target(report: &AccuracyReport) -> anyhow::Result<()> {
    if !report.meets_target {
        anyhow::bail!(
            "accuracy {} is below the target {:.2}",
            report
                .accuracy
                .map_or_else(|| "n/a".to_string(), |a| format!("{a:.4}")),
            report.target
        );
    }
    Ok(())
}

fn synthesize(app_config: &AppConfig, text: &str, out: &Path) -> anyhow::Result<()> {
    let layout = app_config
        .layout
        .build_layout()
        .context("invalid [layout] configuration")?;
    let frames = typing_frames(&layout, text, &TypingProfile::default())?;

    let file = File::create(out).with_context(|| format!("cannot create {}", out.display()))?;
    let mut writer = TraceWriter::new(BufWriter::new(file))?;
    for frame in &frames {
        writer.write_frame(frame)?;
    }
    let written = writer.frames_written();
    writer.finish()?;

    info!(frames = written, out = %out.display(), "synthetic trace written");
    println!("wrote {written} frames typing {text:?} to {}", out.display());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

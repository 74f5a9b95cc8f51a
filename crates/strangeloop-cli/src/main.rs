//! strangeloop: rhythm sequencing and chaotic-signal sonification

mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strangeloop_core::{
    Axis, EventList, InstrumentId, InstrumentRegistry, LoopShape, RosslerParams, RunSet, Stream,
    gradient_onsets, integrate, normalize, onset_timestamps, threshold_onsets,
};
use strangeloop_services::{ConsolePlayer, run_concurrently};

use session::Session;

#[derive(Parser)]
#[command(name = "strangeloop")]
#[command(about = "Rhythm sequencing and synchronized multi-stream playback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the sequences described by a session file
    Play {
        /// Session JSON path
        session: PathBuf,
    },

    /// Sonify the Rössler attractor as three concurrent axis streams
    Sonify {
        /// Onset detection method
        #[arg(long, value_enum, default_value = "gradient")]
        method: Method,

        /// Integration steps
        #[arg(long, default_value = "50000")]
        steps: usize,

        /// Euler integration step size
        #[arg(long, default_value = "0.01")]
        step_size: f64,

        /// Playback rate in integration steps per second
        #[arg(long, default_value = "2000.0")]
        steps_per_second: f64,

        /// Loop count for every axis stream
        #[arg(long, default_value = "1")]
        loops: u32,

        /// Per-axis onset thresholds (x,y,z)
        #[arg(long, value_delimiter = ',', default_value = "0,0,0")]
        thresholds: Vec<f64>,

        /// Rössler coefficient a
        #[arg(long, default_value = "0.29")]
        a: f64,

        /// Rössler coefficient b
        #[arg(long, default_value = "0.14")]
        b: f64,

        /// Rössler coefficient c
        #[arg(long, default_value = "14.0")]
        c: f64,
    },
}

/// How a normalized axis turns into onsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Fire where the axis rises through its threshold
    Threshold,
    /// Fire where the axis gradient rises through its threshold
    Gradient,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strangeloop=info".parse()?)
                .add_directive("strangeloop_services=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { session } => cmd_play(&session),
        Commands::Sonify {
            method,
            steps,
            step_size,
            steps_per_second,
            loops,
            thresholds,
            a,
            b,
            c,
        } => cmd_sonify(
            method,
            steps,
            step_size,
            steps_per_second,
            loops,
            &thresholds,
            RosslerParams { a, b, c },
        ),
    }
}

fn cmd_play(path: &Path) -> anyhow::Result<()> {
    let session = Session::load(path)?;
    info!(sequences = session.sequences.len(), "Session loaded");

    let run_set = session.into_run_set();
    anyhow::ensure!(!run_set.is_empty(), "session has no playable sequences");

    play_run_set(run_set)
}

fn cmd_sonify(
    method: Method,
    steps: usize,
    step_size: f64,
    steps_per_second: f64,
    loops: u32,
    thresholds: &[f64],
    params: RosslerParams,
) -> anyhow::Result<()> {
    anyhow::ensure!(steps_per_second > 0.0, "steps-per-second must be positive");
    anyhow::ensure!(step_size > 0.0, "step-size must be positive");
    anyhow::ensure!(
        thresholds.len() == 3,
        "expected one threshold per axis (x,y,z)"
    );

    info!(?method, steps, steps_per_second, "Integrating attractor");
    let series = integrate(params, (0.1, 0.1, 0.1), steps, step_size);

    let mut run_set = RunSet::new(InstrumentRegistry::default_axes());
    for (axis, &threshold) in Axis::ALL.iter().zip(thresholds) {
        let normalized = normalize(series.axis(*axis));
        let onsets = match method {
            Method::Threshold => threshold_onsets(&normalized, threshold),
            Method::Gradient => gradient_onsets(&normalized, threshold),
        };
        let (timestamps, span) = onset_timestamps(&onsets, steps_per_second);

        let instruments = vec![InstrumentId::Axis(*axis); timestamps.len()];
        let events = EventList::build(&timestamps, &instruments)?;
        let stream =
            Stream::new(format!("Axis {}", axis.name()), events, loops, LoopShape::Repeated)?
                .with_span(span);

        info!(
            axis = axis.name(),
            onsets = stream.events().len(),
            span_s = span.as_secs_f64(),
            "Axis conditioned"
        );
        run_set.add_stream(stream);
    }

    play_run_set(run_set)
}

fn play_run_set(run_set: RunSet) -> anyhow::Result<()> {
    let facility = Arc::new(ConsolePlayer::new(run_set.registry()));
    let results = run_concurrently(run_set, facility);

    let mut failures = 0;
    for result in &results {
        match result {
            Ok(outcome) => info!(
                stream = %outcome.label,
                events = outcome.events_fired,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                max_latency_us = outcome.max_latency.as_micros() as u64,
                "Stream completed"
            ),
            Err(err) => {
                failures += 1;
                error!(%err, "Stream failed");
            }
        }
    }

    anyhow::ensure!(
        failures == 0,
        "{failures} of {} streams failed",
        results.len()
    );
    Ok(())
}

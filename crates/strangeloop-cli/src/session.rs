//! Session documents: declarative multi-sequence playback setups
//!
//! A session file carries a default tempo, any number of rhythm lines,
//! and an optional sample table. Sequences that fail validation are
//! reported and skipped so the rest of the session still plays.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use strangeloop_core::{
    EventList, InstrumentId, InstrumentRegistry, InstrumentSpec, LoopShape, RunSet, SequenceError,
    Stream, Tempo, durations_to_ticks, loop_span, ticks_to_seconds,
};

/// A playable session: a default tempo plus any number of sequences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Default tempo for sequences that do not set their own
    pub bpm: f64,
    pub sequences: Vec<SequenceSpec>,
    /// Sample table by slot; empty means the default toy-percussion slots
    #[serde(default)]
    pub samples: HashMap<u16, SampleSpec>,
}

/// One rhythm line in a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSpec {
    /// Display label; defaults to "Sequence N"
    #[serde(default)]
    pub label: Option<String>,
    /// Note durations in quarter-note units (0.25 = sixteenth)
    pub durations: Vec<f64>,
    /// Sample slot per note
    pub instruments: Vec<u16>,
    /// Tempo override for this sequence
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default = "default_loops")]
    pub loops: u32,
    /// Which loop-expansion convention the player applies
    #[serde(default)]
    pub shape: LoopShape,
}

fn default_loops() -> u32 {
    4
}

/// A sample slot entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSpec {
    pub label: String,
    /// Nominal sample length in milliseconds
    pub length_ms: u64,
}

impl Session {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading session {}", path.display()))?;
        let session: Session = serde_json::from_str(&text)
            .with_context(|| format!("parsing session {}", path.display()))?;
        Ok(session)
    }

    /// Build the run set, skipping sequences that fail validation
    pub fn into_run_set(self) -> RunSet {
        let registry = self.build_registry();
        let mut run_set = RunSet::new(registry);

        for (idx, sequence) in self.sequences.iter().enumerate() {
            let label = sequence
                .label
                .clone()
                .unwrap_or_else(|| format!("Sequence {}", idx + 1));

            match build_stream(&label, sequence, self.bpm) {
                Ok(stream) => {
                    info!(
                        stream = %label,
                        events = stream.events().len(),
                        loops = stream.loops(),
                        "Sequence ready"
                    );
                    run_set.add_stream(stream);
                }
                Err(err) => {
                    warn!(stream = %label, %err, "Skipping invalid sequence");
                }
            }
        }

        run_set
    }

    fn build_registry(&self) -> InstrumentRegistry {
        if self.samples.is_empty() {
            return InstrumentRegistry::default_slots();
        }
        let mut registry = InstrumentRegistry::new();
        for (&slot, sample) in &self.samples {
            registry.insert(
                InstrumentId::Slot(slot),
                InstrumentSpec::new(&sample.label, Duration::from_millis(sample.length_ms)),
            );
        }
        registry
    }
}

fn build_stream(
    label: &str,
    sequence: &SequenceSpec,
    fallback_bpm: f64,
) -> Result<Stream, SequenceError> {
    let tempo = Tempo::new(sequence.bpm.unwrap_or(fallback_bpm))?;

    // A non-positive duration mid-line can leave every cumulative offset
    // non-negative, so the event builder alone cannot catch it
    if let Some(index) = sequence
        .durations
        .iter()
        .position(|&d| !d.is_finite() || d <= 0.0)
    {
        return Err(SequenceError::InvalidDuration {
            index,
            value: sequence.durations[index],
        });
    }

    // A premultiplied sequence is authored as one pass and expanded here,
    // so its event list spans every repetition up front
    let (durations, instruments) = match sequence.shape {
        LoopShape::Repeated => (sequence.durations.clone(), sequence.instruments.clone()),
        LoopShape::Premultiplied => (
            sequence.durations.repeat(sequence.loops as usize),
            sequence.instruments.repeat(sequence.loops as usize),
        ),
    };

    let timestamps = ticks_to_seconds(&durations_to_ticks(&durations), tempo);
    let slots: Vec<InstrumentId> = instruments.iter().map(|&s| InstrumentId::Slot(s)).collect();
    let events = EventList::build(&timestamps, &slots)?;
    let span = loop_span(&durations, tempo);

    Ok(Stream::new(label, events, sequence.loops, sequence.shape)?.with_span(span))
}

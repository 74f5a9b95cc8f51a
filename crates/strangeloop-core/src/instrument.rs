//! Instrument identities and the sample registry

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One coordinate channel of a three-dimensional signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

/// Identifies which sample an event triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentId {
    /// Numbered sample slot from a session
    Slot(u16),
    /// Sonification channel
    Axis(Axis),
}

/// A registered sample: display label and nominal playback length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub label: String,
    /// How long a triggered instance nominally sounds
    pub nominal_len: Duration,
}

impl InstrumentSpec {
    pub fn new(label: impl Into<String>, nominal_len: Duration) -> Self {
        Self {
            label: label.into(),
            nominal_len,
        }
    }
}

/// Maps instrument ids to their samples
///
/// Owned by the run set and shared with playback facilities; every
/// collaborator resolves instruments through this one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentRegistry {
    instruments: HashMap<InstrumentId, InstrumentSpec>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three numbered toy-percussion slots
    pub fn default_slots() -> Self {
        let mut registry = Self::new();
        registry.insert(
            InstrumentId::Slot(1),
            InstrumentSpec::new("toyhit", Duration::from_millis(300)),
        );
        registry.insert(
            InstrumentId::Slot(2),
            InstrumentSpec::new("toycar", Duration::from_millis(400)),
        );
        registry.insert(
            InstrumentId::Slot(3),
            InstrumentSpec::new("toytrain", Duration::from_millis(500)),
        );
        registry
    }

    /// The default axis-to-sample mapping for sonification
    pub fn default_axes() -> Self {
        let mut registry = Self::new();
        registry.insert(
            InstrumentId::Axis(Axis::X),
            InstrumentSpec::new("bleep", Duration::from_millis(180)),
        );
        registry.insert(
            InstrumentId::Axis(Axis::Y),
            InstrumentSpec::new("hihat", Duration::from_millis(120)),
        );
        registry.insert(
            InstrumentId::Axis(Axis::Z),
            InstrumentSpec::new("kick", Duration::from_millis(250)),
        );
        registry
    }

    pub fn insert(&mut self, id: InstrumentId, spec: InstrumentSpec) {
        self.instruments.insert(id, spec);
    }

    pub fn get(&self, id: InstrumentId) -> Option<&InstrumentSpec> {
        self.instruments.get(&id)
    }

    pub fn contains(&self, id: InstrumentId) -> bool {
        self.instruments.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

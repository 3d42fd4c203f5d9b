//! The terminal artifact of the pipeline.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::form::Section;
use crate::harmony::ChordEvent;
use crate::hash::canonical_hash;
use crate::instrument::Role;
use crate::note::Track;
use crate::params::MusicParameters;

/// A fully assembled multi-track composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub parameters: MusicParameters,
    pub sections: Vec<Section>,
    pub chords: Vec<ChordEvent>,
    pub tracks: Vec<Track>,
    pub seed: u64,
    pub diagnostics: Diagnostics,
}

impl Composition {
    /// BLAKE3 hash of the canonical JSON form.
    pub fn canonical_hash(&self) -> Result<String, serde_json::Error> {
        canonical_hash(self)
    }

    /// Total number of notes across all tracks.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// Tracks serving a role, in track order.
    pub fn tracks_for(&self, role: Role) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.role == role)
    }

    /// Tick just past the last sounding note.
    pub fn end_tick(&self) -> u32 {
        self.tracks.iter().map(Track::end_tick).max().unwrap_or(0)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

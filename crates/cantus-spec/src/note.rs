//! Note events and tracks.

use serde::{Deserialize, Serialize};

use crate::instrument::{InstrumentId, Role};

/// Tick resolution.
pub const TICKS_PER_BEAT: u32 = 480;

/// Why a note was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTag {
    ChordTone,
    ScaleTone,
    Passing,
    Neighbor,
    Bass,
    Accompaniment,
    Percussion,
}

impl NoteTag {
    /// Non-harmonic tones exempt from the chord/scale membership rule.
    pub fn is_non_harmonic(self) -> bool {
        matches!(self, NoteTag::Passing | NoteTag::Neighbor)
    }
}

/// A single note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch.
    pub pitch: u8,
    pub start_tick: u32,
    pub duration_ticks: u32,
    pub velocity: u8,
    pub role: Role,
    /// Index of the owning section.
    pub section: usize,
    /// Owning track index, assigned by the allocator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<u16>,
    pub tag: NoteTag,
}

impl NoteEvent {
    pub fn end_tick(&self) -> u32 {
        self.start_tick + self.duration_ticks
    }
}

/// An instrument playing one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub index: u16,
    pub instrument: InstrumentId,
    pub role: Role,
    /// Part name within the role (e.g., "lead", "arpeggio", "drums").
    pub part: String,
    /// Notes sorted by start tick, then pitch.
    pub notes: Vec<NoteEvent>,
}

impl Track {
    /// Tick just past the last sounding note.
    pub fn end_tick(&self) -> u32 {
        self.notes.iter().map(NoteEvent::end_tick).max().unwrap_or(0)
    }

    /// Whether notes are sorted by (start, pitch).
    pub fn is_ordered(&self) -> bool {
        self.notes
            .windows(2)
            .all(|w| (w[0].start_tick, w[0].pitch) <= (w[1].start_tick, w[1].pitch))
    }
}

/// Sorts notes by start tick, then pitch.
pub fn sort_notes(notes: &mut [NoteEvent]) {
    notes.sort_by_key(|n| (n.start_tick, n.pitch));
}

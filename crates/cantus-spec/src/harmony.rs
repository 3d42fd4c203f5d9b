//! Chord events produced by the harmony engine.

use serde::{Deserialize, Serialize};

use crate::pitch::KeyContext;

/// Chord size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Triad,
    Seventh,
    Ninth,
}

/// Tones added above the triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    Seventh,
    Ninth,
}

/// One chord of the progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    /// Scale-degree token realized (e.g., "5", "b7").
    pub degree: String,
    /// Root pitch class.
    pub root: u8,
    pub quality: ChordQuality,
    pub extensions: Vec<Extension>,
    /// Borrowed from the parallel mode.
    pub borrowed: bool,
    /// Local key (differs from the home key inside a relative-key bridge).
    pub key: KeyContext,
    /// Chord-tone semitone offsets above the root, ascending, starting at 0.
    pub intervals: Vec<u8>,
    pub start_beat: u32,
    pub duration_beats: u32,
    /// Index of the owning section.
    pub section: usize,
    /// Tension of the owning section.
    pub tension: f64,
}

impl ChordEvent {
    /// Beat just past the end of the chord.
    pub fn end_beat(&self) -> u32 {
        self.start_beat + self.duration_beats
    }

    /// Whether the chord sounds at a beat.
    pub fn covers(&self, beat: u32) -> bool {
        beat >= self.start_beat && beat < self.end_beat()
    }

    /// Chord-tone pitch classes, root first.
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.intervals
            .iter()
            .map(|&i| (self.root + i) % 12)
            .collect()
    }

    /// Pitch classes of the triad only (root, third, fifth).
    pub fn triad_pitch_classes(&self) -> Vec<u8> {
        self.pitch_classes().into_iter().take(3).collect()
    }

    /// Whether a pitch (any octave) is a chord tone.
    pub fn contains(&self, pitch: u8) -> bool {
        self.pitch_classes().contains(&(pitch % 12))
    }

    /// Pitch class of the fifth (the root when the chord has no fifth).
    pub fn fifth_pc(&self) -> u8 {
        self.intervals
            .get(2)
            .map(|&i| (self.root + i) % 12)
            .unwrap_or(self.root)
    }
}

/// Finds the chord sounding at a beat. Chords must be sorted by start.
pub fn chord_at(chords: &[ChordEvent], beat: u32) -> Option<&ChordEvent> {
    let idx = chords.partition_point(|c| c.start_beat <= beat);
    if idx == 0 {
        return None;
    }
    let chord = &chords[idx - 1];
    chord.covers(beat).then_some(chord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Mode;

    fn chord(root: u8, start: u32, dur: u32) -> ChordEvent {
        ChordEvent {
            degree: "1".to_string(),
            root,
            quality: ChordQuality::Triad,
            extensions: Vec::new(),
            borrowed: false,
            key: KeyContext::new(0, Mode::Major),
            intervals: vec![0, 4, 7],
            start_beat: start,
            duration_beats: dur,
            section: 0,
            tension: 0.3,
        }
    }

    #[test]
    fn test_pitch_classes_wrap() {
        let g = chord(7, 0, 4);
        assert_eq!(g.pitch_classes(), vec![7, 11, 2]);
        assert!(g.contains(62));
        assert!(!g.contains(60));
        assert_eq!(g.fifth_pc(), 2);
    }

    #[test]
    fn test_chord_at() {
        let chords = vec![chord(0, 0, 4), chord(7, 4, 4)];
        assert_eq!(chord_at(&chords, 0).map(|c| c.root), Some(0));
        assert_eq!(chord_at(&chords, 5).map(|c| c.root), Some(7));
        assert!(chord_at(&chords, 8).is_none());
    }
}

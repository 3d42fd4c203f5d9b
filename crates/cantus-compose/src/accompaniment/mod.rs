//! Bass line, accompaniment parts and the percussion lane.
//!
//! Everything here depends only on the chord progression (and the section
//! plan, for percussion), never on the melody, so it runs alongside the
//! melody generator.

mod bass;
mod parts;
mod percussion;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cantus_spec::{AccompanimentPattern, ChordEvent, MusicParameters, NoteEvent};

pub use bass::generate_bass;
pub use parts::{generate_part, voice_chord};
pub use percussion::{generate_percussion, Drum};

/// One accompaniment part, rendered in a single pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccompanimentPart {
    pub pattern: AccompanimentPattern,
    pub notes: Vec<NoteEvent>,
}

impl AccompanimentPart {
    /// Part name used for the track ("block", "arpeggio", ...).
    pub fn name(&self) -> &'static str {
        self.pattern.as_str()
    }
}

/// Output of [`generate_bass_and_accompaniment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BassAndAccompaniment {
    pub bass: Vec<NoteEvent>,
    /// One part per accompaniment pattern, in parameter order.
    pub parts: Vec<AccompanimentPart>,
}

/// Generate the bass line and one part per accompaniment pattern.
pub fn generate_bass_and_accompaniment(
    params: &MusicParameters,
    chords: &[ChordEvent],
    seed: u64,
) -> BassAndAccompaniment {
    let bass = generate_bass(params, chords, seed);
    let mut patterns: Vec<AccompanimentPattern> = Vec::new();
    for &pattern in &params.accompaniment {
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    }
    let parts: Vec<AccompanimentPart> = patterns
        .into_iter()
        .map(|pattern| AccompanimentPart {
            pattern,
            notes: generate_part(params, chords, pattern, seed),
        })
        .collect();
    debug!(
        bass = bass.len(),
        parts = parts.len(),
        pattern = ?params.bass_pattern,
        "generated bass and accompaniment"
    );
    BassAndAccompaniment { bass, parts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{params_for, plan};
    use cantus_spec::{MusicalForm, NoteTag, Role, TICKS_PER_BEAT};
    use pretty_assertions::assert_eq;

    #[test]
    fn one_part_per_distinct_pattern() {
        let mut params = params_for("pop", MusicalForm::Compact, 120, 60.0);
        params.accompaniment = vec![
            AccompanimentPattern::Block,
            AccompanimentPattern::Pad,
            AccompanimentPattern::Block,
        ];
        let (_, chords) = plan(&params, 1);
        let output = generate_bass_and_accompaniment(&params, &chords, 1);
        let names: Vec<&str> = output.parts.iter().map(AccompanimentPart::name).collect();
        assert_eq!(names, vec!["block", "pad"]);
        assert!(!output.bass.is_empty());
    }

    #[test]
    fn roles_and_tags_are_set() {
        let params = params_for("jazz", MusicalForm::Aaba, 132, 90.0);
        let (_, chords) = plan(&params, 2);
        let output = generate_bass_and_accompaniment(&params, &chords, 2);
        assert!(output
            .bass
            .iter()
            .all(|n| n.role == Role::Bass && n.tag == NoteTag::Bass));
        for part in &output.parts {
            assert!(part
                .notes
                .iter()
                .all(|n| n.role == Role::Harmony && n.tag == NoteTag::Accompaniment));
        }
    }

    #[test]
    fn nothing_outlasts_the_progression() {
        let params = params_for("classical", MusicalForm::Compact, 96, 75.0);
        let (_, chords) = plan(&params, 6);
        let end = chords.last().unwrap().end_beat() * TICKS_PER_BEAT;
        let output = generate_bass_and_accompaniment(&params, &chords, 6);
        let all = output
            .bass
            .iter()
            .chain(output.parts.iter().flat_map(|p| p.notes.iter()));
        for note in all {
            assert!(note.end_tick() <= end);
            assert!(note.duration_ticks > 0);
        }
    }

    #[test]
    fn independent_of_melody_and_deterministic() {
        let params = params_for("rock", MusicalForm::Song, 128, 120.0);
        let (_, chords) = plan(&params, 12);
        assert_eq!(
            generate_bass_and_accompaniment(&params, &chords, 12),
            generate_bass_and_accompaniment(&params, &chords, 12)
        );
    }
}

//! Bass line generation.

use rand::Rng;

use cantus_spec::note::sort_notes;
use cantus_spec::{
    BassPattern, ChordEvent, MusicParameters, NoteEvent, NoteTag, Role, TICKS_PER_BEAT,
};

use crate::utils::{clamp_midi, rng_for, velocity};

const STAGE: &str = "bass";

/// MIDI note of the bass register's C.
pub const BASS_FLOOR: u8 = 36;

fn bass_pitch(pc: u8) -> u8 {
    BASS_FLOOR + pc % 12
}

/// Generate the bass line for the progression.
pub fn generate_bass(params: &MusicParameters, chords: &[ChordEvent], seed: u64) -> Vec<NoteEvent> {
    let ts = params.time_signature;
    let mut notes = Vec::new();
    for (i, chord) in chords.iter().enumerate() {
        let root = bass_pitch(chord.root);
        let fifth = bass_pitch(chord.fifth_pc());
        let fifth = if fifth < root { fifth + 12 } else { fifth };
        let start = chord.start_beat * TICKS_PER_BEAT;
        let length = chord.duration_beats * TICKS_PER_BEAT;
        let mut push = |pitch: u8, tick: u32, duration: u32| {
            let beat = tick / TICKS_PER_BEAT;
            let accent = if tick % TICKS_PER_BEAT == 0
                && ts.beat_strength(beat % ts.beats_per_bar()) == 2
            {
                8.0
            } else {
                0.0
            };
            notes.push(NoteEvent {
                pitch,
                start_tick: tick,
                duration_ticks: duration,
                velocity: velocity(70.0, 30.0, chord.tension, accent),
                role: Role::Bass,
                section: chord.section,
                track: None,
                tag: NoteTag::Bass,
            });
        };

        match params.bass_pattern {
            BassPattern::Root => push(root, start, length),
            BassPattern::RootFifth => {
                for b in 0..chord.duration_beats {
                    let pitch = if b % 2 == 0 { root } else { fifth };
                    push(pitch, start + b * TICKS_PER_BEAT, TICKS_PER_BEAT);
                }
            }
            BassPattern::Octave => {
                let eighth = TICKS_PER_BEAT / 2;
                for step in 0..chord.duration_beats * 2 {
                    let pitch = if step % 2 == 0 { root } else { root + 12 };
                    push(pitch, start + step * eighth, eighth);
                }
            }
            BassPattern::Walking => {
                let mut rng = rng_for(seed, STAGE, i as u32);
                let tones = chord.pitch_classes();
                for b in 0..chord.duration_beats {
                    let tick = start + b * TICKS_PER_BEAT;
                    let last = b + 1 == chord.duration_beats;
                    let pitch = if b == 0 {
                        root
                    } else if last {
                        match chords.get(i + 1) {
                            Some(next) => approach(bass_pitch(next.root), rng.gen_bool(0.5)),
                            None => fifth,
                        }
                    } else {
                        let pc = tones[1 + (b as usize - 1) % (tones.len() - 1).max(1)];
                        let pitch = bass_pitch(pc);
                        if pitch < root {
                            pitch + 12
                        } else {
                            pitch
                        }
                    };
                    push(pitch, tick, TICKS_PER_BEAT);
                }
            }
        }
    }
    sort_notes(&mut notes);
    notes
}

/// Chromatic approach to `target` from a semitone below or above.
fn approach(target: u8, from_below: bool) -> u8 {
    if from_below {
        clamp_midi(i32::from(target) - 1)
    } else {
        clamp_midi(i32::from(target) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{params_for, plan};
    use cantus_spec::harmony::chord_at;
    use cantus_spec::MusicalForm;
    use pretty_assertions::assert_eq;

    fn bass(pattern: BassPattern, seed: u64) -> (Vec<ChordEvent>, Vec<NoteEvent>) {
        let mut params = params_for("pop", MusicalForm::Compact, 120, 60.0);
        params.bass_pattern = pattern;
        let (_, chords) = plan(&params, seed);
        let notes = generate_bass(&params, &chords, seed);
        (chords, notes)
    }

    #[test]
    fn root_pattern_sustains_each_chord() {
        let (chords, notes) = bass(BassPattern::Root, 1);
        assert_eq!(notes.len(), chords.len());
        for (note, chord) in notes.iter().zip(&chords) {
            assert_eq!(note.pitch % 12, chord.root);
            assert_eq!(note.duration_ticks, chord.duration_beats * TICKS_PER_BEAT);
        }
    }

    #[test]
    fn downbeats_land_on_roots() {
        for pattern in [
            BassPattern::RootFifth,
            BassPattern::Octave,
            BassPattern::Walking,
        ] {
            let (chords, notes) = bass(pattern, 4);
            for chord in &chords {
                let tick = chord.start_beat * TICKS_PER_BEAT;
                let note = notes.iter().find(|n| n.start_tick == tick).unwrap();
                assert_eq!(note.pitch % 12, chord.root, "{:?}", pattern);
            }
        }
    }

    #[test]
    fn walking_bass_approaches_next_root() {
        let (chords, notes) = bass(BassPattern::Walking, 9);
        for pair in chords.windows(2) {
            if pair[0].duration_beats < 2 {
                continue;
            }
            let tick = (pair[1].start_beat - 1) * TICKS_PER_BEAT;
            let note = notes.iter().find(|n| n.start_tick == tick).unwrap();
            let distance = (i32::from(note.pitch % 12) - i32::from(pair[1].root)).rem_euclid(12);
            assert!(distance == 1 || distance == 11, "approach {} to {}", note.pitch, pair[1].root);
        }
    }

    #[test]
    fn octave_pattern_alternates_register() {
        let (chords, notes) = bass(BassPattern::Octave, 2);
        let first = chord_at(&chords, 0).unwrap();
        assert_eq!(notes[0].pitch, bass_pitch(first.root));
        assert_eq!(notes[1].pitch, bass_pitch(first.root) + 12);
        assert_eq!(notes[1].start_tick, TICKS_PER_BEAT / 2);
    }
}

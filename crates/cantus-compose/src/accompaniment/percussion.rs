//! Percussion lane.
//!
//! Notes use General MIDI drum numbers. Each groove fills one bar at a time;
//! chorus entries get a crash and tense sections end on a snare fill.

use rand::Rng;
use tracing::debug;

use cantus_spec::note::sort_notes;
use cantus_spec::{
    ChordEvent, Complexity, Groove, MusicParameters, NoteEvent, NoteTag, Role, Section,
    SectionKind, TICKS_PER_BEAT,
};

use crate::utils::{bjorklund, rng_for, rotate, velocity};

const STAGE: &str = "percussion";
const EIGHTH: u32 = TICKS_PER_BEAT / 2;
const HIT: u32 = TICKS_PER_BEAT / 4;

/// Tension at or above which a section ends on a fill.
pub const FILL_TENSION: f64 = 0.7;

/// General MIDI percussion notes used by the grooves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Drum {
    Kick = 36,
    Snare = 38,
    ClosedHat = 42,
    OpenHat = 46,
    Crash = 49,
    Ride = 51,
    HighConga = 63,
    LowConga = 64,
}

impl Drum {
    pub fn note(self) -> u8 {
        self as u8
    }
}

/// Generate the percussion lane, or nothing when the piece has no drums.
pub fn generate_percussion(
    params: &MusicParameters,
    sections: &[Section],
    chords: &[ChordEvent],
    seed: u64,
) -> Vec<NoteEvent> {
    if !params.percussion {
        return Vec::new();
    }
    let end_beat = chords
        .last()
        .map(ChordEvent::end_beat)
        .or_else(|| sections.last().map(Section::end_beat))
        .unwrap_or(0);
    let ts = params.time_signature;
    let bar = ts.beats_per_bar();
    let mut notes = Vec::new();

    for (index, section) in sections.iter().enumerate() {
        let mut rng = rng_for(seed, STAGE, index as u32);
        let last_beat = section.end_beat().min(end_beat);
        let fill_from = if section.tension >= FILL_TENSION && section.length_beats > 1 {
            last_beat.saturating_sub(1)
        } else {
            last_beat
        };
        let euclid = euclidean_bar(bar, &mut rng);
        let mut hit = |drum: Drum, tick: u32, duration: u32, accent: f64| {
            notes.push(NoteEvent {
                pitch: drum.note(),
                start_tick: tick,
                duration_ticks: duration,
                velocity: velocity(60.0, 40.0, section.tension, accent),
                role: Role::Percussion,
                section: index,
                track: None,
                tag: NoteTag::Percussion,
            });
        };

        if section.kind == SectionKind::Chorus && section.start_beat < last_beat {
            hit(Drum::Crash, section.start_beat * TICKS_PER_BEAT, TICKS_PER_BEAT, 10.0);
        }

        for beat in section.start_beat..fill_from {
            let in_bar = beat % bar;
            let strength = ts.beat_strength(in_bar);
            let tick = beat * TICKS_PER_BEAT;
            let backbeat = in_bar % 2 == 1;
            match params.groove {
                Groove::Backbeat => {
                    if strength > 0 {
                        hit(Drum::Kick, tick, HIT, 10.0);
                    }
                    if backbeat {
                        hit(Drum::Snare, tick, HIT, 8.0);
                    }
                    hit(Drum::ClosedHat, tick, HIT, 0.0);
                    hit(Drum::ClosedHat, tick + EIGHTH, HIT, -10.0);
                    if params.complexity >= Complexity::Rich
                        && !backbeat
                        && rng.gen_bool(0.15 * section.tension)
                    {
                        hit(Drum::Snare, tick + EIGHTH, HIT, -25.0);
                    }
                }
                Groove::FourOnFloor => {
                    hit(Drum::Kick, tick, HIT, 10.0);
                    if backbeat {
                        hit(Drum::Snare, tick, HIT, 5.0);
                    }
                    hit(Drum::OpenHat, tick + EIGHTH, HIT, -5.0);
                }
                Groove::Swing => {
                    hit(Drum::Ride, tick, HIT, 0.0);
                    if backbeat {
                        // hi-hat on two and four, ride skip on the last triplet
                        hit(Drum::ClosedHat, tick, HIT, -5.0);
                        hit(Drum::Ride, tick + TICKS_PER_BEAT * 2 / 3, HIT, -15.0);
                    }
                    if strength == 2 {
                        hit(Drum::Kick, tick, HIT, -10.0);
                    }
                }
                Groove::Euclidean => {
                    if strength == 2 {
                        hit(Drum::Kick, tick, HIT, 5.0);
                    }
                    for half in 0..2 {
                        let step = (in_bar * 2 + half) as usize;
                        if euclid.get(step).copied().unwrap_or(false) {
                            let drum = if half == 0 {
                                Drum::LowConga
                            } else {
                                Drum::HighConga
                            };
                            hit(drum, tick + half * EIGHTH, HIT, 0.0);
                        }
                    }
                }
            }
        }

        for beat in fill_from..last_beat {
            let tick = beat * TICKS_PER_BEAT;
            for (k, accent) in [0.0, 5.0, 10.0, 15.0].into_iter().enumerate() {
                hit(Drum::Snare, tick + k as u32 * HIT, HIT, accent);
            }
        }
    }

    sort_notes(&mut notes);
    notes.dedup_by(|a, b| a.start_tick == b.start_tick && a.pitch == b.pitch);
    debug!(notes = notes.len(), groove = ?params.groove, "generated percussion");
    notes
}

/// Euclidean eighth-note pattern for one bar.
fn euclidean_bar(beats_per_bar: u32, rng: &mut impl Rng) -> Vec<bool> {
    let steps = (beats_per_bar * 2) as usize;
    let pulses = (steps / 2 + 1).min(steps);
    let offset = rng.gen_range(0..steps.max(1));
    rotate(&bjorklund(steps, pulses), offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{params_for, plan};
    use cantus_spec::MusicalForm;
    use pretty_assertions::assert_eq;

    fn drums(groove: Groove, seconds: f64, seed: u64) -> (Vec<Section>, Vec<NoteEvent>) {
        let mut params = params_for("pop", MusicalForm::Song, 120, seconds);
        params.groove = groove;
        let (sections, chords) = plan(&params, seed);
        let notes = generate_percussion(&params, &sections, &chords, seed);
        (sections, notes)
    }

    #[test]
    fn no_percussion_when_not_wanted() {
        let params = params_for("classical", MusicalForm::Compact, 96, 60.0);
        assert!(!params.percussion);
        let (sections, chords) = plan(&params, 1);
        assert!(generate_percussion(&params, &sections, &chords, 1).is_empty());
    }

    #[test]
    fn backbeat_snare_on_two_and_four() {
        let (sections, notes) = drums(Groove::Backbeat, 120.0, 3);
        let verse = &sections[1];
        let bar_start = verse.start_beat * TICKS_PER_BEAT;
        let snare_ticks: Vec<u32> = notes
            .iter()
            .filter(|n| {
                n.pitch == Drum::Snare.note()
                    && n.start_tick >= bar_start
                    && n.start_tick < bar_start + 4 * TICKS_PER_BEAT
                    && n.velocity > 60
            })
            .map(|n| n.start_tick - bar_start)
            .collect();
        assert_eq!(snare_ticks, vec![TICKS_PER_BEAT, 3 * TICKS_PER_BEAT]);
    }

    #[test]
    fn crash_marks_every_chorus_entry() {
        let (sections, notes) = drums(Groove::FourOnFloor, 180.0, 4);
        for section in sections.iter().filter(|s| s.kind == SectionKind::Chorus) {
            let tick = section.start_beat * TICKS_PER_BEAT;
            assert!(notes
                .iter()
                .any(|n| n.start_tick == tick && n.pitch == Drum::Crash.note()));
        }
        assert!(notes
            .iter()
            .filter(|n| n.pitch == Drum::Crash.note())
            .all(|n| sections[n.section].kind == SectionKind::Chorus));
    }

    #[test]
    fn tense_sections_end_with_a_fill() {
        let (sections, notes) = drums(Groove::Backbeat, 180.0, 5);
        let chorus = sections
            .iter()
            .rev()
            .find(|s| s.kind == SectionKind::Chorus)
            .unwrap();
        assert!(chorus.tension >= FILL_TENSION);
        let last_beat = (chorus.end_beat() - 1) * TICKS_PER_BEAT;
        let fill: Vec<u8> = notes
            .iter()
            .filter(|n| n.start_tick >= last_beat && n.start_tick < last_beat + TICKS_PER_BEAT)
            .map(|n| n.pitch)
            .collect();
        assert_eq!(fill, vec![Drum::Snare.note(); 4]);
    }

    #[test]
    fn hits_stay_inside_the_piece_and_are_unique() {
        for groove in [
            Groove::Backbeat,
            Groove::FourOnFloor,
            Groove::Swing,
            Groove::Euclidean,
        ] {
            let (sections, notes) = drums(groove, 90.0, 6);
            let end = sections.last().unwrap().end_beat() * TICKS_PER_BEAT;
            assert!(notes.iter().all(|n| n.end_tick() <= end), "{:?}", groove);
            for pair in notes.windows(2) {
                assert!(
                    (pair[0].start_tick, pair[0].pitch) < (pair[1].start_tick, pair[1].pitch),
                    "{:?}",
                    groove
                );
            }
        }
    }
}

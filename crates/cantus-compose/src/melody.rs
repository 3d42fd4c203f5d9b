//! Melody generator.
//!
//! The melody walks a beat grid over the chord progression. Every beat gets
//! an anchor pitch drawn from the active chord and its key, weighted toward
//! chord tones on strong beats and toward small steps from the previous note.
//! Weak beats may split into two eighths whose second half is a passing or
//! neighbor tone. Section tension lifts the register and widens the leaps.
//!
//! Later choruses over the same harmony restate the first chorus verbatim;
//! later verses open with the first verse's motif moved up the scale.

use rand::Rng;
use rand_pcg::Pcg32;
use tracing::debug;

use cantus_spec::harmony::chord_at;
use cantus_spec::note::sort_notes;
use cantus_spec::{
    ChordEvent, KeyContext, MusicParameters, NoteEvent, NoteTag, Role, Section, SectionKind,
    TimeSignature, TICKS_PER_BEAT,
};

use crate::utils::{clamp_midi, rng_for, velocity, weighted_index};

const STAGE: &str = "melody";
const EIGHTH: u32 = TICKS_PER_BEAT / 2;

/// Bars of the first verse carried into later verses.
pub const MOTIF_BARS: u32 = 2;

/// Generate the melody line.
pub fn generate_melody(
    params: &MusicParameters,
    sections: &[Section],
    chords: &[ChordEvent],
    seed: u64,
) -> Vec<NoteEvent> {
    let home = params.key_context();
    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut first_verse: Option<usize> = None;
    let mut first_chorus: Option<usize> = None;
    let mut previous: Option<u8> = None;

    for (index, section) in sections.iter().enumerate() {
        let section_chords: Vec<ChordEvent> = chords
            .iter()
            .filter(|c| c.section == index)
            .cloned()
            .collect();

        if section.kind == SectionKind::Chorus {
            match first_chorus {
                Some(source) if same_harmony(chords, source, index, sections) => {
                    let restated = restate(
                        &notes,
                        source,
                        &sections[source],
                        section,
                        index,
                        params.time_signature,
                    );
                    previous = restated.last().map(|n| n.pitch).or(previous);
                    debug!(section = %section.label(), notes = restated.len(), "restated chorus");
                    notes.extend(restated);
                    continue;
                }
                Some(_) => {}
                None => first_chorus = Some(index),
            }
        }

        let mut rng = rng_for(seed, STAGE, index as u32);
        let mut line = phrase(params, section, index, &section_chords, previous, &mut rng);

        if section.kind == SectionKind::Verse {
            match first_verse {
                Some(source) => {
                    let motif = opening_motif(&notes, source, &sections[source], params);
                    let steps = 1 + (section.occurrence as i32 - 1).rem_euclid(2);
                    apply_motif(
                        &mut line,
                        &motif,
                        MotifTarget {
                            section,
                            index,
                            chords: &section_chords,
                            key: home,
                            time_signature: params.time_signature,
                            steps,
                        },
                    );
                }
                None => first_verse = Some(index),
            }
        }

        previous = line.last().map(|n| n.pitch).or(previous);
        debug!(
            section = %section.label(),
            notes = line.len(),
            tension = section.tension,
            "generated melody"
        );
        notes.extend(line);
    }

    sort_notes(&mut notes);
    notes
}

/// Register centre for a tension level.
pub fn register_center(tension: f64) -> u8 {
    62 + (tension.clamp(0.0, 1.0) * 10.0).round() as u8
}

/// Largest interval, in semitones, between consecutive anchors.
pub fn max_leap(tension: f64) -> u32 {
    4 + (tension.clamp(0.0, 1.0) * 5.0).round() as u32
}

/// Velocity from tension and metric strength (0 weak, 1 secondary, 2 downbeat).
pub fn velocity_for(tension: f64, strength: u8) -> u8 {
    let accent = match strength {
        2 => 12.0,
        1 => 6.0,
        _ => 0.0,
    };
    velocity(50.0, 60.0, tension, accent)
}

/// Metric strength of a tick; off-beat ticks are weak.
pub fn strength_at(time_signature: TimeSignature, tick: u32) -> u8 {
    if tick % TICKS_PER_BEAT != 0 {
        return 0;
    }
    let beat = tick / TICKS_PER_BEAT;
    time_signature.beat_strength(beat % time_signature.beats_per_bar())
}

/// Tag for a pitch against a chord: chord tone, scale tone, or `fallback`.
fn tag_for(chord: &ChordEvent, pitch: u8, fallback: NoteTag) -> NoteTag {
    if chord.contains(pitch) {
        NoteTag::ChordTone
    } else if chord.key.contains(pitch) {
        NoteTag::ScaleTone
    } else {
        fallback
    }
}

struct Anchor {
    beat: u32,
    beats: u32,
    pitch: u8,
    strength: u8,
}

fn phrase(
    params: &MusicParameters,
    section: &Section,
    index: usize,
    chords: &[ChordEvent],
    previous: Option<u8>,
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let ts = params.time_signature;
    let tension = section.tension;
    let center = register_center(tension);
    let leap = max_leap(tension);
    let mut prev = previous.unwrap_or(center);

    let mut anchors = Vec::new();
    let mut beat = section.start_beat;
    while beat < section.end_beat() {
        let Some(chord) = chord_at(chords, beat) else {
            beat += 1;
            continue;
        };
        let strength = ts.beat_strength(beat % ts.beats_per_bar());
        if strength == 0 && rng.gen_bool(0.15 * (1.0 - tension)) {
            beat += 1;
            continue;
        }
        let pitch = choose_pitch(chord, prev, center, leap, strength, rng);
        let hold = strength > 0
            && beat + 2 <= chord.end_beat()
            && rng.gen_bool(0.35 * (1.0 - tension));
        let beats = if hold { 2 } else { 1 };
        anchors.push(Anchor {
            beat,
            beats,
            pitch,
            strength,
        });
        prev = pitch;
        beat += beats;
    }

    let note = |pitch: u8, start_tick: u32, duration_ticks: u32, tag: NoteTag| NoteEvent {
        pitch,
        start_tick,
        duration_ticks,
        velocity: velocity_for(tension, strength_at(ts, start_tick)),
        role: Role::Melody,
        section: index,
        track: None,
        tag,
    };

    let mut notes = Vec::with_capacity(anchors.len() * 2);
    for (i, anchor) in anchors.iter().enumerate() {
        let Some(chord) = chord_at(chords, anchor.beat) else {
            continue;
        };
        let start = anchor.beat * TICKS_PER_BEAT;
        let anchor_tag = tag_for(chord, anchor.pitch, NoteTag::ScaleTone);
        let split = anchor.beats == 1
            && anchor.strength == 0
            && rng.gen_bool(0.2 + 0.4 * tension);
        if !split {
            notes.push(note(
                anchor.pitch,
                start,
                anchor.beats * TICKS_PER_BEAT,
                anchor_tag,
            ));
            continue;
        }
        let target = anchors
            .get(i + 1)
            .filter(|next| next.beat == anchor.beat + 1)
            .map(|next| next.pitch);
        let (pitch, tag) = ornament(chord, anchor.pitch, target, rng);
        notes.push(note(anchor.pitch, start, EIGHTH, anchor_tag));
        notes.push(note(pitch, start + EIGHTH, EIGHTH, tag));
    }
    notes
}

fn choose_pitch(
    chord: &ChordEvent,
    prev: u8,
    center: u8,
    leap: u32,
    strength: u8,
    rng: &mut Pcg32,
) -> u8 {
    let low = center.saturating_sub(9);
    let high = center.saturating_add(9).min(127);
    let mut candidates = Vec::new();
    let mut weights = Vec::new();
    for pitch in low..=high {
        let chord_tone = chord.contains(pitch);
        if !chord_tone && !chord.key.contains(pitch) {
            continue;
        }
        let distance = (i32::from(pitch) - i32::from(prev)).unsigned_abs();
        if distance > leap {
            continue;
        }
        let base = if strength > 0 && chord_tone { 4.0 } else { 1.0 };
        let step = 1.0 / (1.0 + f64::from(distance) / 2.0);
        let gravity =
            1.0 / (1.0 + f64::from((i32::from(pitch) - i32::from(center)).unsigned_abs()) / 6.0);
        candidates.push(pitch);
        weights.push(base * step * gravity);
    }
    if let Some(i) = weighted_index(rng, &weights) {
        return candidates[i];
    }
    nearest_chord_tone(chord, prev, low, high)
}

fn nearest_chord_tone(chord: &ChordEvent, pitch: u8, low: u8, high: u8) -> u8 {
    (low..=high)
        .filter(|&p| chord.contains(p))
        .min_by_key(|&p| (i32::from(p) - i32::from(pitch)).unsigned_abs())
        .unwrap_or_else(|| clamp_midi(60 + i32::from(chord.root)))
}

/// Second eighth of a split beat: a passing tone toward `target` when the
/// gap is a third or so, otherwise a neighbor.
fn ornament(chord: &ChordEvent, from: u8, target: Option<u8>, rng: &mut Pcg32) -> (u8, NoteTag) {
    if let Some(to) = target {
        let gap = i32::from(to) - i32::from(from);
        if (2..=4).contains(&gap.abs()) {
            let dir = gap.signum();
            let between = (1..gap.abs())
                .map(|k| clamp_midi(i32::from(from) + dir * k))
                .find(|&p| chord.key.contains(p))
                .unwrap_or_else(|| clamp_midi(i32::from(from) + dir));
            return (between, tag_for(chord, between, NoteTag::Passing));
        }
    }
    let pitch = if rng.gen_bool(0.5) {
        // upper neighbor stays in the scale
        (1..=2)
            .map(|k| clamp_midi(i32::from(from) + k))
            .find(|&p| chord.key.contains(p))
            .unwrap_or_else(|| clamp_midi(i32::from(from) + 2))
    } else {
        clamp_midi(i32::from(from) - 1)
    };
    (pitch, tag_for(chord, pitch, NoteTag::Neighbor))
}

fn same_harmony(chords: &[ChordEvent], a: usize, b: usize, sections: &[Section]) -> bool {
    let of = |s: usize| chords.iter().filter(move |c| c.section == s);
    let (a_start, b_start) = (sections[a].start_beat, sections[b].start_beat);
    sections[a].length_beats == sections[b].length_beats
        && of(a).count() == of(b).count()
        && of(a).zip(of(b)).all(|(x, y)| {
            x.start_beat - a_start == y.start_beat - b_start
                && x.duration_beats == y.duration_beats
                && x.root == y.root
                && x.intervals == y.intervals
                && x.key == y.key
        })
}

fn restate(
    notes: &[NoteEvent],
    source: usize,
    from: &Section,
    to: &Section,
    index: usize,
    time_signature: TimeSignature,
) -> Vec<NoteEvent> {
    let offset = (to.start_beat - from.start_beat) * TICKS_PER_BEAT;
    notes
        .iter()
        .filter(|n| n.section == source)
        .map(|n| {
            let start_tick = n.start_tick + offset;
            NoteEvent {
                start_tick,
                velocity: velocity_for(to.tension, strength_at(time_signature, start_tick)),
                section: index,
                ..n.clone()
            }
        })
        .collect()
}

/// Ticks covered by the opening motif of a section.
fn motif_window(section: &Section, time_signature: TimeSignature) -> u32 {
    (MOTIF_BARS * time_signature.beats_per_bar()).min(section.length_beats) * TICKS_PER_BEAT
}

/// Notes of the first `MOTIF_BARS` bars of a section, relative to its start.
fn opening_motif(
    notes: &[NoteEvent],
    source: usize,
    section: &Section,
    params: &MusicParameters,
) -> Vec<NoteEvent> {
    let start = section.start_beat * TICKS_PER_BEAT;
    let window = motif_window(section, params.time_signature);
    notes
        .iter()
        .filter(|n| n.section == source && n.start_tick - start < window)
        .map(|n| NoteEvent {
            start_tick: n.start_tick - start,
            duration_ticks: n.duration_ticks.min(window - (n.start_tick - start)),
            ..n.clone()
        })
        .collect()
}

struct MotifTarget<'a> {
    section: &'a Section,
    index: usize,
    chords: &'a [ChordEvent],
    key: KeyContext,
    time_signature: TimeSignature,
    steps: i32,
}

/// Replace the opening of `line` with `motif` moved `steps` scale degrees.
fn apply_motif(line: &mut Vec<NoteEvent>, motif: &[NoteEvent], target: MotifTarget<'_>) {
    let Some(extent) = motif.iter().map(NoteEvent::end_tick).max() else {
        return;
    };
    let window = motif_window(target.section, target.time_signature);
    if extent > window {
        return;
    }
    let start = target.section.start_beat * TICKS_PER_BEAT;
    let window_end = start + window;
    line.retain(|n| n.start_tick >= window_end);

    let mut opening = Vec::with_capacity(motif.len());
    for note in motif {
        let tick = start + note.start_tick;
        let Some(chord) = chord_at(target.chords, tick / TICKS_PER_BEAT) else {
            continue;
        };
        let strength = strength_at(target.time_signature, tick);
        let mut pitch = step_scale(target.key, note.pitch, target.steps);
        let mut tag = tag_for(chord, pitch, note.tag);
        let unsupported = !tag.is_non_harmonic() && !chord.key.contains(pitch);
        if unsupported || (strength > 0 && tag != NoteTag::ChordTone) {
            pitch = nearest_chord_tone(
                chord,
                pitch,
                pitch.saturating_sub(6),
                pitch.saturating_add(6).min(127),
            );
            tag = NoteTag::ChordTone;
        }
        opening.push(NoteEvent {
            pitch,
            start_tick: tick,
            velocity: velocity_for(target.section.tension, strength),
            section: target.index,
            tag,
            ..note.clone()
        });
    }
    opening.append(line);
    *line = opening;
}

/// Move a pitch `steps` degrees along the scale of `key`. Chromatic pitches
/// keep their offset from the scale tone they snap to.
pub fn step_scale(key: KeyContext, pitch: u8, steps: i32) -> u8 {
    let snapped = key.snap(pitch);
    let offset = i32::from(pitch) - i32::from(snapped);
    let dir = steps.signum();
    let mut p = i32::from(snapped);
    for _ in 0..steps.abs() {
        loop {
            p += dir;
            if !(1..127).contains(&p) || key.contains(p as u8) {
                break;
            }
        }
    }
    clamp_midi(p + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{params_for, plan};
    use cantus_spec::{Complexity, Mode, MusicalForm, StyleRegistry};
    use pretty_assertions::assert_eq;

    fn melody_for(
        params: &MusicParameters,
        seed: u64,
    ) -> (Vec<Section>, Vec<ChordEvent>, Vec<NoteEvent>) {
        let (sections, chords) = plan(params, seed);
        let notes = generate_melody(params, &sections, &chords, seed);
        (sections, chords, notes)
    }

    #[test]
    fn notes_belong_to_chord_or_scale() {
        let registry = StyleRegistry::builtin();
        for name in registry.names() {
            let params = params_for(name, MusicalForm::Song, 120, 120.0);
            let (_, chords, notes) = melody_for(&params, 21);
            assert!(!notes.is_empty(), "{}", name);
            for note in &notes {
                if note.tag.is_non_harmonic() {
                    continue;
                }
                let chord = chord_at(&chords, note.start_tick / TICKS_PER_BEAT)
                    .unwrap_or_else(|| panic!("{}: no chord at tick {}", name, note.start_tick));
                assert!(
                    chord.contains(note.pitch) || chord.key.contains(note.pitch),
                    "{}: pitch {} outside chord {} and key {}",
                    name,
                    note.pitch,
                    chord.degree,
                    chord.key
                );
            }
        }
    }

    #[test]
    fn monophonic_ordered_and_inside_the_piece() {
        let params = params_for("jazz", MusicalForm::Aaba, 132, 150.0);
        let (sections, _, notes) = melody_for(&params, 4);
        let end = sections.last().unwrap().end_beat() * TICKS_PER_BEAT;
        for pair in notes.windows(2) {
            assert!(pair[0].end_tick() <= pair[1].start_tick);
        }
        for note in &notes {
            assert!(note.end_tick() <= end);
            assert_eq!(note.role, Role::Melody);
            let section = &sections[note.section];
            assert!(note.start_tick >= section.start_beat * TICKS_PER_BEAT);
            assert!(note.start_tick < section.end_beat() * TICKS_PER_BEAT);
        }
    }

    #[test]
    fn same_seed_same_notes() {
        let params = params_for("pop", MusicalForm::Song, 110, 150.0);
        let (_, _, a) = melody_for(&params, 99);
        let (_, _, b) = melody_for(&params, 99);
        assert_eq!(a, b);
        let (_, _, c) = melody_for(&params, 100);
        assert_ne!(a, c);
    }

    #[test]
    fn later_chorus_repeats_the_first() {
        let params = params_for("pop", MusicalForm::Song, 120, 180.0);
        let (sections, _, notes) = melody_for(&params, 5);
        let choruses: Vec<usize> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SectionKind::Chorus)
            .map(|(i, _)| i)
            .collect();
        let relative = |index: usize| -> Vec<(u32, u32, u8)> {
            let start = sections[index].start_beat * TICKS_PER_BEAT;
            notes
                .iter()
                .filter(|n| n.section == index)
                .map(|n| (n.start_tick - start, n.duration_ticks, n.pitch))
                .collect()
        };
        let first = relative(choruses[0]);
        assert!(!first.is_empty());
        assert_eq!(relative(choruses[1]), first);
    }

    #[test]
    fn later_verse_keeps_the_opening_rhythm() {
        let params = params_for("pop", MusicalForm::Song, 120, 180.0);
        let (sections, _, notes) = melody_for(&params, 17);
        let verses: Vec<usize> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SectionKind::Verse)
            .map(|(i, _)| i)
            .collect();
        let window = MOTIF_BARS * params.time_signature.beats_per_bar() * TICKS_PER_BEAT;
        let rhythm = |index: usize| -> Vec<u32> {
            let start = sections[index].start_beat * TICKS_PER_BEAT;
            notes
                .iter()
                .filter(|n| n.section == index && n.start_tick - start < window)
                .map(|n| n.start_tick - start)
                .collect()
        };
        assert_eq!(rhythm(verses[1]), rhythm(verses[0]));
    }

    #[test]
    fn velocity_follows_tension_and_meter() {
        let params = params_for("rock", MusicalForm::Song, 128, 120.0);
        let (sections, _, notes) = melody_for(&params, 8);
        for note in &notes {
            let expected = velocity_for(
                sections[note.section].tension,
                strength_at(params.time_signature, note.start_tick),
            );
            assert_eq!(note.velocity, expected);
        }
        assert!(velocity_for(0.9, 0) > velocity_for(0.2, 0));
        assert!(velocity_for(0.5, 2) > velocity_for(0.5, 1));
    }

    #[test]
    fn tension_widens_register_and_leaps() {
        assert!(register_center(0.9) > register_center(0.2));
        assert!(max_leap(0.9) > max_leap(0.2));
        assert_eq!(register_center(0.0), 62);
    }

    #[test]
    fn step_scale_moves_along_the_key() {
        let c = KeyContext::new(0, Mode::Major);
        assert_eq!(step_scale(c, 60, 1), 62);
        assert_eq!(step_scale(c, 64, 1), 65);
        assert_eq!(step_scale(c, 64, 2), 67);
        assert_eq!(step_scale(c, 62, -1), 60);
        // C#4 snaps to C4 and keeps its sharp
        assert_eq!(step_scale(c, 61, 1), 63);
    }

    #[test]
    fn waltz_meter_is_supported() {
        let mut params = params_for("folk", MusicalForm::Compact, 90, 60.0);
        params.time_signature = TimeSignature::WALTZ;
        params.complexity = Complexity::Simple;
        let (_, _, notes) = melody_for(&params, 3);
        assert!(!notes.is_empty());
        let downbeat = notes.iter().find(|n| n.start_tick == 3 * TICKS_PER_BEAT);
        if let Some(note) = downbeat {
            assert_eq!(strength_at(params.time_signature, note.start_tick), 2);
        }
    }
}

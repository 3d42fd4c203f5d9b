//! Accompaniment patterns over smoothly voiced chords.

use rand::Rng;

use cantus_spec::note::sort_notes;
use cantus_spec::{
    AccompanimentPattern, ChordEvent, MusicParameters, NoteEvent, NoteTag, Role, TICKS_PER_BEAT,
};

use crate::utils::{bjorklund, rng_for, rotate, velocity};

const STAGE: &str = "accompaniment";
const EIGHTH: u32 = TICKS_PER_BEAT / 2;

/// Lowest note of a voicing.
pub const VOICING_FLOOR: u8 = 52;

/// Voicing the first chord is measured against.
const HOME_VOICING: [u8; 3] = [60, 64, 67];

/// Voice `chord` in the inversion nearest `previous`.
///
/// Each candidate inversion is stacked upward from the lowest matching pitch
/// at or above [`VOICING_FLOOR`]; the one with the least total movement from
/// the previous voicing wins, lower inversions first on ties.
pub fn voice_chord(chord: &ChordEvent, previous: Option<&[u8]>) -> Vec<u8> {
    let reference: &[u8] = previous.unwrap_or(&HOME_VOICING);
    let pcs = chord.pitch_classes();
    let mut best: Option<(u32, Vec<u8>)> = None;
    for rotation in 0..pcs.len() {
        let mut voicing = Vec::with_capacity(pcs.len());
        for k in 0..pcs.len() {
            let pc = pcs[(rotation + k) % pcs.len()];
            let floor = voicing.last().map_or(VOICING_FLOOR, |&p: &u8| p + 1);
            let mut pitch = floor - floor % 12 + pc;
            if pitch < floor {
                pitch += 12;
            }
            voicing.push(pitch);
        }
        let cost = movement(&voicing, reference);
        if best.as_ref().map_or(true, |(c, _)| cost < *c) {
            best = Some((cost, voicing));
        }
    }
    best.map(|(_, v)| v).unwrap_or_default()
}

fn movement(voicing: &[u8], reference: &[u8]) -> u32 {
    let paired: u32 = voicing
        .iter()
        .zip(reference)
        .map(|(&a, &b)| (i32::from(a) - i32::from(b)).unsigned_abs())
        .sum();
    let lowest = voicing.first().copied().unwrap_or(0);
    let reference_low = reference.first().copied().unwrap_or(lowest);
    paired + (i32::from(lowest) - i32::from(reference_low)).unsigned_abs()
}

/// Render one accompaniment part across the progression.
pub fn generate_part(
    params: &MusicParameters,
    chords: &[ChordEvent],
    pattern: AccompanimentPattern,
    seed: u64,
) -> Vec<NoteEvent> {
    let ts = params.time_signature;
    let mut notes = Vec::new();
    let mut previous: Option<Vec<u8>> = None;

    for (i, chord) in chords.iter().enumerate() {
        let voicing = voice_chord(chord, previous.as_deref());
        let start = chord.start_beat * TICKS_PER_BEAT;
        let end = chord.end_beat() * TICKS_PER_BEAT;
        let note = |pitch: u8, tick: u32, duration: u32, base: f64| NoteEvent {
            pitch,
            start_tick: tick,
            duration_ticks: duration,
            velocity: velocity(base, 25.0, chord.tension, 0.0),
            role: Role::Harmony,
            section: chord.section,
            track: None,
            tag: NoteTag::Accompaniment,
        };

        match pattern {
            AccompanimentPattern::Block => {
                let attacks: Vec<u32> = (chord.start_beat..chord.end_beat())
                    .filter(|&b| {
                        b == chord.start_beat || ts.beat_strength(b % ts.beats_per_bar()) > 0
                    })
                    .map(|b| b * TICKS_PER_BEAT)
                    .collect();
                for (k, &tick) in attacks.iter().enumerate() {
                    let until = attacks.get(k + 1).copied().unwrap_or(end);
                    for &pitch in &voicing {
                        notes.push(note(pitch, tick, until - tick, 60.0));
                    }
                }
            }
            AccompanimentPattern::Arpeggio => {
                let cycle = arpeggio_cycle(voicing.len());
                let mut tick = start;
                let mut step = 0;
                while tick < end {
                    let pitch = voicing[cycle[step % cycle.len()]];
                    notes.push(note(pitch, tick, EIGHTH.min(end - tick), 55.0));
                    tick += EIGHTH;
                    step += 1;
                }
            }
            AccompanimentPattern::Comping => {
                let mut rng = rng_for(seed, STAGE, i as u32);
                let steps = (chord.duration_beats * 2) as usize;
                let pulses = ((steps * 3 + 7) / 8).max(1);
                let offset = if steps > 1 { rng.gen_range(0..steps) } else { 0 };
                let rhythm = rotate(&bjorklund(steps, pulses), offset);
                let onsets: Vec<u32> = rhythm
                    .iter()
                    .enumerate()
                    .filter(|&(_, &hit)| hit)
                    .map(|(k, _)| start + k as u32 * EIGHTH)
                    .collect();
                for (k, &tick) in onsets.iter().enumerate() {
                    let next = onsets.get(k + 1).copied().unwrap_or(end);
                    let duration = (next - tick).min(2 * EIGHTH);
                    for &pitch in &voicing {
                        notes.push(note(pitch, tick, duration, 58.0));
                    }
                }
            }
            AccompanimentPattern::Pad => {
                for &pitch in &voicing {
                    notes.push(note(pitch, start, end - start, 45.0));
                }
            }
        }
        previous = Some(voicing);
    }
    sort_notes(&mut notes);
    notes
}

/// Voice indices for an up-and-down arpeggio.
fn arpeggio_cycle(voices: usize) -> Vec<usize> {
    if voices <= 1 {
        return vec![0];
    }
    let up: Vec<usize> = (0..voices).collect();
    let down = (1..voices - 1).rev();
    up.into_iter().chain(down).collect()
}

//! Composition assembler.
//!
//! Merges tracks, sections and chords into a [`Composition`] after checking
//! the structural invariants every earlier stage is meant to uphold. A
//! violation is a [`PipelineError::Assembly`] error: it signals a defect in
//! the pipeline, not bad input.

use tracing::{debug, error};

use cantus_spec::form::sections_are_contiguous;
use cantus_spec::{
    AssemblyBudget, ChordEvent, Composition, Diagnostics, MusicParameters, PipelineError, Role,
    Section, Track, TICKS_PER_BEAT,
};

/// Violations reported in one assembly error.
const MAX_REPORTED: usize = 5;

/// Everything the assembler merges.
#[derive(Debug)]
pub struct AssemblyInput<'a> {
    pub params: &'a MusicParameters,
    pub sections: Vec<Section>,
    pub chords: Vec<ChordEvent>,
    pub tracks: Vec<Track>,
    pub seed: u64,
    pub diagnostics: Diagnostics,
}

/// Validate and assemble the composition.
pub fn assemble(
    input: AssemblyInput<'_>,
    budget: &AssemblyBudget,
) -> Result<Composition, PipelineError> {
    let violations = validate_parts(
        input.params,
        &input.sections,
        &input.chords,
        &input.tracks,
        budget,
    );
    if !violations.is_empty() {
        error!(count = violations.len(), first = %violations[0], "assembly failed");
        let shown: Vec<&str> = violations
            .iter()
            .take(MAX_REPORTED)
            .map(String::as_str)
            .collect();
        let more = violations.len().saturating_sub(MAX_REPORTED);
        let mut message = shown.join("; ");
        if more > 0 {
            message.push_str(&format!(" (and {} more)", more));
        }
        return Err(PipelineError::Assembly(message));
    }

    let composition = Composition {
        parameters: input.params.clone(),
        sections: input.sections,
        chords: input.chords,
        tracks: input.tracks,
        seed: input.seed,
        diagnostics: input.diagnostics,
    };
    debug!(
        tracks = composition.tracks.len(),
        notes = composition.note_count(),
        end_tick = composition.end_tick(),
        "assembled composition"
    );
    Ok(composition)
}

/// Check every assembly invariant and return human-readable violations.
pub fn validate_parts(
    params: &MusicParameters,
    sections: &[Section],
    chords: &[ChordEvent],
    tracks: &[Track],
    budget: &AssemblyBudget,
) -> Vec<String> {
    let mut violations = Vec::new();
    validate_sections(params, sections, &mut violations);
    validate_chords(sections, chords, &mut violations);
    validate_tracks(params, sections, tracks, budget, &mut violations);
    violations
}

fn validate_sections(params: &MusicParameters, sections: &[Section], out: &mut Vec<String>) {
    let total = params.total_beats();
    if sections.is_empty() {
        out.push("composition has no sections".to_string());
        return;
    }
    if !sections_are_contiguous(sections, total) {
        let covered: u32 = sections.iter().map(|s| s.length_beats).sum();
        out.push(format!(
            "sections are not contiguous over {} beats (cover {})",
            total, covered
        ));
    }
}

fn validate_chords(sections: &[Section], chords: &[ChordEvent], out: &mut Vec<String>) {
    for (i, chord) in chords.iter().enumerate() {
        if chord.section >= sections.len() {
            out.push(format!(
                "chord {} references missing section {}",
                i, chord.section
            ));
        }
        if chord.duration_beats == 0 {
            out.push(format!("chord {} has zero length", i));
        }
    }
    if !out.is_empty() {
        return;
    }

    for (index, section) in sections.iter().enumerate() {
        let mut beat = section.start_beat;
        for chord in chords.iter().filter(|c| c.section == index) {
            if chord.start_beat != beat {
                out.push(format!(
                    "{}: chord at beat {} leaves a gap or overlap at beat {}",
                    section.label(),
                    chord.start_beat,
                    beat
                ));
                break;
            }
            beat = chord.end_beat();
        }
        if beat != section.end_beat() {
            out.push(format!(
                "{}: chords cover beats {}..{} of {}..{}",
                section.label(),
                section.start_beat,
                beat,
                section.start_beat,
                section.end_beat()
            ));
        }
    }
}

fn validate_tracks(
    params: &MusicParameters,
    sections: &[Section],
    tracks: &[Track],
    budget: &AssemblyBudget,
    out: &mut Vec<String>,
) {
    let limit = (params.total_beats() + budget.tolerance_beats) * TICKS_PER_BEAT;
    for (i, track) in tracks.iter().enumerate() {
        let name = format!("track {} ({} {})", track.index, track.instrument, track.part);
        if usize::from(track.index) != i {
            out.push(format!("{} is stored at position {}", name, i));
        }
        if track.notes.len() > budget.max_notes_per_track {
            out.push(format!(
                "{} has {} notes, above the limit of {}",
                name,
                track.notes.len(),
                budget.max_notes_per_track
            ));
        }
        if !track.is_ordered() {
            out.push(format!("{} notes are out of order", name));
        }
        if track.end_tick() > limit {
            out.push(format!(
                "{} ends at tick {}, past the limit of {}",
                name,
                track.end_tick(),
                limit
            ));
        }
        for note in &track.notes {
            if note.section >= sections.len() {
                out.push(format!(
                    "{}: note at tick {} references missing section {}",
                    name, note.start_tick, note.section
                ));
            }
            if note.track != Some(track.index) {
                out.push(format!("{}: note at tick {} is not bound to it", name, note.start_tick));
            }
            if note.duration_ticks == 0 {
                out.push(format!("{}: note at tick {} has zero length", name, note.start_tick));
            }
            if note.pitch > 127 {
                out.push(format!("{}: pitch {} is not MIDI", name, note.pitch));
            } else if track.role != Role::Percussion && !track.instrument.in_range(note.pitch) {
                out.push(format!(
                    "{}: pitch {} outside the instrument range",
                    name, note.pitch
                ));
            }
        }
    }
}

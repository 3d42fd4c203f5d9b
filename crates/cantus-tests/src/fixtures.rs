//! Shared prompts and helpers for the end-to-end tests.

use cantus_compose::{CancellationToken, CompositionRequest, CompositionResult, Pipeline};
use cantus_spec::{Composition, PipelineError, Role, TICKS_PER_BEAT};

/// Prompts covering every built-in style, several moods and meters.
pub const PROMPTS: &[&str] = &[
    "an upbeat pop song with piano and guitar",
    "heavy rock anthem, fast and energetic",
    "smooth jazz with saxophone, about two minutes",
    "slow sad blues in E minor",
    "a gentle classical piece for strings and harp",
    "calm meditative ambient soundscape, slow tempo",
    "driving electronic dance track at 128 bpm",
    "a cheerful folk tune with acoustic guitar and violin",
    "chill lofi beat for studying",
    "epic cinematic score with dark tension",
    "a celtic jig with flute and fiddle",
    "latin groove with congas and piano",
    "peaceful japanese garden music with koto",
    "a waltz",
    "zxqv blorp",
];

/// Compose with the default pipeline.
pub fn compose(text: &str, seed: u64) -> Result<CompositionResult, PipelineError> {
    Pipeline::default().compose(&CompositionRequest::new(text, seed), &CancellationToken::new())
}

/// Compose a request with the given pipeline.
pub fn compose_with(
    pipeline: &Pipeline,
    request: &CompositionRequest,
) -> Result<CompositionResult, PipelineError> {
    pipeline.compose(request, &CancellationToken::new())
}

/// Total section length in beats.
pub fn section_beats(composition: &Composition) -> u32 {
    composition.sections.iter().map(|s| s.length_beats).sum()
}

/// Melody notes of the first melody track.
pub fn melody_notes(composition: &Composition) -> Vec<&cantus_spec::NoteEvent> {
    composition
        .tracks_for(Role::Melody)
        .next()
        .map(|t| t.notes.iter().collect())
        .unwrap_or_default()
}

/// Beat a tick falls in.
pub fn beat_of(tick: u32) -> u32 {
    tick / TICKS_PER_BEAT
}

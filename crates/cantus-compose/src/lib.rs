//! Cantus composition pipeline - deterministic text-to-score generation
//!
//! This crate turns a free-form description ("a calm jazz piece with piano,
//! two minutes") into a symbolic [`Composition`](cantus_spec::Composition):
//! sections, a chord progression and per-instrument note tracks. Rendering to
//! audio or MIDI is left to the host.
//!
//! # Stages
//!
//! 1. [`intent`]: lexicon and pattern matching into a `MusicIntent`
//! 2. [`params`]: style blending, overrides and bounds into `MusicParameters`
//! 3. [`form`]: contiguous sections with a tension curve
//! 4. [`harmony`]: weighted Markov progressions with cadences
//! 5. [`melody`]: motif-driven melody over the chords
//! 6. [`accompaniment`]: bass, accompaniment parts and percussion
//! 7. [`instrumentation`]: role to instrument allocation
//! 8. [`assemble`]: invariant checks and the final composition
//!
//! Stages 5 and 6 run concurrently; [`pipeline::Pipeline`] wires them all
//! together and [`job::JobRunner`] runs batches on a bounded thread pool.
//!
//! # Determinism
//!
//! Every stage draws from its own PCG32 stream, seeded by hashing the request
//! seed with the stage name and an index (BLAKE3). Identical text, overrides,
//! seed and configuration give an identical composition, whatever the thread
//! scheduling.
//!
//! # Example
//!
//! ```
//! use cantus_compose::{CancellationToken, CompositionRequest, Pipeline};
//!
//! let pipeline = Pipeline::default();
//! let request = CompositionRequest::new("a calm jazz piece with piano, one minute", 42);
//! let result = pipeline.compose(&request, &CancellationToken::new()).unwrap();
//!
//! assert_eq!(result.composition.parameters.duration_seconds, 60.0);
//! assert!(result.composition.note_count() > 0);
//! ```

pub mod accompaniment;
pub mod assemble;
pub mod form;
pub mod harmony;
pub mod instrumentation;
pub mod intent;
pub mod job;
pub mod melody;
pub mod outcome;
pub mod params;
pub mod pipeline;
pub mod style_provider;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use accompaniment::{generate_bass_and_accompaniment, generate_percussion, BassAndAccompaniment};
pub use assemble::{assemble, AssemblyInput};
pub use form::plan_form;
pub use harmony::generate_harmony;
pub use instrumentation::{allocate_instruments, RoleOutputs};
pub use intent::{analyze, IntentAnalyzer, LexiconMatcher, TagMatcher};
pub use job::{JobBoard, JobFailure, JobReport, JobRunner, JobState};
pub use melody::generate_melody;
pub use outcome::StageOutcome;
pub use params::synthesize_parameters;
pub use pipeline::{CancellationToken, CompositionRequest, CompositionResult, Pipeline};
pub use style_provider::{
    GenerativeStyleProvider, SeededStyleBackend, StaticStyleProvider, StyleBackend,
    StyleProvider, StyleProviderError,
};

//! Cantus data model.
//!
//! This crate holds every type that flows between the stages of the Cantus
//! text-to-composition pipeline, plus the configuration those stages read.
//!
//! # Overview
//!
//! - **Intent** ([`MusicIntent`]): tags extracted from free-form text
//! - **Parameters** ([`MusicParameters`]): a complete, validated parameter set
//! - **Form** ([`Section`]): contiguous sections with a tension curve
//! - **Harmony** ([`ChordEvent`]): the chord progression
//! - **Notes** ([`NoteEvent`], [`Track`]): per-role note sequences
//! - **Composition** ([`Composition`]): the assembled artifact
//!
//! Configuration is explicit and immutable: the [`StyleRegistry`] of style
//! templates and the [`PipelineBudget`] of bounds are passed in, never global.
//!
//! # Example
//!
//! ```
//! use cantus_spec::{StyleRegistry, PipelineBudget};
//!
//! let registry = StyleRegistry::builtin();
//! assert!(registry.get("jazz").is_some());
//!
//! let budget = PipelineBudget::by_name("preview").unwrap();
//! assert!(budget.parameters.max_duration_seconds <= 60.0);
//! ```
//!
//! # Modules
//!
//! - [`error`]: fatal pipeline errors and the coded-error trait
//! - [`diagnostics`]: recoverable diagnostics
//! - [`pitch`]: pitch classes, modes and key contexts
//! - [`instrument`]: instrument catalog and roles
//! - [`style`]: style templates and the registry
//! - [`budget`]: budget profiles
//! - [`hash`]: canonical hashing and seed derivation
//! - [`timing`]: stage timings

pub mod budget;
pub mod composition;
pub mod diagnostics;
pub mod error;
pub mod form;
pub mod harmony;
pub mod hash;
pub mod instrument;
pub mod intent;
pub mod note;
pub mod params;
pub mod pitch;
pub mod style;
pub mod timing;

pub use budget::{AnalyzerBudget, AssemblyBudget, JobBudget, ParameterBounds, PipelineBudget};
pub use composition::Composition;
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
pub use error::{CodedError, ErrorKind, PipelineError};
pub use form::{Section, SectionKind};
pub use harmony::{ChordEvent, ChordQuality, Extension};
pub use hash::{canonical_hash, derive_stage_seed};
pub use instrument::{InstrumentFamily, InstrumentId, InstrumentInfo, Role};
pub use intent::{Complexity, KeyHint, Mood, MusicIntent, TempoHint};
pub use note::{NoteEvent, NoteTag, Track, TICKS_PER_BEAT};
pub use params::{
    AccompanimentPattern, BassPattern, CadencePolicy, Groove, MusicParameters, MusicalForm,
    ParameterOverrides, TimeSignature,
};
pub use pitch::{KeyContext, Mode};
pub use style::{
    HarmonyProfile, RegistryError, StyleRegistry, StyleTemplate, TransitionRow, WeightedDegree,
};
pub use timing::{StageTimer, StageTiming};

//! The end-to-end composition pipeline.
//!
//! Stages run in order: analyze, parameters, form, harmony, then melody and
//! accompaniment side by side on the rayon pool, then instrumentation and
//! assembly. A [`CancellationToken`] is checked before every stage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug_span, info, info_span, warn};

use cantus_spec::{
    Composition, Diagnostics, MusicIntent, ParameterOverrides, PipelineBudget, PipelineError,
    StageTimer, StageTiming, StyleRegistry,
};

use crate::accompaniment::{generate_bass_and_accompaniment, generate_percussion};
use crate::assemble::{assemble, AssemblyInput};
use crate::form::plan_form;
use crate::harmony::generate_harmony;
use crate::instrumentation::{allocate_instruments, RoleOutputs};
use crate::intent::IntentAnalyzer;
use crate::melody::generate_melody;
use crate::params::synthesize_parameters;
use crate::style_provider::{StaticStyleProvider, StyleProvider};

/// Stage names, in execution order.
pub const STAGES: [&str; 8] = [
    "analyze",
    "parameters",
    "form",
    "harmony",
    "melody",
    "accompaniment",
    "instrumentation",
    "assemble",
];

/// Cooperative cancellation flag shared between a caller and a running job.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next stage boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self, stage: &str) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            return Err(PipelineError::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }
}

/// A single composition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub text: String,
    #[serde(default)]
    pub overrides: ParameterOverrides,
    pub seed: u64,
}

impl CompositionRequest {
    pub fn new(text: impl Into<String>, seed: u64) -> Self {
        Self {
            text: text.into(),
            overrides: ParameterOverrides::default(),
            seed,
        }
    }

    pub fn with_overrides(mut self, overrides: ParameterOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Output of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionResult {
    pub intent: MusicIntent,
    pub composition: Composition,
    /// Per-stage wall-clock timings; not part of the composition hash.
    pub timings: Vec<StageTiming>,
}

impl CompositionResult {
    /// Diagnostics accumulated across all stages.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.composition.diagnostics
    }
}

/// The configured pipeline. Cheap to share across threads.
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<StyleRegistry>,
    provider: Arc<dyn StyleProvider>,
    analyzer: IntentAnalyzer,
    budget: PipelineBudget,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("styles", &self.registry.len())
            .field("provider", &self.provider.name())
            .field("budget", &self.budget.name)
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Arc::new(StyleRegistry::builtin()))
    }
}

impl Pipeline {
    /// A pipeline resolving styles from `registry` only.
    pub fn new(registry: Arc<StyleRegistry>) -> Self {
        let provider = Arc::new(StaticStyleProvider::new(registry.clone()));
        Self {
            registry,
            provider,
            analyzer: IntentAnalyzer::default(),
            budget: PipelineBudget::default(),
        }
    }

    /// Use a different style provider for tags.
    pub fn with_provider(mut self, provider: Arc<dyn StyleProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Apply a budget profile.
    pub fn with_budget(mut self, budget: PipelineBudget) -> Self {
        self.analyzer = IntentAnalyzer::with_budget(budget.analyzer.clone());
        self.budget = budget;
        self
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn budget(&self) -> &PipelineBudget {
        &self.budget
    }

    /// Run every stage for one request.
    pub fn compose(
        &self,
        request: &CompositionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompositionResult, PipelineError> {
        let span = info_span!("compose", seed = request.seed);
        let _enter = span.enter();
        let seed = request.seed;
        let mut timings = Vec::with_capacity(STAGES.len());
        let mut diagnostics = Diagnostics::new();

        let intent = run_stage("analyze", cancel, &mut timings, || {
            self.analyzer.analyze(&request.text)
        })??;

        let outcome = run_stage("parameters", cancel, &mut timings, || {
            synthesize_parameters(
                &intent,
                &request.overrides,
                self.provider.as_ref(),
                &self.registry,
                &self.budget,
            )
        })?;
        let (params, found) = outcome.into_result()?;
        merge(&mut diagnostics, found);

        let sections = run_stage("form", cancel, &mut timings, || plan_form(&params))?;

        let outcome = run_stage("harmony", cancel, &mut timings, || {
            generate_harmony(&params, &sections, seed)
        })?;
        let (chords, found) = outcome.into_result()?;
        merge(&mut diagnostics, found);

        cancel.check("melody")?;
        let ((melody, melody_timing), ((backing, percussion), backing_timing)) = rayon::join(
            || {
                let _stage = debug_span!(parent: &span, "stage", name = "melody").entered();
                let timer = StageTimer::start("melody");
                let notes = generate_melody(&params, &sections, &chords, seed);
                (notes, timer.finish())
            },
            || {
                let _stage = debug_span!(parent: &span, "stage", name = "accompaniment").entered();
                let timer = StageTimer::start("accompaniment");
                let backing = generate_bass_and_accompaniment(&params, &chords, seed);
                let percussion = generate_percussion(&params, &sections, &chords, seed);
                ((backing, percussion), timer.finish())
            },
        );
        timings.push(melody_timing);
        timings.push(backing_timing);

        let outputs = RoleOutputs {
            melody,
            parts: backing.parts,
            bass: backing.bass,
            percussion,
        };
        let outcome = run_stage("instrumentation", cancel, &mut timings, || {
            allocate_instruments(&params, outputs)
        })?;
        let (tracks, found) = outcome.into_result()?;
        merge(&mut diagnostics, found);

        let warnings = diagnostics.len();
        let composition = run_stage("assemble", cancel, &mut timings, || {
            assemble(
                AssemblyInput {
                    params: &params,
                    sections,
                    chords,
                    tracks,
                    seed,
                    diagnostics,
                },
                &self.budget.assembly,
            )
        })??;

        info!(
            tracks = composition.tracks.len(),
            notes = composition.note_count(),
            warnings,
            "composition complete"
        );
        Ok(CompositionResult {
            intent,
            composition,
            timings,
        })
    }
}

/// Check cancellation, then run one stage inside its span and record its time.
fn run_stage<T>(
    name: &'static str,
    cancel: &CancellationToken,
    timings: &mut Vec<StageTiming>,
    stage: impl FnOnce() -> T,
) -> Result<T, PipelineError> {
    cancel.check(name)?;
    let _span = debug_span!("stage", name).entered();
    let timer = StageTimer::start(name);
    let value = stage();
    timings.push(timer.finish());
    Ok(value)
}

fn merge(all: &mut Diagnostics, found: Diagnostics) {
    for diagnostic in found.iter() {
        warn!(code = diagnostic.code.code(), stage = %diagnostic.stage, "{}", diagnostic.message);
    }
    all.extend(found);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantus_spec::{DiagnosticCode, ErrorKind, InstrumentId, Role};
    use pretty_assertions::assert_eq;

    fn compose(text: &str, seed: u64) -> Result<CompositionResult, PipelineError> {
        Pipeline::default().compose(&CompositionRequest::new(text, seed), &CancellationToken::new())
    }

    #[test]
    fn composes_a_full_piece() {
        let result = compose("an upbeat pop song with piano, about one minute", 1).unwrap();
        let composition = &result.composition;
        assert_eq!(composition.parameters.styles, vec!["pop".to_string()]);
        assert_eq!(composition.parameters.duration_seconds, 60.0);
        for role in [Role::Melody, Role::Harmony, Role::Bass, Role::Percussion] {
            assert!(composition.tracks_for(role).next().is_some(), "{}", role);
        }
        let stages: Vec<&str> = result.timings.iter().map(|t| t.stage.as_str()).collect();
        assert_eq!(stages, STAGES.to_vec());
    }

    #[test]
    fn identical_requests_hash_identically() {
        let a = compose("dark cinematic strings", 77).unwrap();
        let b = compose("dark cinematic strings", 77).unwrap();
        assert_eq!(a.composition, b.composition);
        assert_eq!(
            a.composition.canonical_hash().unwrap(),
            b.composition.canonical_hash().unwrap()
        );
        let c = compose("dark cinematic strings", 78).unwrap();
        assert_ne!(a.composition, c.composition);
    }

    #[test]
    fn empty_text_fails_before_any_generation() {
        let err = compose("   ", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn bad_override_names_the_field() {
        let request = CompositionRequest::new("jazz", 1)
            .with_overrides(ParameterOverrides::new().tempo(10));
        let err = Pipeline::default()
            .compose(&request, &CancellationToken::new())
            .unwrap_err();
        match err {
            PipelineError::ParameterValidation { field, .. } => assert_eq!(field, "tempo"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn cancelled_token_stops_at_first_stage() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = Pipeline::default()
            .compose(&CompositionRequest::new("pop", 1), &cancel)
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::Cancelled {
                stage: "analyze".to_string()
            }
        );
    }

    #[test]
    fn warnings_ride_along_with_the_composition() {
        let request = CompositionRequest::new("a quiet piece", 5).with_overrides(
            ParameterOverrides::new()
                .style("zydeco")
                .instrument(InstrumentId::DrumKit),
        );
        let result = Pipeline::default()
            .compose(&request, &CancellationToken::new())
            .unwrap();
        let diagnostics = result.diagnostics();
        assert!(diagnostics.has(DiagnosticCode::StyleUnavailable));
        assert!(diagnostics.has(DiagnosticCode::DefaultStyleSubstituted));
        assert!(diagnostics.has(DiagnosticCode::HarmonyFallback));
        assert!(diagnostics.has(DiagnosticCode::InstrumentReassignment));
        let melody: Vec<_> = result.composition.tracks_for(Role::Melody).collect();
        assert!(melody.iter().all(|t| !t.instrument.is_percussion_only()));
    }

    #[test]
    fn preview_budget_limits_duration() {
        let pipeline = Pipeline::default().with_budget(PipelineBudget::preview());
        let result = pipeline
            .compose(&CompositionRequest::new("folk tune", 3), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.composition.parameters.duration_seconds, 30.0);
    }
}

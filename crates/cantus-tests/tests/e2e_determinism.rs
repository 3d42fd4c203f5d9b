//! End-to-End Determinism Tests for Cantus
//!
//! Same text, overrides, seed and configuration must give the same
//! composition, whether run alone, repeatedly, or inside a parallel batch.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cantus-tests --test e2e_determinism
//! ```

use std::sync::Arc;

use cantus_compose::{
    CancellationToken, CompositionRequest, GenerativeStyleProvider, JobRunner, Pipeline,
    SeededStyleBackend,
};
use cantus_spec::{ParameterOverrides, PipelineBudget, StyleRegistry};
use cantus_tests::determinism::{composition_bytes, verify_composition_determinism};
use cantus_tests::fixtures::{compose, PROMPTS};
use cantus_tests::test_determinism;
use pretty_assertions::assert_eq;

test_determinism!(jazz_ballad_is_deterministic, "a slow jazz ballad with piano", seed = 7);
test_determinism!(rock_is_deterministic, "loud rock with electric guitar", seed = 8);
test_determinism!(waltz_is_deterministic, "a gentle waltz in 3/4", seed = 9);

#[test]
fn every_prompt_is_deterministic() {
    let pipeline = Pipeline::default();
    for (seed, prompt) in PROMPTS.iter().enumerate() {
        let request = CompositionRequest::new(*prompt, seed as u64);
        let result = verify_composition_determinism(&pipeline, &request, 2);
        assert!(result.is_deterministic, "{}: {:?}", prompt, result.diff_info);
    }
}

#[test]
fn canonical_hash_is_stable_across_runs() {
    let a = compose("cinematic strings, two minutes", 1234).unwrap();
    let b = compose("cinematic strings, two minutes", 1234).unwrap();
    assert_eq!(
        a.composition.canonical_hash().unwrap(),
        b.composition.canonical_hash().unwrap()
    );
    assert_eq!(a.composition.canonical_hash().unwrap().len(), 64);
}

#[test]
fn different_seeds_differ() {
    let a = compose("cinematic strings, two minutes", 1).unwrap();
    let b = compose("cinematic strings, two minutes", 2).unwrap();
    assert_ne!(
        composition_bytes(&a.composition),
        composition_bytes(&b.composition)
    );
}

#[test]
fn batch_runs_match_sequential_runs() {
    let pipeline = Pipeline::default().with_budget(PipelineBudget::preview());
    let requests: Vec<CompositionRequest> = PROMPTS
        .iter()
        .enumerate()
        .map(|(seed, prompt)| CompositionRequest::new(*prompt, seed as u64))
        .collect();
    let sequential: Vec<Vec<u8>> = requests
        .iter()
        .map(|r| {
            let result = pipeline.compose(r, &CancellationToken::new()).unwrap();
            composition_bytes(&result.composition)
        })
        .collect();

    let runner = JobRunner::new(pipeline).unwrap();
    let reports = runner.run_batch(&requests, &CancellationToken::new());
    let batched: Vec<Vec<u8>> = reports
        .iter()
        .map(|r| composition_bytes(&r.result.as_ref().unwrap().composition))
        .collect();
    assert_eq!(batched, sequential);
}

#[test]
fn generative_styles_are_deterministic() {
    let registry = Arc::new(StyleRegistry::builtin());
    let provider = GenerativeStyleProvider::new(SeededStyleBackend).with_registry(registry.clone());
    let pipeline = Pipeline::new(registry).with_provider(Arc::new(provider));
    let request = CompositionRequest::new("a vaporwave synthscape", 11)
        .with_overrides(ParameterOverrides::new().style("vaporwave"));
    verify_composition_determinism(&pipeline, &request, 3).assert_deterministic();
}

//! Style provider integration tests: static registries, generative
//! backends, failing backends and custom registries loaded from JSON.

use std::sync::Arc;

use cantus_compose::{
    CancellationToken, CompositionRequest, GenerativeStyleProvider, Pipeline, SeededStyleBackend,
    StyleBackend, StyleProviderError,
};
use cantus_spec::{DiagnosticCode, ParameterOverrides, StyleRegistry};
use pretty_assertions::assert_eq;

/// Backend that always fails, like an unreachable service.
struct OfflineBackend;

impl StyleBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn generate(&self, _tag: &str) -> Result<String, StyleProviderError> {
        Err(StyleProviderError::Backend {
            backend: "offline".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

/// Backend that returns text that is not a template.
struct GarbageBackend;

impl StyleBackend for GarbageBackend {
    fn name(&self) -> &str {
        "garbage"
    }

    fn generate(&self, _tag: &str) -> Result<String, StyleProviderError> {
        Ok("{\"tempo\": \"fast\"}".to_string())
    }
}

fn pipeline_with<B: StyleBackend + 'static>(backend: B) -> Pipeline {
    let registry = Arc::new(StyleRegistry::builtin());
    let provider = GenerativeStyleProvider::new(backend).with_registry(registry.clone());
    Pipeline::new(registry).with_provider(Arc::new(provider))
}

fn zydeco(seed: u64) -> CompositionRequest {
    CompositionRequest::new("a zydeco party tune", seed)
        .with_overrides(ParameterOverrides::new().style("zydeco"))
}

#[test]
fn generative_provider_fills_registry_gaps() {
    let result = pipeline_with(SeededStyleBackend)
        .compose(&zydeco(1), &CancellationToken::new())
        .unwrap();
    let diagnostics = result.diagnostics();
    assert!(!diagnostics.has(DiagnosticCode::StyleUnavailable));
    assert!(!diagnostics.has(DiagnosticCode::HarmonyFallback));
    assert_eq!(result.composition.parameters.styles, vec!["zydeco".to_string()]);
}

#[test]
fn generative_provider_prefers_the_registry() {
    let request = CompositionRequest::new("jazz", 2);
    let generative = pipeline_with(OfflineBackend)
        .compose(&request, &CancellationToken::new())
        .unwrap();
    let fixed = Pipeline::default()
        .compose(&request, &CancellationToken::new())
        .unwrap();
    assert_eq!(generative.composition, fixed.composition);
}

#[test]
fn failing_backend_degrades_to_defaults() {
    let result = pipeline_with(OfflineBackend)
        .compose(&zydeco(3), &CancellationToken::new())
        .unwrap();
    let diagnostics = result.diagnostics();
    assert!(diagnostics.has(DiagnosticCode::StyleUnavailable));
    assert!(diagnostics.has(DiagnosticCode::DefaultStyleSubstituted));
    let unavailable = diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::StyleUnavailable)
        .unwrap();
    assert!(unavailable.message.contains("STYLE_001"));
}

#[test]
fn malformed_template_is_recoverable() {
    let result = pipeline_with(GarbageBackend)
        .compose(&zydeco(4), &CancellationToken::new())
        .unwrap();
    let unavailable = result
        .diagnostics()
        .iter()
        .find(|d| d.code == DiagnosticCode::StyleUnavailable)
        .unwrap();
    assert!(unavailable.message.contains("STYLE_002"));
    assert!(!result.composition.tracks.is_empty());
}

#[test]
fn custom_registry_from_json_drives_the_pipeline() {
    let builtin = StyleRegistry::builtin();
    let mut json: serde_json::Value =
        serde_json::from_str(&builtin.to_json_pretty().unwrap()).unwrap();
    json["default_style"] = serde_json::Value::String("jazz".to_string());
    let registry = StyleRegistry::from_json(&json.to_string()).unwrap();
    assert_eq!(registry.default_style(), "jazz");

    let pipeline = Pipeline::new(Arc::new(registry));
    let result = pipeline
        .compose(&CompositionRequest::new("something nice", 5), &CancellationToken::new())
        .unwrap();
    assert_eq!(result.composition.parameters.styles, vec!["jazz".to_string()]);
}

#[test]
fn seeded_backend_is_stable_per_tag() {
    let a = SeededStyleBackend.generate("vaporwave").unwrap();
    let b = SeededStyleBackend.generate("Vaporwave").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, SeededStyleBackend.generate("polka").unwrap());
}

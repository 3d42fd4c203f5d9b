//! Style template providers.
//!
//! The parameter synthesizer asks a [`StyleProvider`] for the template behind
//! each style tag. [`StaticStyleProvider`] is a plain registry lookup;
//! [`GenerativeStyleProvider`] asks a [`StyleBackend`] for a JSON template
//! document when the registry has nothing, and validates what comes back.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use cantus_spec::params::{AccompanimentPattern, BassPattern, Groove, MusicalForm};
use cantus_spec::{
    CodedError, Complexity, HarmonyProfile, InstrumentId, Mode, StyleRegistry, StyleTemplate,
    TimeSignature, TransitionRow, WeightedDegree,
};

/// Errors raised by style providers. Always recoverable for the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleProviderError {
    /// The backend could not produce a document.
    #[error("style backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    /// The document is not a template.
    #[error("malformed template for '{tag}': {reason}")]
    Malformed { tag: String, reason: String },

    /// The template parsed but violates a range.
    #[error("invalid template for '{tag}': {reason}")]
    Invalid { tag: String, reason: String },
}

impl CodedError for StyleProviderError {
    fn code(&self) -> &'static str {
        match self {
            StyleProviderError::Backend { .. } => "STYLE_001",
            StyleProviderError::Malformed { .. } => "STYLE_002",
            StyleProviderError::Invalid { .. } => "STYLE_003",
        }
    }

    fn category(&self) -> &'static str {
        "style"
    }
}

/// Capability that maps a style tag to a template.
pub trait StyleProvider: Send + Sync {
    /// Provider name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Template for `tag`, or `None` when the provider does not know it.
    fn template_for(&self, tag: &str) -> Result<Option<StyleTemplate>, StyleProviderError>;
}

/// Lookup in an immutable registry.
#[derive(Debug, Clone)]
pub struct StaticStyleProvider {
    registry: Arc<StyleRegistry>,
}

impl StaticStyleProvider {
    pub fn new(registry: Arc<StyleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }
}

impl StyleProvider for StaticStyleProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn template_for(&self, tag: &str) -> Result<Option<StyleTemplate>, StyleProviderError> {
        Ok(self.registry.get(tag).cloned())
    }
}

/// Source of JSON template documents, e.g. a model-backed service.
pub trait StyleBackend: Send + Sync {
    fn name(&self) -> &str;

    /// A JSON-serialized [`StyleTemplate`] for `tag`.
    fn generate(&self, tag: &str) -> Result<String, StyleProviderError>;
}

/// Provider that generates templates for tags its registry lacks.
#[derive(Debug, Clone)]
pub struct GenerativeStyleProvider<B> {
    backend: B,
    registry: Option<Arc<StyleRegistry>>,
}

impl<B: StyleBackend> GenerativeStyleProvider<B> {
    /// Provider that always asks the backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: None,
        }
    }

    /// Consult `registry` first and only generate on a miss.
    pub fn with_registry(mut self, registry: Arc<StyleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn parse(&self, tag: &str, document: &str) -> Result<StyleTemplate, StyleProviderError> {
        let mut template: StyleTemplate =
            serde_json::from_str(document).map_err(|e| StyleProviderError::Malformed {
                tag: tag.to_string(),
                reason: e.to_string(),
            })?;
        if template.name.trim().is_empty() {
            template.name = normalize_tag(tag);
        }
        if template.harmony.sources.is_empty() {
            template.harmony.sources = vec![template.name.clone()];
        }
        template
            .validate()
            .map_err(|reason| StyleProviderError::Invalid {
                tag: tag.to_string(),
                reason,
            })?;
        Ok(template)
    }
}

impl<B: StyleBackend> StyleProvider for GenerativeStyleProvider<B> {
    fn name(&self) -> &str {
        "generative"
    }

    fn template_for(&self, tag: &str) -> Result<Option<StyleTemplate>, StyleProviderError> {
        if let Some(template) = self.registry.as_ref().and_then(|r| r.get(tag)) {
            return Ok(Some(template.clone()));
        }
        let document = self.backend.generate(tag)?;
        let template = self.parse(tag, &document)?;
        debug!(
            backend = self.backend.name(),
            tag,
            tempo = template.tempo,
            "generated style template"
        );
        Ok(Some(template))
    }
}

/// Deterministic backend that derives a plausible template from the
/// BLAKE3 hash of the tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededStyleBackend;

impl SeededStyleBackend {
    /// The template this backend produces for `tag`.
    pub fn template(tag: &str) -> StyleTemplate {
        let name = normalize_tag(tag);
        let hash = blake3::hash(name.as_bytes());
        let b = hash.as_bytes();
        let pick = |i: usize, n: usize| b[i] as usize % n;

        const MELODY: [InstrumentId; 8] = [
            InstrumentId::Piano,
            InstrumentId::Flute,
            InstrumentId::Violin,
            InstrumentId::Saxophone,
            InstrumentId::SynthLead,
            InstrumentId::AcousticGuitar,
            InstrumentId::Clarinet,
            InstrumentId::Marimba,
        ];
        const HARMONY: [InstrumentId; 6] = [
            InstrumentId::Strings,
            InstrumentId::ElectricPiano,
            InstrumentId::Organ,
            InstrumentId::AcousticGuitar,
            InstrumentId::SynthPad,
            InstrumentId::Harp,
        ];
        const BASS: [InstrumentId; 3] = [
            InstrumentId::AcousticBass,
            InstrumentId::ElectricBass,
            InstrumentId::SynthBass,
        ];
        const METERS: [TimeSignature; 4] = [
            TimeSignature::COMMON,
            TimeSignature::COMMON,
            TimeSignature::WALTZ,
            TimeSignature::COMPOUND_DUPLE,
        ];
        const BASS_PATTERNS: [BassPattern; 4] = [
            BassPattern::Root,
            BassPattern::RootFifth,
            BassPattern::Octave,
            BassPattern::Walking,
        ];
        const ACCOMPANIMENT: [AccompanimentPattern; 4] = [
            AccompanimentPattern::Block,
            AccompanimentPattern::Arpeggio,
            AccompanimentPattern::Comping,
            AccompanimentPattern::Pad,
        ];
        const GROOVES: [Groove; 4] = [
            Groove::Backbeat,
            Groove::FourOnFloor,
            Groove::Swing,
            Groove::Euclidean,
        ];

        let graph: [(&str, &[&str]); 5] = [
            ("1", &["4", "5", "6", "2"]),
            ("2", &["5", "4"]),
            ("4", &["5", "1", "2"]),
            ("5", &["1", "6", "4"]),
            ("6", &["4", "2", "5"]),
        ];
        let mut byte = 12;
        let transitions = graph
            .iter()
            .map(|(from, targets)| TransitionRow {
                from: from.to_string(),
                to: targets
                    .iter()
                    .map(|to| {
                        let calm = 1.0 + f64::from(b[byte % 32] % 4);
                        let tense = 1.0 + f64::from(b[(byte + 1) % 32] % 4);
                        byte += 2;
                        WeightedDegree::new(*to, calm, tense)
                    })
                    .collect(),
            })
            .collect();

        StyleTemplate {
            name: name.clone(),
            tempo: 60 + (b[0] as u16 % 100),
            complexity: Complexity::from_level(b[1] % 4),
            mode: Mode::all()[pick(2, Mode::all().len())],
            key: b[3] % 12,
            time_signature: METERS[pick(4, METERS.len())],
            instruments: vec![
                MELODY[pick(5, MELODY.len())],
                HARMONY[pick(6, HARMONY.len())],
                BASS[pick(7, BASS.len())],
            ],
            bass_pattern: BASS_PATTERNS[pick(8, BASS_PATTERNS.len())],
            accompaniment: vec![ACCOMPANIMENT[pick(9, ACCOMPANIMENT.len())]],
            groove: GROOVES[pick(10, GROOVES.len())],
            percussion: b[11] % 3 != 0,
            form: MusicalForm::Auto,
            harmony: HarmonyProfile {
                start_degree: "1".to_string(),
                transitions,
                modal_interchange: b[30] % 2 == 0,
                relative_key_bridge: b[31] % 2 == 0,
                sources: vec![name],
            },
        }
    }
}

impl StyleBackend for SeededStyleBackend {
    fn name(&self) -> &str {
        "seeded"
    }

    fn generate(&self, tag: &str) -> Result<String, StyleProviderError> {
        if tag.trim().is_empty() {
            return Err(StyleProviderError::Backend {
                backend: self.name().to_string(),
                message: "empty style tag".to_string(),
            });
        }
        serde_json::to_string(&Self::template(tag)).map_err(|e| StyleProviderError::Backend {
            backend: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

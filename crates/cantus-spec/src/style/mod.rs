//! Style templates and the immutable style registry.
//!
//! A [`StyleTemplate`] bundles the defaults a genre contributes to parameter
//! synthesis, including its [`HarmonyProfile`]: a weighted chord-transition
//! table whose rows carry a `calm` and a `tense` weight per target degree.
//! The harmony engine interpolates between the two by section tension.
//!
//! [`StyleRegistry`] is plain configuration. Build it once with
//! [`StyleRegistry::builtin`] or [`StyleRegistry::from_json`] and share it
//! behind an `Arc`.

mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CodedError;
use crate::instrument::InstrumentId;
use crate::intent::Complexity;
use crate::params::{AccompanimentPattern, BassPattern, Groove, MusicalForm, TimeSignature};
use crate::pitch::{parse_degree_token, Mode};

/// A transition target with tension-dependent weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedDegree {
    /// Target degree token.
    pub degree: String,
    /// Weight at tension 0.
    pub calm: f64,
    /// Weight at tension 1.
    pub tense: f64,
}

impl WeightedDegree {
    pub fn new(degree: impl Into<String>, calm: f64, tense: f64) -> Self {
        Self {
            degree: degree.into(),
            calm,
            tense,
        }
    }

    /// Weight linearly interpolated at a tension in 0..=1.
    pub fn weight_at(&self, tension: f64) -> f64 {
        let t = tension.clamp(0.0, 1.0);
        (self.calm + (self.tense - self.calm) * t).max(0.0)
    }
}

/// All transitions leaving one degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRow {
    pub from: String,
    pub to: Vec<WeightedDegree>,
}

/// Chord vocabulary of a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyProfile {
    /// Degree every section starts from.
    pub start_degree: String,
    /// Weighted transition rows.
    #[serde(default)]
    pub transitions: Vec<TransitionRow>,
    /// Allow chords borrowed from the parallel mode.
    #[serde(default)]
    pub modal_interchange: bool,
    /// Play bridges in the relative key.
    #[serde(default)]
    pub relative_key_bridge: bool,
    /// Templates that contributed to this profile, in blend order.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Default for HarmonyProfile {
    fn default() -> Self {
        Self {
            start_degree: "1".to_string(),
            transitions: Vec::new(),
            modal_interchange: false,
            relative_key_bridge: false,
            sources: Vec::new(),
        }
    }
}

impl HarmonyProfile {
    /// Row for a degree token.
    pub fn row(&self, from: &str) -> Option<&TransitionRow> {
        self.transitions.iter().find(|r| r.from == from)
    }

    /// Whether the profile has no transitions.
    pub fn is_empty(&self) -> bool {
        self.transitions.iter().all(|r| r.to.is_empty())
    }

    /// Every degree token mentioned, in first-seen order.
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = vec![self.start_degree.as_str()];
        for row in &self.transitions {
            for token in std::iter::once(row.from.as_str())
                .chain(row.to.iter().map(|w| w.degree.as_str()))
            {
                if !seen.contains(&token) {
                    seen.push(token);
                }
            }
        }
        seen
    }

    /// Checks that every token parses and every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        for token in self.vocabulary() {
            if parse_degree_token(token).is_none() {
                return Err(format!("invalid degree token '{}'", token));
            }
        }
        for row in &self.transitions {
            for target in &row.to {
                let ok = |w: f64| w.is_finite() && w >= 0.0;
                if !ok(target.calm) || !ok(target.tense) {
                    return Err(format!(
                        "transition {} -> {} has an invalid weight",
                        row.from, target.degree
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Defaults one style contributes to parameter synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTemplate {
    pub name: String,
    pub tempo: u16,
    pub complexity: Complexity,
    pub mode: Mode,
    /// Tonic pitch class.
    pub key: u8,
    #[serde(default)]
    pub time_signature: TimeSignature,
    pub instruments: Vec<InstrumentId>,
    #[serde(default)]
    pub bass_pattern: BassPattern,
    pub accompaniment: Vec<AccompanimentPattern>,
    #[serde(default)]
    pub groove: Groove,
    #[serde(default)]
    pub percussion: bool,
    #[serde(default)]
    pub form: MusicalForm,
    pub harmony: HarmonyProfile,
}

impl StyleTemplate {
    /// Template used when a registry has no usable default.
    pub fn fallback() -> Self {
        builtin::pop()
    }

    /// Checks ranges and the harmony profile.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        if !(40..=240).contains(&self.tempo) {
            return Err(format!("tempo {} outside 40-240", self.tempo));
        }
        if self.key > 11 {
            return Err(format!("key {} is not a pitch class", self.key));
        }
        if !self.time_signature.is_valid() {
            return Err(format!(
                "unsupported time signature {}",
                self.time_signature
            ));
        }
        if self.accompaniment.is_empty() {
            return Err("no accompaniment patterns".to_string());
        }
        self.harmony.validate()
    }
}

/// Errors raised while building or loading a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("style '{name}' is invalid: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("default style '{0}' is not registered")]
    UnknownDefault(String),

    #[error("alias '{alias}' points at unregistered style '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

impl CodedError for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            RegistryError::Json(_) => "REGISTRY_001",
            RegistryError::InvalidTemplate { .. } => "REGISTRY_002",
            RegistryError::UnknownDefault(_) => "REGISTRY_003",
            RegistryError::UnknownAliasTarget { .. } => "REGISTRY_004",
        }
    }

    fn category(&self) -> &'static str {
        "registry"
    }
}

/// Immutable map of style names to templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRegistry {
    default_style: String,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    styles: BTreeMap<String, StyleTemplate>,
}

impl StyleRegistry {
    /// Creates a validated registry.
    pub fn new(
        default_style: impl Into<String>,
        templates: impl IntoIterator<Item = StyleTemplate>,
    ) -> Result<Self, RegistryError> {
        let styles = templates
            .into_iter()
            .map(|t| (normalize(&t.name), t))
            .collect();
        let registry = Self {
            default_style: normalize(&default_style.into()),
            aliases: BTreeMap::new(),
            styles,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// The built-in registry.
    pub fn builtin() -> Self {
        let mut styles = BTreeMap::new();
        for template in builtin::templates() {
            styles.insert(template.name.clone(), template);
        }
        let aliases = builtin::ALIASES
            .iter()
            .map(|(a, t)| (a.to_string(), t.to_string()))
            .collect();
        Self {
            default_style: "pop".to_string(),
            aliases,
            styles,
        }
    }

    /// Loads and validates a registry from JSON.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let mut registry: StyleRegistry = serde_json::from_str(json)?;
        registry.default_style = normalize(&registry.default_style);
        registry.styles = std::mem::take(&mut registry.styles)
            .into_iter()
            .map(|(k, v)| (normalize(&k), v))
            .collect();
        registry.aliases = std::mem::take(&mut registry.aliases)
            .into_iter()
            .map(|(k, v)| (normalize(&k), normalize(&v)))
            .collect();
        registry.validate()?;
        Ok(registry)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns a copy with an extra alias.
    pub fn with_alias(
        mut self,
        alias: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let alias = normalize(&alias.into());
        let target = normalize(&target.into());
        if !self.styles.contains_key(&target) {
            return Err(RegistryError::UnknownAliasTarget { alias, target });
        }
        self.aliases.insert(alias, target);
        Ok(self)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        for (name, template) in &self.styles {
            template
                .validate()
                .map_err(|reason| RegistryError::InvalidTemplate {
                    name: name.clone(),
                    reason,
                })?;
        }
        if !self.styles.contains_key(&self.default_style) {
            return Err(RegistryError::UnknownDefault(self.default_style.clone()));
        }
        for (alias, target) in &self.aliases {
            if !self.styles.contains_key(target) {
                return Err(RegistryError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }

    /// Canonical name for a tag or alias.
    pub fn resolve_name(&self, tag: &str) -> Option<&str> {
        let key = normalize(tag);
        if let Some((name, _)) = self.styles.get_key_value(&key) {
            return Some(name.as_str());
        }
        self.aliases
            .get(&key)
            .and_then(|target| self.styles.get_key_value(target))
            .map(|(name, _)| name.as_str())
    }

    /// Template for a tag or alias.
    pub fn get(&self, tag: &str) -> Option<&StyleTemplate> {
        self.resolve_name(tag).and_then(|name| self.styles.get(name))
    }

    /// Name of the default style.
    pub fn default_style(&self) -> &str {
        &self.default_style
    }

    /// The default template.
    pub fn default_template(&self) -> Option<&StyleTemplate> {
        self.styles.get(&self.default_style)
    }

    /// Registered style names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Templates, sorted by name.
    pub fn templates(&self) -> impl Iterator<Item = &StyleTemplate> {
        self.styles.values()
    }

    /// Aliases as (alias, target) pairs, sorted by alias.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = StyleRegistry::builtin();
        registry.validate().unwrap();
        assert_eq!(registry.len(), 13);
        assert_eq!(registry.default_style(), "pop");
        for name in [
            "pop",
            "rock",
            "jazz",
            "blues",
            "classical",
            "ambient",
            "electronic",
            "folk",
            "lofi",
            "cinematic",
            "celtic",
            "latin",
            "japanese",
        ] {
            assert!(registry.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = StyleRegistry::builtin();
        assert_eq!(registry.resolve_name("Lo-Fi"), Some("lofi"));
        assert_eq!(registry.resolve_name("EDM"), Some("electronic"));
        assert_eq!(registry.resolve_name("orchestral"), Some("cinematic"));
        assert_eq!(registry.resolve_name("zydecotronica"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let registry = StyleRegistry::builtin();
        let json = registry.to_json_pretty().unwrap();
        let parsed = StyleRegistry::from_json(&json).unwrap();
        assert_eq!(parsed, registry);
    }

    #[test]
    fn test_unknown_default_rejected() {
        let err = StyleRegistry::new("waltz", vec![StyleTemplate::fallback()]).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownDefault(ref s) if s == "waltz"));
        assert_eq!(err.code(), "REGISTRY_003");
    }

    #[test]
    fn test_invalid_template_rejected() {
        let mut bad = StyleTemplate::fallback();
        bad.harmony.start_degree = "9".to_string();
        let err = StyleRegistry::new("pop", vec![bad]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTemplate { .. }));

        let mut slow = StyleTemplate::fallback();
        slow.tempo = 20;
        assert!(slow.validate().is_err());
    }

    #[test]
    fn test_alias_to_missing_style_rejected() {
        let registry = StyleRegistry::new("pop", vec![StyleTemplate::fallback()]).unwrap();
        assert!(registry.clone().with_alias("chart", "pop").is_ok());
        assert!(registry.with_alias("chart", "rock").is_err());
    }

    #[test]
    fn test_weight_interpolation() {
        let w = WeightedDegree::new("5", 0.2, 0.6);
        assert!((w.weight_at(0.0) - 0.2).abs() < 1e-12);
        assert!((w.weight_at(0.5) - 0.4).abs() < 1e-12);
        assert!((w.weight_at(2.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_profile_vocabulary_and_emptiness() {
        let pop = StyleTemplate::fallback();
        let vocab = pop.harmony.vocabulary();
        assert_eq!(vocab[0], "1");
        assert!(vocab.contains(&"5"));
        assert!(!pop.harmony.is_empty());
        assert!(HarmonyProfile::default().is_empty());
    }
}

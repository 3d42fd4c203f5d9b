//! Pipeline budget profiles.
//!
//! A budget bundles every tunable bound the pipeline enforces:
//! - Parameter bounds (tempo, duration, default duration)
//! - Analyzer input limits
//! - Assembly tolerances and per-track note caps
//! - Job runner worker count
//!
//! Pre-defined profiles: default, preview, strict.

use serde::{Deserialize, Serialize};

/// Bounds applied by the parameter synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub min_tempo: u16,
    pub max_tempo: u16,
    pub min_duration_seconds: f64,
    pub max_duration_seconds: f64,
    /// Duration used when neither the text nor an override names one.
    pub default_duration_seconds: f64,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            min_tempo: Self::DEFAULT_MIN_TEMPO,
            max_tempo: Self::DEFAULT_MAX_TEMPO,
            min_duration_seconds: Self::DEFAULT_MIN_DURATION_SECONDS,
            max_duration_seconds: Self::DEFAULT_MAX_DURATION_SECONDS,
            default_duration_seconds: Self::DEFAULT_DURATION_SECONDS,
        }
    }
}

impl ParameterBounds {
    pub const DEFAULT_MIN_TEMPO: u16 = 40;
    pub const DEFAULT_MAX_TEMPO: u16 = 240;
    pub const DEFAULT_MIN_DURATION_SECONDS: f64 = 15.0;
    pub const DEFAULT_MAX_DURATION_SECONDS: f64 = 600.0;
    pub const DEFAULT_DURATION_SECONDS: f64 = 180.0;

    /// Whether a tempo is within bounds.
    pub fn tempo_ok(&self, tempo: u16) -> bool {
        (self.min_tempo..=self.max_tempo).contains(&tempo)
    }

    /// Whether a duration is within bounds.
    pub fn duration_ok(&self, seconds: f64) -> bool {
        seconds.is_finite()
            && seconds >= self.min_duration_seconds
            && seconds <= self.max_duration_seconds
    }
}

/// Limits applied by the intent analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerBudget {
    /// Longest accepted input, in characters.
    pub max_text_chars: usize,
}

impl Default for AnalyzerBudget {
    fn default() -> Self {
        Self {
            max_text_chars: Self::DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl AnalyzerBudget {
    pub const DEFAULT_MAX_TEXT_CHARS: usize = 4_000;
}

/// Limits checked by the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyBudget {
    /// Slack allowed past the target duration, in beats.
    pub tolerance_beats: u32,
    /// Maximum notes in a single track.
    pub max_notes_per_track: usize,
}

impl Default for AssemblyBudget {
    fn default() -> Self {
        Self {
            tolerance_beats: Self::DEFAULT_TOLERANCE_BEATS,
            max_notes_per_track: Self::DEFAULT_MAX_NOTES_PER_TRACK,
        }
    }
}

impl AssemblyBudget {
    pub const DEFAULT_TOLERANCE_BEATS: u32 = 1;
    pub const DEFAULT_MAX_NOTES_PER_TRACK: usize = 50_000;
}

/// Job runner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobBudget {
    /// Worker threads in the job pool.
    pub max_workers: usize,
}

impl Default for JobBudget {
    fn default() -> Self {
        Self {
            max_workers: Self::DEFAULT_MAX_WORKERS,
        }
    }
}

impl JobBudget {
    pub const DEFAULT_MAX_WORKERS: usize = 4;
}

/// A complete pipeline budget profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineBudget {
    /// Profile identifier (e.g., "default", "preview", "strict").
    pub name: String,
    #[serde(default)]
    pub parameters: ParameterBounds,
    #[serde(default)]
    pub analyzer: AnalyzerBudget,
    #[serde(default)]
    pub assembly: AssemblyBudget,
    #[serde(default)]
    pub jobs: JobBudget,
}

impl Default for PipelineBudget {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            parameters: ParameterBounds::default(),
            analyzer: AnalyzerBudget::default(),
            assembly: AssemblyBudget::default(),
            jobs: JobBudget::default(),
        }
    }
}

impl PipelineBudget {
    /// Creates a default-valued profile with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Short pieces for quick auditioning.
    pub fn preview() -> Self {
        Self {
            name: "preview".to_string(),
            parameters: ParameterBounds {
                max_duration_seconds: 60.0,
                default_duration_seconds: 30.0,
                ..ParameterBounds::default()
            },
            ..Default::default()
        }
    }

    /// Reduced limits for shared hosts.
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            parameters: ParameterBounds {
                max_duration_seconds: 300.0,
                ..ParameterBounds::default()
            },
            analyzer: AnalyzerBudget {
                max_text_chars: 1_000,
            },
            assembly: AssemblyBudget {
                tolerance_beats: 1,
                max_notes_per_track: 10_000,
            },
            jobs: JobBudget { max_workers: 2 },
        }
    }

    /// Looks up a profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "preview" => Some(Self::preview()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    /// Names accepted by [`PipelineBudget::by_name`].
    pub fn profile_names() -> &'static [&'static str] {
        &["default", "preview", "strict"]
    }

    /// Parses a profile from JSON. Missing sections take default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks internal consistency of the bounds.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.parameters;
        if p.min_tempo == 0 || p.min_tempo > p.max_tempo {
            return Err(format!(
                "tempo bounds {}..{} are inverted or zero",
                p.min_tempo, p.max_tempo
            ));
        }
        if !(p.min_duration_seconds > 0.0 && p.min_duration_seconds <= p.max_duration_seconds) {
            return Err("duration bounds are inverted or non-positive".to_string());
        }
        if !p.duration_ok(p.default_duration_seconds) {
            return Err(format!(
                "default duration {}s is outside {}..{}s",
                p.default_duration_seconds, p.min_duration_seconds, p.max_duration_seconds
            ));
        }
        if self.analyzer.max_text_chars == 0 {
            return Err("analyzer.max_text_chars must be positive".to_string());
        }
        if self.jobs.max_workers == 0 {
            return Err("jobs.max_workers must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_values() {
        let budget = PipelineBudget::default();
        assert_eq!(budget.parameters.min_tempo, 40);
        assert_eq!(budget.parameters.max_tempo, 240);
        assert_eq!(budget.parameters.default_duration_seconds, 180.0);
        assert!(budget.validate().is_ok());
    }

    #[test]
    fn test_profiles_by_name() {
        for name in PipelineBudget::profile_names() {
            let budget = PipelineBudget::by_name(name).unwrap();
            assert_eq!(&budget.name, name);
            assert!(budget.validate().is_ok(), "{} invalid", name);
        }
        assert!(PipelineBudget::by_name("zx-8bit").is_none());
    }

    #[test]
    fn test_preview_is_shorter() {
        let preview = PipelineBudget::preview();
        assert!(preview.parameters.max_duration_seconds < 180.0);
        assert!(preview.parameters.duration_ok(30.0));
        assert!(!preview.parameters.duration_ok(90.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let budget = PipelineBudget::from_json(r#"{"name":"custom","jobs":{"max_workers":8}}"#)
            .unwrap();
        assert_eq!(budget.name, "custom");
        assert_eq!(budget.jobs.max_workers, 8);
        assert_eq!(budget.parameters, ParameterBounds::default());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut budget = PipelineBudget::default();
        budget.parameters.min_tempo = 200;
        budget.parameters.max_tempo = 100;
        assert!(budget.validate().is_err());
    }
}

//! Musical intent extracted from free-form text.

use serde::{Deserialize, Serialize};

use crate::instrument::InstrumentId;
use crate::pitch::Mode;

/// Emotional character detected in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Calm,
    Energetic,
    Dark,
    Mysterious,
    Romantic,
    Epic,
    Playful,
}

impl Mood {
    /// Tempo multiplier applied to the blended template tempo.
    pub fn tempo_scale(self) -> f64 {
        match self {
            Mood::Calm | Mood::Sad | Mood::Romantic => 0.85,
            Mood::Energetic => 1.15,
            _ => 1.0,
        }
    }

    /// Returns the mood as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Calm => "calm",
            Mood::Energetic => "energetic",
            Mood::Dark => "dark",
            Mood::Mysterious => "mysterious",
            Mood::Romantic => "romantic",
            Mood::Epic => "epic",
            Mood::Playful => "playful",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualitative tempo hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoHint {
    VerySlow,
    Slow,
    Moderate,
    Fast,
    VeryFast,
}

impl TempoHint {
    /// Inclusive BPM band the inferred tempo is clamped into.
    pub fn band(self) -> (u16, u16) {
        match self {
            TempoHint::VerySlow => (40, 60),
            TempoHint::Slow => (50, 70),
            TempoHint::Moderate => (80, 110),
            TempoHint::Fast => (120, 150),
            TempoHint::VeryFast => (150, 200),
        }
    }
}

/// Ordinal complexity level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Rich,
    Adventurous,
}

impl Complexity {
    /// Zero-based ordinal (simple = 0).
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Complexity for an ordinal, saturating at adventurous.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Complexity::Simple,
            1 => Complexity::Moderate,
            2 => Complexity::Rich,
            _ => Complexity::Adventurous,
        }
    }

    /// Probability of borrowing a chord from the parallel mode.
    pub fn interchange_probability(self) -> f64 {
        match self {
            Complexity::Simple => 0.0,
            Complexity::Moderate => 0.1,
            Complexity::Rich => 0.2,
            Complexity::Adventurous => 0.3,
        }
    }

    /// Returns the complexity as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Rich => "rich",
            Complexity::Adventurous => "adventurous",
        }
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "moderate" => Ok(Complexity::Moderate),
            "rich" => Ok(Complexity::Rich),
            "adventurous" => Ok(Complexity::Adventurous),
            other => Err(format!("unknown complexity '{}'", other)),
        }
    }
}

/// Key named explicitly in the text (e.g., "in F# minor").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHint {
    /// Tonic pitch class.
    pub tonic: u8,
    /// Mode, when the text names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

/// Tags extracted from raw text. Immutable once produced by the analyzer.
///
/// Style tags and cultural markers are ordered by first occurrence in the text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MusicIntent {
    /// The original text.
    pub text: String,
    /// Genre/style tags (canonical registry names, or unknown words kept verbatim).
    pub styles: Vec<String>,
    /// Detected moods.
    pub moods: Vec<Mood>,
    /// Qualitative tempo hints.
    pub tempo_hints: Vec<TempoHint>,
    /// Instruments named in the text.
    pub instruments: Vec<InstrumentId>,
    /// Cultural/regional style cues (e.g., "celtic", "japanese").
    pub cultural_markers: Vec<String>,
    /// Explicit tempo in BPM ("90 bpm").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_tempo: Option<u16>,
    /// Duration in seconds ("2 minutes", "1:30").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hint: Option<f64>,
    /// Explicit key ("in D minor").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_hint: Option<KeyHint>,
    /// Complexity words ("simple", "intricate").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_hint: Option<Complexity>,
}

impl MusicIntent {
    /// Creates an intent with no tags.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Style tags followed by cultural markers, deduplicated, in detection order.
    pub fn style_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.styles.iter().chain(self.cultural_markers.iter()) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }

    /// Whether nothing beyond the raw text was recognized.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
            && self.moods.is_empty()
            && self.tempo_hints.is_empty()
            && self.instruments.is_empty()
            && self.cultural_markers.is_empty()
            && self.explicit_tempo.is_none()
            && self.duration_hint.is_none()
            && self.key_hint.is_none()
            && self.complexity_hint.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_ordering() {
        assert!(Complexity::Simple < Complexity::Moderate);
        assert!(Complexity::Rich < Complexity::Adventurous);
        assert_eq!(Complexity::from_level(9), Complexity::Adventurous);
        assert_eq!(Complexity::from_level(Complexity::Rich.level()), Complexity::Rich);
    }

    #[test]
    fn test_tempo_bands_are_ordered() {
        let (lo, hi) = TempoHint::Slow.band();
        assert!(lo < hi);
        assert!(hi <= 70);
        assert_eq!(TempoHint::VeryFast.band(), (150, 200));
    }

    #[test]
    fn test_style_tags_merge_cultural_markers() {
        let mut intent = MusicIntent::new("celtic folk with a jazz touch");
        intent.styles = vec!["folk".to_string(), "jazz".to_string()];
        intent.cultural_markers = vec!["celtic".to_string(), "folk".to_string()];
        assert_eq!(intent.style_tags(), vec!["folk", "jazz", "celtic"]);
        assert!(!intent.is_empty());
        assert!(MusicIntent::new("hello").is_empty());
    }
}

//! Concrete, validated musical parameters.

use serde::{Deserialize, Serialize};

use crate::instrument::InstrumentId;
use crate::intent::{Complexity, Mood};
use crate::note::TICKS_PER_BEAT;
use crate::pitch::{KeyContext, Mode};
use crate::style::HarmonyProfile;

/// Meter. One beat is one denominator unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };
    pub const WALTZ: TimeSignature = TimeSignature {
        numerator: 3,
        denominator: 4,
    };
    pub const COMPOUND_DUPLE: TimeSignature = TimeSignature {
        numerator: 6,
        denominator: 8,
    };

    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Beats in one bar.
    pub fn beats_per_bar(&self) -> u32 {
        self.numerator.max(1) as u32
    }

    /// Metric weight of a beat within the bar: 2 = downbeat, 1 = secondary accent, 0 = weak.
    pub fn beat_strength(&self, beat_in_bar: u32) -> u8 {
        if beat_in_bar == 0 {
            return 2;
        }
        let n = self.beats_per_bar();
        let secondary = match n {
            4 => beat_in_bar == 2,
            6 => beat_in_bar == 3,
            9 | 12 => beat_in_bar % 3 == 0,
            _ => false,
        };
        u8::from(secondary)
    }

    /// Whether the numerator and denominator form a supported meter.
    pub fn is_valid(&self) -> bool {
        (2..=12).contains(&self.numerator) && matches!(self.denominator, 2 | 4 | 8)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl std::str::FromStr for TimeSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .split_once('/')
            .ok_or_else(|| format!("time signature '{}' must look like 3/4", s))?;
        let numerator = num
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("invalid numerator '{}': {}", num, e))?;
        let denominator = den
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("invalid denominator '{}': {}", den, e))?;
        Ok(Self::new(numerator, denominator))
    }
}

/// Requested large-scale form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MusicalForm {
    /// Template preference, then duration thresholds.
    #[default]
    Auto,
    /// intro, verse, outro
    Miniature,
    /// intro, verse, chorus, bridge, outro
    Compact,
    /// intro, verse, verse, bridge, verse, outro
    Aaba,
    /// intro, verse, chorus, verse, chorus, bridge, chorus, outro
    Song,
}

impl MusicalForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            MusicalForm::Auto => "auto",
            MusicalForm::Miniature => "miniature",
            MusicalForm::Compact => "compact",
            MusicalForm::Aaba => "aaba",
            MusicalForm::Song => "song",
        }
    }
}

impl std::str::FromStr for MusicalForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(MusicalForm::Auto),
            "miniature" => Ok(MusicalForm::Miniature),
            "compact" => Ok(MusicalForm::Compact),
            "aaba" => Ok(MusicalForm::Aaba),
            "song" => Ok(MusicalForm::Song),
            other => Err(format!("unknown form '{}'", other)),
        }
    }
}

/// How chorus and outro sections resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CadencePolicy {
    /// V then I.
    #[default]
    Authentic,
    /// V then vi.
    Deceptive,
}

/// Bass line rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BassPattern {
    /// Sustained root per chord.
    #[default]
    Root,
    /// Root on strong beats, fifth on the others.
    RootFifth,
    /// Eighth-note root/octave alternation.
    Octave,
    /// Quarter notes with a chromatic approach into the next root.
    Walking,
}

/// Accompaniment texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccompanimentPattern {
    /// Chord struck on each beat.
    Block,
    /// Broken chord in eighth notes.
    Arpeggio,
    /// Syncopated stabs on a Euclidean rhythm.
    Comping,
    /// One sustained voicing per chord.
    Pad,
}

impl AccompanimentPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccompanimentPattern::Block => "block",
            AccompanimentPattern::Arpeggio => "arpeggio",
            AccompanimentPattern::Comping => "comping",
            AccompanimentPattern::Pad => "pad",
        }
    }
}

/// Percussion groove family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Groove {
    /// Kick on 1 and 3, snare on 2 and 4, eighth hats.
    #[default]
    Backbeat,
    /// Kick on every beat, off-beat open hats.
    FourOnFloor,
    /// Ride on every beat with a swung skip note, soft kick.
    Swing,
    /// Euclidean hand-percussion patterns.
    Euclidean,
}

/// Complete parameter set consumed by the generation stages.
///
/// Tempo and duration are always inside the configured bounds and `styles`
/// is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicParameters {
    /// Tonic pitch class (0-11).
    pub key: u8,
    pub mode: Mode,
    /// Beats per minute.
    pub tempo: u16,
    pub time_signature: TimeSignature,
    /// Target duration in seconds.
    pub duration_seconds: f64,
    /// Style labels in blend order.
    pub styles: Vec<String>,
    /// Instruments explicitly requested.
    pub instruments: Vec<InstrumentId>,
    /// Style-appropriate defaults used to fill uncovered roles.
    pub default_instruments: Vec<InstrumentId>,
    pub complexity: Complexity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    pub form: MusicalForm,
    /// Blended chord vocabulary. May be empty when no template resolved.
    pub harmony: HarmonyProfile,
    pub bass_pattern: BassPattern,
    pub accompaniment: Vec<AccompanimentPattern>,
    pub groove: Groove,
    pub percussion: bool,
    pub cadence: CadencePolicy,
}

impl MusicParameters {
    /// Home key.
    pub fn key_context(&self) -> KeyContext {
        KeyContext::new(self.key, self.mode)
    }

    /// Total beats covered by the target duration.
    pub fn total_beats(&self) -> u32 {
        ((self.duration_seconds * self.tempo as f64 / 60.0).round() as u32).max(1)
    }

    /// Total ticks covered by the target duration.
    pub fn total_ticks(&self) -> u32 {
        self.total_beats() * TICKS_PER_BEAT
    }

    /// Seconds per beat at the current tempo.
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo as f64
    }
}

/// Explicit user overrides. Every set field takes precedence over inference
/// and is validated strictly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterOverrides {
    pub tempo: Option<u16>,
    pub duration_seconds: Option<f64>,
    pub key: Option<u8>,
    pub mode: Option<Mode>,
    pub time_signature: Option<TimeSignature>,
    /// Replaces detected style tags when non-empty.
    pub styles: Vec<String>,
    /// Replaces detected instruments when non-empty.
    pub instruments: Vec<InstrumentId>,
    pub complexity: Option<Complexity>,
    pub form: Option<MusicalForm>,
    pub cadence: Option<CadencePolicy>,
    pub percussion: Option<bool>,
}

impl ParameterOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tempo(mut self, tempo: u16) -> Self {
        self.tempo = Some(tempo);
        self
    }

    pub fn duration_seconds(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn key(mut self, tonic: u8) -> Self {
        self.key = Some(tonic);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = Some(time_signature);
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.styles.push(style.into());
        self
    }

    pub fn instrument(mut self, instrument: InstrumentId) -> Self {
        self.instruments.push(instrument);
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn form(mut self, form: MusicalForm) -> Self {
        self.form = Some(form);
        self
    }

    pub fn cadence(mut self, cadence: CadencePolicy) -> Self {
        self.cadence = Some(cadence);
        self
    }

    pub fn percussion(mut self, percussion: bool) -> Self {
        self.percussion = Some(percussion);
        self
    }
}

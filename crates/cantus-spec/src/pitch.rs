//! Pitch classes, modes, and key contexts.
//!
//! Pitches are MIDI note numbers; pitch classes are semitones 0-11 with C = 0.

use serde::{Deserialize, Serialize};

/// Note names used when rendering pitch classes (sharps only).
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Diatonic modes supported by the harmony engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Ionian / major scale.
    #[default]
    Major,
    /// Aeolian / natural minor scale.
    Minor,
    /// Minor with a raised sixth.
    Dorian,
    /// Minor with a lowered second.
    Phrygian,
    /// Major with a raised fourth.
    Lydian,
    /// Major with a lowered seventh.
    Mixolydian,
}

impl Mode {
    /// Semitone offsets of scale degrees 1-7 above the tonic.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
        }
    }

    /// Whether the third degree is minor.
    pub fn is_minor(self) -> bool {
        self.intervals()[2] == 3
    }

    /// The parallel mode used for modal interchange.
    pub fn parallel(self) -> Mode {
        if self.is_minor() {
            Mode::Major
        } else {
            Mode::Minor
        }
    }

    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
        }
    }

    /// All supported modes.
    pub fn all() -> &'static [Mode] {
        &[
            Mode::Major,
            Mode::Minor,
            Mode::Dorian,
            Mode::Phrygian,
            Mode::Lydian,
            Mode::Mixolydian,
        ]
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" | "ionian" | "maj" => Ok(Mode::Major),
            "minor" | "aeolian" | "min" => Ok(Mode::Minor),
            "dorian" => Ok(Mode::Dorian),
            "phrygian" => Ok(Mode::Phrygian),
            "lydian" => Ok(Mode::Lydian),
            "mixolydian" => Ok(Mode::Mixolydian),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// A tonic pitch class together with a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyContext {
    /// Tonic pitch class (0-11).
    pub tonic: u8,
    /// Scale mode.
    pub mode: Mode,
}

impl KeyContext {
    /// Creates a key context, folding the tonic into 0-11.
    pub fn new(tonic: u8, mode: Mode) -> Self {
        Self {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Pitch class of a zero-based scale degree (wraps past the octave).
    pub fn degree_pc(&self, degree_index: usize) -> u8 {
        (self.tonic + self.mode.intervals()[degree_index % 7]) % 12
    }

    /// The seven pitch classes of the scale.
    pub fn scale_pcs(&self) -> [u8; 7] {
        let mut pcs = [0u8; 7];
        for (i, pc) in pcs.iter_mut().enumerate() {
            *pc = self.degree_pc(i);
        }
        pcs
    }

    /// Whether a pitch class (or MIDI pitch) belongs to the scale.
    pub fn contains(&self, pitch: u8) -> bool {
        let pc = pitch % 12;
        self.scale_pcs().contains(&pc)
    }

    /// Zero-based scale degree of a pitch, if it is diatonic.
    pub fn degree_of(&self, pitch: u8) -> Option<usize> {
        let pc = pitch % 12;
        self.scale_pcs().iter().position(|&p| p == pc)
    }

    /// The same tonic in the parallel mode.
    pub fn parallel(&self) -> KeyContext {
        KeyContext::new(self.tonic, self.mode.parallel())
    }

    /// The relative key (relative minor of a major key and vice versa).
    pub fn relative(&self) -> KeyContext {
        if self.mode.is_minor() {
            KeyContext::new(self.tonic + 3, Mode::Major)
        } else {
            KeyContext::new(self.tonic + 9, Mode::Minor)
        }
    }

    /// Snap a MIDI pitch to the nearest scale tone, preferring downward motion on ties.
    pub fn snap(&self, pitch: u8) -> u8 {
        if self.contains(pitch) {
            return pitch;
        }
        for offset in 1u8..=6 {
            if pitch >= offset && self.contains(pitch - offset) {
                return pitch - offset;
            }
            if pitch <= 127 - offset && self.contains(pitch + offset) {
                return pitch + offset;
            }
        }
        pitch
    }
}

impl std::fmt::Display for KeyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", pitch_class_name(self.tonic), self.mode)
    }
}

/// Name of a pitch class (e.g., 1 -> "C#").
pub fn pitch_class_name(pc: u8) -> &'static str {
    NOTE_NAMES[(pc % 12) as usize]
}

/// Convert a MIDI note number to a note name (e.g., 60 -> "C4").
pub fn midi_to_note_name(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", pitch_class_name(midi), octave)
}

/// Parse a pitch class name (e.g., "C", "F#", "Bb", "sol") into a semitone value (0-11).
///
/// Accepts letter names with an optional `#`/`b` accidental and the Romance
/// solfège names (`do`, `re`, `mi`, `fa`, `sol`, `la`, `si`).
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    let (base, rest): (i32, &str) = if let Some(r) = lower.strip_prefix("sol") {
        (7, r)
    } else if let Some(r) = lower.strip_prefix("do") {
        (0, r)
    } else if let Some(r) = lower.strip_prefix("re") {
        (2, r)
    } else if let Some(r) = lower.strip_prefix("mi") {
        (4, r)
    } else if let Some(r) = lower.strip_prefix("fa") {
        (5, r)
    } else if let Some(r) = lower.strip_prefix("la") {
        (9, r)
    } else if let Some(r) = lower.strip_prefix("si") {
        (11, r)
    } else {
        let mut chars = lower.chars();
        let letter = chars.next()?;
        let base = match letter {
            'c' => 0,
            'd' => 2,
            'e' => 4,
            'f' => 5,
            'g' => 7,
            'a' => 9,
            'b' => 11,
            _ => return None,
        };
        (base, &lower[letter.len_utf8()..])
    };

    let accidental = match rest {
        "" => 0,
        "#" | "s" | "sharp" | "♯" => 1,
        "b" | "flat" | "♭" => -1,
        _ => return None,
    };

    Some((base + accidental).rem_euclid(12) as u8)
}

/// Parse a scale-degree token (e.g., "1", "b3", "#4") into a one-based degree and accidental.
pub fn parse_degree_token(token: &str) -> Option<(u8, i8)> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut accidental = 0i8;
    let mut rest = trimmed;
    while let Some(stripped) = rest.strip_prefix('b') {
        accidental -= 1;
        rest = stripped;
    }
    while let Some(stripped) = rest.strip_prefix('#') {
        accidental += 1;
        rest = stripped;
    }

    let degree = rest.parse::<u8>().ok()?;
    if !(1..=7).contains(&degree) || accidental.abs() > 1 {
        return None;
    }
    Some((degree, accidental))
}

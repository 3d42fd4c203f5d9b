//! Regex extraction of explicit values: tempo, duration, key and named styles.

use std::sync::OnceLock;

use regex::Regex;

use cantus_spec::pitch::parse_pitch_class;
use cantus_spec::{KeyHint, Mode};

fn bpm_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{2,3})\s*(?:bpm|beats per minute|beats a minute|ppm|lpm|schläge pro minute)\b",
        )
        .expect("invalid regex pattern")
    })
}

fn tempo_of_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\btempo\s*(?:of|=|:|de|di)?\s*(\d{2,3})\b").expect("invalid regex pattern")
    })
}

fn compound_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{1,2})\s*(?:minutes?|mins?|m)\s*(?:and\s+)?(\d{1,2})\s*(?:seconds?|secs?|s)\b",
        )
        .expect("invalid regex pattern")
    })
}

fn clock_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2}):([0-5]\d)\b").expect("invalid regex pattern"))
}

fn unit_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d+(?:[.,]\d+)?)\s*-?\s*(minutes?|minutos?|minuten?|minuti|mins?|seconds?|secs?|segundos?|secondes?|sekunden|secondi|secondo)\b",
        )
        .expect("invalid regex pattern")
    })
}

fn word_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(one|two|three|four|five|six|seven|eight|nine|ten)[\s-]+minutes?\b")
            .expect("invalid regex pattern")
    })
}

fn key_with_mode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:in|en|em)\s+(do|re|mi|fa|sol|la|si|[a-g])\s*(#|♯|♭|sharp|flat|sostenido|bemol|bémol|dièse|b)?[\s-]*(major|minor|maj|min|mayor|menor|majeur|mineur|maggiore|minore|maior|dur|moll|dorian|phrygian|lydian|mixolydian|aeolian|ionian)\b",
        )
        .expect("invalid regex pattern")
    })
}

fn bare_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:in|en|em)\s+([A-G])(#|♯|♭|b)?(?:[\s.,;:!?]|$)")
            .expect("invalid regex pattern")
    })
}

fn style_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\p{L}+)[\s-](?:style|genre|inspired)\b").expect("invalid regex pattern")
    })
}

fn style_of_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:style|genre) of (?:the )?(\p{L}+)").expect("invalid regex pattern")
    })
}

/// Words that precede "style" without naming one.
const STYLE_STOPWORDS: &[&str] = &[
    "a",
    "an",
    "the",
    "any",
    "some",
    "this",
    "that",
    "my",
    "your",
    "same",
    "different",
    "new",
    "old",
    "similar",
    "own",
    "musical",
    "music",
    "unique",
    "playing",
    "writing",
];

/// Explicit tempo in BPM, e.g. "at 90 bpm" or "tempo of 120".
pub fn extract_tempo(text: &str) -> Option<u16> {
    bpm_regex()
        .captures(text)
        .or_else(|| tempo_of_regex().captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Explicit duration in seconds, e.g. "2 minutes", "45 seconds", "1:30".
pub fn extract_duration(text: &str) -> Option<f64> {
    if let Some(caps) = compound_duration_regex().captures(text) {
        let minutes: f64 = caps.get(1)?.as_str().parse().ok()?;
        let seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(minutes * 60.0 + seconds);
    }
    if let Some(caps) = clock_duration_regex().captures(text) {
        let minutes: f64 = caps.get(1)?.as_str().parse().ok()?;
        let seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(minutes * 60.0 + seconds);
    }
    if let Some(caps) = unit_duration_regex().captures(text) {
        let value: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
        let unit = caps.get(2)?.as_str().to_lowercase();
        let scale = if unit.starts_with("min") { 60.0 } else { 1.0 };
        return Some(value * scale);
    }
    if let Some(caps) = word_duration_regex().captures(text) {
        let minutes = match caps.get(1)?.as_str().to_lowercase().as_str() {
            "one" => 1.0,
            "two" => 2.0,
            "three" => 3.0,
            "four" => 4.0,
            "five" => 5.0,
            "six" => 6.0,
            "seven" => 7.0,
            "eight" => 8.0,
            "nine" => 9.0,
            _ => 10.0,
        };
        return Some(minutes * 60.0);
    }
    None
}

/// Explicit key, e.g. "in F# minor", "en re menor", "in d-Moll", "in Eb".
///
/// A key without a mode word is only recognised with an upper-case letter,
/// so "in a hurry" is not read as A.
pub fn extract_key(text: &str) -> Option<KeyHint> {
    if let Some(caps) = key_with_mode_regex().captures(text) {
        let tonic = tonic_from(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str()))?;
        let mode = mode_from_word(caps.get(3)?.as_str())?;
        return Some(KeyHint {
            tonic,
            mode: Some(mode),
        });
    }
    let caps = bare_key_regex().captures(text)?;
    let tonic = tonic_from(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str()))?;
    Some(KeyHint { tonic, mode: None })
}

/// Style names introduced by "X style", "X-inspired" or "style of X", with
/// byte offsets into `text`.
pub fn extract_named_styles(text: &str) -> Vec<(usize, String)> {
    let mut found: Vec<(usize, String)> = style_suffix_regex()
        .captures_iter(text)
        .chain(style_of_regex().captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str().to_lowercase()))
        .filter(|(_, word)| !STYLE_STOPWORDS.contains(&word.as_str()))
        .collect();
    found.sort_by_key(|(offset, _)| *offset);
    found
}

fn tonic_from(letter: &str, accidental: Option<&str>) -> Option<u8> {
    let base = parse_pitch_class(letter)?;
    let shift: i32 = match accidental.map(str::to_lowercase).as_deref() {
        None => 0,
        Some("#" | "♯" | "sharp" | "sostenido" | "dièse") => 1,
        Some(_) => -1,
    };
    Some((i32::from(base) + shift).rem_euclid(12) as u8)
}

fn mode_from_word(word: &str) -> Option<Mode> {
    match word.to_lowercase().as_str() {
        "major" | "maj" | "mayor" | "majeur" | "maggiore" | "maior" | "dur" | "ionian" => {
            Some(Mode::Major)
        }
        "minor" | "min" | "menor" | "mineur" | "minore" | "moll" | "aeolian" => Some(Mode::Minor),
        other => other.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_forms() {
        assert_eq!(extract_tempo("groove at 92 bpm"), Some(92));
        assert_eq!(extract_tempo("a tempo of 140"), Some(140));
        assert_eq!(extract_tempo("no numbers here"), None);
    }

    #[test]
    fn duration_forms() {
        assert_eq!(extract_duration("about 2 minutes long"), Some(120.0));
        assert_eq!(extract_duration("45 seconds"), Some(45.0));
        assert_eq!(extract_duration("1:30 of music"), Some(90.0));
        assert_eq!(extract_duration("1 min 15 sec"), Some(75.0));
        assert_eq!(extract_duration("1,5 minutos"), Some(90.0));
        assert_eq!(extract_duration("a three minute song"), Some(180.0));
        assert_eq!(extract_duration("90s pop"), None);
    }

    #[test]
    fn key_forms() {
        assert_eq!(
            extract_key("something in F# minor"),
            Some(KeyHint {
                tonic: 6,
                mode: Some(Mode::Minor)
            })
        );
        assert_eq!(
            extract_key("una pieza en re menor"),
            Some(KeyHint {
                tonic: 2,
                mode: Some(Mode::Minor)
            })
        );
        assert_eq!(
            extract_key("ein Lied in d-Moll"),
            Some(KeyHint {
                tonic: 2,
                mode: Some(Mode::Minor)
            })
        );
        assert_eq!(
            extract_key("a ballad in Eb"),
            Some(KeyHint {
                tonic: 3,
                mode: None
            })
        );
        assert_eq!(extract_key("written in a hurry"), None);
    }

    #[test]
    fn named_styles_skip_stopwords() {
        let styles = extract_named_styles("zydeco-style track in the style of polka");
        let names: Vec<_> = styles.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(names, vec!["zydeco", "polka"]);
        assert!(extract_named_styles("in a different style").is_empty());
    }
}

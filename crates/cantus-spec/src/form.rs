//! Sections of the large-scale form.

use serde::{Deserialize, Serialize};

/// Kind of a formal section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl SectionKind {
    /// Relative length weight used when scaling a form to a duration.
    pub fn weight(self) -> f64 {
        match self {
            SectionKind::Intro | SectionKind::Outro => 1.0,
            SectionKind::Verse | SectionKind::Chorus => 2.0,
            SectionKind::Bridge => 1.5,
        }
    }

    /// Whether the last chord of this section must resolve.
    pub fn requires_cadence(self) -> bool {
        matches!(self, SectionKind::Chorus | SectionKind::Outro)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Verse => "verse",
            SectionKind::Chorus => "chorus",
            SectionKind::Bridge => "bridge",
            SectionKind::Outro => "outro",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contiguous span of the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    /// Zero-based count of earlier sections of the same kind.
    pub occurrence: u32,
    /// First beat of the section.
    pub start_beat: u32,
    /// Length in beats.
    pub length_beats: u32,
    /// Tension target in 0..=1.
    pub tension: f64,
}

impl Section {
    /// Beat just past the end of the section.
    pub fn end_beat(&self) -> u32 {
        self.start_beat + self.length_beats
    }

    /// Length in seconds at a tempo.
    pub fn seconds(&self, tempo: u16) -> f64 {
        self.length_beats as f64 * 60.0 / tempo as f64
    }

    /// Label such as "verse 2".
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.occurrence + 1)
    }
}

/// Checks that sections are contiguous from beat 0 and sum to `total_beats`.
pub fn sections_are_contiguous(sections: &[Section], total_beats: u32) -> bool {
    let mut cursor = 0;
    for section in sections {
        if section.start_beat != cursor || section.length_beats == 0 {
            return false;
        }
        cursor = section.end_beat();
    }
    cursor == total_beats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(kind: SectionKind, start: u32, len: u32) -> Section {
        Section {
            kind,
            occurrence: 0,
            start_beat: start,
            length_beats: len,
            tension: 0.5,
        }
    }

    #[test]
    fn test_contiguity() {
        let ok = vec![
            section(SectionKind::Intro, 0, 8),
            section(SectionKind::Verse, 8, 16),
        ];
        assert!(sections_are_contiguous(&ok, 24));
        assert!(!sections_are_contiguous(&ok, 25));

        let gap = vec![
            section(SectionKind::Intro, 0, 8),
            section(SectionKind::Verse, 9, 16),
        ];
        assert!(!sections_are_contiguous(&gap, 25));
    }

    #[test]
    fn test_section_seconds_and_label() {
        let s = section(SectionKind::Chorus, 0, 16);
        assert!((s.seconds(120) - 8.0).abs() < 1e-9);
        assert_eq!(s.label(), "chorus 1");
        assert!(SectionKind::Chorus.requires_cadence());
        assert!(!SectionKind::Bridge.requires_cadence());
    }
}

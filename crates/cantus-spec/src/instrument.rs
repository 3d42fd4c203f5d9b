//! Instrument catalog and voice roles.

use serde::{Deserialize, Serialize};

/// Musical role a track plays in the arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lead melodic line.
    Melody,
    /// Chordal support (block chords, arpeggios, comping, pads).
    Harmony,
    /// Bass line.
    Bass,
    /// Unpitched drums and percussion.
    Percussion,
}

impl Role {
    /// All roles in allocation order.
    pub const ALL: [Role; 4] = [Role::Melody, Role::Harmony, Role::Bass, Role::Percussion];

    /// Returns the role as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Melody => "melody",
            Role::Harmony => "harmony",
            Role::Bass => "bass",
            Role::Percussion => "percussion",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broad instrument family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentFamily {
    Keyboard,
    Guitar,
    Strings,
    Woodwind,
    Brass,
    Vocal,
    Synth,
    Bass,
    Mallet,
    Plucked,
    Percussion,
}

/// Instruments known to the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentId {
    Piano,
    ElectricPiano,
    Organ,
    AcousticGuitar,
    ElectricGuitar,
    Violin,
    Cello,
    Strings,
    Harp,
    Flute,
    Clarinet,
    Saxophone,
    Trumpet,
    Choir,
    SynthLead,
    SynthPad,
    AcousticBass,
    ElectricBass,
    SynthBass,
    DrumKit,
    HandPercussion,
    Marimba,
    Koto,
    Sitar,
}

/// Static catalog entry for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentInfo {
    /// Instrument family.
    pub family: InstrumentFamily,
    /// Lowest playable MIDI note.
    pub low: u8,
    /// Highest playable MIDI note.
    pub high: u8,
    /// Roles this instrument can serve.
    pub roles: &'static [Role],
    /// Role the instrument is best suited to.
    pub best_role: Role,
}

const MELODY: &[Role] = &[Role::Melody];
const MELODY_HARMONY: &[Role] = &[Role::Melody, Role::Harmony];
const HARMONY_MELODY: &[Role] = &[Role::Harmony, Role::Melody];
const ANY_PITCHED: &[Role] = &[Role::Melody, Role::Harmony, Role::Bass];
const BASS_ONLY: &[Role] = &[Role::Bass];
const PERCUSSION_ONLY: &[Role] = &[Role::Percussion];

impl InstrumentId {
    /// Every instrument in the catalog.
    pub const ALL: [InstrumentId; 24] = [
        InstrumentId::Piano,
        InstrumentId::ElectricPiano,
        InstrumentId::Organ,
        InstrumentId::AcousticGuitar,
        InstrumentId::ElectricGuitar,
        InstrumentId::Violin,
        InstrumentId::Cello,
        InstrumentId::Strings,
        InstrumentId::Harp,
        InstrumentId::Flute,
        InstrumentId::Clarinet,
        InstrumentId::Saxophone,
        InstrumentId::Trumpet,
        InstrumentId::Choir,
        InstrumentId::SynthLead,
        InstrumentId::SynthPad,
        InstrumentId::AcousticBass,
        InstrumentId::ElectricBass,
        InstrumentId::SynthBass,
        InstrumentId::DrumKit,
        InstrumentId::HandPercussion,
        InstrumentId::Marimba,
        InstrumentId::Koto,
        InstrumentId::Sitar,
    ];

    /// Catalog entry for this instrument.
    pub fn info(self) -> InstrumentInfo {
        use InstrumentFamily as F;
        let (family, low, high, roles, best_role) = match self {
            InstrumentId::Piano => (F::Keyboard, 21, 108, ANY_PITCHED, Role::Harmony),
            InstrumentId::ElectricPiano => (F::Keyboard, 28, 103, HARMONY_MELODY, Role::Harmony),
            InstrumentId::Organ => (F::Keyboard, 36, 96, ANY_PITCHED, Role::Harmony),
            InstrumentId::AcousticGuitar => (F::Guitar, 40, 84, HARMONY_MELODY, Role::Harmony),
            InstrumentId::ElectricGuitar => (F::Guitar, 40, 88, MELODY_HARMONY, Role::Melody),
            InstrumentId::Violin => (F::Strings, 55, 103, MELODY_HARMONY, Role::Melody),
            InstrumentId::Cello => (F::Strings, 36, 76, ANY_PITCHED, Role::Bass),
            InstrumentId::Strings => (F::Strings, 28, 96, HARMONY_MELODY, Role::Harmony),
            InstrumentId::Harp => (F::Plucked, 24, 103, HARMONY_MELODY, Role::Harmony),
            InstrumentId::Flute => (F::Woodwind, 60, 96, MELODY, Role::Melody),
            InstrumentId::Clarinet => (F::Woodwind, 50, 94, MELODY_HARMONY, Role::Melody),
            InstrumentId::Saxophone => (F::Woodwind, 49, 81, MELODY, Role::Melody),
            InstrumentId::Trumpet => (F::Brass, 54, 84, MELODY, Role::Melody),
            InstrumentId::Choir => (F::Vocal, 40, 81, HARMONY_MELODY, Role::Harmony),
            InstrumentId::SynthLead => (F::Synth, 36, 96, MELODY, Role::Melody),
            InstrumentId::SynthPad => (F::Synth, 36, 96, HARMONY_MELODY, Role::Harmony),
            InstrumentId::AcousticBass => (F::Bass, 28, 67, BASS_ONLY, Role::Bass),
            InstrumentId::ElectricBass => (F::Bass, 28, 67, BASS_ONLY, Role::Bass),
            InstrumentId::SynthBass => (F::Bass, 24, 72, BASS_ONLY, Role::Bass),
            InstrumentId::DrumKit => (F::Percussion, 35, 81, PERCUSSION_ONLY, Role::Percussion),
            InstrumentId::HandPercussion => {
                (F::Percussion, 35, 81, PERCUSSION_ONLY, Role::Percussion)
            }
            InstrumentId::Marimba => (F::Mallet, 45, 96, MELODY_HARMONY, Role::Melody),
            InstrumentId::Koto => (F::Plucked, 43, 86, MELODY_HARMONY, Role::Melody),
            InstrumentId::Sitar => (F::Plucked, 48, 84, MELODY, Role::Melody),
        };
        InstrumentInfo {
            family,
            low,
            high,
            roles,
            best_role,
        }
    }

    /// Whether the instrument can serve a role.
    pub fn can_play(self, role: Role) -> bool {
        self.info().roles.contains(&role)
    }

    /// Whether the instrument is unpitched.
    pub fn is_percussion_only(self) -> bool {
        self.info().roles == PERCUSSION_ONLY
    }

    /// Fold a pitch by octaves into the playable range, preserving pitch class.
    pub fn fold_into_range(self, pitch: u8) -> u8 {
        let info = self.info();
        let mut p = pitch as i16;
        while p < info.low as i16 {
            p += 12;
        }
        while p > info.high as i16 {
            p -= 12;
        }
        p.clamp(info.low as i16, info.high as i16) as u8
    }

    /// Whether a pitch is playable.
    pub fn in_range(self, pitch: u8) -> bool {
        let info = self.info();
        (info.low..=info.high).contains(&pitch)
    }

    /// Catalog fallback instrument for a role.
    pub fn default_for_role(role: Role) -> InstrumentId {
        match role {
            Role::Melody => InstrumentId::Piano,
            Role::Harmony => InstrumentId::Strings,
            Role::Bass => InstrumentId::AcousticBass,
            Role::Percussion => InstrumentId::DrumKit,
        }
    }

    /// Returns the instrument as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentId::Piano => "piano",
            InstrumentId::ElectricPiano => "electric_piano",
            InstrumentId::Organ => "organ",
            InstrumentId::AcousticGuitar => "acoustic_guitar",
            InstrumentId::ElectricGuitar => "electric_guitar",
            InstrumentId::Violin => "violin",
            InstrumentId::Cello => "cello",
            InstrumentId::Strings => "strings",
            InstrumentId::Harp => "harp",
            InstrumentId::Flute => "flute",
            InstrumentId::Clarinet => "clarinet",
            InstrumentId::Saxophone => "saxophone",
            InstrumentId::Trumpet => "trumpet",
            InstrumentId::Choir => "choir",
            InstrumentId::SynthLead => "synth_lead",
            InstrumentId::SynthPad => "synth_pad",
            InstrumentId::AcousticBass => "acoustic_bass",
            InstrumentId::ElectricBass => "electric_bass",
            InstrumentId::SynthBass => "synth_bass",
            InstrumentId::DrumKit => "drum_kit",
            InstrumentId::HandPercussion => "hand_percussion",
            InstrumentId::Marimba => "marimba",
            InstrumentId::Koto => "koto",
            InstrumentId::Sitar => "sitar",
        }
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InstrumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        InstrumentId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| format!("unknown instrument '{}'", s))
    }
}

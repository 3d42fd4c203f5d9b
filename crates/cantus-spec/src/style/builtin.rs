//! Built-in style templates.
//!
//! Weights are tunable data. Each target lists `(degree, calm, tense)`.

use super::{HarmonyProfile, StyleTemplate, TransitionRow, WeightedDegree};
use crate::instrument::InstrumentId as I;
use crate::intent::Complexity;
use crate::params::{AccompanimentPattern as A, BassPattern, Groove, MusicalForm, TimeSignature};
use crate::pitch::Mode;

/// Alias -> canonical style name.
pub(super) const ALIASES: &[(&str, &str)] = &[
    ("lo-fi", "lofi"),
    ("lo fi", "lofi"),
    ("chillhop", "lofi"),
    ("hip hop", "lofi"),
    ("edm", "electronic"),
    ("techno", "electronic"),
    ("house", "electronic"),
    ("synthwave", "electronic"),
    ("orchestral", "cinematic"),
    ("soundtrack", "cinematic"),
    ("film", "cinematic"),
    ("classic", "classical"),
    ("baroque", "classical"),
    ("irish", "celtic"),
    ("scottish", "celtic"),
    ("salsa", "latin"),
    ("bossa nova", "latin"),
    ("japan", "japanese"),
    ("swing", "jazz"),
    ("metal", "rock"),
    ("country", "folk"),
    ("acoustic", "folk"),
];

fn row(from: &str, to: &[(&str, f64, f64)]) -> TransitionRow {
    TransitionRow {
        from: from.to_string(),
        to: to
            .iter()
            .map(|&(d, calm, tense)| WeightedDegree::new(d, calm, tense))
            .collect(),
    }
}

fn profile(
    name: &str,
    rows: Vec<TransitionRow>,
    modal_interchange: bool,
    relative_key_bridge: bool,
) -> HarmonyProfile {
    HarmonyProfile {
        start_degree: "1".to_string(),
        transitions: rows,
        modal_interchange,
        relative_key_bridge,
        sources: vec![name.to_string()],
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    name: &str,
    tempo: u16,
    complexity: Complexity,
    mode: Mode,
    key: u8,
    time_signature: TimeSignature,
    instruments: &[I],
    bass_pattern: BassPattern,
    accompaniment: &[A],
    groove: Groove,
    percussion: bool,
    form: MusicalForm,
    harmony: HarmonyProfile,
) -> StyleTemplate {
    StyleTemplate {
        name: name.to_string(),
        tempo,
        complexity,
        mode,
        key,
        time_signature,
        instruments: instruments.to_vec(),
        bass_pattern,
        accompaniment: accompaniment.to_vec(),
        groove,
        percussion,
        form,
        harmony,
    }
}

pub(super) fn templates() -> Vec<StyleTemplate> {
    vec![
        pop(),
        rock(),
        jazz(),
        blues(),
        classical(),
        ambient(),
        electronic(),
        folk(),
        lofi(),
        cinematic(),
        celtic(),
        latin(),
        japanese(),
    ]
}

pub(super) fn pop() -> StyleTemplate {
    let rows = vec![
        row("1", &[("5", 0.25, 0.3), ("6", 0.3, 0.2), ("4", 0.35, 0.3), ("2", 0.1, 0.2)]),
        row("2", &[("5", 0.7, 0.6), ("4", 0.3, 0.4)]),
        row("3", &[("6", 0.6, 0.5), ("4", 0.4, 0.5)]),
        row("4", &[("1", 0.4, 0.2), ("5", 0.4, 0.5), ("6", 0.1, 0.1), ("2", 0.1, 0.2)]),
        row("5", &[("1", 0.45, 0.3), ("6", 0.35, 0.45), ("4", 0.2, 0.25)]),
        row("6", &[("4", 0.55, 0.4), ("2", 0.2, 0.3), ("5", 0.25, 0.3)]),
    ];
    template(
        "pop",
        110,
        Complexity::Moderate,
        Mode::Major,
        0,
        TimeSignature::COMMON,
        &[I::Piano, I::AcousticGuitar, I::ElectricBass, I::DrumKit],
        BassPattern::RootFifth,
        &[A::Block],
        Groove::Backbeat,
        true,
        MusicalForm::Song,
        profile("pop", rows, false, false),
    )
}

fn rock() -> StyleTemplate {
    let rows = vec![
        row("1", &[("4", 0.35, 0.25), ("5", 0.3, 0.3), ("b7", 0.2, 0.25), ("6", 0.15, 0.2)]),
        row("4", &[("1", 0.45, 0.3), ("5", 0.35, 0.45), ("b7", 0.2, 0.25)]),
        row("5", &[("1", 0.4, 0.25), ("4", 0.4, 0.5), ("6", 0.2, 0.25)]),
        row("b7", &[("4", 0.5, 0.4), ("1", 0.5, 0.6)]),
        row("6", &[("4", 0.5, 0.4), ("5", 0.5, 0.6)]),
    ];
    template(
        "rock",
        128,
        Complexity::Moderate,
        Mode::Major,
        4,
        TimeSignature::COMMON,
        &[I::ElectricGuitar, I::Organ, I::ElectricBass, I::DrumKit],
        BassPattern::Octave,
        &[A::Block],
        Groove::Backbeat,
        true,
        MusicalForm::Song,
        profile("rock", rows, true, false),
    )
}

fn jazz() -> StyleTemplate {
    let rows = vec![
        row("1", &[("6", 0.35, 0.25), ("2", 0.35, 0.3), ("4", 0.2, 0.2), ("3", 0.1, 0.25)]),
        row("2", &[("5", 0.85, 0.7), ("b2", 0.15, 0.3)]),
        row("3", &[("6", 0.7, 0.5), ("b3", 0.3, 0.5)]),
        row("b3", &[("2", 1.0, 1.0)]),
        row("b2", &[("1", 1.0, 1.0)]),
        row("4", &[("7", 0.3, 0.4), ("5", 0.3, 0.3), ("1", 0.4, 0.3)]),
        row("5", &[("1", 0.7, 0.5), ("6", 0.2, 0.3), ("3", 0.1, 0.2)]),
        row("6", &[("2", 0.8, 0.6), ("5", 0.2, 0.4)]),
        row("7", &[("3", 0.6, 0.6), ("1", 0.4, 0.4)]),
    ];
    template(
        "jazz",
        132,
        Complexity::Rich,
        Mode::Major,
        5,
        TimeSignature::COMMON,
        &[I::Saxophone, I::Piano, I::AcousticBass, I::DrumKit],
        BassPattern::Walking,
        &[A::Comping],
        Groove::Swing,
        true,
        MusicalForm::Aaba,
        profile("jazz", rows, true, true),
    )
}

fn blues() -> StyleTemplate {
    let rows = vec![
        row("1", &[("1", 0.3, 0.15), ("4", 0.5, 0.55), ("5", 0.2, 0.3)]),
        row("4", &[("4", 0.2, 0.1), ("1", 0.6, 0.5), ("5", 0.2, 0.4)]),
        row("5", &[("4", 0.6, 0.6), ("1", 0.4, 0.4)]),
    ];
    template(
        "blues",
        84,
        Complexity::Moderate,
        Mode::Mixolydian,
        9,
        TimeSignature::COMMON,
        &[I::ElectricGuitar, I::Piano, I::ElectricBass, I::DrumKit],
        BassPattern::Walking,
        &[A::Comping],
        Groove::Swing,
        true,
        MusicalForm::Compact,
        profile("blues", rows, false, false),
    )
}

fn classical() -> StyleTemplate {
    let rows = vec![
        row(
            "1",
            &[
                ("4", 0.3, 0.2),
                ("5", 0.25, 0.25),
                ("6", 0.2, 0.2),
                ("2", 0.15, 0.2),
                ("3", 0.1, 0.15),
            ],
        ),
        row("2", &[("5", 0.75, 0.6), ("7", 0.25, 0.4)]),
        row("3", &[("6", 0.6, 0.5), ("4", 0.4, 0.5)]),
        row("4", &[("5", 0.5, 0.55), ("2", 0.2, 0.25), ("1", 0.3, 0.2)]),
        row("5", &[("1", 0.6, 0.4), ("6", 0.25, 0.4), ("4", 0.15, 0.2)]),
        row("6", &[("2", 0.5, 0.4), ("4", 0.5, 0.6)]),
        row("7", &[("1", 0.7, 0.5), ("3", 0.3, 0.5)]),
    ];
    template(
        "classical",
        96,
        Complexity::Rich,
        Mode::Major,
        2,
        TimeSignature::COMMON,
        &[I::Violin, I::Strings, I::Cello, I::Harp],
        BassPattern::Root,
        &[A::Arpeggio],
        Groove::Backbeat,
        false,
        MusicalForm::Compact,
        profile("classical", rows, false, true),
    )
}

fn ambient() -> StyleTemplate {
    let rows = vec![
        row("1", &[("2", 0.4, 0.3), ("5", 0.3, 0.3), ("6", 0.3, 0.4)]),
        row("2", &[("1", 0.6, 0.4), ("6", 0.4, 0.6)]),
        row("5", &[("1", 0.5, 0.4), ("2", 0.5, 0.6)]),
        row("6", &[("2", 0.4, 0.3), ("1", 0.6, 0.7)]),
    ];
    template(
        "ambient",
        70,
        Complexity::Simple,
        Mode::Lydian,
        2,
        TimeSignature::COMMON,
        &[I::Piano, I::SynthPad, I::SynthBass],
        BassPattern::Root,
        &[A::Pad],
        Groove::Backbeat,
        false,
        MusicalForm::Compact,
        profile("ambient", rows, true, false),
    )
}

fn electronic() -> StyleTemplate {
    let rows = vec![
        row("1", &[("6", 0.4, 0.3), ("7", 0.3, 0.3), ("4", 0.3, 0.4)]),
        row("3", &[("7", 0.5, 0.4), ("6", 0.5, 0.6)]),
        row("4", &[("6", 0.4, 0.3), ("1", 0.3, 0.2), ("5", 0.3, 0.5)]),
        row("5", &[("1", 0.7, 0.6), ("6", 0.3, 0.4)]),
        row("6", &[("7", 0.5, 0.4), ("3", 0.3, 0.3), ("4", 0.2, 0.3)]),
        row("7", &[("1", 0.6, 0.4), ("3", 0.2, 0.3), ("6", 0.2, 0.3)]),
    ];
    template(
        "electronic",
        124,
        Complexity::Moderate,
        Mode::Minor,
        9,
        TimeSignature::COMMON,
        &[I::SynthLead, I::SynthPad, I::SynthBass, I::DrumKit],
        BassPattern::Octave,
        &[A::Arpeggio, A::Pad],
        Groove::FourOnFloor,
        true,
        MusicalForm::Song,
        profile("electronic", rows, false, false),
    )
}

fn folk() -> StyleTemplate {
    let rows = vec![
        row("1", &[("4", 0.4, 0.3), ("5", 0.45, 0.45), ("6", 0.15, 0.25)]),
        row("4", &[("1", 0.55, 0.4), ("5", 0.45, 0.6)]),
        row("5", &[("1", 0.7, 0.5), ("4", 0.2, 0.3), ("6", 0.1, 0.2)]),
        row("6", &[("4", 0.6, 0.5), ("5", 0.4, 0.5)]),
    ];
    template(
        "folk",
        100,
        Complexity::Simple,
        Mode::Major,
        7,
        TimeSignature::WALTZ,
        &[I::Violin, I::AcousticGuitar, I::AcousticBass],
        BassPattern::RootFifth,
        &[A::Arpeggio],
        Groove::Backbeat,
        false,
        MusicalForm::Compact,
        profile("folk", rows, false, false),
    )
}

fn lofi() -> StyleTemplate {
    let rows = vec![
        row("1", &[("6", 0.3, 0.25), ("4", 0.4, 0.3), ("2", 0.3, 0.45)]),
        row("2", &[("5", 0.8, 0.6), ("3", 0.2, 0.4)]),
        row("3", &[("6", 0.7, 0.5), ("4", 0.3, 0.5)]),
        row("4", &[("3", 0.4, 0.3), ("1", 0.3, 0.2), ("5", 0.3, 0.5)]),
        row("5", &[("1", 0.6, 0.5), ("3", 0.4, 0.5)]),
        row("6", &[("2", 0.6, 0.5), ("4", 0.4, 0.5)]),
    ];
    template(
        "lofi",
        78,
        Complexity::Rich,
        Mode::Major,
        3,
        TimeSignature::COMMON,
        &[I::ElectricPiano, I::Piano, I::ElectricBass, I::DrumKit],
        BassPattern::Root,
        &[A::Comping, A::Pad],
        Groove::Backbeat,
        true,
        MusicalForm::Compact,
        profile("lofi", rows, true, false),
    )
}

fn cinematic() -> StyleTemplate {
    let rows = vec![
        row("1", &[("6", 0.35, 0.25), ("4", 0.3, 0.3), ("3", 0.2, 0.2), ("7", 0.15, 0.25)]),
        row("3", &[("6", 0.4, 0.3), ("7", 0.6, 0.7)]),
        row("4", &[("1", 0.4, 0.2), ("6", 0.3, 0.3), ("5", 0.3, 0.5)]),
        row("5", &[("1", 0.6, 0.5), ("6", 0.4, 0.5)]),
        row("6", &[("3", 0.35, 0.2), ("7", 0.35, 0.4), ("4", 0.3, 0.4)]),
        row("7", &[("1", 0.4, 0.2), ("3", 0.6, 0.5), ("5", 0.0, 0.3)]),
    ];
    template(
        "cinematic",
        90,
        Complexity::Rich,
        Mode::Minor,
        2,
        TimeSignature::COMMON,
        &[I::Violin, I::Strings, I::Cello, I::Choir, I::HandPercussion],
        BassPattern::Root,
        &[A::Pad, A::Arpeggio],
        Groove::Euclidean,
        true,
        MusicalForm::Song,
        profile("cinematic", rows, true, true),
    )
}

fn celtic() -> StyleTemplate {
    let rows = vec![
        row("1", &[("7", 0.4, 0.4), ("4", 0.35, 0.3), ("3", 0.25, 0.3)]),
        row("3", &[("7", 0.5, 0.4), ("4", 0.5, 0.6)]),
        row("4", &[("1", 0.6, 0.5), ("7", 0.4, 0.5)]),
        row("7", &[("1", 0.6, 0.5), ("4", 0.4, 0.5)]),
    ];
    template(
        "celtic",
        112,
        Complexity::Moderate,
        Mode::Dorian,
        2,
        TimeSignature::COMPOUND_DUPLE,
        &[I::Flute, I::Harp, I::Cello, I::HandPercussion],
        BassPattern::Root,
        &[A::Arpeggio],
        Groove::Euclidean,
        true,
        MusicalForm::Compact,
        profile("celtic", rows, false, false),
    )
}

fn latin() -> StyleTemplate {
    let rows = vec![
        row("1", &[("4", 0.45, 0.35), ("5", 0.35, 0.4), ("6", 0.2, 0.25)]),
        row("3", &[("6", 1.0, 1.0)]),
        row("4", &[("5", 0.5, 0.6), ("1", 0.4, 0.3), ("7", 0.1, 0.1)]),
        row("5", &[("1", 0.8, 0.6), ("6", 0.2, 0.4)]),
        row("6", &[("5", 0.6, 0.6), ("4", 0.4, 0.4)]),
        row("7", &[("3", 0.6, 0.6), ("1", 0.4, 0.4)]),
    ];
    template(
        "latin",
        104,
        Complexity::Moderate,
        Mode::Minor,
        7,
        TimeSignature::COMMON,
        &[I::Trumpet, I::AcousticGuitar, I::AcousticBass, I::HandPercussion],
        BassPattern::RootFifth,
        &[A::Comping],
        Groove::Euclidean,
        true,
        MusicalForm::Song,
        profile("latin", rows, false, false),
    )
}

fn japanese() -> StyleTemplate {
    let rows = vec![
        row("1", &[("2", 0.4, 0.4), ("4", 0.3, 0.3), ("6", 0.3, 0.3)]),
        row("2", &[("1", 0.7, 0.6), ("4", 0.3, 0.4)]),
        row("4", &[("2", 0.3, 0.4), ("1", 0.5, 0.3), ("6", 0.2, 0.3)]),
        row("6", &[("2", 0.3, 0.4), ("1", 0.4, 0.3), ("4", 0.3, 0.3)]),
    ];
    template(
        "japanese",
        72,
        Complexity::Simple,
        Mode::Phrygian,
        4,
        TimeSignature::COMMON,
        &[I::Koto, I::Strings, I::Cello, I::HandPercussion],
        BassPattern::Root,
        &[A::Arpeggio, A::Pad],
        Groove::Euclidean,
        false,
        MusicalForm::Compact,
        profile("japanese", rows, false, false),
    )
}

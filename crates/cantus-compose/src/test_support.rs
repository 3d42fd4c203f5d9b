//! Fixtures shared by unit tests.

use cantus_spec::{ChordEvent, Complexity, MusicParameters, MusicalForm, Section, StyleRegistry};

use crate::accompaniment::{generate_bass_and_accompaniment, generate_percussion};
use crate::form::plan_form;
use crate::harmony::generate_harmony;
use crate::instrumentation::RoleOutputs;
use crate::melody::generate_melody;

/// Parameters taken straight from a built-in template.
pub fn params_for(style: &str, form: MusicalForm, tempo: u16, seconds: f64) -> MusicParameters {
    let registry = StyleRegistry::builtin();
    let template = registry.get(style).expect("built-in style");
    MusicParameters {
        key: template.key,
        mode: template.mode,
        tempo,
        time_signature: template.time_signature,
        duration_seconds: seconds,
        styles: vec![template.name.clone()],
        instruments: vec![],
        default_instruments: template.instruments.clone(),
        complexity: Complexity::Moderate,
        mood: None,
        form,
        harmony: template.harmony.clone(),
        bass_pattern: template.bass_pattern,
        accompaniment: template.accompaniment.clone(),
        groove: template.groove,
        percussion: template.percussion,
        cadence: Default::default(),
    }
}

/// Sections and chords for `params`.
pub fn plan(params: &MusicParameters, seed: u64) -> (Vec<Section>, Vec<ChordEvent>) {
    let sections = plan_form(params);
    let (chords, _) = generate_harmony(params, &sections, seed)
        .into_result()
        .expect("harmony never fails");
    (sections, chords)
}

/// Sections, chords and every role's notes for `params`.
pub fn outputs(
    params: &MusicParameters,
    seed: u64,
) -> (Vec<Section>, Vec<ChordEvent>, RoleOutputs) {
    let (sections, chords) = plan(params, seed);
    let melody = generate_melody(params, &sections, &chords, seed);
    let backing = generate_bass_and_accompaniment(params, &chords, seed);
    let percussion = generate_percussion(params, &sections, &chords, seed);
    let role_outputs = RoleOutputs {
        melody,
        parts: backing.parts,
        bass: backing.bass,
        percussion,
    };
    (sections, chords, role_outputs)
}

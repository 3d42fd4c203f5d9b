//! End-to-end tests: text in, assembled composition out.

use cantus_compose::assemble::validate_parts;
use cantus_compose::{CancellationToken, CompositionRequest, JobRunner, JobState, Pipeline};
use cantus_spec::harmony::chord_at;
use cantus_spec::{
    AssemblyBudget, DiagnosticCode, ErrorKind, InstrumentId, MusicalForm, ParameterOverrides,
    PipelineBudget, Role, SectionKind, TICKS_PER_BEAT,
};
use cantus_tests::fixtures::{beat_of, compose, compose_with, melody_notes, section_beats, PROMPTS};
use pretty_assertions::assert_eq;

#[test]
fn every_prompt_composes_a_valid_piece() {
    for (seed, prompt) in PROMPTS.iter().enumerate() {
        let result = compose(prompt, seed as u64).unwrap_or_else(|e| panic!("{}: {}", prompt, e));
        let c = &result.composition;
        let violations = validate_parts(
            &c.parameters,
            &c.sections,
            &c.chords,
            &c.tracks,
            &AssemblyBudget::default(),
        );
        assert!(violations.is_empty(), "{}: {:?}", prompt, violations);
        assert_eq!(section_beats(c), c.parameters.total_beats(), "{}", prompt);
        assert!(c.tracks_for(Role::Melody).next().is_some(), "{}", prompt);
        assert!(c.tracks_for(Role::Bass).next().is_some(), "{}", prompt);
    }
}

#[test]
fn melody_stays_on_chord_or_scale_tones() {
    for (seed, prompt) in PROMPTS.iter().enumerate() {
        let result = compose(prompt, 100 + seed as u64).unwrap();
        let c = &result.composition;
        for note in melody_notes(c) {
            if note.tag.is_non_harmonic() {
                continue;
            }
            let chord = chord_at(&c.chords, beat_of(note.start_tick)).unwrap();
            assert!(
                chord.contains(note.pitch) || chord.key.contains(note.pitch),
                "{}: pitch {} at tick {}",
                prompt,
                note.pitch,
                note.start_tick
            );
        }
    }
}

#[test]
fn calm_meditative_prompt_is_slow() {
    let result = compose("calm meditative piece, slow tempo", 1).unwrap();
    assert!(result.composition.parameters.tempo <= 70);
}

#[test]
fn sixty_seconds_of_compact_form_has_five_sections() {
    let request = CompositionRequest::new("pop song", 2).with_overrides(
        ParameterOverrides::new()
            .duration_seconds(60.0)
            .form(MusicalForm::Compact),
    );
    let result = compose_with(&Pipeline::default(), &request).unwrap();
    let c = &result.composition;
    let kinds: Vec<SectionKind> = c.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SectionKind::Intro,
            SectionKind::Verse,
            SectionKind::Chorus,
            SectionKind::Bridge,
            SectionKind::Outro
        ]
    );
    let seconds = f64::from(section_beats(c)) * c.parameters.seconds_per_beat();
    assert!((seconds - 60.0).abs() <= c.parameters.seconds_per_beat());
}

#[test]
fn percussion_only_request_gets_a_melody_instrument() {
    let request = CompositionRequest::new("a groove", 3)
        .with_overrides(ParameterOverrides::new().instrument(InstrumentId::DrumKit));
    let result = compose_with(&Pipeline::default(), &request).unwrap();
    assert!(result
        .diagnostics()
        .has(DiagnosticCode::InstrumentReassignment));
    let c = &result.composition;
    let melody: Vec<InstrumentId> = c.tracks_for(Role::Melody).map(|t| t.instrument).collect();
    assert!(!melody.is_empty());
    assert!(melody.iter().all(|i| i.can_play(Role::Melody)));
    assert!(!melody.contains(&InstrumentId::DrumKit));
}

#[test]
fn unknown_style_falls_back_without_failing() {
    let request = CompositionRequest::new("something", 4)
        .with_overrides(ParameterOverrides::new().style("zydeco"));
    let result = compose_with(&Pipeline::default(), &request).unwrap();
    assert!(result.diagnostics().has(DiagnosticCode::HarmonyFallback));
    assert!(!result.composition.chords.is_empty());
}

#[test]
fn unknown_style_blended_with_a_known_one_reports_the_fallback() {
    let result = compose("jazz with a zydeco-style feel", 1).unwrap();
    let c = &result.composition;
    assert_eq!(c.parameters.styles, vec!["jazz".to_string(), "zydeco".to_string()]);
    let diagnostics = result.diagnostics();
    assert!(diagnostics.has(DiagnosticCode::StyleUnavailable));
    assert_eq!(diagnostics.count(DiagnosticCode::HarmonyFallback), 1);
    assert!(!diagnostics.has(DiagnosticCode::DefaultStyleSubstituted));
    assert!(!c.chords.is_empty());
}

#[test]
fn choruses_and_outros_end_on_a_cadence() {
    let request = CompositionRequest::new("pop song", 5)
        .with_overrides(ParameterOverrides::new().duration_seconds(180.0));
    let result = compose_with(&Pipeline::default(), &request).unwrap();
    let c = &result.composition;
    for (index, section) in c.sections.iter().enumerate() {
        if !section.kind.requires_cadence() {
            continue;
        }
        let last = c.chords.iter().filter(|ch| ch.section == index).last().unwrap();
        assert_eq!(last.degree, "1", "{}", section.label());
    }
}

#[test]
fn tracks_end_within_the_requested_duration() {
    let result = compose("electronic track, 45 seconds", 6).unwrap();
    let c = &result.composition;
    let limit = (c.parameters.total_beats() + AssemblyBudget::default().tolerance_beats)
        * TICKS_PER_BEAT;
    assert!(c.end_tick() <= limit);
    assert_eq!(c.parameters.duration_seconds, 45.0);
}

#[test]
fn invalid_input_and_bad_overrides_fail_with_kinds() {
    let err = compose("", 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let request = CompositionRequest::new("rock", 1)
        .with_overrides(ParameterOverrides::new().duration_seconds(5.0));
    let err = compose_with(&Pipeline::default(), &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParameterValidation);
    assert!(err.to_string().contains("duration"));
}

#[test]
fn oversized_text_is_rejected_under_strict_budget() {
    let pipeline = Pipeline::default().with_budget(PipelineBudget::strict());
    let text = "jazz ".repeat(300);
    let err = compose_with(&pipeline, &CompositionRequest::new(text, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn cancellation_is_reported_per_job() {
    let runner = JobRunner::new(Pipeline::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let reports = runner.run_batch(&[CompositionRequest::new("folk", 1)], &cancel);
    assert_eq!(reports[0].state, JobState::Cancelled);
}

//! Parameter synthesizer: [`MusicIntent`] plus overrides to [`MusicParameters`].
//!
//! Precedence for every field is explicit override, then a value stated in
//! the text (key, tempo, duration), then mood and tempo-hint adjustments,
//! then the blended style template. Explicit overrides out of bounds are
//! fatal; inferred values are clamped with a [`DiagnosticCode::ValueClamped`]
//! note.

mod blend;

use tracing::{debug, warn};

use cantus_spec::{
    CadencePolicy, CodedError, Complexity, Diagnostic, DiagnosticCode, Diagnostics,
    HarmonyProfile, Mode, Mood, MusicIntent, MusicParameters, ParameterBounds,
    ParameterOverrides, PipelineBudget, PipelineError, StyleRegistry, StyleTemplate,
};

use crate::outcome::StageOutcome;
use crate::style_provider::StyleProvider;

pub use blend::{blend, blend_weights, round_toward_first};

const STAGE: &str = "parameters";

/// Build validated parameters for `intent`.
///
/// `provider` resolves style tags; `registry` supplies the default style
/// when nothing resolves.
pub fn synthesize_parameters(
    intent: &MusicIntent,
    overrides: &ParameterOverrides,
    provider: &dyn StyleProvider,
    registry: &StyleRegistry,
    budget: &PipelineBudget,
) -> StageOutcome<MusicParameters> {
    let bounds = &budget.parameters;
    if let Err(err) = validate_overrides(overrides, bounds) {
        return StageOutcome::Fatal(err);
    }

    let mut diagnostics = Diagnostics::new();
    let tags = if overrides.styles.is_empty() {
        intent.style_tags()
    } else {
        overrides.styles.clone()
    };

    let mut templates: Vec<StyleTemplate> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    for (i, tag) in tags.iter().enumerate() {
        match provider.template_for(tag) {
            Ok(Some(template)) => {
                if !templates.iter().any(|t| t.name == template.name) {
                    push_label(&mut labels, &template.name);
                    templates.push(template);
                }
            }
            Ok(None) => {
                push_label(&mut labels, tag);
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::StyleUnavailable,
                        STAGE,
                        format!("no template for style '{}'", tag),
                    )
                    .with_path(format!("styles[{}]", i)),
                );
            }
            Err(err) => {
                warn!(
                    provider = provider.name(),
                    tag = %tag,
                    code = err.code(),
                    "style provider failed"
                );
                push_label(&mut labels, tag);
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::StyleUnavailable,
                        STAGE,
                        format!("style '{}' unavailable: [{}] {}", tag, err.code(), err.message()),
                    )
                    .with_path(format!("styles[{}]", i)),
                );
            }
        }
    }

    let template = match blend(&templates) {
        Some(template) => template,
        None => {
            let mut default = registry
                .default_template()
                .cloned()
                .unwrap_or_else(StyleTemplate::fallback);
            if tags.is_empty() {
                push_label(&mut labels, &default.name);
            } else {
                // Requested styles exist but none resolved: keep the default's
                // arrangement, leave harmony empty so the engine falls back.
                default.harmony = HarmonyProfile {
                    sources: Vec::new(),
                    transitions: Vec::new(),
                    ..default.harmony
                };
            }
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::DefaultStyleSubstituted,
                STAGE,
                format!("no style resolved; using '{}' defaults", default.name),
            ));
            default
        }
    };

    let mood = intent.moods.first().copied();
    let mode = overrides
        .mode
        .or_else(|| intent.key_hint.and_then(|k| k.mode))
        .or_else(|| mood.map(|m| mode_for_mood(m, template.mode)))
        .unwrap_or(template.mode);
    let key = overrides
        .key
        .or_else(|| intent.key_hint.map(|k| k.tonic))
        .unwrap_or(template.key);

    let tempo = match overrides.tempo {
        Some(tempo) => tempo,
        None => {
            let inferred = infer_tempo(intent, &template);
            clamp_tempo(inferred, bounds, &mut diagnostics)
        }
    };

    let duration_seconds = match (overrides.duration_seconds, intent.duration_hint) {
        (Some(seconds), _) => seconds,
        (None, Some(hint)) => clamp_duration(hint, bounds, &mut diagnostics),
        (None, None) => bounds.default_duration_seconds,
    };

    let complexity = overrides
        .complexity
        .or(intent.complexity_hint)
        .unwrap_or(template.complexity);
    let cadence = overrides.cadence.unwrap_or(if complexity == Complexity::Adventurous {
        CadencePolicy::Deceptive
    } else {
        CadencePolicy::Authentic
    });

    let instruments = if overrides.instruments.is_empty() {
        intent.instruments.clone()
    } else {
        overrides.instruments.clone()
    };
    let percussion = overrides.percussion.unwrap_or_else(|| {
        template.percussion || instruments.iter().any(|i| i.is_percussion_only())
    });

    let parameters = MusicParameters {
        key: key % 12,
        mode,
        tempo,
        time_signature: overrides.time_signature.unwrap_or(template.time_signature),
        duration_seconds,
        styles: labels,
        instruments,
        default_instruments: template.instruments.clone(),
        complexity,
        mood,
        form: overrides.form.unwrap_or(template.form),
        harmony: template.harmony.clone(),
        bass_pattern: template.bass_pattern,
        accompaniment: template.accompaniment.clone(),
        groove: template.groove,
        percussion,
        cadence,
    };

    debug!(
        styles = ?parameters.styles,
        key = parameters.key,
        mode = %parameters.mode,
        tempo = parameters.tempo,
        duration = parameters.duration_seconds,
        complexity = parameters.complexity.as_str(),
        "synthesized parameters"
    );
    StageOutcome::from_parts(parameters, diagnostics)
}

fn validate_overrides(
    overrides: &ParameterOverrides,
    bounds: &ParameterBounds,
) -> Result<(), PipelineError> {
    if let Some(tempo) = overrides.tempo {
        if !bounds.tempo_ok(tempo) {
            return Err(PipelineError::parameter(
                "tempo",
                format!(
                    "{} BPM is outside {}-{}",
                    tempo, bounds.min_tempo, bounds.max_tempo
                ),
            ));
        }
    }
    if let Some(seconds) = overrides.duration_seconds {
        if !bounds.duration_ok(seconds) {
            return Err(PipelineError::parameter(
                "duration_seconds",
                format!(
                    "{} s is outside {}-{} s",
                    seconds, bounds.min_duration_seconds, bounds.max_duration_seconds
                ),
            ));
        }
    }
    if let Some(key) = overrides.key {
        if key > 11 {
            return Err(PipelineError::parameter(
                "key",
                format!("{} is not a pitch class (0-11)", key),
            ));
        }
    }
    if let Some(ts) = overrides.time_signature {
        if !ts.is_valid() {
            return Err(PipelineError::parameter(
                "time_signature",
                format!("{} is not supported", ts),
            ));
        }
    }
    if let Some(i) = overrides.styles.iter().position(|s| s.trim().is_empty()) {
        return Err(PipelineError::parameter(
            format!("styles[{}]", i),
            "style name is empty",
        ));
    }
    Ok(())
}

/// Mode selected by a mood, given the template's mode.
pub fn mode_for_mood(mood: Mood, template_mode: Mode) -> Mode {
    match mood {
        Mood::Sad if template_mode.is_minor() => template_mode,
        Mood::Sad => Mode::Minor,
        Mood::Dark if template_mode.is_minor() => Mode::Phrygian,
        Mood::Mysterious if template_mode.is_minor() => Mode::Dorian,
        Mood::Dark | Mood::Mysterious => Mode::Minor,
        Mood::Happy | Mood::Energetic if template_mode.is_minor() => Mode::Major,
        _ => template_mode,
    }
}

/// Tempo implied by the template, mood, tempo hints and any BPM in the text.
/// Not yet clamped to bounds.
fn infer_tempo(intent: &MusicIntent, template: &StyleTemplate) -> f64 {
    if let Some(bpm) = intent.explicit_tempo {
        return f64::from(bpm);
    }
    let mut tempo = f64::from(template.tempo);
    if let Some(mood) = intent.moods.first() {
        tempo *= mood.tempo_scale();
    }
    if let Some(hint) = intent.tempo_hints.first() {
        let (low, high) = hint.band();
        tempo = tempo.clamp(f64::from(low), f64::from(high));
    }
    tempo.round()
}

fn clamp_tempo(tempo: f64, bounds: &ParameterBounds, diagnostics: &mut Diagnostics) -> u16 {
    let clamped = tempo.clamp(f64::from(bounds.min_tempo), f64::from(bounds.max_tempo));
    if clamped != tempo {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::ValueClamped,
                STAGE,
                format!("tempo {} clamped to {}", tempo, clamped),
            )
            .with_path("tempo"),
        );
    }
    clamped as u16
}

fn clamp_duration(seconds: f64, bounds: &ParameterBounds, diagnostics: &mut Diagnostics) -> f64 {
    let clamped = if seconds.is_finite() {
        seconds.clamp(bounds.min_duration_seconds, bounds.max_duration_seconds)
    } else {
        bounds.default_duration_seconds
    };
    if clamped != seconds {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::ValueClamped,
                STAGE,
                format!("duration {} s clamped to {} s", seconds, clamped),
            )
            .with_path("duration_seconds"),
        );
    }
    clamped
}

fn push_label(labels: &mut Vec<String>, label: &str) {
    if !labels.iter().any(|l| l == label) {
        labels.push(label.to_string());
    }
}

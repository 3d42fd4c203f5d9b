//! Harmony engine: sections to a chord progression.
//!
//! Each section walks the style's weighted transition table from the start
//! degree, one chord per bar (half bars in tense sections of rich pieces).
//! Weights are interpolated by section tension. Chorus and outro sections
//! end on a cadence; a chorus whose layout matches the first chorus restates
//! its chords. A profile with no usable transitions is replaced by a generic
//! progression and reported with [`DiagnosticCode::HarmonyFallback`]; a
//! requested style that contributed no rows to a usable blend is reported the
//! same way while the blend carries on.

mod chord;

use rand::Rng;
use rand_pcg::Pcg32;
use tracing::{debug, warn};

use cantus_spec::{
    CadencePolicy, ChordEvent, Complexity, Diagnostic, DiagnosticCode, Diagnostics, Extension,
    HarmonyProfile, KeyContext, MusicParameters, Section, SectionKind, TransitionRow,
    WeightedDegree,
};

use crate::outcome::StageOutcome;
use crate::utils::{rng_for, weighted_index};

pub use chord::{generic_progression, interchange, realize_degree, stack_thirds, ChordSpec};

const STAGE: &str = "harmony";

/// Tension at or above which rich pieces move to half-bar chords.
pub const HALF_BAR_TENSION: f64 = 0.7;

/// Generate chords covering every section.
pub fn generate_harmony(
    params: &MusicParameters,
    sections: &[Section],
    seed: u64,
) -> StageOutcome<Vec<ChordEvent>> {
    let home = params.key_context();
    let mut diagnostics = Diagnostics::new();

    let profile = if profile_is_usable(&params.harmony, home) {
        for style in unsourced_styles(params) {
            warn!(style = %style, "harmony fallback");
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::HarmonyFallback,
                STAGE,
                format!(
                    "style '{}' has no progression; using the blended rows of [{}]",
                    style,
                    params.harmony.sources.join(", ")
                ),
            ));
        }
        params.harmony.clone()
    } else {
        let generic = generic_profile(home);
        let message = format!(
            "no usable progression for styles [{}]; using the generic {} progression",
            params.styles.join(", "),
            if home.mode.is_minor() { "minor" } else { "major" }
        );
        warn!(styles = ?params.styles, "harmony fallback");
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::HarmonyFallback,
            STAGE,
            message,
        ));
        generic
    };

    let mut chords: Vec<ChordEvent> = Vec::new();
    let mut first_chorus: Option<(usize, Vec<u32>, KeyContext)> = None;

    for (index, section) in sections.iter().enumerate() {
        let key = if profile.relative_key_bridge && section.kind == SectionKind::Bridge {
            home.relative()
        } else {
            home
        };
        let slots = chord_slots(section, params);
        let durations: Vec<u32> = slots.iter().map(|&(_, d)| d).collect();

        if section.kind == SectionKind::Chorus {
            if let Some((source, layout, source_key)) = &first_chorus {
                if *layout == durations && *source_key == key {
                    let restated = restate(&chords, *source, sections, index, section);
                    chords.extend(restated);
                    continue;
                }
            } else {
                first_chorus = Some((index, durations.clone(), key));
            }
        }

        let mut rng = rng_for(seed, STAGE, index as u32);
        let tokens = walk(&profile, section, slots.len(), params.cadence, &mut rng);
        let before = chords.len();
        for (i, (&(start, duration), token)) in slots.iter().zip(&tokens).enumerate() {
            let cadence_slot = section.kind.requires_cadence() && i + 2 >= tokens.len();
            let chord = build_chord(ChordRequest {
                token,
                key,
                complexity: params.complexity,
                interchange: profile.modal_interchange,
                cadence_slot,
                start,
                duration,
                section: index,
                tension: section.tension,
            }, &mut rng);
            chords.push(chord);
        }
        debug!(
            section = %section.label(),
            chords = chords.len() - before,
            key = %key,
            "harmonized section"
        );
    }

    StageOutcome::from_parts(chords, diagnostics)
}

/// Chord start beats and lengths for a section. The last chord absorbs any
/// partial bar.
pub fn chord_slots(section: &Section, params: &MusicParameters) -> Vec<(u32, u32)> {
    let bar = params.time_signature.beats_per_bar().max(1);
    let half = section.tension >= HALF_BAR_TENSION
        && params.complexity >= Complexity::Rich
        && bar % 2 == 0;
    let step = if half { bar / 2 } else { bar };
    let count = (section.length_beats / step).max(1);
    (0..count)
        .map(|i| {
            let start = section.start_beat + i * step;
            let length = if i + 1 == count {
                section.end_beat() - start
            } else {
                step
            };
            (start, length)
        })
        .collect()
}

/// Style labels that contributed no transition rows to the blended profile.
fn unsourced_styles(params: &MusicParameters) -> impl Iterator<Item = &str> {
    params
        .styles
        .iter()
        .map(String::as_str)
        .filter(|style| !params.harmony.sources.iter().any(|s| s == style))
}

fn profile_is_usable(profile: &HarmonyProfile, home: KeyContext) -> bool {
    if profile.is_empty() || profile.validate().is_err() {
        return false;
    }
    if realize_degree(&profile.start_degree, home).is_none() {
        return false;
    }
    profile
        .row(&profile.start_degree)
        .is_some_and(|row| row.to.iter().any(|t| t.calm > 0.0 || t.tense > 0.0))
}

fn generic_profile(home: KeyContext) -> HarmonyProfile {
    let cycle = generic_progression(home.mode);
    let transitions = (0..cycle.len())
        .map(|i| TransitionRow {
            from: cycle[i].to_string(),
            to: vec![WeightedDegree::new(cycle[(i + 1) % cycle.len()], 1.0, 1.0)],
        })
        .collect();
    HarmonyProfile {
        start_degree: cycle[0].to_string(),
        transitions,
        modal_interchange: false,
        relative_key_bridge: false,
        sources: vec!["generic".to_string()],
    }
}

/// Degree tokens for one section, cadence applied.
fn walk(
    profile: &HarmonyProfile,
    section: &Section,
    count: usize,
    cadence: CadencePolicy,
    rng: &mut Pcg32,
) -> Vec<String> {
    let mut tokens = Vec::with_capacity(count);
    let mut current = profile.start_degree.clone();
    tokens.push(current.clone());
    while tokens.len() < count {
        current = next_degree(profile, &current, section.tension, rng)
            .unwrap_or_else(|| profile.start_degree.clone());
        tokens.push(current.clone());
    }

    if section.kind.requires_cadence() {
        let last = match cadence {
            CadencePolicy::Authentic => "1",
            CadencePolicy::Deceptive => "6",
        };
        if let Some(slot) = tokens.last_mut() {
            *slot = last.to_string();
        }
        if count >= 2 {
            tokens[count - 2] = "5".to_string();
        }
    }
    tokens
}

fn next_degree(
    profile: &HarmonyProfile,
    current: &str,
    tension: f64,
    rng: &mut Pcg32,
) -> Option<String> {
    let pick = |row: &TransitionRow, rng: &mut Pcg32| {
        let weights: Vec<f64> = row.to.iter().map(|t| t.weight_at(tension)).collect();
        weighted_index(rng, &weights).map(|i| row.to[i].degree.clone())
    };
    if let Some(row) = profile.row(current) {
        if let Some(next) = pick(row, rng) {
            return Some(next);
        }
    }
    profile.row(&profile.start_degree).and_then(|row| pick(row, rng))
}

struct ChordRequest<'a> {
    token: &'a str,
    key: KeyContext,
    complexity: Complexity,
    interchange: bool,
    cadence_slot: bool,
    start: u32,
    duration: u32,
    section: usize,
    tension: f64,
}

fn build_chord(req: ChordRequest<'_>, rng: &mut Pcg32) -> ChordEvent {
    let mut spec =
        realize_degree(req.token, req.key).unwrap_or_else(|| chord::tonic(req.key));
    let plain_index = req
        .token
        .parse::<usize>()
        .ok()
        .filter(|d| (1..=7).contains(d))
        .map(|d| d - 1);
    let probability = if req.interchange {
        req.complexity.interchange_probability()
    } else {
        0.0
    };

    if req.cadence_slot {
        if spec.degree == "5" && req.key.mode.is_minor() {
            spec = spec.as_major_dominant();
        }
    } else if let Some(idx) = plain_index.filter(|&i| i != 0) {
        if probability > 0.0 && rng.gen_bool(probability) {
            if let Some(borrowed) = interchange(idx, req.key) {
                spec = borrowed;
            }
        }
    }

    let extensions = pick_extensions(&spec, req.complexity, rng);
    let (intervals, quality) = spec.with_extensions(&extensions);
    ChordEvent {
        degree: spec.degree.clone(),
        root: spec.root,
        quality,
        extensions,
        borrowed: spec.borrowed,
        key: req.key,
        intervals,
        start_beat: req.start,
        duration_beats: req.duration,
        section: req.section,
        tension: req.tension,
    }
}

fn pick_extensions(spec: &ChordSpec, complexity: Complexity, rng: &mut Pcg32) -> Vec<Extension> {
    match complexity {
        Complexity::Simple => Vec::new(),
        Complexity::Moderate => {
            if matches!(spec.degree.as_str(), "5" | "7") {
                vec![Extension::Seventh]
            } else {
                Vec::new()
            }
        }
        Complexity::Rich => {
            if rng.gen_bool(0.5) {
                vec![Extension::Seventh]
            } else {
                Vec::new()
            }
        }
        Complexity::Adventurous => {
            if rng.gen_bool(0.4) {
                vec![Extension::Seventh, Extension::Ninth]
            } else {
                vec![Extension::Seventh]
            }
        }
    }
}

/// Copy the chords of section `source` into `section`.
fn restate(
    chords: &[ChordEvent],
    source: usize,
    sections: &[Section],
    index: usize,
    section: &Section,
) -> Vec<ChordEvent> {
    let offset = sections[source].start_beat;
    chords
        .iter()
        .filter(|c| c.section == source)
        .map(|c| ChordEvent {
            start_beat: section.start_beat + (c.start_beat - offset),
            section: index,
            tension: section.tension,
            ..c.clone()
        })
        .collect()
}

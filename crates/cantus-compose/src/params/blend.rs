//! Weighted blending of style templates.
//!
//! Template `i` (in detection order) weighs `1 / (i + 1)`, normalized.
//! Numeric attributes are averaged, collections are unioned in first-seen
//! order, and single-valued attributes come from the first template.

use cantus_spec::{Complexity, HarmonyProfile, StyleTemplate, TransitionRow, WeightedDegree};

/// Normalized blend weights for `n` templates.
pub fn blend_weights(n: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..n).map(|i| 1.0 / (i as f64 + 1.0)).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Round to the nearest integer; an exact .5 midpoint rounds toward `first`.
pub fn round_toward_first(value: f64, first: f64) -> f64 {
    let floor = value.floor();
    if ((value - floor) - 0.5).abs() < 1e-9 {
        if first > value {
            floor + 1.0
        } else {
            floor
        }
    } else {
        value.round()
    }
}

/// Blend templates into one. Returns `None` for an empty slice.
pub fn blend(templates: &[StyleTemplate]) -> Option<StyleTemplate> {
    let first = templates.first()?;
    if templates.len() == 1 {
        return Some(first.clone());
    }
    let weights = blend_weights(templates.len());

    let tempo: f64 = templates
        .iter()
        .zip(&weights)
        .map(|(t, w)| f64::from(t.tempo) * w)
        .sum();
    let level: f64 = templates
        .iter()
        .zip(&weights)
        .map(|(t, w)| f64::from(t.complexity.level()) * w)
        .sum();

    let mut instruments = Vec::new();
    let mut accompaniment = Vec::new();
    for template in templates {
        for id in &template.instruments {
            if !instruments.contains(id) {
                instruments.push(*id);
            }
        }
        for pattern in &template.accompaniment {
            if !accompaniment.contains(pattern) {
                accompaniment.push(*pattern);
            }
        }
    }

    let names: Vec<String> = templates.iter().map(|t| t.name.clone()).collect();
    Some(StyleTemplate {
        name: names.join("+"),
        tempo: round_toward_first(tempo, f64::from(first.tempo)) as u16,
        complexity: Complexity::from_level(
            round_toward_first(level, f64::from(first.complexity.level())) as u8,
        ),
        mode: first.mode,
        key: first.key,
        time_signature: first.time_signature,
        instruments,
        bass_pattern: first.bass_pattern,
        accompaniment,
        groove: first.groove,
        percussion: templates.iter().any(|t| t.percussion),
        form: first.form,
        harmony: blend_harmony(templates, &weights),
    })
}

fn blend_harmony(templates: &[StyleTemplate], weights: &[f64]) -> HarmonyProfile {
    let mut rows: Vec<TransitionRow> = Vec::new();
    for (template, &w) in templates.iter().zip(weights) {
        for source_row in &template.harmony.transitions {
            let idx = match rows.iter().position(|r| r.from == source_row.from) {
                Some(idx) => idx,
                None => {
                    rows.push(TransitionRow {
                        from: source_row.from.clone(),
                        to: Vec::new(),
                    });
                    rows.len() - 1
                }
            };
            let row = &mut rows[idx];
            for target in &source_row.to {
                match row.to.iter_mut().find(|t| t.degree == target.degree) {
                    Some(existing) => {
                        existing.calm += target.calm * w;
                        existing.tense += target.tense * w;
                    }
                    None => row.to.push(WeightedDegree::new(
                        target.degree.clone(),
                        target.calm * w,
                        target.tense * w,
                    )),
                }
            }
        }
    }

    let mut sources = Vec::new();
    for template in templates {
        if !template.harmony.transitions.is_empty() && !sources.contains(&template.name) {
            sources.push(template.name.clone());
        }
        for source in &template.harmony.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
    }

    let first = &templates[0].harmony;
    HarmonyProfile {
        start_degree: first.start_degree.clone(),
        transitions: rows,
        modal_interchange: templates.iter().any(|t| t.harmony.modal_interchange),
        relative_key_bridge: first.relative_key_bridge,
        sources,
    }
}

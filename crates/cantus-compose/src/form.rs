//! Form planner: partitions the total duration into sections.
//!
//! Section boundaries are placed on whole bars where the piece is long
//! enough, otherwise on whole beats. The final section absorbs whatever is
//! left, so the lengths always sum to the total beat count.

use tracing::debug;

use cantus_spec::{MusicParameters, MusicalForm, Section, SectionKind};

use SectionKind::{Bridge, Chorus, Intro, Outro, Verse};

/// Durations (seconds) below which `auto` picks a shorter form.
pub const MINIATURE_MAX_SECONDS: f64 = 45.0;
pub const COMPACT_MAX_SECONDS: f64 = 120.0;

/// Section sequence for a concrete form.
pub fn form_template(form: MusicalForm) -> &'static [SectionKind] {
    match form {
        MusicalForm::Miniature => &[Intro, Verse, Outro],
        MusicalForm::Compact => &[Intro, Verse, Chorus, Bridge, Outro],
        MusicalForm::Aaba => &[Intro, Verse, Verse, Bridge, Verse, Outro],
        MusicalForm::Song | MusicalForm::Auto => {
            &[Intro, Verse, Chorus, Verse, Chorus, Bridge, Chorus, Outro]
        }
    }
}

/// Resolve `auto` by duration.
pub fn resolve_form(form: MusicalForm, duration_seconds: f64) -> MusicalForm {
    match form {
        MusicalForm::Auto if duration_seconds < MINIATURE_MAX_SECONDS => MusicalForm::Miniature,
        MusicalForm::Auto if duration_seconds < COMPACT_MAX_SECONDS => MusicalForm::Compact,
        MusicalForm::Auto => MusicalForm::Song,
        other => other,
    }
}

/// Plan the sections for `params`.
pub fn plan_form(params: &MusicParameters) -> Vec<Section> {
    let total = params.total_beats();
    let form = resolve_form(params.form, params.duration_seconds);
    let mut kinds: &[SectionKind] = form_template(form);
    if (total as usize) < kinds.len() {
        kinds = form_template(MusicalForm::Miniature);
    }
    if (total as usize) < kinds.len() {
        kinds = &[Verse];
    }

    let lengths = scale_lengths(kinds, total, params.time_signature.beats_per_bar());
    let amplitude = 0.7 + 0.1 * f64::from(params.complexity.level());

    let mut sections = Vec::with_capacity(kinds.len());
    let mut start = 0;
    for (&kind, length) in kinds.iter().zip(lengths) {
        let occurrence = kinds[..sections.len()]
            .iter()
            .filter(|&&k| k == kind)
            .count() as u32;
        sections.push(Section {
            kind,
            occurrence,
            start_beat: start,
            length_beats: length,
            tension: tension_for(kind, occurrence, amplitude),
        });
        start += length;
    }

    debug!(
        form = form.as_str(),
        sections = sections.len(),
        total_beats = total,
        "planned form"
    );
    sections
}

/// Split `total` beats by section weight.
fn scale_lengths(kinds: &[SectionKind], total: u32, beats_per_bar: u32) -> Vec<u32> {
    let n = kinds.len() as u32;
    if n <= 1 {
        return vec![total];
    }
    let unit = if beats_per_bar > 0 && total / beats_per_bar >= n {
        beats_per_bar
    } else {
        1
    };
    let weight_sum: f64 = kinds.iter().map(|k| k.weight()).sum();

    let mut lengths = Vec::with_capacity(kinds.len());
    let mut prev = 0u32;
    let mut cumulative = 0.0;
    for (k, kind) in kinds[..kinds.len() - 1].iter().enumerate() {
        cumulative += f64::from(total) * kind.weight() / weight_sum;
        let remaining = n - 1 - k as u32;
        let rounded = (cumulative / f64::from(unit)).round() as u32 * unit;
        let max_boundary = (total / unit - remaining) * unit;
        let boundary = rounded.clamp(prev + unit, max_boundary);
        lengths.push(boundary - prev);
        prev = boundary;
    }
    lengths.push(total - prev);
    lengths
}

/// Tension target: rising through verses into chorus peaks, dipping at the
/// bridge and decaying at the outro. Lower complexity compresses the curve
/// toward 0.5.
pub fn tension_for(kind: SectionKind, occurrence: u32, amplitude: f64) -> f64 {
    let occ = f64::from(occurrence);
    let base = match kind {
        Intro => 0.2,
        Verse => (0.4 + 0.1 * occ).min(0.65),
        Chorus => (0.75 + 0.08 * occ).min(0.95),
        Bridge => 0.55,
        Outro => 0.15,
    };
    (0.5 + (base - 0.5) * amplitude).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::params_for;
    use cantus_spec::form::sections_are_contiguous;
    use cantus_spec::Complexity;
    use pretty_assertions::assert_eq;

    fn params(form: MusicalForm, tempo: u16, seconds: f64) -> MusicParameters {
        params_for("pop", form, tempo, seconds)
    }

    #[test]
    fn sixty_seconds_compact_has_five_sections() {
        let p = params(MusicalForm::Compact, 120, 60.0);
        let sections = plan_form(&p);
        assert_eq!(sections.len(), 5);
        assert!(sections_are_contiguous(&sections, p.total_beats()));
        let seconds: f64 = sections.iter().map(|s| s.seconds(p.tempo)).sum();
        assert!((seconds - 60.0).abs() <= 60.0 / f64::from(p.tempo));
    }

    #[test]
    fn auto_form_follows_duration() {
        assert_eq!(resolve_form(MusicalForm::Auto, 30.0), MusicalForm::Miniature);
        assert_eq!(resolve_form(MusicalForm::Auto, 60.0), MusicalForm::Compact);
        assert_eq!(resolve_form(MusicalForm::Auto, 180.0), MusicalForm::Song);
        assert_eq!(resolve_form(MusicalForm::Aaba, 30.0), MusicalForm::Aaba);
    }

    #[test]
    fn boundaries_fall_on_bars_with_leftover_in_final_section() {
        // 181 beats: not a whole number of bars
        let p = params(MusicalForm::Song, 110, 98.73);
        let total = p.total_beats();
        let sections = plan_form(&p);
        assert!(sections_are_contiguous(&sections, total));
        for section in &sections[..sections.len() - 1] {
            assert_eq!(section.length_beats % 4, 0, "{}", section.label());
        }
    }

    #[test]
    fn tiny_pieces_still_partition() {
        let p = params(MusicalForm::Song, 40, 6.0);
        let sections = plan_form(&p);
        assert_eq!(p.total_beats(), 4);
        assert_eq!(sections.len(), 3);
        assert!(sections_are_contiguous(&sections, 4));
    }

    #[test]
    fn tension_curve_shape() {
        let p = params(MusicalForm::Song, 120, 180.0);
        let s = plan_form(&p);
        let t: Vec<f64> = s.iter().map(|s| s.tension).collect();
        // intro < verse < chorus, bridge dips below chorus, outro lowest
        assert!(t[0] < t[1] && t[1] < t[2]);
        assert!(t[3] > t[1], "second verse rises");
        assert!(t[4] > t[2], "later chorus peaks higher");
        assert!(t[5] < t[4]);
        assert!(t[7] < t[6] && t[7] < t[0] + 1e-9);
    }

    #[test]
    fn tension_is_deterministic_and_scaled_by_complexity() {
        let mut p = params(MusicalForm::Song, 120, 180.0);
        assert_eq!(plan_form(&p), plan_form(&p));
        let moderate_peak = plan_form(&p)[6].tension;
        p.complexity = Complexity::Adventurous;
        assert!(plan_form(&p)[6].tension > moderate_peak);
    }

    #[test]
    fn occurrences_count_per_kind() {
        let p = params(MusicalForm::Song, 120, 180.0);
        let labels: Vec<String> = plan_form(&p).iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec![
                "intro 1", "verse 1", "chorus 1", "verse 2", "chorus 2", "bridge 1", "chorus 3",
                "outro 1"
            ]
        );
    }
}

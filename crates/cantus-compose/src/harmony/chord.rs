//! Degree-token realization and chord construction.
//!
//! A plain digit is a diatonic degree of the local key. An accidental token
//! ("b7", "#4") is measured against the major scale on the tonic, so "b7" is
//! always a whole step below the tonic. When that root is not diatonic the
//! chord is borrowed: stacked in the parallel mode when the root lives
//! there, otherwise a major triad for flats and a diminished one for sharps.

use cantus_spec::pitch::parse_degree_token;
use cantus_spec::{ChordQuality, Extension, KeyContext, Mode};

const MAJOR: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Intervals of the triad on a scale degree of `key`.
pub fn stack_thirds(key: KeyContext, degree_index: usize) -> Vec<u8> {
    let root = key.degree_pc(degree_index);
    [0, 2, 4]
        .iter()
        .map(|step| (key.degree_pc(degree_index + step) + 12 - root) % 12)
        .collect()
}

/// A triad realized from a degree token, before extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordSpec {
    pub degree: String,
    pub root: u8,
    pub triad: Vec<u8>,
    pub borrowed: bool,
    /// Scale the triad was stacked in, for diatonic sevenths.
    scale: Option<(KeyContext, usize)>,
}

impl ChordSpec {
    /// Interval of the seventh to add above the root.
    pub fn seventh_interval(&self) -> u8 {
        match self.scale {
            Some((key, idx)) => (key.degree_pc(idx + 6) + 12 - self.root) % 12,
            None if self.triad == [0, 3, 6] => 9,
            None => 10,
        }
    }

    /// Build the final interval list and quality.
    pub fn with_extensions(&self, extensions: &[Extension]) -> (Vec<u8>, ChordQuality) {
        let mut intervals = self.triad.clone();
        let mut quality = ChordQuality::Triad;
        if extensions.contains(&Extension::Seventh) {
            intervals.push(self.seventh_interval());
            quality = ChordQuality::Seventh;
        }
        if extensions.contains(&Extension::Ninth) {
            intervals.push(14);
            quality = ChordQuality::Ninth;
        }
        (intervals, quality)
    }

    /// Replace with a major triad borrowed from the parallel major.
    pub fn as_major_dominant(&self) -> ChordSpec {
        ChordSpec {
            degree: self.degree.clone(),
            root: self.root,
            triad: vec![0, 4, 7],
            borrowed: self.triad != [0, 4, 7],
            scale: None,
        }
    }
}

/// Realize a degree token in `key`. Returns `None` for unparsable tokens.
pub fn realize_degree(token: &str, key: KeyContext) -> Option<ChordSpec> {
    let (degree, accidental) = parse_degree_token(token)?;
    let idx = usize::from(degree - 1);
    if accidental == 0 {
        return Some(diatonic(token, key, idx));
    }

    let root = ((i32::from(key.tonic) + i32::from(MAJOR[idx]) + i32::from(accidental))
        .rem_euclid(12)) as u8;
    if let Some(local) = key.degree_of(root) {
        let mut spec = diatonic(token, key, local);
        spec.degree = token.to_string();
        return Some(spec);
    }
    let parallel = key.parallel();
    if let Some(borrowed_idx) = parallel.degree_of(root) {
        return Some(ChordSpec {
            degree: token.to_string(),
            root,
            triad: stack_thirds(parallel, borrowed_idx),
            borrowed: true,
            scale: Some((parallel, borrowed_idx)),
        });
    }
    Some(ChordSpec {
        degree: token.to_string(),
        root,
        triad: if accidental < 0 {
            vec![0, 4, 7]
        } else {
            vec![0, 3, 6]
        },
        borrowed: true,
        scale: None,
    })
}

/// The parallel mode's chord on the same degree, as a borrowed chord.
///
/// Returns `None` when the parallel chord is identical to the diatonic one.
pub fn interchange(degree_index: usize, key: KeyContext) -> Option<ChordSpec> {
    let parallel = key.parallel();
    let root = parallel.degree_pc(degree_index);
    let triad = stack_thirds(parallel, degree_index);
    if root == key.degree_pc(degree_index) && triad == stack_thirds(key, degree_index) {
        return None;
    }
    let major_root = (key.tonic + MAJOR[degree_index % 7]) % 12;
    let token = match (root + 12 - major_root) % 12 {
        0 => format!("{}", degree_index + 1),
        1 => format!("#{}", degree_index + 1),
        _ => format!("b{}", degree_index + 1),
    };
    Some(ChordSpec {
        degree: token,
        root,
        triad,
        borrowed: true,
        scale: Some((parallel, degree_index)),
    })
}

/// The tonic triad of `key`.
pub fn tonic(key: KeyContext) -> ChordSpec {
    diatonic("1", key, 0)
}

fn diatonic(token: &str, key: KeyContext, idx: usize) -> ChordSpec {
    ChordSpec {
        degree: token.to_string(),
        root: key.degree_pc(idx),
        triad: stack_thirds(key, idx),
        borrowed: false,
        scale: Some((key, idx)),
    }
}

/// Home-key degree tokens of the generic fallback progression.
pub fn generic_progression(mode: Mode) -> [&'static str; 4] {
    if mode.is_minor() {
        ["1", "6", "3", "7"]
    } else {
        ["1", "5", "6", "4"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c(mode: Mode) -> KeyContext {
        KeyContext::new(0, mode)
    }

    #[test]
    fn diatonic_triads_in_major() {
        let key = c(Mode::Major);
        assert_eq!(stack_thirds(key, 0), vec![0, 4, 7]);
        assert_eq!(stack_thirds(key, 1), vec![0, 3, 7]);
        assert_eq!(stack_thirds(key, 6), vec![0, 3, 6]);
        let five = realize_degree("5", key).unwrap();
        assert_eq!(five.root, 7);
        assert_eq!(five.seventh_interval(), 10);
        assert!(!five.borrowed);
    }

    #[test]
    fn five_in_minor_is_minor_until_cadential() {
        let key = KeyContext::new(9, Mode::Minor);
        let five = realize_degree("5", key).unwrap();
        assert_eq!(five.root, 4);
        assert_eq!(five.triad, vec![0, 3, 7]);
        let dominant = five.as_major_dominant();
        assert_eq!(dominant.triad, vec![0, 4, 7]);
        assert!(dominant.borrowed);
    }

    #[test]
    fn flat_seven_borrowed_in_major_diatonic_in_mixolydian() {
        let borrowed = realize_degree("b7", c(Mode::Major)).unwrap();
        assert_eq!(borrowed.root, 10);
        assert_eq!(borrowed.triad, vec![0, 4, 7]);
        assert!(borrowed.borrowed);

        let native = realize_degree("b7", c(Mode::Mixolydian)).unwrap();
        assert_eq!(native.root, 10);
        assert!(!native.borrowed);
    }

    #[test]
    fn chromatic_roots_outside_both_modes() {
        let neapolitan = realize_degree("b2", c(Mode::Major)).unwrap();
        assert_eq!(neapolitan.root, 1);
        assert_eq!(neapolitan.triad, vec![0, 4, 7]);

        let sharp_four = realize_degree("#4", c(Mode::Major)).unwrap();
        assert_eq!(sharp_four.root, 6);
        assert_eq!(sharp_four.triad, vec![0, 3, 6]);
        assert_eq!(sharp_four.seventh_interval(), 9);
    }

    #[test]
    fn interchange_names_tokens_against_major() {
        let flat_six = interchange(5, c(Mode::Major)).unwrap();
        assert_eq!(flat_six.degree, "b6");
        assert_eq!(flat_six.root, 8);
        let minor_four = interchange(3, c(Mode::Major)).unwrap();
        assert_eq!(minor_four.degree, "4");
        assert_eq!(minor_four.triad, vec![0, 3, 7]);
        assert!(interchange(2, c(Mode::Mixolydian)).is_some());
        // v is minor in both mixolydian and aeolian
        assert!(interchange(4, c(Mode::Mixolydian)).is_none());
        // C major's ii and parallel minor's ii differ in quality only
        assert_eq!(interchange(1, c(Mode::Major)).unwrap().degree, "2");
    }

    #[test]
    fn extensions_extend_intervals() {
        let one = realize_degree("1", c(Mode::Major)).unwrap();
        let (intervals, quality) = one.with_extensions(&[Extension::Seventh, Extension::Ninth]);
        assert_eq!(intervals, vec![0, 4, 7, 11, 14]);
        assert_eq!(quality, ChordQuality::Ninth);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(realize_degree("x9", c(Mode::Major)).is_none());
        assert!(realize_degree("8", c(Mode::Major)).is_none());
    }
}

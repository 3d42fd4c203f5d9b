//! Determinism testing framework for Cantus.
//!
//! Given the same text, overrides, seed and configuration, the pipeline must
//! produce the same composition. This module runs a generator several times
//! and compares the canonical JSON of each output byte by byte.
//!
//! # Example
//!
//! ```rust,ignore
//! use cantus_tests::determinism::verify_composition_determinism;
//!
//! let result = verify_composition_determinism(&pipeline, &request, 3);
//! result.assert_deterministic();
//! ```

use std::fmt;

use cantus_compose::{CancellationToken, CompositionRequest, Pipeline};
use cantus_spec::hash::canonicalize_json;
use cantus_spec::Composition;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the reference output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the reference output.
    pub hash: String,
    /// First difference found, if any.
    pub diff_info: Option<DiffInfo>,
}

/// The first point where a run diverged from the reference.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    /// Byte offset of the difference.
    pub offset: usize,
    /// Which run (0-indexed) diverged.
    pub run_index: usize,
    /// Reference text around the offset.
    pub expected: String,
    /// Diverging text around the offset.
    pub actual: String,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difference at byte {} (run {}):\n  expected: ...{}...\n  actual:   ...{}...",
            self.offset, self.run_index, self.expected, self.actual
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Run `generate_fn` `runs` times and verify all outputs are identical.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference_bytes = reference.as_ref();
    let hash = compute_hash(reference_bytes);

    for run_index in 1..runs {
        let output = generate_fn();
        if let Some(diff) = find_first_difference(reference_bytes, output.as_ref(), run_index) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference_bytes.len(),
                hash,
                diff_info: Some(diff),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference_bytes.len(),
        hash,
        diff_info: None,
    }
}

/// Compose `request` `runs` times with fresh tokens and compare the
/// canonical JSON of each composition.
pub fn verify_composition_determinism(
    pipeline: &Pipeline,
    request: &CompositionRequest,
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        || match pipeline.compose(request, &CancellationToken::new()) {
            Ok(result) => composition_bytes(&result.composition),
            Err(err) => format!("error: {}", err).into_bytes(),
        },
        runs,
    )
}

/// Canonical JSON bytes of a composition.
pub fn composition_bytes(composition: &Composition) -> Vec<u8> {
    serde_json::to_value(composition)
        .map(|value| canonicalize_json(&value).into_bytes())
        .unwrap_or_default()
}

/// BLAKE3 hex digest.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

fn find_first_difference(expected: &[u8], actual: &[u8], run_index: usize) -> Option<DiffInfo> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;
    Some(DiffInfo {
        offset,
        run_index,
        expected: excerpt(expected, offset),
        actual: excerpt(actual, offset),
    })
}

fn excerpt(data: &[u8], offset: usize) -> String {
    let start = offset.saturating_sub(24);
    let end = (offset + 24).min(data.len());
    String::from_utf8_lossy(&data[start.min(end)..end]).into_owned()
}

/// Generates a `#[test]` that composes a prompt several times and asserts
/// identical output.
///
/// ```rust,ignore
/// test_determinism!(jazz_waltz, "a jazz waltz", seed = 7);
/// ```
#[macro_export]
macro_rules! test_determinism {
    ($name:ident, $text:expr, seed = $seed:expr) => {
        #[test]
        fn $name() {
            let pipeline = ::cantus_compose::Pipeline::default();
            let request = ::cantus_compose::CompositionRequest::new($text, $seed);
            $crate::determinism::verify_composition_determinism(&pipeline, &request, 3)
                .assert_deterministic();
        }
    };
}

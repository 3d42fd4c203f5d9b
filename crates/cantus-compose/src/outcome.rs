//! Tagged stage results.

use cantus_spec::{Diagnostics, PipelineError};

/// Result of one pipeline stage.
///
/// Recoverable conditions travel with the value instead of aborting the run;
/// only [`StageOutcome::Fatal`] stops the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    /// The stage ran without incident.
    Success(T),
    /// The stage produced a value after recovering from one or more conditions.
    Recovered { value: T, diagnostics: Diagnostics },
    /// The stage could not produce a value.
    Fatal(PipelineError),
}

impl<T> StageOutcome<T> {
    /// `Success` when `diagnostics` is empty, `Recovered` otherwise.
    pub fn from_parts(value: T, diagnostics: Diagnostics) -> Self {
        if diagnostics.is_empty() {
            StageOutcome::Success(value)
        } else {
            StageOutcome::Recovered { value, diagnostics }
        }
    }

    /// Splits into the value and its diagnostics, or the fatal error.
    pub fn into_result(self) -> Result<(T, Diagnostics), PipelineError> {
        match self {
            StageOutcome::Success(value) => Ok((value, Diagnostics::new())),
            StageOutcome::Recovered { value, diagnostics } => Ok((value, diagnostics)),
            StageOutcome::Fatal(err) => Err(err),
        }
    }

    /// The value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            StageOutcome::Success(value) | StageOutcome::Recovered { value, .. } => Some(value),
            StageOutcome::Fatal(_) => None,
        }
    }

    /// Diagnostics raised by the stage (empty unless recovered).
    pub fn diagnostics(&self) -> Diagnostics {
        match self {
            StageOutcome::Recovered { diagnostics, .. } => diagnostics.clone(),
            _ => Diagnostics::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Success(_))
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, StageOutcome::Recovered { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StageOutcome::Fatal(_))
    }

    /// Maps the value, keeping diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutcome<U> {
        match self {
            StageOutcome::Success(value) => StageOutcome::Success(f(value)),
            StageOutcome::Recovered { value, diagnostics } => StageOutcome::Recovered {
                value: f(value),
                diagnostics,
            },
            StageOutcome::Fatal(err) => StageOutcome::Fatal(err),
        }
    }
}

impl<T> From<PipelineError> for StageOutcome<T> {
    fn from(err: PipelineError) -> Self {
        StageOutcome::Fatal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantus_spec::{Diagnostic, DiagnosticCode};

    #[test]
    fn empty_diagnostics_is_success() {
        let outcome = StageOutcome::from_parts(3, Diagnostics::new());
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), Some(&3));
    }

    #[test]
    fn recovered_keeps_diagnostics_through_map() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::HarmonyFallback,
            "harmony",
            "generic progression",
        ));
        let outcome = StageOutcome::from_parts(2, diagnostics).map(|v| v * 10);
        assert!(outcome.is_recovered());
        let (value, diagnostics) = outcome.into_result().unwrap();
        assert_eq!(value, 20);
        assert!(diagnostics.has(DiagnosticCode::HarmonyFallback));
    }

    #[test]
    fn fatal_has_no_value() {
        let outcome: StageOutcome<u8> = PipelineError::Assembly("overlap".into()).into();
        assert!(outcome.is_fatal());
        assert!(outcome.value().is_none());
        assert!(outcome.into_result().is_err());
    }
}

//! Host configuration: budget profiles, style registries and the pipeline
//! built from them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

use cantus_compose::{GenerativeStyleProvider, Pipeline, SeededStyleBackend};
use cantus_spec::{PipelineBudget, StyleRegistry};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Budget profile name (default, preview, strict).
    pub profile: String,
    /// JSON budget file; takes precedence over `profile`.
    pub config: Option<String>,
    /// JSON style registry file; replaces the built-in registry.
    pub styles: Option<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            config: None,
            styles: None,
        }
    }
}

/// Resolve the budget from a JSON file or a named profile.
pub fn load_budget(profile: &str, config: Option<&Path>) -> Result<PipelineBudget> {
    let budget = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read budget file {}", path.display()))?;
            PipelineBudget::from_json(&json)
                .with_context(|| format!("Failed to parse budget file {}", path.display()))?
        }
        None => match PipelineBudget::by_name(profile) {
            Some(budget) => budget,
            None => bail!(
                "unknown profile '{}' (expected one of: {})",
                profile,
                PipelineBudget::profile_names().join(", ")
            ),
        },
    };
    if let Err(message) = budget.validate() {
        bail!("budget '{}' is inconsistent: {}", budget.name, message);
    }
    Ok(budget)
}

/// Load a style registry from JSON, or the built-in one.
pub fn load_registry(path: Option<&Path>) -> Result<StyleRegistry> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read style registry {}", path.display()))?;
            let registry = StyleRegistry::from_json(&json)
                .with_context(|| format!("Invalid style registry {}", path.display()))?;
            debug!(styles = registry.len(), path = %path.display(), "loaded style registry");
            Ok(registry)
        }
        None => Ok(StyleRegistry::builtin()),
    }
}

/// Build the pipeline the options describe.
pub fn build_pipeline(options: &HostOptions, generative_styles: bool) -> Result<Pipeline> {
    let budget = load_budget(&options.profile, options.config.as_deref().map(Path::new))?;
    let registry = Arc::new(load_registry(options.styles.as_deref().map(Path::new))?);
    let mut pipeline = Pipeline::new(registry.clone()).with_budget(budget);
    if generative_styles {
        let provider = GenerativeStyleProvider::new(SeededStyleBackend).with_registry(registry);
        pipeline = pipeline.with_provider(Arc::new(provider));
    }
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn named_profiles_resolve() {
        assert_eq!(load_budget("strict", None).unwrap(), PipelineBudget::strict());
        let err = load_budget("turbo", None).unwrap_err();
        assert!(err.to_string().contains("unknown profile 'turbo'"));
    }

    #[test]
    fn budget_file_overrides_profile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("budget.json");
        fs::write(&path, r#"{"name": "custom", "jobs": {"max_workers": 3}}"#).unwrap();
        let budget = load_budget("strict", Some(&path)).unwrap();
        assert_eq!(budget.name, "custom");
        assert_eq!(budget.jobs.max_workers, 3);
    }

    #[test]
    fn missing_registry_file_is_reported_with_its_path() {
        let err = load_registry(Some(Path::new("/nonexistent/styles.json"))).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/styles.json"));
    }

    #[test]
    fn builtin_registry_round_trips_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("styles.json");
        let builtin = StyleRegistry::builtin();
        fs::write(&path, builtin.to_json_pretty().unwrap()).unwrap();
        let loaded = load_registry(Some(&path)).unwrap();
        assert_eq!(loaded.len(), builtin.len());
    }
}

//! Compose command implementation
//!
//! Runs the full pipeline and writes the composition JSON.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::fs;
use std::process::ExitCode;

use cantus_compose::{CancellationToken, CompositionRequest, CompositionResult};
use cantus_spec::pitch::parse_pitch_class;
use cantus_spec::{CodedError, InstrumentId, Mode, MusicalForm, ParameterOverrides};

use crate::config::{build_pipeline, HostOptions};

/// Explicit parameter choices from the command line.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    pub seed: u64,
    pub tempo: Option<u16>,
    pub duration: Option<f64>,
    pub key: Option<String>,
    pub mode: Option<String>,
    pub styles: Vec<String>,
    pub instruments: Vec<String>,
    pub form: Option<String>,
    pub generative_styles: bool,
    pub output: Option<String>,
}

impl ComposeOptions {
    /// Turn the raw flags into pipeline overrides.
    pub fn overrides(&self) -> Result<ParameterOverrides> {
        let mut overrides = ParameterOverrides::new();
        if let Some(tempo) = self.tempo {
            overrides = overrides.tempo(tempo);
        }
        if let Some(seconds) = self.duration {
            overrides = overrides.duration_seconds(seconds);
        }
        if let Some(key) = &self.key {
            let tonic = parse_pitch_class(key).ok_or_else(|| anyhow!("invalid --key '{}'", key))?;
            overrides = overrides.key(tonic);
        }
        if let Some(mode) = &self.mode {
            let mode: Mode = mode.parse().map_err(|e: String| anyhow!(e))?;
            overrides = overrides.mode(mode);
        }
        for style in &self.styles {
            overrides = overrides.style(style.as_str());
        }
        for name in &self.instruments {
            let instrument: InstrumentId = name.parse().map_err(|e: String| anyhow!(e))?;
            overrides = overrides.instrument(instrument);
        }
        if let Some(form) = &self.form {
            let form: MusicalForm = form.parse().map_err(|e: String| anyhow!(e))?;
            overrides = overrides.form(form);
        }
        Ok(overrides)
    }
}

/// Run the compose command
///
/// # Returns
/// Exit code: 0 on success, 1 when the pipeline fails
pub fn run(host: &HostOptions, text: &str, options: &ComposeOptions) -> Result<ExitCode> {
    let pipeline = build_pipeline(host, options.generative_styles)?;
    let request = CompositionRequest::new(text, options.seed).with_overrides(options.overrides()?);

    let result = match pipeline.compose(&request, &CancellationToken::new()) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{} [{}] {}", "error:".red().bold(), err.code(), err);
            return Ok(ExitCode::from(1));
        }
    };

    let json = result
        .composition
        .to_json_pretty()
        .context("Failed to serialize composition")?;
    match &options.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
        }
        None => println!("{}", json),
    }

    print_summary(&result)?;
    Ok(ExitCode::SUCCESS)
}

fn print_summary(result: &CompositionResult) -> Result<()> {
    let composition = &result.composition;
    for diagnostic in result.diagnostics().iter() {
        eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
    let params = &composition.parameters;
    let hash = composition
        .canonical_hash()
        .context("Failed to hash composition")?;
    eprintln!(
        "{} {} in {}, {} bpm, {}s: {} tracks, {} notes ({})",
        "composed".green().bold(),
        params.styles.join("+"),
        params.key_context(),
        params.tempo,
        params.duration_seconds,
        composition.tracks.len(),
        composition.note_count(),
        hash[..12.min(hash.len())].dimmed()
    );
    Ok(())
}

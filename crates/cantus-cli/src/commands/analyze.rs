//! Analyze command implementation
//!
//! Runs the intent analyzer on a description and prints the intent as JSON.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use cantus_compose::IntentAnalyzer;

use crate::config::{load_budget, HostOptions};

/// Run the analyze command
///
/// # Returns
/// Exit code: 0 on success, 1 when the text is unusable
pub fn run(options: &HostOptions, text: &str, pretty: bool) -> Result<ExitCode> {
    let budget = load_budget(
        &options.profile,
        options.config.as_deref().map(std::path::Path::new),
    )?;
    let analyzer = IntentAnalyzer::with_budget(budget.analyzer);

    let intent = match analyzer.analyze(text) {
        Ok(intent) => intent,
        Err(err) => {
            eprintln!("{} [{}] {}", "error:".red().bold(), err.kind().code(), err);
            return Ok(ExitCode::from(1));
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&intent)
    } else {
        serde_json::to_string(&intent)
    }
    .context("Failed to serialize intent")?;
    println!("{}", json);

    if intent.is_empty() {
        eprintln!(
            "{} no musical vocabulary recognized; defaults will apply",
            "warning:".yellow().bold()
        );
    }
    Ok(ExitCode::SUCCESS)
}

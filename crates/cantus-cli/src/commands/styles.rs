//! Styles command implementation
//!
//! Lists the templates in the active style registry.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use cantus_spec::pitch::pitch_class_name;
use cantus_spec::StyleRegistry;

use crate::config::{load_registry, HostOptions};

/// Run the styles command
///
/// # Returns
/// Exit code: 0 on success
pub fn run(options: &HostOptions, json: bool) -> Result<ExitCode> {
    let registry = load_registry(options.styles.as_deref().map(Path::new))?;
    if json {
        let out = registry
            .to_json_pretty()
            .context("Failed to serialize style registry")?;
        println!("{}", out);
    } else {
        print!("{}", render_table(&registry));
    }
    Ok(ExitCode::SUCCESS)
}

/// One line per template, then the aliases.
pub fn render_table(registry: &StyleRegistry) -> String {
    let mut out = String::new();
    for template in registry.templates() {
        let marker = if template.name == registry.default_style() {
            "*"
        } else {
            " "
        };
        out.push_str(&format!(
            "{} {} {:>3} bpm  {:<2} {:<10} {:<9} {}\n",
            marker,
            format!("{:<12}", template.name).bold(),
            template.tempo,
            pitch_class_name(template.key),
            template.mode.as_str(),
            template.complexity.as_str(),
            template
                .instruments
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", ")
                .dimmed()
        ));
    }
    let aliases: Vec<String> = registry
        .aliases()
        .map(|(alias, target)| format!("{} -> {}", alias, target))
        .collect();
    if !aliases.is_empty() {
        out.push_str(&format!("aliases: {}\n", aliases.join(", ")));
    }
    out
}

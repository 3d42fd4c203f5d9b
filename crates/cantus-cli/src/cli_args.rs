//! CLI argument definitions for the `cantus` binary.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! so the binary stays a thin dispatcher and the parsing can be tested.

use clap::{Parser, Subcommand};

use crate::config::HostOptions;

/// Cantus - deterministic text-to-music composition
#[derive(Parser, Debug)]
#[command(name = "cantus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Budget profile (default, preview, strict)
    #[arg(long, global = true, default_value = "default")]
    pub profile: String,

    /// JSON budget file (overrides --profile)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// JSON style registry file (replaces the built-in styles)
    #[arg(long, global = true)]
    pub styles: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            profile: self.profile.clone(),
            config: self.config.clone(),
            styles: self.styles.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the musical intent from a description and print it as JSON
    Analyze {
        /// Free-form description
        text: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Compose a piece from a description
    Compose {
        /// Free-form description
        text: String,

        /// Seed for all random choices
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Tempo in BPM
        #[arg(long)]
        tempo: Option<u16>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Tonic (e.g., C, F#, Bb)
        #[arg(long)]
        key: Option<String>,

        /// Mode (major, minor, dorian, ...)
        #[arg(long)]
        mode: Option<String>,

        /// Style tag; repeat to blend styles
        #[arg(long = "style")]
        styles: Vec<String>,

        /// Instrument; repeat for several
        #[arg(long = "instrument")]
        instruments: Vec<String>,

        /// Form (auto, miniature, compact, aaba, song)
        #[arg(long)]
        form: Option<String>,

        /// Generate templates for style tags the registry lacks
        #[arg(long)]
        generative_styles: bool,

        /// Output file for the composition JSON (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the styles in the registry
    Styles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compose_flags_parse() {
        let cli = Cli::try_parse_from([
            "cantus",
            "compose",
            "a waltz",
            "--seed",
            "9",
            "--style",
            "jazz",
            "--style",
            "blues",
            "--instrument",
            "flute",
            "--profile",
            "preview",
        ])
        .unwrap();
        assert_eq!(cli.profile, "preview");
        match cli.command {
            Commands::Compose {
                text,
                seed,
                styles,
                instruments,
                generative_styles,
                ..
            } => {
                assert_eq!(text, "a waltz");
                assert_eq!(seed, 9);
                assert_eq!(styles, vec!["jazz", "blues"]);
                assert_eq!(instruments, vec!["flute"]);
                assert!(!generative_styles);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_default() {
        let cli = Cli::try_parse_from(["cantus", "styles"]).unwrap();
        let options = cli.host_options();
        assert_eq!(options.profile, "default");
        assert!(options.config.is_none());
        assert!(!cli.verbose);
    }
}

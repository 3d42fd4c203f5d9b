//! Cantus CLI - compose symbolic music from text descriptions
//!
//! The composition JSON goes to stdout (or `--output`); logs and the summary
//! go to stderr.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cantus_cli::cli_args::{Cli, Commands};
use cantus_cli::commands;
use cantus_cli::commands::compose::ComposeOptions;

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let host = cli.host_options();

    let result = match cli.command {
        Commands::Analyze { text, pretty } => commands::analyze::run(&host, &text, pretty),
        Commands::Compose {
            text,
            seed,
            tempo,
            duration,
            key,
            mode,
            styles,
            instruments,
            form,
            generative_styles,
            output,
        } => commands::compose::run(
            &host,
            &text,
            &ComposeOptions {
                seed,
                tempo,
                duration,
                key,
                mode,
                styles,
                instruments,
                form,
                generative_styles,
                output,
            },
        ),
        Commands::Styles { json } => commands::styles::run(&host, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

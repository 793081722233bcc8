//! Kiln - in-memory React project store with a sandboxed live preview.

use anyhow::Result;
use clap::{ColorChoice, Parser};

use kiln::cli::{self, Cli, Commands};
use kiln::config::{KilnConfig, init_config};
use kiln::core;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(KilnConfig::load(&cli)?);

    match &cli.command {
        Commands::Render { preview, output } => {
            cli::render::render_project(&config, &preview.project, output.as_deref())
        }
        Commands::Check { preview, json } => cli::check::check_project(&config, &preview.project, *json),
        Commands::Apply { project, calls, dry } => cli::apply::apply_calls(project, calls, *dry).map(|_| ()),
        Commands::Serve { preview, .. } => cli::serve::serve_project(preview.project.clone()),
    }
}

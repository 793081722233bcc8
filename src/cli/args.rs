//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Kiln: in-memory React project store with a sandboxed live preview
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a project into one self-contained preview document
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        preview: PreviewArgs,

        /// Output file (default: stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Transform every module reachable from the entry and report problems
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        preview: PreviewArgs,

        /// Print the import map and module graph as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Apply editor tool calls to a project file
    #[command(visible_alias = "a")]
    Apply {
        /// Project file (flat `path -> content` JSON)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        project: PathBuf,

        /// Tool calls (one call or an array). Use `-` to read stdin.
        #[arg(value_hint = clap::ValueHint::FilePath)]
        calls: PathBuf,

        /// Print the results without writing the project back
        #[arg(short, long)]
        dry: bool,
    },

    /// Start the preview server with live reload
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        preview: PreviewArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Push new previews to open pages over WebSocket
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

/// Shared preview arguments for Render, Check and Serve
#[derive(clap::Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Project file (flat `path -> content` JSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub project: PathBuf,

    /// Entry module (default from config, then /App.jsx)
    #[arg(short, long)]
    pub entry: Option<String>,

    /// Import alias prefix for the project root
    #[arg(long)]
    pub alias: Option<String>,

    /// Document title
    #[arg(short, long)]
    pub title: Option<String>,
}

impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }

    /// Preview arguments of commands that render.
    pub fn preview_args(&self) -> Option<&PreviewArgs> {
        match &self.command {
            Commands::Render { preview, .. } | Commands::Check { preview, .. } | Commands::Serve { preview, .. } => {
                Some(preview)
            }
            Commands::Apply { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["kiln", "serve", "project.json", "-p", "8080", "-w", "false", "-e", "/main.tsx"]);
        assert!(cli.is_serve());
        let Commands::Serve { preview, port, watch, .. } = &cli.command else {
            panic!("expected serve");
        };
        assert_eq!(*port, Some(8080));
        assert_eq!(*watch, Some(false));
        assert_eq!(preview.entry.as_deref(), Some("/main.tsx"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kiln", "check", "p.json", "-V", "-C", "other.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(cli.preview_args().is_some());
    }

    #[test]
    fn test_apply_has_no_preview_args() {
        let cli = Cli::parse_from(["kiln", "apply", "p.json", "-"]);
        assert!(cli.preview_args().is_none());
    }
}

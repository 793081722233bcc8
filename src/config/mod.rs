//! Project configuration management for `kiln.toml`.
//!
//! The file is optional: without one every section takes its defaults.
//! CLI flags override whatever the file sets.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [preview], [cdn], [serve]
//! ├── types/         # ConfigError, diagnostics, global handle
//! └── mod.rs         # KilnConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[preview]` | Entry module, import alias, extension probe order |
//! | `[cdn]`     | Package CDN base, version pins, query string     |
//! | `[serve]`   | Preview server (interface, port, watch)          |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{CdnConfig, PreviewConfig, ServeConfig};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::cli::{Cli, Commands, PreviewArgs};
use crate::importmap::{CdnPolicy, ImportMapBuilder};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "kiln.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub cdn: CdnConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl KilnConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing default file
    /// means defaults; a missing file named with `-C` is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None if cli.config == Path::new(CONFIG_FILE) => Self::default(),
            None => {
                return Err(ConfigError::Validation(format!("config file `{}` not found", cli.config.display())).into());
            }
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content).map_err(ConfigError::Toml)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // derived settings
    // ========================================================================

    /// Package URL policy.
    pub fn cdn_policy(&self) -> CdnPolicy {
        self.cdn.policy()
    }

    /// Import map builder with a fresh module cache.
    pub fn builder(&self) -> ImportMapBuilder {
        ImportMapBuilder::new(self.preview.resolver_options(), self.cdn_policy())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Some(args) = cli.preview_args() {
            self.apply_preview_args(args);
        }
        if let Commands::Serve {
            interface, port, watch, ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    fn apply_preview_args(&mut self, args: &PreviewArgs) {
        Self::update_option(&mut self.preview.entry, args.entry.as_ref());
        Self::update_option(&mut self.preview.alias, args.alias.as_ref());
        Self::update_option(&mut self.preview.title, args.title.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.preview.validate(&mut diag);
        self.cdn.validate(&mut diag);
        if self.serve.port == 0 {
            diag.error(FieldPath::new("serve.port"), "port must be between 1 and 65535");
        } else if self.serve.port < 1024 {
            diag.warn(FieldPath::new("serve.port"), "privileged port, binding may fail");
        }

        diag.print_warnings();
        diag.into_result().map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> KilnConfig {
    let (parsed, ignored) = KilnConfig::parse_with_ignored(content).unwrap();
    assert!(ignored.is_empty(), "test config has unknown fields: {:?}", ignored);
    parsed
}

// ============================================================================
// tests
// ============================================================================

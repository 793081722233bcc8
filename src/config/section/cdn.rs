//! `[cdn]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cdn]
//! base = "https://esm.sh"    # Package CDN
//! query = "dev"              # Appended to every package URL
//!
//! [cdn.pins]                 # Versions for unversioned imports
//! react = "19"
//! react-dom = "19"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::importmap::CdnPolicy;

/// Package CDN settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    pub base: String,
    pub pins: BTreeMap<String, String>,
    pub query: Option<String>,
}

impl Default for CdnConfig {
    fn default() -> Self {
        let policy = CdnPolicy::default();
        Self {
            base: policy.base,
            pins: policy.pins,
            query: policy.query,
        }
    }
}

impl CdnConfig {
    pub fn policy(&self) -> CdnPolicy {
        CdnPolicy {
            base: self.base.clone(),
            pins: self.pins.clone(),
            query: self.query.clone().filter(|q| !q.is_empty()),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(self.base.starts_with("https://") || self.base.starts_with("http://")) {
            diag.error_with_hint(
                FieldPath::new("cdn.base"),
                format!("`{}` is not an http(s) URL", self.base),
                "e.g. base = \"https://esm.sh\"",
            );
        }
        for (name, version) in &self.pins {
            if version.trim().is_empty() {
                diag.error(FieldPath::new("cdn.pins"), format!("empty version for `{name}`"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_pins_merge_into_policy() {
        let config = test_parse_config("[cdn]\nbase = \"https://cdn.example\"\nquery = \"dev\"\n[cdn.pins]\nreact = \"18.3.1\"");
        let policy = config.cdn.policy();
        assert_eq!(policy.base, "https://cdn.example");
        assert_eq!(policy.pins.get("react").map(String::as_str), Some("18.3.1"));
        assert!(!policy.pins.contains_key("react-dom"));
        assert_eq!(policy.query.as_deref(), Some("dev"));
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(CdnConfig::default().policy(), CdnPolicy::default());
    }

    #[test]
    fn test_invalid_base() {
        let mut diag = ConfigDiagnostics::new();
        CdnConfig {
            base: "esm.sh".into(),
            ..CdnConfig::default()
        }
        .validate(&mut diag);
        assert!(diag.has_errors());
    }
}

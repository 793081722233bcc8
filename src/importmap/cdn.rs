//! Mapping of bare package specifiers to CDN URLs.

use std::collections::BTreeMap;

use crate::resolve::PackageSpecifier;

/// Default ESM CDN.
pub const DEFAULT_CDN: &str = "https://esm.sh";

/// Specifiers the preview runtime itself imports; always mapped.
pub const RUNTIME_SPECIFIERS: [&str; 3] = ["react", "react-dom/client", "react/jsx-runtime"];

/// How externals become URLs: `{base}/{name}[@version][/subpath][?query]`.
///
/// An inline `pkg@version` in the source wins over a pin; unpinned packages
/// resolve to whatever the CDN serves as latest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnPolicy {
    pub base: String,
    pub pins: BTreeMap<String, String>,
    pub query: Option<String>,
}

impl Default for CdnPolicy {
    fn default() -> Self {
        let pins = [("react", "19"), ("react-dom", "19")]
            .into_iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect();
        Self {
            base: DEFAULT_CDN.to_string(),
            pins,
            query: None,
        }
    }
}

impl CdnPolicy {
    /// URL for a bare specifier, or `None` if it is not a package name.
    pub fn url_for(&self, specifier: &str) -> Option<String> {
        let package = PackageSpecifier::parse(specifier)?;
        let version = package
            .version
            .or_else(|| self.pins.get(package.name).map(String::as_str));

        let mut url = format!("{}/{}", self.base.trim_end_matches('/'), package.name);
        if let Some(version) = version {
            url.push('@');
            url.push_str(version);
        }
        if let Some(subpath) = package.subpath {
            url.push('/');
            url.push_str(subpath);
        }
        if let Some(query) = self.query.as_deref().map(|q| q.trim_start_matches('?'))
            && !query.is_empty()
        {
            url.push('?');
            url.push_str(query);
        }
        Some(url)
    }
}

/// Whether a specifier is already a full URL the browser can fetch.
pub fn is_url(specifier: &str) -> bool {
    specifier.contains("://") || specifier.starts_with("data:") || specifier.starts_with("blob:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_and_subpaths() {
        let cdn = CdnPolicy::default();
        assert_eq!(cdn.url_for("react").as_deref(), Some("https://esm.sh/react@19"));
        assert_eq!(
            cdn.url_for("react/jsx-runtime").as_deref(),
            Some("https://esm.sh/react@19/jsx-runtime")
        );
        assert_eq!(
            cdn.url_for("lucide-react").as_deref(),
            Some("https://esm.sh/lucide-react")
        );
    }

    #[test]
    fn test_inline_version_wins() {
        let cdn = CdnPolicy::default();
        assert_eq!(
            cdn.url_for("react@18.3.1").as_deref(),
            Some("https://esm.sh/react@18.3.1")
        );
    }

    #[test]
    fn test_custom_base_and_query() {
        let cdn = CdnPolicy {
            base: "https://cdn.example.com/".into(),
            pins: BTreeMap::new(),
            query: Some("?external=react".into()),
        };
        assert_eq!(
            cdn.url_for("@radix-ui/react-slot").as_deref(),
            Some("https://cdn.example.com/@radix-ui/react-slot?external=react")
        );
    }

    #[test]
    fn test_non_packages() {
        let cdn = CdnPolicy::default();
        assert!(cdn.url_for("./local").is_none());
        assert!(is_url("https://unpkg.com/x"));
        assert!(!is_url("react"));
    }
}

//! Specifier resolution against a store snapshot.
//!
//! Resolution order for a specifier written in `from`:
//!
//! 1. Alias prefix (`@/`) is replaced by the project root
//! 2. Relative specifiers join against the importer's directory
//! 3. An existing file is used verbatim
//! 4. Otherwise each configured extension is appended in order
//! 5. Otherwise `<path>/index.<ext>` is probed in the same order
//! 6. Otherwise the specifier is `Unresolved` (external by policy)
//!
//! Bare specifiers are probed as root-relative paths before falling back to
//! external, so `components/Counter` finds `/components/Counter.jsx`.

mod package;

pub use package::PackageSpecifier;

use crate::vfs::{StoreSnapshot, path};

/// Default probe order: TypeScript sources before JavaScript.
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".tsx", ".ts", ".jsx", ".js"];

/// Default project-root alias.
pub const DEFAULT_ALIAS: &str = "@/";

/// Resolver policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Prefix that means "relative to the project root".
    pub alias: String,
    /// Probe order, each with its leading dot.
    pub extensions: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            alias: DEFAULT_ALIAS.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// How a specifier is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `@/components/Button`
    Alias,
    /// `./Button`, `../lib/utils`
    Relative,
    /// `/components/Button.jsx`
    Absolute,
    /// `react`, `@scope/pkg/sub`, `components/Button`
    Bare,
}

impl SpecifierKind {
    /// Whether the specifier can only ever name a project file.
    #[inline]
    pub const fn is_local(self) -> bool {
        !matches!(self, Self::Bare)
    }
}

/// Outcome of `PathResolver::resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Absolute, normalized path of an existing file.
    Local(String),
    /// No project file matches.
    Unresolved,
}

impl Resolution {
    pub fn local(&self) -> Option<&str> {
        match self {
            Self::Local(path) => Some(path),
            Self::Unresolved => None,
        }
    }
}

/// Resolves specifiers against one immutable snapshot.
///
/// The result depends only on the snapshot and the options, never on call
/// order or file creation order.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    snapshot: &'a StoreSnapshot,
    options: &'a ResolverOptions,
}

impl<'a> PathResolver<'a> {
    pub fn new(snapshot: &'a StoreSnapshot, options: &'a ResolverOptions) -> Self {
        Self { snapshot, options }
    }

    #[inline]
    pub fn options(&self) -> &ResolverOptions {
        self.options
    }

    /// Classify a specifier by its written form.
    pub fn classify(&self, specifier: &str) -> SpecifierKind {
        classify(specifier, &self.options.alias)
    }

    /// Resolve `specifier` as written in the file at `from`.
    pub fn resolve(&self, from: &str, specifier: &str) -> Resolution {
        let Some(base) = self.candidate(from, specifier) else {
            return Resolution::Unresolved;
        };
        match self.probe(&base) {
            Some(found) => Resolution::Local(found),
            None => Resolution::Unresolved,
        }
    }

    /// Alias-qualified form of a local specifier written in `from`.
    ///
    /// Purely syntactic (no probing), so it only depends on the importer's
    /// path. Compiled bodies import each other through this form, which lets
    /// a module loaded from an opaque blob URL still find its relative
    /// imports. `None` for bare specifiers and paths escaping the root.
    pub fn canonical_specifier(&self, from: &str, specifier: &str) -> Option<String> {
        canonical_specifier(from, specifier, &self.options.alias)
    }

    fn candidate(&self, from: &str, specifier: &str) -> Option<String> {
        local_target(from, specifier, &self.options.alias)
    }

    /// Exact file, then `<base><ext>`, then `<base>/index<ext>`.
    fn probe(&self, base: &str) -> Option<String> {
        if self.snapshot.is_file(base) {
            return Some(base.to_string());
        }
        let extensions = &self.options.extensions;
        extensions
            .iter()
            .map(|ext| format!("{base}{ext}"))
            .chain(extensions.iter().map(|ext| format!("{base}/index{ext}")))
            .find(|probe| self.snapshot.is_file(probe))
    }
}

/// Classify a specifier given the alias prefix.
pub fn classify(specifier: &str, alias: &str) -> SpecifierKind {
    if !alias.is_empty() && specifier.starts_with(alias) {
        SpecifierKind::Alias
    } else if specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../") {
        SpecifierKind::Relative
    } else if specifier.starts_with('/') {
        SpecifierKind::Absolute
    } else {
        SpecifierKind::Bare
    }
}

/// `alias + path` without the leading separator.
pub fn canonical(alias: &str, resolved: &str) -> String {
    format!("{alias}{}", resolved.trim_start_matches('/'))
}

/// Free-standing form of `PathResolver::canonical_specifier`.
pub fn canonical_specifier(from: &str, specifier: &str, alias: &str) -> Option<String> {
    if !classify(specifier, alias).is_local() {
        return None;
    }
    local_target(from, specifier, alias).map(|target| canonical(alias, &target))
}

/// Absolute path a specifier points at before any probing.
fn local_target(from: &str, specifier: &str, alias: &str) -> Option<String> {
    let joined = match classify(specifier, alias) {
        SpecifierKind::Alias => format!("/{}", &specifier[alias.len()..]),
        SpecifierKind::Relative => {
            let dir = path::parent(from).unwrap_or(path::ROOT);
            format!("{dir}/{specifier}")
        }
        SpecifierKind::Absolute => specifier.to_string(),
        SpecifierKind::Bare => format!("/{specifier}"),
    };
    path::normalize(&joined).ok().filter(|p| p != path::ROOT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::FileStore;

    fn snapshot(files: &[&str]) -> StoreSnapshot {
        let mut store = FileStore::new();
        for file in files {
            store.create_file(file, "").unwrap();
        }
        store.snapshot()
    }

    fn resolve(snap: &StoreSnapshot, from: &str, specifier: &str) -> Option<String> {
        let options = ResolverOptions::default();
        PathResolver::new(snap, &options)
            .resolve(from, specifier)
            .local()
            .map(str::to_string)
    }

    #[test]
    fn test_classify() {
        let alias = DEFAULT_ALIAS;
        assert_eq!(classify("@/components/Button", alias), SpecifierKind::Alias);
        assert_eq!(classify("./Button", alias), SpecifierKind::Relative);
        assert_eq!(classify("../lib", alias), SpecifierKind::Relative);
        assert_eq!(classify("/App.jsx", alias), SpecifierKind::Absolute);
        assert_eq!(classify("react", alias), SpecifierKind::Bare);
        assert_eq!(classify("@scope/pkg", alias), SpecifierKind::Bare);
    }

    #[test]
    fn test_alias_and_relative() {
        let snap = snapshot(&["/App.jsx", "/components/Counter.jsx", "/lib/utils.ts"]);
        assert_eq!(
            resolve(&snap, "/App.jsx", "@/components/Counter").as_deref(),
            Some("/components/Counter.jsx")
        );
        assert_eq!(
            resolve(&snap, "/components/Counter.jsx", "../lib/utils").as_deref(),
            Some("/lib/utils.ts")
        );
        assert_eq!(
            resolve(&snap, "/App.jsx", "./components/Counter.jsx").as_deref(),
            Some("/components/Counter.jsx")
        );
    }

    #[test]
    fn test_extension_priority() {
        let snap = snapshot(&["/Button.js", "/Button.tsx", "/Button.jsx"]);
        assert_eq!(resolve(&snap, "/App.jsx", "./Button").as_deref(), Some("/Button.tsx"));

        let options = ResolverOptions {
            extensions: vec![".js".into(), ".tsx".into()],
            ..Default::default()
        };
        let found = PathResolver::new(&snap, &options).resolve("/App.jsx", "./Button");
        assert_eq!(found, Resolution::Local("/Button.js".into()));
    }

    #[test]
    fn test_index_probe() {
        let snap = snapshot(&["/components/ui/index.ts"]);
        assert_eq!(
            resolve(&snap, "/App.jsx", "@/components/ui").as_deref(),
            Some("/components/ui/index.ts")
        );
    }

    #[test]
    fn test_unresolved() {
        let snap = snapshot(&["/App.jsx"]);
        assert_eq!(resolve(&snap, "/App.jsx", "react"), None);
        assert_eq!(resolve(&snap, "/App.jsx", "./Missing"), None);
        assert_eq!(resolve(&snap, "/App.jsx", "../../outside"), None);
    }

    #[test]
    fn test_bare_root_relative() {
        let snap = snapshot(&["/components/Counter.jsx"]);
        assert_eq!(
            resolve(&snap, "/App.jsx", "components/Counter").as_deref(),
            Some("/components/Counter.jsx")
        );
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let forward = snapshot(&["/a/index.jsx", "/a.ts", "/b.jsx"]);
        let backward = snapshot(&["/b.jsx", "/a.ts", "/a/index.jsx"]);
        let queries = [("/App.jsx", "./a"), ("/b.jsx", "@/a"), ("/x/y.js", "../b"), ("/App.jsx", "a")];

        let first: Vec<_> = queries.iter().map(|(f, s)| resolve(&forward, f, s)).collect();
        let reversed: Vec<_> = queries.iter().rev().map(|(f, s)| resolve(&backward, f, s)).collect();
        assert_eq!(first, reversed.into_iter().rev().collect::<Vec<_>>());
        assert_eq!(first[0].as_deref(), Some("/a.ts"));
    }

    #[test]
    fn test_canonical_specifier() {
        assert_eq!(canonical("@/", "/components/Counter.jsx"), "@/components/Counter.jsx");
        assert_eq!(canonical("~/", "/App.jsx"), "~/App.jsx");

        let alias = DEFAULT_ALIAS;
        assert_eq!(
            canonical_specifier("/components/Counter.jsx", "./ui/Button", alias).as_deref(),
            Some("@/components/ui/Button")
        );
        assert_eq!(
            canonical_specifier("/components/Counter.jsx", "../lib/utils.ts", alias).as_deref(),
            Some("@/lib/utils.ts")
        );
        assert_eq!(canonical_specifier("/App.jsx", "/App.jsx", alias).as_deref(), Some("@/App.jsx"));
        assert_eq!(canonical_specifier("/App.jsx", "react", alias), None);
        assert_eq!(canonical_specifier("/App.jsx", "../../up", alias), None);
    }
}

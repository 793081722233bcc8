//! Bare package specifiers: `name[@version][/subpath]`.

/// A parsed bare specifier such as `@scope/pkg@1.2/sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier<'a> {
    pub name: &'a str,
    pub version: Option<&'a str>,
    pub subpath: Option<&'a str>,
}

impl<'a> PackageSpecifier<'a> {
    /// Parse a bare specifier. Returns `None` for relative, absolute or
    /// malformed input.
    pub fn parse(specifier: &'a str) -> Option<Self> {
        if specifier.is_empty() || specifier.starts_with(['.', '/']) {
            return None;
        }

        // Scoped packages keep their first separator inside the name.
        let name_end = if specifier.starts_with('@') {
            let scope_end = specifier.find('/')?;
            scope_end + 1 + specifier[scope_end + 1..].find('/').unwrap_or(specifier.len() - scope_end - 1)
        } else {
            specifier.find('/').unwrap_or(specifier.len())
        };

        let head = &specifier[..name_end];
        let subpath = specifier
            .get(name_end + 1..)
            .filter(|rest| !rest.is_empty());

        // A version marker is an `@` after the first character.
        let (name, version) = match head.char_indices().skip(1).find(|&(_, c)| c == '@') {
            Some((idx, _)) => (&head[..idx], Some(&head[idx + 1..])),
            None => (head, None),
        };
        if name.is_empty() || name.ends_with('/') || version.is_some_and(str::is_empty) {
            return None;
        }

        Some(Self { name, version, subpath })
    }
}

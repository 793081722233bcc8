//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Common prefix of every placeholder.
const MARKER: &str = "__KILN_";

/// A set of values substituted into one template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection.
///
/// Placeholders are plain `__KILN_*__` markers replaced by `TemplateVars`.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Replace each `(placeholder, value)` in one left-to-right pass.
///
/// Inserted values are copied straight to the output and never scanned, so a
/// value that itself contains a placeholder stays literal. Unknown markers are
/// kept as they are.
pub fn substitute(content: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(content.len() + extra);
    let mut rest = content;

    while let Some(start) = rest.find(MARKER) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push_str(MARKER);
                rest = &tail[MARKER.len()..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_every_occurrence() {
        let out = substitute("<b>__KILN_A__</b>__KILN_B__ __KILN_A__", &[("__KILN_A__", "x"), ("__KILN_B__", "y")]);
        assert_eq!(out, "<b>x</b>y x");
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let out = substitute(
            "boot=__KILN_A__; map=__KILN_B__",
            &[("__KILN_A__", "\"/__KILN_B__.jsx\""), ("__KILN_B__", "{}")],
        );
        assert_eq!(out, "boot=\"/__KILN_B__.jsx\"; map={}");
    }

    #[test]
    fn test_unknown_markers_are_kept() {
        assert_eq!(substitute("window.__KILN__ = __KILN_X__", &[]), "window.__KILN__ = __KILN_X__");
    }
}

//! Static module references in a parsed program.
//!
//! Only top-level `import`, `export … from` and `export * from` statements
//! are considered. Type-only forms never reach the browser and are skipped.

use oxc::allocator::Allocator;
use oxc::ast::ast::{Program, Statement, StringLiteral};
use oxc::span::Atom;

use crate::resolve;

/// Value specifiers in first-occurrence order, deduplicated.
pub fn collect(program: &Program<'_>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for stmt in &program.body {
        if let Some(source) = value_source(stmt)
            && !out.iter().any(|seen| seen == source)
        {
            out.push(source.to_string());
        }
    }
    out
}

/// Remove stylesheet imports from the body, returning their specifiers.
pub fn take_stylesheets(program: &mut Program<'_>) -> Vec<String> {
    let mut sheets: Vec<String> = Vec::new();
    for stmt in &program.body {
        if let Statement::ImportDeclaration(decl) = stmt
            && is_stylesheet(decl.source.value.as_str())
            && !sheets.iter().any(|s| s == decl.source.value.as_str())
        {
            sheets.push(decl.source.value.to_string());
        }
    }
    if !sheets.is_empty() {
        program.body.retain(|stmt| {
            !matches!(stmt, Statement::ImportDeclaration(decl) if is_stylesheet(decl.source.value.as_str()))
        });
    }
    sheets
}

/// Rewrite local specifiers to their alias-qualified form.
pub fn rewrite_local<'a>(program: &mut Program<'a>, allocator: &'a Allocator, from: &str, alias: &str) {
    for stmt in program.body.iter_mut() {
        let Some(source) = source_mut(stmt) else {
            continue;
        };
        if let Some(canonical) = resolve::canonical_specifier(from, source.value.as_str(), alias)
            && canonical != source.value.as_str()
        {
            source.value = Atom::from(&*allocator.alloc_str(&canonical));
            source.raw = None;
        }
    }
}

/// `.css` with an optional query or fragment.
pub fn is_stylesheet(specifier: &str) -> bool {
    let path = specifier.split(['?', '#']).next().unwrap_or(specifier);
    path.ends_with(".css")
}

fn value_source<'p>(stmt: &'p Statement<'_>) -> Option<&'p str> {
    match stmt {
        Statement::ImportDeclaration(decl) if !decl.import_kind.is_type() => {
            Some(decl.source.value.as_str())
        }
        Statement::ExportNamedDeclaration(decl) if !decl.export_kind.is_type() => {
            decl.source.as_ref().map(|source| source.value.as_str())
        }
        Statement::ExportAllDeclaration(decl) if !decl.export_kind.is_type() => {
            Some(decl.source.value.as_str())
        }
        _ => None,
    }
}

fn source_mut<'p, 'a>(stmt: &'p mut Statement<'a>) -> Option<&'p mut StringLiteral<'a>> {
    match stmt {
        Statement::ImportDeclaration(decl) => Some(&mut decl.source),
        Statement::ExportNamedDeclaration(decl) => decl.source.as_mut(),
        Statement::ExportAllDeclaration(decl) => Some(&mut decl.source),
        _ => None,
    }
}

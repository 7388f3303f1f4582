//! Pluggable extraction of raw import specifiers from source text.
//!
//! Each syntax family is a separate [`SpecifierExtractor`], so a real parser
//! can replace the pattern-based ones without touching the dependency graph.

use std::sync::LazyLock;

use regex::Regex;

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+(?:[\w*\s{},]*\s+from\s+)?['"]([^'"]+)['"]"#)
        .expect("static import pattern is valid")
});

static REQUIRE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("require pattern is valid")
});

static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("dynamic import pattern is valid")
});

/// Extracts raw specifiers of one import syntax from source text.
pub trait SpecifierExtractor: Send + Sync {
    /// Short name of the syntax family, used in logs.
    fn name(&self) -> &'static str;

    /// Returns every specifier found in `content`, in source order.
    fn extract<'t>(&self, content: &'t str) -> Vec<&'t str>;
}

/// `import x from "m"` and bare `import "m"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticImport;

/// `require("m")`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireCall;

/// `import("m")`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicImport;

fn captures<'t>(pattern: &Regex, content: &'t str) -> Vec<&'t str> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

impl SpecifierExtractor for StaticImport {
    fn name(&self) -> &'static str {
        "static-import"
    }

    fn extract<'t>(&self, content: &'t str) -> Vec<&'t str> {
        captures(&STATIC_IMPORT, content)
    }
}

impl SpecifierExtractor for RequireCall {
    fn name(&self) -> &'static str {
        "require"
    }

    fn extract<'t>(&self, content: &'t str) -> Vec<&'t str> {
        captures(&REQUIRE_CALL, content)
    }
}

impl SpecifierExtractor for DynamicImport {
    fn name(&self) -> &'static str {
        "dynamic-import"
    }

    fn extract<'t>(&self, content: &'t str) -> Vec<&'t str> {
        captures(&DYNAMIC_IMPORT, content)
    }
}

/// The default extractor set: static imports, then requires, then dynamic imports.
#[must_use]
pub fn default_extractors() -> Vec<Box<dyn SpecifierExtractor>> {
    vec![Box::new(StaticImport), Box::new(RequireCall), Box::new(DynamicImport)]
}

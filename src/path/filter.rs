// ABOUTME: Name predicates applied to bare file names during file-set evaluation
// ABOUTME: Supports glob patterns, exact names and arbitrary closures

use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum NameFilter {
    Any,
    Exact(String),
    Glob(String),
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl NameFilter {
    pub fn any() -> Self {
        NameFilter::Any
    }

    pub fn exact(name: impl Into<String>) -> Self {
        NameFilter::Exact(name.into())
    }

    /// Glob over a single file name: `*`, `?`, `[a-z]` and `{a,b}`.
    pub fn glob(pattern: impl Into<String>) -> Self {
        NameFilter::Glob(pattern.into())
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        NameFilter::Custom(Arc::new(predicate))
    }

    /// `name` must be a bare file name, never a path.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Any => true,
            NameFilter::Exact(expected) => name == expected,
            NameFilter::Glob(pattern) => glob_match::glob_match(pattern, name),
            NameFilter::Custom(predicate) => predicate(name),
        }
    }
}

impl From<&str> for NameFilter {
    fn from(pattern: &str) -> Self {
        if pattern == "*" {
            NameFilter::Any
        } else {
            NameFilter::glob(pattern)
        }
    }
}

impl From<String> for NameFilter {
    fn from(pattern: String) -> Self {
        NameFilter::from(pattern.as_str())
    }
}

impl fmt::Debug for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameFilter::Any => write!(f, "Any"),
            NameFilter::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            NameFilter::Glob(pattern) => f.debug_tuple("Glob").field(pattern).finish(),
            NameFilter::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_filters() {
        let filter = NameFilter::from("*.txt");
        assert!(filter.matches("a.txt"));
        assert!(!filter.matches("a.log"));

        let alternatives = NameFilter::glob("*.{rs,toml}");
        assert!(alternatives.matches("lib.rs"));
        assert!(alternatives.matches("Cargo.toml"));
        assert!(!alternatives.matches("README.md"));
    }

    #[test]
    fn test_exact_and_custom_filters() {
        assert!(NameFilter::exact("target").matches("target"));
        assert!(!NameFilter::exact("target").matches("targets"));

        let hidden = NameFilter::custom(|name| name.starts_with('.'));
        assert!(hidden.matches(".git"));
        assert!(!hidden.matches("src"));
    }

    #[test]
    fn test_star_is_any() {
        assert!(matches!(NameFilter::from("*"), NameFilter::Any));
        assert!(NameFilter::any().matches("anything at all"));
    }
}

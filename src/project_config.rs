//! Resolved project configuration consumed by the resolution engine.
//!
//! This is the typed shape of a tsconfig/jsconfig after loading (see
//! `cli::config` for the loader): a base directory and an ordered alias
//! table. Missing configuration is not an error; [`ProjectConfig::new`]
//! yields a config with no aliases rooted at the project directory.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Extension of view/template files that terminate resolution.
pub const DEFAULT_LEAF_EXTENSION: &str = "vue";

/// Alias pattern -> target patterns, in declaration order.
pub type AliasTable = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Directory alias targets are resolved against (tsconfig `baseUrl`)
    pub base_directory: PathBuf,
    /// tsconfig `paths`; the first matching pattern wins
    pub alias_table: AliasTable,
    /// Extension (without the dot) of leaf artifacts
    pub leaf_extension: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig::new(".")
    }
}

impl ProjectConfig {
    /// Configuration with no aliases, rooted at `base_directory`.
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        ProjectConfig {
            base_directory: base_directory.into(),
            alias_table: AliasTable::new(),
            leaf_extension: DEFAULT_LEAF_EXTENSION.to_string(),
        }
    }

    pub fn with_alias<I, S>(mut self, pattern: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_table
            .insert(pattern.into(), targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_leaf_extension(mut self, extension: &str) -> Self {
        self.leaf_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Compiled alias patterns in table order. Patterns without targets are
    /// dropped.
    pub fn path_mappings(&self) -> Vec<PathMapping> {
        self.alias_table
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(pattern, targets)| PathMapping::new(pattern, targets))
            .collect()
    }
}

/// Whether `path` has the leaf extension `leaf_extension` (ASCII case
/// insensitive).
pub fn is_leaf_path(path: &Path, leaf_extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(leaf_extension))
}

/// One alias pattern split around its wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub(crate) pattern: String,
    pub(crate) prefix: String,
    pub(crate) suffix: String,
    pub(crate) targets: Vec<String>,
}

impl PathMapping {
    pub fn new(pattern: &str, targets: &[String]) -> Self {
        let pattern = normalize_path_pattern(pattern);
        let (prefix, suffix) = split_path_pattern(&pattern);
        PathMapping {
            pattern,
            prefix,
            suffix,
            targets: targets
                .iter()
                .map(|target| normalize_path_pattern(target))
                .collect(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Text captured by the wildcard when `specifier` matches; an exact
    /// (wildcard-free) pattern captures the empty string.
    pub fn match_specifier(&self, specifier: &str) -> Option<String> {
        if !self.pattern.contains('*') {
            return (self.pattern == specifier).then(String::new);
        }

        if !specifier.starts_with(&self.prefix) || !specifier.ends_with(&self.suffix) {
            return None;
        }

        let start = self.prefix.len();
        let end = specifier.len().saturating_sub(self.suffix.len());
        if end < start {
            return None;
        }

        Some(specifier[start..end].to_string())
    }

    /// First target with the captured text substituted for its wildcard.
    pub fn first_target(&self, captured: &str) -> Option<String> {
        let target = self.targets.first()?;
        Some(if target.contains('*') {
            target.replacen('*', captured, 1)
        } else {
            target.clone()
        })
    }
}

fn normalize_path_pattern(value: &str) -> String {
    value.trim().replace('\\', "/")
}

fn split_path_pattern(pattern: &str) -> (String, String) {
    match pattern.find('*') {
        Some(star_idx) => {
            let (prefix, rest) = pattern.split_at(star_idx);
            (prefix.to_string(), rest[1..].to_string())
        }
        None => (pattern.to_string(), String::new()),
    }
}

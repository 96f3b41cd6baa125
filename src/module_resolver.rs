//! Module Resolution
//!
//! Turns a raw module specifier into a candidate absolute file path:
//! - Path aliases from the project config (`"@/*": ["src/*"]`), first match
//!   in table order
//! - Relative specifiers (`./foo`, `../bar`) against the importing directory
//! - Absolute specifiers (`/abs/foo`)
//!
//! Bare package specifiers (`vue`, `@scope/pkg`) are out of scope and do not
//! resolve. Extensionless candidates are probed with the usual TypeScript and
//! JavaScript extensions; when nothing exists on disk the unprobed candidate
//! is returned and the module table builder fails soft on it.

use crate::project_config::{PathMapping, ProjectConfig, is_leaf_path};
use rustc_hash::FxHashMap;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Extensions tried, in order, for an extensionless candidate and for
/// `index` files inside a candidate directory.
pub const MODULE_EXTENSION_CANDIDATES: [&str; 9] =
    ["ts", "tsx", "d.ts", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// How a specifier was mapped to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Through the alias pattern with this text
    Alias(String),
    Relative,
    Absolute,
}

/// Result of module resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Normalized absolute candidate path
    pub resolved_path: PathBuf,
    /// Original specifier used in the import
    pub original_specifier: String,
    pub kind: ResolutionKind,
    /// Whether the path names a leaf artifact
    pub is_leaf: bool,
}

/// Reason why module resolution failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// Package specifier; package resolution is not performed
    BareSpecifier { specifier: String },
    /// Empty specifier text
    EmptySpecifier,
}

impl std::fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionFailure::BareSpecifier { specifier } => {
                write!(f, "cannot resolve package specifier '{specifier}'")
            }
            ResolutionFailure::EmptySpecifier => f.write_str("empty module specifier"),
        }
    }
}

/// Resolve `module_specifier` without caching or an owning config.
pub fn resolve_module_path(
    base_directory: &Path,
    path_mappings: &[PathMapping],
    leaf_extension: &str,
    origin_directory: &Path,
    module_specifier: &str,
) -> Result<ResolvedModule, ResolutionFailure> {
    if module_specifier.is_empty() {
        return Err(ResolutionFailure::EmptySpecifier);
    }

    let (candidate, kind) = if let Some((mapping, captured)) = path_mappings
        .iter()
        .find_map(|mapping| Some((mapping, mapping.match_specifier(module_specifier)?)))
    {
        let target = mapping.first_target(&captured).unwrap_or_default();
        (
            base_directory.join(target),
            ResolutionKind::Alias(mapping.pattern().to_string()),
        )
    } else if is_relative_specifier(module_specifier) {
        (
            origin_directory.join(module_specifier),
            ResolutionKind::Relative,
        )
    } else if module_specifier.starts_with('/') {
        (PathBuf::from(module_specifier), ResolutionKind::Absolute)
    } else {
        return Err(ResolutionFailure::BareSpecifier {
            specifier: module_specifier.to_string(),
        });
    };

    let candidate = normalize_path(&candidate);
    let is_leaf = is_leaf_path(&candidate, leaf_extension);
    let resolved_path = if is_leaf {
        candidate
    } else {
        try_file_or_directory(&candidate).unwrap_or(candidate)
    };

    Ok(ResolvedModule {
        resolved_path,
        original_specifier: module_specifier.to_string(),
        kind,
        is_leaf,
    })
}

/// Module resolver bound to one project configuration.
///
/// Results are cached per (origin directory, specifier) for the lifetime of
/// the resolver, which is one resolution session.
#[derive(Debug)]
pub struct ModuleResolver {
    base_directory: PathBuf,
    path_mappings: Vec<PathMapping>,
    leaf_extension: String,
    resolution_cache: FxHashMap<(PathBuf, String), Result<ResolvedModule, ResolutionFailure>>,
}

impl ModuleResolver {
    pub fn new(config: &ProjectConfig) -> Self {
        ModuleResolver {
            base_directory: config.base_directory.clone(),
            path_mappings: config.path_mappings(),
            leaf_extension: config.leaf_extension.clone(),
            resolution_cache: FxHashMap::default(),
        }
    }

    /// Resolve a module specifier written in a file inside `origin_directory`.
    pub fn resolve(
        &mut self,
        specifier: &str,
        origin_directory: &Path,
    ) -> Result<ResolvedModule, ResolutionFailure> {
        let cache_key = (origin_directory.to_path_buf(), specifier.to_string());
        if let Some(cached) = self.resolution_cache.get(&cache_key) {
            return cached.clone();
        }

        let result = resolve_module_path(
            &self.base_directory,
            &self.path_mappings,
            &self.leaf_extension,
            origin_directory,
            specifier,
        );
        match &result {
            Ok(resolved) => tracing::trace!(
                specifier,
                origin = %origin_directory.display(),
                resolved = %resolved.resolved_path.display(),
                kind = ?resolved.kind,
                "resolved module specifier"
            ),
            Err(failure) => tracing::trace!(specifier, %failure, "module specifier not resolved"),
        }

        self.resolution_cache.insert(cache_key, result.clone());
        result
    }

    /// Resolve a specifier written in `containing_file`.
    pub fn resolve_from_file(
        &mut self,
        specifier: &str,
        containing_file: &Path,
    ) -> Result<ResolvedModule, ResolutionFailure> {
        let origin_directory = containing_file.parent().unwrap_or(Path::new("."));
        self.resolve(specifier, origin_directory)
    }

    pub fn clear_cache(&mut self) {
        self.resolution_cache.clear();
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Lexically remove `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::RootDir | Component::Normal(_) | Component::Prefix(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }

    normalized
}

/// `path` with `.ext` appended (not replacing an existing extension, so
/// `./Header.view` probes `Header.view.ts`).
fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// TypeScript sources that a JavaScript output specifier (`./util.js`)
/// stands for.
fn script_extension_substitution(path: &Path) -> &'static [&'static str] {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js") => &["ts", "tsx", "d.ts"],
        Some("jsx") => &["tsx", "d.ts"],
        Some("mjs") => &["mts"],
        Some("cjs") => &["cts"],
        _ => &[],
    }
}

/// Try to resolve a file with the candidate extensions
fn try_file(path: &Path) -> Option<PathBuf> {
    if let Some(source) = script_extension_substitution(path)
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file())
    {
        return Some(source);
    }
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    MODULE_EXTENSION_CANDIDATES
        .iter()
        .map(|ext| with_appended_extension(path, ext))
        .find(|candidate| candidate.is_file())
}

/// Try to resolve a path as a file or as a directory with an index file
fn try_file_or_directory(path: &Path) -> Option<PathBuf> {
    if let Some(resolved) = try_file(path) {
        return Some(resolved);
    }

    if path.is_dir() {
        let index = path.join("index");
        return MODULE_EXTENSION_CANDIDATES
            .iter()
            .map(|ext| with_appended_extension(&index, ext))
            .find(|candidate| candidate.is_file());
    }

    None
}

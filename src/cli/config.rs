//! tsconfig/jsconfig loading.
//!
//! Only the fields module resolution needs are read: `compilerOptions.baseUrl`
//! and `compilerOptions.paths`, following `extends` chains. The result is a
//! [`ProjectConfig`] whose alias table keeps the source order of `paths`.

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::module_resolver::normalize_path;
use crate::project_config::{AliasTable, ProjectConfig};

/// Config file names looked up in a project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tsconfig.json", "jsconfig.json"];

/// `extends` takes one config or, since TypeScript 5.0, a list applied in
/// order.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn into_vec(self) -> Vec<String> {
        match self {
            Extends::One(path) => vec![path],
            Extends::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<Extends>,
    #[serde(default)]
    pub compiler_options: Option<CompilerOptions>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Alias patterns in source order
    #[serde(default)]
    pub paths: Option<IndexMap<String, Vec<String>>>,
    /// Directory of the config file that set `baseUrl`
    #[serde(skip)]
    pub base_url_origin: Option<PathBuf>,
    /// Directory of the config file that set `paths`
    #[serde(skip)]
    pub paths_origin: Option<PathBuf>,
}

impl CompilerOptions {
    /// Directory alias targets are relative to: `baseUrl`, else the
    /// directory of the config declaring `paths`.
    pub fn resolution_base(&self) -> Option<PathBuf> {
        if let Some(base_url) = &self.base_url {
            let base_url = Path::new(base_url);
            let joined = match &self.base_url_origin {
                Some(origin) if !base_url.is_absolute() => origin.join(base_url),
                _ => base_url.to_path_buf(),
            };
            return Some(normalize_path(&joined));
        }
        self.paths_origin.clone()
    }
}

/// Parse tsconfig text, tolerating comments and trailing commas.
pub fn parse_tsconfig(source: &str) -> Result<TsConfig> {
    let json = strip_jsonc(source);
    let config = serde_json::from_str(&json).context("invalid tsconfig JSON")?;
    Ok(config)
}

/// Load a config file with its `extends` chain merged in.
pub fn load_tsconfig(path: &Path) -> Result<TsConfig> {
    let mut visited = HashSet::new();
    load_tsconfig_inner(path, &mut visited)
}

fn load_tsconfig_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("tsconfig extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tsconfig: {}", path.display()))?;
    let mut config = parse_tsconfig(&source)
        .with_context(|| format!("failed to parse tsconfig: {}", path.display()))?;

    let config_dir = path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;
    let config_dir = std::path::absolute(config_dir).unwrap_or_else(|_| config_dir.to_path_buf());
    if let Some(options) = config.compiler_options.as_mut() {
        if options.base_url.is_some() {
            options.base_url_origin = Some(config_dir.clone());
        }
        if options.paths.is_some() {
            options.paths_origin = Some(config_dir.clone());
        }
    }

    if let Some(extends) = config.extends.take() {
        let mut merged = TsConfig::default();
        for extends_path in extends.into_vec() {
            let base_path = resolve_extends_path(path, &extends_path)?;
            let base_config = load_tsconfig_inner(&base_path, visited)?;
            merged = merge_configs(merged, base_config);
        }
        config = merge_configs(merged, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn resolve_extends_path(current_path: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current_path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;

    let is_path = extends.starts_with('.') || Path::new(extends).is_absolute();
    if is_path {
        return Ok(with_json_extension(base_dir.join(extends)));
    }

    // Package config, e.g. `@vue/tsconfig/tsconfig.dom.json`.
    for ancestor in base_dir.ancestors() {
        let candidate = ancestor.join("node_modules").join(extends);
        if candidate.is_file() {
            return Ok(candidate);
        }
        let with_json = with_json_extension(candidate.clone());
        if with_json.is_file() {
            return Ok(with_json);
        }
        let package_config = candidate.join("tsconfig.json");
        if package_config.is_file() {
            return Ok(package_config);
        }
    }
    bail!(
        "cannot find base config '{extends}' extended by {}",
        current_path.display()
    )
}

fn with_json_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "json") {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(".json");
    PathBuf::from(name)
}

fn merge_configs(base: TsConfig, child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options) {
        (Some(base_opts), Some(child_opts)) => Some(merge_compiler_options(base_opts, child_opts)),
        (base_opts, child_opts) => child_opts.or(base_opts),
    };
    TsConfig {
        extends: None,
        compiler_options,
    }
}

/// Each option keeps the directory of the file that set it.
fn merge_compiler_options(base: CompilerOptions, child: CompilerOptions) -> CompilerOptions {
    let (base_url, base_url_origin) = if child.base_url.is_some() {
        (child.base_url, child.base_url_origin)
    } else {
        (base.base_url, base.base_url_origin)
    };
    let (paths, paths_origin) = if child.paths.is_some() {
        (child.paths, child.paths_origin)
    } else {
        (base.paths, base.paths_origin)
    };
    CompilerOptions {
        base_url,
        paths,
        base_url_origin,
        paths_origin,
    }
}

/// First config file of [`CONFIG_FILE_NAMES`] present in `dir`.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Project configuration from an explicit `--project` path: a config file,
/// or a directory searched with [`find_config_file`].
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    if path.is_dir() {
        return discover_project_config(path);
    }
    if !path.is_file() {
        bail!("project config not found: {}", path.display());
    }
    let config = load_tsconfig(path)?;
    let config_dir = path.parent().unwrap_or(Path::new("."));
    Ok(project_config_from(config, config_dir))
}

/// Project configuration for `root`. A root without a config file gets no
/// aliases and `root` as its base directory.
pub fn discover_project_config(root: &Path) -> Result<ProjectConfig> {
    match find_config_file(root) {
        Some(path) => {
            tracing::debug!(config = %path.display(), "using project config");
            let config = load_tsconfig(&path)?;
            Ok(project_config_from(config, root))
        }
        None => {
            tracing::debug!(root = %root.display(), "no project config, using defaults");
            Ok(ProjectConfig::new(absolute_dir(root)))
        }
    }
}

fn project_config_from(config: TsConfig, config_dir: &Path) -> ProjectConfig {
    let options = config.compiler_options.unwrap_or_default();
    let base_directory = options
        .resolution_base()
        .unwrap_or_else(|| absolute_dir(config_dir));
    let alias_table: AliasTable = options.paths.unwrap_or_default();

    let mut project = ProjectConfig::new(base_directory);
    project.alias_table = alias_table;
    project
}

fn absolute_dir(dir: &Path) -> PathBuf {
    normalize_path(&std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()))
}

/// Rewrite JSONC into JSON: comments become whitespace (keeping newlines)
/// and commas directly before `}` or `]` are dropped.
fn strip_jsonc(input: &str) -> String {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Code,
        String { escaped: bool },
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(input.len());
    // Index in `out` of a comma not yet followed by a significant character.
    let mut pending_comma: Option<usize> = None;
    let mut state = State::Code;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::LineComment => {
                if ch == '\n' {
                    out.push(ch);
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                } else if ch == '\n' {
                    out.push(ch);
                }
            }
            State::String { escaped } => {
                out.push(ch);
                state = match ch {
                    _ if escaped => State::String { escaped: false },
                    '\\' => State::String { escaped: true },
                    '"' => State::Code,
                    _ => state,
                };
            }
            State::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                c if c.is_whitespace() => out.push(c),
                '}' | ']' => {
                    if let Some(comma) = pending_comma.take() {
                        out.replace_range(comma..comma + 1, " ");
                    }
                    out.push(ch);
                }
                ',' => {
                    pending_comma = Some(out.len());
                    out.push(ch);
                }
                '"' => {
                    pending_comma = None;
                    out.push(ch);
                    state = State::String { escaped: false };
                }
                _ => {
                    pending_comma = None;
                    out.push(ch);
                }
            },
        }
    }

    out
}

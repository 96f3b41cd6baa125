use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::cli::args::{CliArgs, OutputFormat};
use crate::cli::config::{discover_project_config, load_project_config};
use crate::definition::{pascal_case, provide_definition_with};
use crate::module_resolver::normalize_path;
use crate::origin_resolver::ResolutionSession;
use crate::project_config::ProjectConfig;
use crate::registration::{ComponentMap, RegistrationExtractor, build_component_map_with};

/// Extensions of files scanned for registration blocks when walking a
/// directory.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["vue", "ts", "tsx", "js"];

/// Component map of one input file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileReport {
    pub file: PathBuf,
    pub components: ComponentMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Text for stdout
    pub output: String,
    /// False when `--tag` found no definition
    pub success: bool,
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let root = absolute_path(cwd, args.root.as_deref().unwrap_or(Path::new(".")));
    let config = project_config(args, cwd, &root)?.with_leaf_extension(&args.leaf_extension);
    let extractor = RegistrationExtractor::new().with_decorators(args.decorators.iter().cloned());

    let inputs: Vec<PathBuf> = args
        .paths
        .iter()
        .map(|path| absolute_path(cwd, path))
        .collect();

    if let Some(tag) = &args.tag {
        let Some(file) = inputs.first() else {
            bail!("--tag needs an input file");
        };
        let mut session = ResolutionSession::new(&config);
        let definition = provide_definition_with(&mut session, &extractor, file, &pascal_case(tag));
        return Ok(RunResult {
            output: definition
                .as_ref()
                .map(|path| format!("{}\n", path.display()))
                .unwrap_or_default(),
            success: definition.is_some(),
        });
    }

    let files = collect_input_files(&inputs)?;
    tracing::debug!(files = files.len(), "collected input files");
    let reports = build_reports(&files, &config, &extractor);

    let output = match args.format {
        OutputFormat::Text => render_text(&reports),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&reports).context("failed to serialize reports")?;
            json.push('\n');
            json
        }
    };
    Ok(RunResult {
        output,
        success: true,
    })
}

fn project_config(args: &CliArgs, cwd: &Path, root: &Path) -> Result<ProjectConfig> {
    match &args.project {
        Some(project) => {
            let project = absolute_path(cwd, project);
            load_project_config(&project)
                .with_context(|| format!("failed to load project config {}", project.display()))
        }
        None => discover_project_config(root),
    }
}

fn absolute_path(cwd: &Path, path: &Path) -> PathBuf {
    normalize_path(&cwd.join(path))
}

/// Input files in argument order; directories contribute their source files
/// sorted by name.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            bail!("input path not found: {}", path.display());
        }

        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && is_source_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "node_modules" || name.starts_with('.')
}

fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    // Declaration files never register components.
    if name.ends_with(".d.ts") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Component maps of `files`, in input order. Each file gets its own
/// session; only the project config is shared.
pub fn build_reports(
    files: &[PathBuf],
    config: &ProjectConfig,
    extractor: &RegistrationExtractor,
) -> Vec<FileReport> {
    files
        .par_iter()
        .map(|file| {
            let _span = tracing::debug_span!("file", path = %file.display()).entered();
            let mut session = ResolutionSession::new(config);
            let components = build_component_map_with(&mut session, extractor, file);
            let stats = session.stats();
            tracing::debug!(
                parsed = stats.files_parsed,
                cache_hits = stats.cache_hits,
                hops = stats.hops,
                "session finished"
            );
            FileReport {
                file: file.clone(),
                components,
            }
        })
        .collect()
}

/// `file` followed by one indented `Name -> path` line per component. Files
/// without registrations are left out.
pub fn render_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports.iter().filter(|report| !report.components.is_empty()) {
        let _ = writeln!(out, "{}", report.file.display());
        for (name, definition) in &report.components {
            let _ = writeln!(out, "  {name} -> {}", definition.display());
        }
    }
    out
}

//! Module tables: the import and export bindings of one file.
//!
//! A table is a pure function of the file's contents. Building one never
//! fails: unreadable or unparsable files yield an empty table, which callers
//! treat as "nothing found here".

use crate::exports::{ExportBinding, ExportStats};
use crate::imports::ImportBinding;
use crate::parser::parse_module_table;
use crate::scanner::LanguageVariant;
use crate::sfc::{SFC_EXTENSION, extract_script};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTable {
    pub imports: Vec<ImportBinding>,
    /// Export bindings in declaration order
    pub exports: Vec<ExportBinding>,
    /// Names of top-level classes, functions, variables and types declared in
    /// the file itself
    pub declarations: Vec<String>,
}

impl ModuleTable {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.exports.is_empty() && self.declarations.is_empty()
    }

    /// Import binding for a local name. A redeclared local name resolves to
    /// its last import.
    pub fn import_for(&self, local_name: &str) -> Option<&ImportBinding> {
        self.imports
            .iter()
            .rev()
            .find(|binding| binding.local_name == local_name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declarations.iter().any(|declared| declared == name)
    }

    /// Source modules of `export * from` declarations, in declaration order.
    pub fn reexport_all_sources(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().filter_map(|binding| match binding {
            ExportBinding::ReExportAll { from_module } => Some(from_module.as_str()),
            _ => None,
        })
    }

    pub fn export_stats(&self) -> ExportStats {
        ExportStats::collect(&self.exports)
    }
}

/// Module source text of `path`: the whole file, or the `<script>` block of a
/// single-file component (empty when it has none).
pub fn read_module_source(path: &Path) -> std::io::Result<String> {
    let source = std::fs::read_to_string(path)?;
    let is_sfc = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SFC_EXTENSION));
    if is_sfc {
        return Ok(extract_script(&source).unwrap_or_default().to_string());
    }
    Ok(source)
}

/// Table for a source text; empty when the text is not a readable module.
pub fn table_from_source(source: &str, file_name: &Path) -> ModuleTable {
    match parse_module_table(source, LanguageVariant::from_path(file_name)) {
        Ok(table) => table,
        Err(err) => {
            tracing::debug!(file = %file_name.display(), %err, "unparsable module, using empty table");
            ModuleTable::default()
        }
    }
}

/// Read and parse `path` into its module table, failing soft.
pub fn build_module_table(path: &Path) -> ModuleTable {
    let source = match read_module_source(path) {
        Ok(source) => source,
        Err(err) => {
            tracing::debug!(file = %path.display(), %err, "unreadable module, using empty table");
            return ModuleTable::default();
        }
    };
    let table = table_from_source(&source, path);
    let stats = table.export_stats();
    tracing::trace!(
        file = %path.display(),
        imports = table.imports.len(),
        exports = stats.total(),
        reexports = stats.reexport_named + stats.reexport_namespace + stats.reexport_all,
        "built module table"
    );
    table
}

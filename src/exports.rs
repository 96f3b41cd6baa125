//! Export bindings collected from a module's top-level export declarations.
//!
//! Every export form the origin resolver distinguishes is one variant of
//! [`ExportBinding`]:
//! - Local named exports: `export { foo }`, `export { foo as bar }`
//! - Named re-exports: `export { foo } from 'mod'`
//! - Namespace re-exports: `export * as ns from 'mod'`
//! - Wildcard re-exports: `export * from 'mod'`
//! - Default assignment: `export default foo`
//! - Exported declarations: `export class Foo {}`, `export default class {}`

/// Kind of an export binding, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    LocalNamed,
    ReExportNamed,
    ReExportNamespace,
    ReExportAll,
    DefaultAssignment,
    Declaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExportBinding {
    /// `export { local as exported }`, resolved through the file's own imports
    LocalNamed {
        exported_name: String,
        local_name: String,
    },
    /// `export { local as exported } from 'mod'`; `local_name` is the name
    /// inside `from_module` and may equal `exported_name`.
    ReExportNamed {
        exported_name: String,
        local_name: String,
        from_module: String,
    },
    /// `export * as exported from 'mod'`
    ReExportNamespace {
        exported_name: String,
        from_module: String,
    },
    /// `export * from 'mod'`: every name is implicitly forwarded.
    ReExportAll { from_module: String },
    /// `export default local`
    DefaultAssignment { local_name: String },
    /// `export const name = ...`, `export class name {}`, and anonymous or
    /// expression default exports (`name` is then `default`).
    Declaration { name: String },
}

impl ExportBinding {
    pub fn kind(&self) -> ExportKind {
        match self {
            ExportBinding::LocalNamed { .. } => ExportKind::LocalNamed,
            ExportBinding::ReExportNamed { .. } => ExportKind::ReExportNamed,
            ExportBinding::ReExportNamespace { .. } => ExportKind::ReExportNamespace,
            ExportBinding::ReExportAll { .. } => ExportKind::ReExportAll,
            ExportBinding::DefaultAssignment { .. } => ExportKind::DefaultAssignment,
            ExportBinding::Declaration { .. } => ExportKind::Declaration,
        }
    }
}

/// Counts of export bindings by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub local_named: usize,
    pub reexport_named: usize,
    pub reexport_namespace: usize,
    pub reexport_all: usize,
    pub default_assignments: usize,
    pub declarations: usize,
}

impl ExportStats {
    pub fn collect<'a>(exports: impl IntoIterator<Item = &'a ExportBinding>) -> Self {
        let mut stats = ExportStats::default();
        for binding in exports {
            match binding.kind() {
                ExportKind::LocalNamed => stats.local_named += 1,
                ExportKind::ReExportNamed => stats.reexport_named += 1,
                ExportKind::ReExportNamespace => stats.reexport_namespace += 1,
                ExportKind::ReExportAll => stats.reexport_all += 1,
                ExportKind::DefaultAssignment => stats.default_assignments += 1,
                ExportKind::Declaration => stats.declarations += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.local_named
            + self.reexport_named
            + self.reexport_namespace
            + self.reexport_all
            + self.default_assignments
            + self.declarations
    }
}

//! Import bindings collected from a module's top-level import declarations.

/// How an imported local name is bound to the source module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import Foo from 'mod'`
    Default,
    /// `import { original as local } from 'mod'`; carries `original`.
    Named(String),
    /// `import * as ns from 'mod'`
    Namespace,
}

/// A single local name introduced by an import declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportBinding {
    /// Name bound in the importing file
    pub local_name: String,
    /// Module specifier text, exactly as written
    pub module_specifier: String,
    pub kind: ImportKind,
}

impl ImportBinding {
    pub fn default_import(local_name: impl Into<String>, module_specifier: impl Into<String>) -> Self {
        ImportBinding {
            local_name: local_name.into(),
            module_specifier: module_specifier.into(),
            kind: ImportKind::Default,
        }
    }

    pub fn named(
        local_name: impl Into<String>,
        original_name: impl Into<String>,
        module_specifier: impl Into<String>,
    ) -> Self {
        ImportBinding {
            local_name: local_name.into(),
            module_specifier: module_specifier.into(),
            kind: ImportKind::Named(original_name.into()),
        }
    }

    pub fn namespace(local_name: impl Into<String>, module_specifier: impl Into<String>) -> Self {
        ImportBinding {
            local_name: local_name.into(),
            module_specifier: module_specifier.into(),
            kind: ImportKind::Namespace,
        }
    }

    /// The name this binding refers to inside the source module: the
    /// original name of a named import, `default` for a default import.
    /// Namespace imports refer to the module as a whole and have none.
    pub fn imported_name(&self) -> Option<&str> {
        match &self.kind {
            ImportKind::Default => Some("default"),
            ImportKind::Named(original) => Some(original),
            ImportKind::Namespace => None,
        }
    }
}

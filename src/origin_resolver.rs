//! Symbol origin resolution.
//!
//! Given a symbol imported into a file, walks the import/export graph until
//! the file that ultimately defines the symbol is found:
//!
//! ```text
//! Home.ts         import { Header } from './widgets'
//! widgets.ts      export { HeaderImpl as Header } from './header-impl'
//! header-impl.ts  export { default as HeaderImpl } from './Header.vue'
//! Header.vue      <- leaf artifact, never parsed
//! ```
//!
//! A [`ResolutionSession`] owns the per-session state: the module resolver
//! (with its specifier cache), the parsed module tables, and the stack of
//! (file, symbol) pairs currently being resolved, which turns cyclic
//! re-export graphs into [`Origin::Cycle`] instead of unbounded recursion.

use crate::exports::ExportBinding;
use crate::module_resolver::ModuleResolver;
use crate::module_table::{ModuleTable, build_module_table};
use crate::project_config::ProjectConfig;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Outcome of resolving a symbol to its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Absolute path of the defining file or leaf artifact
    Found(PathBuf),
    Unresolved,
    /// Resolution re-entered `symbol` in `path` while already resolving it
    Cycle { path: PathBuf, symbol: String },
}

impl Origin {
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Origin::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Files read and parsed into module tables
    pub files_parsed: usize,
    /// Module table requests served from the cache
    pub cache_hits: usize,
    /// `resolve_origin` calls, including recursive ones
    pub hops: usize,
    pub cycles: usize,
}

/// Per-session resolution state over one read-only [`ProjectConfig`].
pub struct ResolutionSession<'cfg> {
    config: &'cfg ProjectConfig,
    resolver: ModuleResolver,
    tables: FxHashMap<PathBuf, Rc<ModuleTable>>,
    active: FxHashSet<(PathBuf, String)>,
    stats: SessionStats,
}

impl<'cfg> ResolutionSession<'cfg> {
    pub fn new(config: &'cfg ProjectConfig) -> Self {
        ResolutionSession {
            config,
            resolver: ModuleResolver::new(config),
            tables: FxHashMap::default(),
            active: FxHashSet::default(),
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &'cfg ProjectConfig {
        self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Module table of `path`, parsed at most once per session.
    pub fn module_table(&mut self, path: &Path) -> Rc<ModuleTable> {
        if let Some(table) = self.tables.get(path) {
            self.stats.cache_hits += 1;
            return Rc::clone(table);
        }
        let table = Rc::new(build_module_table(path));
        self.stats.files_parsed += 1;
        self.tables.insert(path.to_path_buf(), Rc::clone(&table));
        table
    }

    /// Resolve `symbol_name`, imported from `module_specifier` inside
    /// `current_file`, to the file it originates from.
    pub fn resolve_origin(
        &mut self,
        symbol_name: &str,
        current_file: &Path,
        module_specifier: &str,
    ) -> Origin {
        self.stats.hops += 1;
        let resolved = match self.resolver.resolve_from_file(module_specifier, current_file) {
            Ok(resolved) => resolved,
            Err(failure) => {
                tracing::debug!(symbol = symbol_name, %failure, "unresolved specifier");
                return Origin::Unresolved;
            }
        };

        // Leaf artifacts are terminal and never parsed.
        if resolved.is_leaf {
            return Origin::Found(resolved.resolved_path);
        }

        let module_path = resolved.resolved_path;
        let key = (module_path.clone(), symbol_name.to_string());
        if !self.active.insert(key.clone()) {
            self.stats.cycles += 1;
            tracing::debug!(
                symbol = symbol_name,
                file = %module_path.display(),
                "re-export cycle detected"
            );
            return Origin::Cycle {
                path: module_path,
                symbol: symbol_name.to_string(),
            };
        }

        tracing::trace!(symbol = symbol_name, file = %module_path.display(), "searching module");
        let origin = self.resolve_in_module(symbol_name, &module_path);
        self.active.remove(&key);
        origin
    }

    /// Search the exports of `module_path` for `symbol_name`.
    fn resolve_in_module(&mut self, symbol_name: &str, module_path: &Path) -> Origin {
        let table = self.module_table(module_path);
        let exports = &table.exports;

        // a. `export default local`
        let default_assignment = best_match(
            exports.iter().filter_map(|binding| match binding {
                ExportBinding::DefaultAssignment { local_name } => Some(local_name),
                _ => None,
            }),
            |_| symbol_name == "default",
            |local_name| *local_name == symbol_name,
        );
        if let Some(local_name) = default_assignment {
            return self.follow_local(local_name, module_path, &table);
        }

        // b. `export { local as exported } from 'mod'`
        let reexport = best_match(
            exports.iter().filter_map(|binding| match binding {
                ExportBinding::ReExportNamed {
                    exported_name,
                    local_name,
                    from_module,
                } => Some((exported_name, local_name, from_module)),
                _ => None,
            }),
            |(exported_name, _, _)| *exported_name == symbol_name,
            |(_, local_name, _)| *local_name == symbol_name,
        );
        if let Some((_, local_name, from_module)) = reexport {
            // A leaf source module terminates in the recursive call before
            // anything is parsed.
            return self.resolve_origin(local_name, module_path, from_module);
        }

        // c. `export * as exported from 'mod'` points straight at its module.
        let namespace = exports.iter().find_map(|binding| match binding {
            ExportBinding::ReExportNamespace {
                exported_name,
                from_module,
            } if exported_name == symbol_name => Some(from_module),
            _ => None,
        });
        if let Some(from_module) = namespace {
            return self.resolve_module(from_module, module_path);
        }

        // d. `export { local as exported }`
        let local_export = best_match(
            exports.iter().filter_map(|binding| match binding {
                ExportBinding::LocalNamed {
                    exported_name,
                    local_name,
                } => Some((exported_name, local_name)),
                _ => None,
            }),
            |(exported_name, _)| *exported_name == symbol_name,
            |(_, local_name)| *local_name == symbol_name,
        );
        if let Some((_, local_name)) = local_export {
            return self.follow_local(local_name, module_path, &table);
        }

        // e. `export class Foo {}`: defined right here.
        let declared = exports.iter().any(|binding| {
            matches!(binding, ExportBinding::Declaration { name } if name == symbol_name)
        });
        if declared {
            return Origin::Found(module_path.to_path_buf());
        }

        // `export * from 'mod'`, first hit wins.
        let mut cycle = None;
        for from_module in table.reexport_all_sources() {
            match self.resolve_origin(symbol_name, module_path, from_module) {
                found @ Origin::Found(_) => return found,
                detected @ Origin::Cycle { .. } => {
                    cycle.get_or_insert(detected);
                }
                Origin::Unresolved => {}
            }
        }
        cycle.unwrap_or(Origin::Unresolved)
    }

    /// Follow a name bound in `module_path` through the file's own imports.
    fn follow_local(&mut self, local_name: &str, module_path: &Path, table: &ModuleTable) -> Origin {
        let Some(import) = table.import_for(local_name) else {
            if table.declares(local_name) {
                return Origin::Found(module_path.to_path_buf());
            }
            tracing::debug!(
                symbol = local_name,
                file = %module_path.display(),
                "exported name is neither imported nor declared"
            );
            return Origin::Unresolved;
        };

        match import.imported_name() {
            Some(imported_name) => {
                self.resolve_origin(imported_name, module_path, &import.module_specifier)
            }
            None => self.resolve_module(&import.module_specifier, module_path),
        }
    }

    /// The resolved path of a module itself, for namespace bindings.
    pub fn resolve_module(&mut self, specifier: &str, current_file: &Path) -> Origin {
        match self.resolver.resolve_from_file(specifier, current_file) {
            Ok(resolved) => Origin::Found(resolved.resolved_path),
            Err(_) => Origin::Unresolved,
        }
    }
}

/// Pick the first candidate matching on its public name, else the first
/// matching on its local name. Exported names take priority over local ones.
fn best_match<T, I>(
    candidates: I,
    public_match: impl Fn(&T) -> bool,
    local_match: impl Fn(&T) -> bool,
) -> Option<T>
where
    I: Iterator<Item = T> + Clone,
{
    candidates
        .clone()
        .find(|candidate| public_match(candidate))
        .or_else(|| candidates.into_iter().find(|candidate| local_match(candidate)))
}

/// Resolve one symbol in a fresh session.
pub fn resolve_origin(
    symbol_name: &str,
    current_file: &Path,
    module_specifier: &str,
    config: &ProjectConfig,
) -> Origin {
    ResolutionSession::new(config).resolve_origin(symbol_name, current_file, module_specifier)
}

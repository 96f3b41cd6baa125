//! Registration extraction and component map building.
//!
//! A registration block is the `components` object of a class component's
//! decorator options (or of a default-exported options object):
//!
//! ```text
//! @Options({ components: { Header, Footer: AppFooter } })
//! export default class Home extends Vue {}
//! ```
//!
//! [`RegistrationExtractor`] harvests `public name -> local name` pairs from
//! it; [`build_component_map`] then resolves every local name through the
//! file's own imports to the file defining the component.

use crate::module_table::read_module_source;
use crate::origin_resolver::{Origin, ResolutionSession};
use crate::parser::parse_registrations;
use crate::project_config::ProjectConfig;
use crate::scanner::LanguageVariant;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Decorators whose options object is searched for `components`.
pub const DEFAULT_DECORATORS: [&str; 2] = ["Options", "Component"];

/// Public registration name -> absolute path of the defining file.
pub type ComponentMap = IndexMap<String, PathBuf>;

#[derive(Debug, Clone)]
pub struct RegistrationExtractor {
    decorators: Vec<String>,
}

impl Default for RegistrationExtractor {
    fn default() -> Self {
        RegistrationExtractor {
            decorators: DEFAULT_DECORATORS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl RegistrationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recognized decorator names.
    pub fn with_decorators<I, S>(mut self, decorators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decorators = decorators.into_iter().map(Into::into).collect();
        self
    }

    /// Registration entries of `path`. Unreadable or unscannable files have
    /// none.
    pub fn extract(&self, path: &Path) -> IndexMap<String, String> {
        match read_module_source(path) {
            Ok(source) => self.extract_from_source(&source, LanguageVariant::from_path(path)),
            Err(err) => {
                tracing::debug!(file = %path.display(), %err, "cannot read registration source");
                IndexMap::new()
            }
        }
    }

    pub fn extract_from_source(
        &self,
        source: &str,
        variant: LanguageVariant,
    ) -> IndexMap<String, String> {
        match parse_registrations(source, variant, &self.decorators) {
            // A repeated public name keeps its first position and last value,
            // like the object literal it came from.
            Ok(entries) => entries.into_iter().collect(),
            Err(err) => {
                tracing::debug!(%err, "cannot scan registration source");
                IndexMap::new()
            }
        }
    }
}

/// Build the component map of `path` with the default extractor in a fresh
/// session.
pub fn build_component_map(path: &Path, config: &ProjectConfig) -> ComponentMap {
    let mut session = ResolutionSession::new(config);
    build_component_map_with(&mut session, &RegistrationExtractor::default(), path)
}

/// Build the component map of `path`, omitting every entry that does not
/// resolve.
pub fn build_component_map_with(
    session: &mut ResolutionSession<'_>,
    extractor: &RegistrationExtractor,
    path: &Path,
) -> ComponentMap {
    let registrations = extractor.extract(path);
    let mut components = ComponentMap::with_capacity(registrations.len());

    for (public_name, local_name) in &registrations {
        let _span = tracing::debug_span!("component", name = %public_name).entered();
        match resolve_local(session, path, local_name) {
            Origin::Found(definition) => {
                tracing::debug!(local = %local_name, file = %definition.display(), "resolved");
                components.insert(public_name.clone(), definition);
            }
            Origin::Cycle { path: cycle_file, symbol } => {
                tracing::debug!(
                    local = %local_name,
                    cycle_file = %cycle_file.display(),
                    symbol,
                    "omitted, re-export cycle"
                );
            }
            Origin::Unresolved => {
                tracing::debug!(local = %local_name, "omitted, unresolved");
            }
        }
    }

    components
}

/// Resolve a name bound in `path` through that file's own imports.
fn resolve_local(session: &mut ResolutionSession<'_>, path: &Path, local_name: &str) -> Origin {
    let table = session.module_table(path);
    let Some(import) = table.import_for(local_name) else {
        if table.declares(local_name) {
            return Origin::Found(path.to_path_buf());
        }
        return Origin::Unresolved;
    };

    match import.imported_name() {
        Some(imported_name) => session.resolve_origin(imported_name, path, &import.module_specifier),
        // `import * as widgets` registers the module itself.
        None => session.resolve_module(&import.module_specifier, path),
    }
}

/// Definition of the component registered as `public_name` in `path`.
pub fn resolve_component(path: &Path, public_name: &str, config: &ProjectConfig) -> Option<PathBuf> {
    let mut session = ResolutionSession::new(config);
    resolve_component_with(&mut session, &RegistrationExtractor::default(), path, public_name)
}

/// Like [`resolve_component`], recognizing the decorators of `extractor`.
/// Only the requested entry is resolved.
pub fn resolve_component_with(
    session: &mut ResolutionSession<'_>,
    extractor: &RegistrationExtractor,
    path: &Path,
    public_name: &str,
) -> Option<PathBuf> {
    let local_name = extractor.extract(path).shift_remove(public_name)?;
    resolve_local(session, path, &local_name).into_path()
}

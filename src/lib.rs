//! vuenav: go-to-definition for Vue class-component registrations.
//!
//! Starting from a registration block such as
//! `@Options({ components: { Header } })`, the local symbol behind every
//! registered name is followed through imports, re-export chains and path
//! aliases to the file that defines it, stopping at the first `.vue` file.
//!
//! Layers, bottom up:
//! - [`scanner`] and [`parser`]: tokens and top-level import/export syntax
//! - [`module_table`]: per-file import/export bindings
//! - [`module_resolver`]: specifier -> path, with aliases from [`project_config`]
//! - [`origin_resolver`]: the recursive symbol origin search
//! - [`registration`]: registration blocks -> [`registration::ComponentMap`]
//! - [`definition`]: tag under the cursor -> definition file

pub mod span;
pub use span::Span;

pub mod scanner;
pub use scanner::{LanguageVariant, ScanError, SyntaxKind, Token};
#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod scanner_tests;

pub mod imports;
pub use imports::{ImportBinding, ImportKind};

pub mod exports;
pub use exports::{ExportBinding, ExportKind};

pub mod parser;
#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod parser_tests;

pub mod sfc;

pub mod module_table;
pub use module_table::{ModuleTable, build_module_table};

pub mod project_config;
pub use project_config::ProjectConfig;

pub mod module_resolver;
pub use module_resolver::{ModuleResolver, ResolvedModule, resolve_module_path};
#[cfg(test)]
#[path = "tests/module_resolver_tests.rs"]
mod module_resolver_tests;

pub mod origin_resolver;
pub use origin_resolver::{Origin, ResolutionSession, SessionStats, resolve_origin};
#[cfg(test)]
#[path = "tests/origin_resolver_tests.rs"]
mod origin_resolver_tests;

pub mod registration;
pub use registration::{ComponentMap, RegistrationExtractor, build_component_map};
#[cfg(test)]
#[path = "tests/registration_tests.rs"]
mod registration_tests;

pub mod definition;

pub mod cli;

pub mod tracing_config;

// Shared filesystem fixtures
#[cfg(test)]
#[path = "tests/test_fixtures.rs"]
pub mod test_fixtures;

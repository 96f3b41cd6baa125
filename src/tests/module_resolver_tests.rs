//! Tests for module_resolver.rs

use std::path::{Path, PathBuf};

use crate::module_resolver::*;
use crate::project_config::ProjectConfig;
use crate::test_fixtures::TestProject;

fn resolve(config: &ProjectConfig, from_dir: &Path, specifier: &str) -> ResolvedModule {
    ModuleResolver::new(config)
        .resolve(specifier, from_dir)
        .expect("specifier should resolve")
}

#[test]
fn test_normalize_path() {
    assert_eq!(
        normalize_path(Path::new("/p/src/./views/../widgets/index.ts")),
        PathBuf::from("/p/src/widgets/index.ts")
    );
    assert_eq!(normalize_path(Path::new("/p/../../x")), PathBuf::from("/x"));
}

#[test]
fn test_relative_specifier_probes_extensions() {
    let project = TestProject::new();
    let widgets = project.write("src/widgets.ts", "export {}");
    let config = project.config();

    let resolved = resolve(&config, &project.path("src/views"), "../widgets");
    assert_eq!(resolved.resolved_path, widgets);
    assert_eq!(resolved.kind, ResolutionKind::Relative);
    assert!(!resolved.is_leaf);
}

#[test]
fn test_extension_order_prefers_ts_over_js() {
    let project = TestProject::new();
    project.write("a.js", "");
    let ts = project.write("a.ts", "");
    let resolved = resolve(&project.config(), project.root(), "./a");
    assert_eq!(resolved.resolved_path, ts);
}

#[test]
fn test_directory_index() {
    let project = TestProject::new();
    let index = project.write("components/index.tsx", "");
    let resolved = resolve(&project.config(), project.root(), "./components");
    assert_eq!(resolved.resolved_path, index);
}

#[test]
fn test_dotted_file_name_keeps_its_extension() {
    let project = TestProject::new();
    let file = project.write("store.module.ts", "");
    let resolved = resolve(&project.config(), project.root(), "./store.module");
    assert_eq!(resolved.resolved_path, file);
}

#[test]
fn test_js_specifier_maps_to_typescript_source() {
    let project = TestProject::new();
    let util = project.write("util.ts", "");
    let view = project.write("View.tsx", "");
    let plain = project.write("plain.js", "");
    let config = project.config();

    assert_eq!(resolve(&config, project.root(), "./util.js").resolved_path, util);
    assert_eq!(resolve(&config, project.root(), "./View.jsx").resolved_path, view);
    // A real `.js` file with no TypeScript source is used as written.
    assert_eq!(resolve(&config, project.root(), "./plain.js").resolved_path, plain);
}

#[test]
fn test_leaf_is_returned_without_probing() {
    let project = TestProject::new();
    let config = project.config();
    // The leaf does not exist on disk; it is still the answer.
    let resolved = resolve(&config, &project.path("src"), "./Header.vue");
    assert_eq!(resolved.resolved_path, project.path("src/Header.vue"));
    assert!(resolved.is_leaf);
}

#[test]
fn test_configured_leaf_extension() {
    let project = TestProject::new();
    let config = project.config().with_leaf_extension("view");
    let resolved = resolve(&config, project.root(), "./Header.view");
    assert!(resolved.is_leaf);
    assert!(!resolve(&config, project.root(), "./Header.vue").is_leaf);
}

#[test]
fn test_missing_file_returns_unprobed_candidate() {
    let project = TestProject::new();
    let resolved = resolve(&project.config(), project.root(), "./missing");
    assert_eq!(resolved.resolved_path, project.path("missing"));
}

#[test]
fn test_alias_wildcard() {
    let project = TestProject::new();
    let header = project.write("src/components/Header.ts", "");
    let config = project.config().with_alias("@/*", ["src/*"]);

    let resolved = resolve(&config, &project.path("deep/nested"), "@/components/Header");
    assert_eq!(resolved.resolved_path, header);
    assert_eq!(resolved.kind, ResolutionKind::Alias("@/*".into()));
}

#[test]
fn test_first_declared_alias_wins() {
    let project = TestProject::new();
    let config = project
        .config()
        .with_alias("@/*", ["src/*"])
        .with_alias("@/components/*", ["lib/*"]);

    let resolved = resolve(&config, project.root(), "@/components/Header.vue");
    assert_eq!(resolved.resolved_path, project.path("src/components/Header.vue"));
}

#[test]
fn test_only_first_alias_target_is_used() {
    let project = TestProject::new();
    project.write("fallback/util.ts", "");
    let config = project.config().with_alias("~/*", ["primary/*", "fallback/*"]);

    let resolved = resolve(&config, project.root(), "~/util");
    assert_eq!(resolved.resolved_path, project.path("primary/util"));
}

#[test]
fn test_alias_takes_precedence_over_relative() {
    let project = TestProject::new();
    let config = project.config().with_alias("./shared", ["lib/shared.vue"]);
    let resolved = resolve(&config, &project.path("src"), "./shared");
    assert_eq!(resolved.resolved_path, project.path("lib/shared.vue"));
    assert!(resolved.is_leaf);
}

#[test]
fn test_absolute_specifier() {
    let project = TestProject::new();
    let file = project.write("abs/mod.ts", "");
    let specifier = project.path("abs/mod");
    let resolved = resolve(&project.config(), Path::new("/elsewhere"), specifier.to_str().unwrap());
    assert_eq!(resolved.resolved_path, file);
    assert_eq!(resolved.kind, ResolutionKind::Absolute);
}

#[test]
fn test_bare_and_empty_specifiers_fail() {
    let config = ProjectConfig::new("/project");
    let mut resolver = ModuleResolver::new(&config);
    assert_eq!(
        resolver.resolve("vue", Path::new("/project/src")),
        Err(ResolutionFailure::BareSpecifier {
            specifier: "vue".into()
        })
    );
    assert_eq!(
        resolver.resolve("", Path::new("/project/src")),
        Err(ResolutionFailure::EmptySpecifier)
    );
}

#[test]
fn test_resolution_is_cached_per_session() {
    let project = TestProject::new();
    let config = project.config();
    let mut resolver = ModuleResolver::new(&config);

    let first = resolver.resolve("./late", project.root()).unwrap();
    assert_eq!(first.resolved_path, project.path("late"));

    // A file created mid-session is not seen until the cache is cleared.
    let late = project.write("late.ts", "");
    let cached = resolver.resolve("./late", project.root()).unwrap();
    assert_eq!(cached.resolved_path, project.path("late"));

    resolver.clear_cache();
    let fresh = resolver.resolve("./late", project.root()).unwrap();
    assert_eq!(fresh.resolved_path, late);
}

#[test]
fn test_resolve_from_file_uses_containing_directory() {
    let project = TestProject::new();
    let target = project.write("src/b.ts", "");
    let config = project.config();
    let mut resolver = ModuleResolver::new(&config);
    let resolved = resolver
        .resolve_from_file("./b", &project.path("src/a.ts"))
        .unwrap();
    assert_eq!(resolved.resolved_path, target);
    assert_eq!(resolved.original_specifier, "./b");
}

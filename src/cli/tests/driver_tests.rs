use clap::Parser;
use std::path::Path;
use tempfile::TempDir;

use super::args::CliArgs;
use super::driver::{collect_input_files, run};

fn write_file(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// A small aliased project with one class component per view.
fn create_test_project(dir: &Path) {
    write_file(
        dir,
        "tsconfig.json",
        r#"{
  // aliases
  "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["src/*"] } },
}"#,
    );
    write_file(
        dir,
        "src/views/Home.vue",
        r#"<template><app-header /></template>
<script lang="ts">
import { Options, Vue } from 'vue-class-component'
import { AppHeader } from '@/components'
@Options({ components: { AppHeader } })
export default class Home extends Vue {}
</script>
"#,
    );
    write_file(
        dir,
        "src/views/About.ts",
        "import Card from '@/components/Card.vue'\n@Options({ components: { Card } })\nexport default class About extends Vue {}\n",
    );
    write_file(
        dir,
        "src/components/index.ts",
        "export { default as AppHeader } from './AppHeader.vue'\n",
    );
    write_file(dir, "src/views/types.d.ts", "export declare const x: number\n");
    write_file(dir, "src/views/node_modules/dep/index.ts", "");
    write_file(dir, "src/views/.cache/Cached.ts", "");
}

fn args(items: &[&str]) -> CliArgs {
    let mut argv = vec!["vuenav"];
    argv.extend_from_slice(items);
    CliArgs::try_parse_from(argv).expect("args should parse")
}

#[test]
fn collects_sources_sorted_and_skips_hidden_dirs() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    let files = collect_input_files(&[temp.path().join("src/views")]).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|f| f.strip_prefix(temp.path()).unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["src/views/About.ts", "src/views/Home.vue"]);

    assert!(collect_input_files(&[temp.path().join("missing")]).is_err());
}

#[test]
fn text_report_lists_components_per_file() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    let result = run(&args(&["src/views"]), temp.path()).expect("run should succeed");
    assert!(result.success);
    let root = temp.path().display().to_string();
    let expected = format!(
        "{root}/src/views/About.ts\n  Card -> {root}/src/components/Card.vue\n\
         {root}/src/views/Home.vue\n  AppHeader -> {root}/src/components/AppHeader.vue\n"
    );
    assert_eq!(result.output, expected);
}

#[test]
fn json_report_keeps_input_order() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    let result = run(
        &args(&["--format", "json", "src/views/Home.vue", "src/views/About.ts"]),
        temp.path(),
    )
    .unwrap();
    let reports: serde_json::Value = serde_json::from_str(&result.output).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0]["file"].as_str().unwrap().ends_with("Home.vue"));
    assert!(
        reports[0]["components"]["AppHeader"]
            .as_str()
            .unwrap()
            .ends_with("src/components/AppHeader.vue")
    );
    assert!(reports[1]["components"]["Card"].as_str().is_some());
}

#[test]
fn tag_lookup_reports_definition_or_failure() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    let found = run(&args(&["--tag", "app-header", "src/views/Home.vue"]), temp.path()).unwrap();
    assert!(found.success);
    assert_eq!(
        found.output.trim_end(),
        temp.path().join("src/components/AppHeader.vue").display().to_string()
    );

    let missing = run(&args(&["--tag", "nope", "src/views/Home.vue"]), temp.path()).unwrap();
    assert!(!missing.success);
    assert!(missing.output.is_empty());
}

#[test]
fn tag_lookup_uses_configured_decorators() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());
    write_file(
        temp.path(),
        "src/views/Page.ts",
        "import Header from '../Header.vue'\n@Page({ components: { Header } })\nexport default class P {}\n",
    );

    let listed = run(&args(&["--decorators", "Page", "src/views/Page.ts"]), temp.path()).unwrap();
    assert!(listed.output.contains("Header -> "));

    let found = run(
        &args(&["--decorators", "Page", "--tag", "header", "src/views/Page.ts"]),
        temp.path(),
    )
    .unwrap();
    assert!(found.success);
    assert_eq!(
        found.output.trim_end(),
        temp.path().join("src/Header.vue").display().to_string()
    );

    // The default decorators do not recognize `@Page`.
    let default = run(&args(&["--tag", "header", "src/views/Page.ts"]), temp.path()).unwrap();
    assert!(!default.success);
}

#[test]
fn missing_explicit_project_is_an_error() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());
    let err = run(&args(&["--project", "nope.json", "src"]), temp.path()).unwrap_err();
    assert!(format!("{err:#}").contains("nope.json"));
}

#[test]
fn without_config_aliases_do_not_resolve() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());
    std::fs::remove_file(temp.path().join("tsconfig.json")).unwrap();

    let result = run(&args(&["src/views/About.ts"]), temp.path()).unwrap();
    assert!(result.output.is_empty());
}

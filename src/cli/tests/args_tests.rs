use clap::Parser;
use std::path::PathBuf;

use super::args::{CliArgs, OutputFormat};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["vuenav", "src"]).expect("default args should parse");

    assert!(args.project.is_none());
    assert!(args.root.is_none());
    assert!(args.tag.is_none());
    assert_eq!(args.format, OutputFormat::Text);
    assert_eq!(args.leaf_extension, "vue");
    assert_eq!(args.decorators, vec!["Options", "Component"]);
    assert_eq!(args.paths, vec![PathBuf::from("src")]);
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "vuenav",
        "--project",
        "configs/tsconfig.json",
        "--root",
        "app",
        "--format",
        "JSON",
        "--leafExtension",
        "view",
        "--decorators",
        "Page,Component",
        "src/views",
        "src/Home.ts",
    ])
    .expect("flagged args should parse");

    assert_eq!(
        args.project.as_deref(),
        Some(std::path::Path::new("configs/tsconfig.json"))
    );
    assert_eq!(args.root.as_deref(), Some(std::path::Path::new("app")));
    assert_eq!(args.format, OutputFormat::Json);
    assert_eq!(args.leaf_extension, "view");
    assert_eq!(args.decorators, vec!["Page", "Component"]);
    assert_eq!(
        args.paths,
        vec![PathBuf::from("src/views"), PathBuf::from("src/Home.ts")]
    );
}

#[test]
fn parses_tag_lookup() {
    let args = CliArgs::try_parse_from(["vuenav", "-t", "my-header", "Home.vue"])
        .expect("tag args should parse");
    assert_eq!(args.tag.as_deref(), Some("my-header"));
}

#[test]
fn requires_an_input_path() {
    assert!(CliArgs::try_parse_from(["vuenav"]).is_err());
    assert!(CliArgs::try_parse_from(["vuenav", "--format", "yaml", "src"]).is_err());
}

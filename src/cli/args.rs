use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the vuenav binary.
#[derive(Parser, Debug)]
#[command(
    name = "vuenav",
    version,
    about = "Resolve Vue class-component registrations to their defining files"
)]
pub struct CliArgs {
    /// Path to tsconfig.json/jsconfig.json or a directory containing it.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// Project root; defaults to the current directory.
    #[arg(short = 'r', long = "root")]
    pub root: Option<PathBuf>,

    /// Print the definition of a single component tag (`my-header` or
    /// `MyHeader`) registered in the first input file.
    #[arg(short = 't', long = "tag")]
    pub tag: Option<String>,

    /// Output format for component maps.
    #[arg(long, value_enum, ignore_case = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Extension of files that terminate resolution.
    #[arg(long = "leafExtension", alias = "leaf-extension", default_value = "vue")]
    pub leaf_extension: String,

    /// Decorator names whose options carry `components`.
    #[arg(long, value_delimiter = ',', default_values_t = ["Options".to_string(), "Component".to_string()])]
    pub decorators: Vec<String>,

    /// Files or directories to scan.
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

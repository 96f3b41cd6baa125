#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use vuenav::cli::args::CliArgs;
use vuenav::cli::driver;

fn main() -> Result<()> {
    // Only active when VUENAV_LOG or RUST_LOG is set.
    vuenav::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let result = driver::run(&args, &cwd)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(result.output.as_bytes())
        .context("failed to write output")?;
    stdout.flush().context("failed to write output")?;

    if !result.success {
        if let Some(tag) = &args.tag {
            eprintln!("no definition found for <{tag}>");
        }
        std::process::exit(1);
    }
    Ok(())
}

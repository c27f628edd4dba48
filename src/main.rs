//! Laravel OpenAPI Rules - Command-line tool for inspecting cached validation analyses.
//!
//! The Laravel side of the pipeline writes one analysis file per form request:
//! the parameters it found, the conditional rule sets it traced through
//! `rules()`, and the attribute labels and messages. This binary loads those
//! files, upgrades legacy rule-set entries, reports inconsistencies, and prints
//! the normalised result, the rules active for one HTTP method, or the OpenAPI
//! fragments generated from them.
//!
//! # Usage
//!
//! ```bash
//! laravel-openapi-rules [OPTIONS] <INPUT_PATH>
//! ```
//!
//! # Examples
//!
//! Normalise every cached analysis to YAML:
//! ```bash
//! laravel-openapi-rules ./storage/app/openapi-cache -o analyses.yaml
//! ```
//!
//! Show the rules applied to `PUT` requests:
//! ```bash
//! laravel-openapi-rules ./storage/app/openapi-cache -m put -f json
//! ```
//!
//! Generate OpenAPI schemas with verbose logging:
//! ```bash
//! laravel-openapi-rules ./storage/app/openapi-cache --schema -v
//! ```

use anyhow::Result;
use clap::Parser;
use laravel_openapi_rules::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Laravel OpenAPI Rules starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("Analysis inspection completed successfully");

    Ok(())
}

use crate::openapi::{OpenApiComponents, OpenApiOperation, OpenApiResponse};
use crate::route::HttpMethod;
use crate::scanner::FileScanner;
use crate::schema_generator::SchemaGenerator;
use crate::serializer::{load_analysis, serialize_json, serialize_yaml, write_to_file};
use crate::validation::{RuleMap, ValidationAnalysisResult};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Laravel OpenAPI Rules - Inspect cached validation analyses of Laravel form requests
#[derive(Parser, Debug)]
#[command(name = "laravel-openapi-rules")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a cached analysis file or a directory of them
    #[arg(value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Only print the rules active for this HTTP method
    #[arg(short = 'm', long = "method", value_name = "METHOD", conflicts_with = "schema")]
    pub method: Option<String>,

    /// Emit OpenAPI parameters, request bodies and component schemas
    #[arg(long = "schema")]
    pub schema: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// OpenAPI fragments generated in `--schema` mode
#[derive(Debug, Serialize)]
pub struct SchemaOutput {
    /// File stem -> operation fragment
    pub operations: IndexMap<String, OpenApiOperation>,
    #[serde(skip_serializing_if = "OpenApiComponents::is_empty")]
    pub components: OpenApiComponents,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }

    if let Some(method) = &args.method {
        method.parse::<HttpMethod>()?;
    }

    info!("Input path: {}", args.input_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if let Some(ref method) = args.method {
        info!("Method filter: {}", method.to_ascii_uppercase());
    }

    Ok(args)
}

/// Key an analysis by its file name without extension
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Scan, load and check every analysis under the input path.
///
/// Files that fail to load are skipped with a warning.
pub fn load_analyses(input_path: &Path) -> Result<IndexMap<String, ValidationAnalysisResult>> {
    info!("Scanning {}...", input_path.display());
    let scan_result = FileScanner::new(input_path.to_path_buf()).scan()?;
    info!("Found {} analysis files", scan_result.analysis_files.len());

    if scan_result.analysis_files.is_empty() {
        anyhow::bail!("No analysis files found in {}", input_path.display());
    }

    let mut analyses = IndexMap::new();
    for path in &scan_result.analysis_files {
        let analysis = match load_analysis(path) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                continue;
            }
        };

        let key = file_stem(path);
        for field in analysis.fields_without_parameters() {
            warn!("{}: field '{}' has rules but no parameter definition", key, field);
        }
        if !analysis.conditional_rules.condition_flag_is_consistent() {
            warn!("{}: has_conditions does not match its rule sets", key);
        }

        if analyses.insert(key.clone(), analysis).is_some() {
            warn!("Duplicate analysis name '{}', keeping {}", key, path.display());
        }
    }

    if analyses.is_empty() {
        anyhow::bail!("No analysis files could be loaded");
    }

    Ok(analyses)
}

/// Build an operation fragment for every analysis, sharing one component registry
pub fn build_schema_output(analyses: &IndexMap<String, ValidationAnalysisResult>) -> SchemaOutput {
    let mut schema_gen = SchemaGenerator::new();
    let mut operations = IndexMap::new();

    for (name, analysis) in analyses {
        debug!("Generating schemas for {}", name);
        let parameters = analysis
            .parameters
            .iter()
            .filter_map(|param| schema_gen.generate_parameter(param))
            .collect();

        let mut operation = OpenApiOperation::new(name.clone())
            .with_parameters(parameters)
            .with_response("422", OpenApiResponse::new("Validation error"));
        if let Some(body) = schema_gen.generate_request_body(analysis) {
            operation = operation.with_request_body(body);
        }
        operations.insert(name.clone(), operation);
    }

    SchemaOutput {
        operations,
        components: OpenApiComponents {
            schemas: schema_gen.get_schemas().clone(),
            ..OpenApiComponents::default()
        },
    }
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(value),
        OutputFormat::Json => serialize_json(value),
    }
}

/// Produce the serialized output for the given arguments
pub fn generate(args: &CliArgs) -> Result<String> {
    let analyses = load_analyses(&args.input_path)?;

    info!("Serializing to {:?} format...", args.output_format);
    if let Some(method) = &args.method {
        let by_method: IndexMap<&str, RuleMap> = analyses
            .iter()
            .map(|(name, analysis)| {
                (name.as_str(), analysis.conditional_rules.active_rules_for_http_method(method))
            })
            .collect();
        serialize(&by_method, args.output_format)
    } else if args.schema {
        serialize(&build_schema_output(&analyses), args.output_format)
    } else {
        serialize(&analyses, args.output_format)
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting analysis inspection...");

    let content = generate(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote output to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Done!");
    info!("Summary:");
    info!("  - Input: {}", args.input_path.display());
    info!("  - Format: {:?}", args.output_format);
    if let Some(method) = &args.method {
        info!("  - Method: {}", method.to_ascii_uppercase());
    }
    info!("  - Schema mode: {}", args.schema);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(input_path: PathBuf) -> CliArgs {
        CliArgs {
            input_path,
            output_format: OutputFormat::Json,
            output_path: None,
            method: None,
            schema: false,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_args_rejects_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(parse_args_from_parsed(args(temp_dir.path().join("missing"))).is_err());
    }

    #[test]
    fn test_parse_args_rejects_unknown_method() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli_args = args(temp_dir.path().to_path_buf());
        cli_args.method = Some("TRACE".to_string());
        assert!(parse_args_from_parsed(cli_args).is_err());

        let mut cli_args = args(temp_dir.path().to_path_buf());
        cli_args.method = Some("post".to_string());
        assert!(parse_args_from_parsed(cli_args).is_ok());
    }

    #[test]
    fn test_clap_method_conflicts_with_schema() {
        let result = CliArgs::try_parse_from(["laravel-openapi-rules", ".", "-m", "POST", "--schema"]);
        assert!(result.is_err());

        let parsed = CliArgs::try_parse_from(["laravel-openapi-rules", "cache", "-f", "json", "-v"]).unwrap();
        assert_eq!(parsed.input_path, PathBuf::from("cache"));
        assert!(matches!(parsed.output_format, OutputFormat::Json));
        assert!(parsed.verbose);
    }

    #[test]
    fn test_load_analyses_empty_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_analyses(temp_dir.path()).is_err());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("cache/StoreUserRequest.json")), "StoreUserRequest");
    }
}

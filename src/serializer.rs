//! Serialization module for reading and writing validation analyses.
//!
//! This module serializes any of the crate's DTOs (or the OpenAPI fragments
//! built from them) to YAML or JSON, loads cached analyses back from disk,
//! and writes output files.

use crate::validation::ValidationAnalysisResult;
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a value to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use laravel_openapi_rules::serializer::serialize_yaml;
/// use laravel_openapi_rules::validation::ConditionResult;
///
/// let yaml = serialize_yaml(&ConditionResult::default_else()).unwrap();
/// assert!(yaml.contains("type: else"));
/// ```
pub fn serialize_yaml<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing to YAML");
    serde_yaml::to_string(value).context("Failed to serialize to YAML")
}

/// Serializes a value to JSON format with pretty printing.
///
/// The output is formatted with indentation for readability, making it suitable
/// for human review and version control.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing to JSON");
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// Loads a cached validation analysis.
///
/// `.yaml`/`.yml` files are read as YAML, everything else as JSON. Legacy
/// rule-set entries are upgraded and unknown condition types rejected, as in
/// [`ValidationAnalysisResult::from_value`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a valid analysis.
pub fn load_analysis(path: &Path) -> Result<ValidationAnalysisResult> {
    debug!("Loading analysis from {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    };

    let analysis = ValidationAnalysisResult::from_value(&value)
        .with_context(|| format!("Invalid validation analysis in {}", path.display()))?;

    debug!(
        "Loaded {} parameters and {} rule sets from {}",
        analysis.count(),
        analysis.conditional_rules.count(),
        path.display()
    );
    Ok(analysis)
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ParameterDefinition, ParameterLocation};
    use crate::validation::{ConditionResult, ConditionalRule, ConditionalRuleSet, RuleMap, RuleValue};
    use tempfile::TempDir;

    /// Helper function to create a small analysis for testing
    fn create_test_analysis() -> ValidationAnalysisResult {
        let rule_set = ConditionalRuleSet::merge(vec![ConditionalRule::new(
            vec![ConditionResult::http_method(Some("POST".to_string()), "isMethod('POST')")],
            RuleMap::from([("title".to_string(), RuleValue::from("required|string"))]),
        )]);
        ValidationAnalysisResult::new(
            vec![ParameterDefinition::new("title", ParameterLocation::Body, true, "string")],
            rule_set,
        )
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_analysis()).unwrap();

        assert!(yaml.contains("parameters:"));
        assert!(yaml.contains("conditional_rules:"));
        assert!(yaml.contains("rules_sets:"));
        assert!(yaml.contains("type: http_method"));
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_analysis()).unwrap();

        assert!(json.contains('\n'));
        assert!(json.contains("  "));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["conditional_rules"]["has_conditions"], true);
    }

    #[test]
    fn test_load_json_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("StorePostRequest.json");
        let analysis = create_test_analysis();

        write_to_file(&serialize_json(&analysis).unwrap(), &path).unwrap();

        assert_eq!(load_analysis(&path).unwrap(), analysis);
    }

    #[test]
    fn test_load_yaml_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("StorePostRequest.yml");
        let analysis = create_test_analysis();

        write_to_file(&serialize_yaml(&analysis).unwrap(), &path).unwrap();

        assert_eq!(load_analysis(&path).unwrap(), analysis);
    }

    #[test]
    fn test_load_rejects_invalid_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_analysis(&path).is_err());

        let path = temp_dir.path().join("bad_condition.json");
        fs::write(
            &path,
            r#"{"conditional_rules": {"rules_sets": [{"conditions": [{"type": "nope"}]}]}}"#,
        )
        .unwrap();
        let err = load_analysis(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("nope"), "{:#}", err);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_analysis(&temp_dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("out.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}

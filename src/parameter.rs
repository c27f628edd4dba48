//! Request parameters derived from Laravel validation rules.
//!
//! A [`ParameterDefinition`] is what the validation analyzer hands to the
//! OpenAPI side for every validated field: its location, type, whether it is
//! required, and the richer facts hidden in the rules (enum classes, file
//! constraints, conditional `required_*` macros).

use crate::validation::RuleValue;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Laravel rule names that make a field conditionally present or required.
pub const CONDITIONAL_RULE_NAMES: [&str; 14] = [
    "required_if",
    "required_unless",
    "required_with",
    "required_with_all",
    "required_without",
    "required_without_all",
    "prohibited_if",
    "prohibited_unless",
    "exclude_if",
    "exclude_unless",
    "missing_if",
    "missing_unless",
    "present_if",
    "present_unless",
];

/// The location where a parameter value is read from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Request body field
    Body,
    /// Query string parameter (e.g., `?page=1&per_page=10`)
    Query,
    /// Route segment (e.g., `/users/{user}`)
    Path,
    /// HTTP header parameter
    Header,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Body => "body",
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
        }
    }
}

/// A single Laravel conditional rule macro such as `required_if:status,active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRuleDetail {
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub full_rule: String,
}

impl ConditionalRuleDetail {
    /// Splits a rule token into its name and parameter list.
    ///
    /// Returns `None` for rules that are not conditional macros.
    pub fn parse(rule: &str) -> Option<Self> {
        let (name, parameters) = rule.split_once(':').unwrap_or((rule, ""));
        if !Self::is_conditional_rule(name) {
            return None;
        }
        Some(Self {
            rule_type: name.to_string(),
            parameters: parameters.to_string(),
            full_rule: rule.to_string(),
        })
    }

    pub fn is_conditional_rule(name: &str) -> bool {
        CONDITIONAL_RULE_NAMES.contains(&name)
    }

    /// Parameters as a list (`"status,active"` -> `["status", "active"]`)
    pub fn parameter_list(&self) -> Vec<&str> {
        if self.parameters.is_empty() {
            return Vec::new();
        }
        self.parameters.split(',').map(str::trim).collect()
    }
}

/// Backing scalar of a PHP backed enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumBackingType {
    String,
    Int,
}

/// A backed enum referenced through `Rule::enum(...)` or `new Enum(...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumInfo {
    /// Fully qualified class name
    pub class: String,
    pub values: Vec<Value>,
    pub backing_type: EnumBackingType,
}

impl EnumInfo {
    pub fn new(class: impl Into<String>, values: Vec<Value>, backing_type: EnumBackingType) -> Self {
        Self {
            class: class.into(),
            values,
            backing_type,
        }
    }

    pub fn is_string_backed(&self) -> bool {
        self.backing_type == EnumBackingType::String
    }

    pub fn is_int_backed(&self) -> bool {
        self.backing_type == EnumBackingType::Int
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Class name without its namespace (`App\Enums\Status` -> `Status`)
    pub fn short_name(&self) -> &str {
        self.class.rsplit('\\').next().unwrap_or(self.class.as_str())
    }
}

/// Width/height constraints from Laravel's `dimensions:` rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
}

/// Constraints on an uploaded file. Sizes are in kilobytes, as in Laravel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadInfo {
    #[serde(default)]
    pub is_image: bool,
    /// Extensions from `mimes:`
    #[serde(default)]
    pub mimes: Vec<String>,
    /// MIME types from `mimetypes:`
    #[serde(default)]
    pub mime_types: Vec<String>,
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default)]
    pub min_size: Option<u64>,
    #[serde(default)]
    pub dimensions: Option<ImageDimensions>,
    #[serde(default)]
    pub multiple: bool,
}

impl FileUploadInfo {
    /// Collects file constraints from rule tokens, or `None` when no token
    /// describes a file.
    pub fn from_tokens(tokens: &[&str]) -> Option<Self> {
        let mut info = FileUploadInfo::default();
        let mut is_file = false;

        for token in tokens {
            let (name, params) = token.split_once(':').unwrap_or((*token, ""));
            match name {
                "file" => is_file = true,
                "image" => {
                    is_file = true;
                    info.is_image = true;
                }
                "mimes" => {
                    is_file = true;
                    info.mimes = params.split(',').map(|m| m.trim().to_string()).collect();
                }
                "mimetypes" => {
                    is_file = true;
                    info.mime_types = params.split(',').map(|m| m.trim().to_string()).collect();
                }
                "dimensions" => {
                    is_file = true;
                    info.dimensions = Some(parse_dimensions(params));
                }
                "max" => info.max_size = params.parse().ok(),
                "min" => info.min_size = params.parse().ok(),
                "array" => info.multiple = true,
                _ => {}
            }
        }

        if !is_file {
            return None;
        }
        Some(info)
    }

    pub fn has_mime_restrictions(&self) -> bool {
        !self.mimes.is_empty() || !self.mime_types.is_empty()
    }

    pub fn has_size_constraints(&self) -> bool {
        self.max_size.is_some() || self.min_size.is_some()
    }

    /// `max_size` in bytes, or `None` when unset or too large for a `u64`
    pub fn max_size_in_bytes(&self) -> Option<u64> {
        self.max_size.and_then(|kb| kb.checked_mul(1024))
    }
}

fn parse_dimensions(params: &str) -> ImageDimensions {
    let mut dimensions = ImageDimensions::default();
    for pair in params.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "min_width" => dimensions.min_width = value.parse().ok(),
            "max_width" => dimensions.max_width = value.parse().ok(),
            "min_height" => dimensions.min_height = value.parse().ok(),
            "max_height" => dimensions.max_height = value.parse().ok(),
            "ratio" => dimensions.ratio = Some(value.to_string()),
            _ => {}
        }
    }
    dimensions
}

/// An OpenAPI-bound parameter derived from one validated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: Option<Value>,
    /// Rule tokens in source order
    #[serde(default)]
    pub validation: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub conditional_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_rules: Vec<ConditionalRuleDetail>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_info: Option<EnumInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileUploadInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ParameterDefinition {
    /// Create a new ParameterDefinition with minimal required fields
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        param_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            param_type: param_type.into(),
            description: String::new(),
            example: None,
            validation: Vec::new(),
            format: None,
            conditional_required: false,
            conditional_rules: Vec::new(),
            enum_info: None,
            file_info: None,
            pattern: None,
        }
    }

    /// Derives a body parameter from a field's rule value.
    ///
    /// The type comes from the first type rule found (`integer`, `numeric`,
    /// `boolean`, `array`, `file`/`image`, otherwise `string`); formats come
    /// from `email`, `url`, `uuid`, `date`, `date_format` and `ip` rules.
    pub fn from_rules(name: impl Into<String>, rules: &RuleValue) -> Self {
        let name = name.into();
        let tokens = rules.tokens();
        debug!("Deriving parameter '{}' from {} rule tokens", name, tokens.len());

        let file_info = FileUploadInfo::from_tokens(&tokens);
        let param_type = if file_info.is_some() {
            "file"
        } else {
            infer_type(&tokens)
        };

        let conditional_rules: Vec<ConditionalRuleDetail> = tokens
            .iter()
            .filter_map(|token| ConditionalRuleDetail::parse(token))
            .collect();

        let mut parameter = Self::new(
            name,
            ParameterLocation::Body,
            rules.contains_rule("required"),
            param_type,
        );
        parameter.validation = tokens.iter().map(|token| token.to_string()).collect();
        parameter.format = infer_format(&tokens);
        parameter.pattern = tokens
            .iter()
            .find_map(|token| token.strip_prefix("regex:"))
            .map(strip_regex_delimiters);
        parameter.conditional_required = conditional_rules
            .iter()
            .any(|detail| detail.rule_type.starts_with("required_"));
        parameter.conditional_rules = conditional_rules;
        parameter.file_info = file_info;
        parameter
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_validation(mut self, validation: Vec<String>) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_enum(mut self, enum_info: EnumInfo) -> Self {
        self.enum_info = Some(enum_info);
        self
    }

    pub fn with_file_info(mut self, file_info: FileUploadInfo) -> Self {
        self.file_info = Some(file_info);
        self
    }

    pub fn with_conditional_rules(mut self, rules: Vec<ConditionalRuleDetail>) -> Self {
        self.conditional_required = rules
            .iter()
            .any(|detail| detail.rule_type.starts_with("required_"));
        self.conditional_rules = rules;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_file_upload(&self) -> bool {
        self.file_info.is_some() || self.param_type == "file"
    }

    pub fn has_enum(&self) -> bool {
        self.enum_info.is_some()
    }

    pub fn has_conditional_rules(&self) -> bool {
        !self.conditional_rules.is_empty()
    }

    pub fn to_value(&self) -> crate::error::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> crate::error::Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

/// `/^abc$/i` -> `^abc$`: drops the PCRE delimiters and trailing flags
fn strip_regex_delimiters(pattern: &str) -> String {
    let Some(body) = pattern.strip_prefix('/') else {
        return pattern.to_string();
    };
    match body.rfind('/') {
        Some(end) => body[..end].to_string(),
        None => body.to_string(),
    }
}

fn infer_type(tokens: &[&str]) -> &'static str {
    for token in tokens {
        let name = token.split(':').next().unwrap_or(*token);
        let param_type = match name {
            "integer" | "int" | "digits" | "digits_between" => "integer",
            "numeric" | "decimal" => "number",
            "boolean" | "bool" | "accepted" | "declined" => "boolean",
            "array" | "list" => "array",
            "json" => "object",
            "string" | "email" | "url" | "uuid" | "date" | "date_format" | "ip" => "string",
            _ => continue,
        };
        return param_type;
    }
    "string"
}

fn infer_format(tokens: &[&str]) -> Option<String> {
    tokens.iter().find_map(|token| {
        let name = token.split(':').next().unwrap_or(*token);
        let format = match name {
            "email" => "email",
            "url" | "active_url" => "uri",
            "uuid" => "uuid",
            "date" | "before" | "after" => "date",
            "date_format" => "date-time",
            "ip" | "ipv4" => "ipv4",
            "ipv6" => "ipv6",
            "password" | "current_password" => "password",
            _ => return None,
        };
        Some(format.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_rules_basic_string() {
        let param = ParameterDefinition::from_rules("email", &RuleValue::from("required|email|max:255"));

        assert_eq!(param.name, "email");
        assert_eq!(param.location, ParameterLocation::Body);
        assert!(param.required);
        assert_eq!(param.param_type, "string");
        assert_eq!(param.format.as_deref(), Some("email"));
        assert_eq!(param.validation, vec!["required", "email", "max:255"]);
        assert!(!param.is_file_upload());
    }

    #[test]
    fn test_from_rules_integer_optional() {
        let param = ParameterDefinition::from_rules("age", &RuleValue::from(vec!["nullable", "integer", "min:0"]));
        assert!(!param.required);
        assert_eq!(param.param_type, "integer");
        assert_eq!(param.format, None);
    }

    #[test]
    fn test_from_rules_conditional() {
        let param = ParameterDefinition::from_rules(
            "reason",
            &RuleValue::from("required_if:status,rejected|string"),
        );

        assert!(!param.required);
        assert!(param.conditional_required);
        assert!(param.has_conditional_rules());
        assert_eq!(
            param.conditional_rules,
            vec![ConditionalRuleDetail {
                rule_type: "required_if".to_string(),
                parameters: "status,rejected".to_string(),
                full_rule: "required_if:status,rejected".to_string(),
            }]
        );
    }

    #[test]
    fn test_from_rules_file_upload() {
        let param = ParameterDefinition::from_rules(
            "avatar",
            &RuleValue::from("required|image|mimes:jpg,png|max:2048|dimensions:min_width=100,ratio=3/2"),
        );

        assert!(param.is_file_upload());
        assert_eq!(param.param_type, "file");
        let info = param.file_info.unwrap();
        assert!(info.is_image);
        assert_eq!(info.mimes, vec!["jpg", "png"]);
        assert_eq!(info.max_size_in_bytes(), Some(2048 * 1024));
        assert!(info.has_mime_restrictions());
        assert!(info.has_size_constraints());
        let dimensions = info.dimensions.unwrap();
        assert_eq!(dimensions.min_width, Some(100));
        assert_eq!(dimensions.ratio.as_deref(), Some("3/2"));
    }

    #[test]
    fn test_from_rules_regex_pattern() {
        let param = ParameterDefinition::from_rules("code", &RuleValue::from(vec!["regex:/^[A-Z]{3}$/"]));
        assert_eq!(param.pattern.as_deref(), Some("^[A-Z]{3}$"));
    }

    #[test]
    fn test_conditional_rule_detail_parse() {
        assert!(ConditionalRuleDetail::parse("required").is_none());
        let detail = ConditionalRuleDetail::parse("required_with:first,last").unwrap();
        assert_eq!(detail.parameter_list(), vec!["first", "last"]);
    }

    #[test]
    fn test_enum_info() {
        let info = EnumInfo::new(
            "App\\Enums\\Status",
            vec![json!("active"), json!("inactive")],
            EnumBackingType::String,
        );
        assert!(info.is_string_backed());
        assert!(!info.is_int_backed());
        assert_eq!(info.value_count(), 2);
        assert_eq!(info.short_name(), "Status");
    }

    #[test]
    fn test_to_value_wire_keys() {
        let param = ParameterDefinition::new("page", ParameterLocation::Query, false, "integer")
            .with_description("Page number")
            .with_example(json!(1));

        assert_eq!(
            param.to_value().unwrap(),
            json!({
                "name": "page",
                "in": "query",
                "required": false,
                "type": "integer",
                "description": "Page number",
                "example": 1,
                "validation": [],
                "conditional_required": false
            })
        );
    }

    #[test]
    fn test_round_trip_full() {
        let param = ParameterDefinition::new("status", ParameterLocation::Body, true, "string")
            .with_validation(vec!["required".to_string()])
            .with_enum(EnumInfo::new("App\\Enums\\Status", vec![json!("a")], EnumBackingType::String))
            .with_conditional_rules(vec![ConditionalRuleDetail::parse("required_unless:type,draft").unwrap()])
            .with_pattern("^[a-z]+$")
            .with_format("slug");

        assert!(param.conditional_required);
        assert_eq!(ParameterDefinition::from_value(&param.to_value().unwrap()).unwrap(), param);
    }

    #[test]
    fn test_max_size_in_bytes_overflow() {
        let param = ParameterDefinition::from_rules("f", &RuleValue::from("file|max:99999999999999999"));
        let info = param.file_info.unwrap();
        assert_eq!(info.max_size, Some(99_999_999_999_999_999));
        assert_eq!(info.max_size_in_bytes(), None);
    }

    #[test]
    fn test_regex_pattern_with_flags() {
        let param = ParameterDefinition::from_rules("code", &RuleValue::from(vec!["regex:/^abc$/i"]));
        assert_eq!(param.pattern.as_deref(), Some("^abc$"));

        let param = ParameterDefinition::from_rules("path", &RuleValue::from(vec!["regex:/^a\\/b$/"]));
        assert_eq!(param.pattern.as_deref(), Some("^a\\/b$"));
    }

    #[test]
    fn test_round_trip_file_upload_with_dimensions() {
        let param = ParameterDefinition::new("photos", ParameterLocation::Body, true, "file").with_file_info(
            FileUploadInfo {
                is_image: true,
                mimes: vec!["jpg".to_string(), "png".to_string()],
                mime_types: vec!["image/jpeg".to_string()],
                max_size: Some(4096),
                min_size: Some(1),
                dimensions: Some(ImageDimensions {
                    min_width: Some(100),
                    max_width: Some(2000),
                    min_height: None,
                    max_height: Some(1500),
                    ratio: Some("16/9".to_string()),
                }),
                multiple: true,
            },
        );

        let value = param.to_value().unwrap();
        assert_eq!(value["file_info"]["dimensions"]["ratio"], "16/9");
        assert_eq!(ParameterDefinition::from_value(&value).unwrap(), param);
    }

    #[test]
    fn test_round_trip_int_backed_enum() {
        let param = ParameterDefinition::new("priority", ParameterLocation::Query, false, "integer").with_enum(
            EnumInfo::new("App\\Enums\\Priority", vec![json!(1), json!(2), json!(3)], EnumBackingType::Int),
        );

        let value = param.to_value().unwrap();
        assert_eq!(value["enum"]["backing_type"], "int");
        let restored = ParameterDefinition::from_value(&value).unwrap();
        assert!(restored.enum_info.as_ref().unwrap().is_int_backed());
        assert_eq!(restored, param);
    }

    #[test]
    fn test_from_value_minimal() {
        let param = ParameterDefinition::from_value(&json!({"name": "q", "in": "query", "type": "string"})).unwrap();
        assert!(!param.required);
        assert!(param.validation.is_empty());
        assert!(!param.has_enum());
    }
}

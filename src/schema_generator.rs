use crate::openapi::{OpenApiParameter, OpenApiRequestBody, OpenApiSchema};
use crate::parameter::{EnumInfo, ParameterDefinition, ParameterLocation};
use crate::validation::ValidationAnalysisResult;
use indexmap::IndexMap;
use log::debug;

/// Schema generator - converts validated parameters to OpenAPI schemas
pub struct SchemaGenerator {
    /// Enum component schemas, keyed by enum short name
    schemas: IndexMap<String, OpenApiSchema>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            schemas: IndexMap::new(),
        }
    }

    /// Generate a schema for a single parameter
    pub fn generate_schema(&mut self, param: &ParameterDefinition) -> OpenApiSchema {
        debug!("Generating schema for parameter: {}", param.name);

        // Enums become a reference to a shared component schema
        if let Some(enum_info) = &param.enum_info {
            let name = self.generate_enum_schema(enum_info);
            return OpenApiSchema::reference(format!("#/components/schemas/{}", name));
        }

        if param.is_file_upload() {
            let file = OpenApiSchema::of_type("string").with_format("binary");
            let multiple = param.file_info.as_ref().is_some_and(|info| info.multiple);
            return if multiple {
                OpenApiSchema::array_of(file)
            } else {
                file
            };
        }

        let mut schema = Self::type_to_schema(&param.param_type);

        if let Some(format) = &param.format {
            schema = schema.with_format(format.clone());
        }
        if let Some(pattern) = &param.pattern {
            schema = schema.with_pattern(pattern.clone());
        }
        if !param.description.is_empty() {
            schema = schema.with_description(param.description.clone());
        }
        if let Some(example) = &param.example {
            schema = schema.with_example(example.clone());
        }
        if param.validation.iter().any(|rule| rule == "nullable") {
            schema = schema.nullable();
        }

        schema
    }

    /// Convert a Laravel-derived type name to an OpenAPI schema
    fn type_to_schema(param_type: &str) -> OpenApiSchema {
        match param_type {
            "integer" | "number" | "boolean" | "string" | "object" => OpenApiSchema::of_type(param_type),
            "array" => OpenApiSchema::array_of(OpenApiSchema::of_type("string")),
            _ => {
                debug!("Unknown type: {}, using string", param_type);
                OpenApiSchema::of_type("string")
            }
        }
    }

    /// Generate a component schema for an enum and return its component name
    fn generate_enum_schema(&mut self, enum_info: &EnumInfo) -> String {
        let name = enum_info.short_name().to_string();

        // Check if already generated
        if self.schemas.contains_key(&name) {
            debug!("Schema for {} already exists", name);
            return name;
        }

        debug!("Generating enum schema for: {}", enum_info.class);
        let schema_type = if enum_info.is_int_backed() {
            "integer"
        } else {
            "string"
        };
        let schema = OpenApiSchema::of_type(schema_type).with_enum(enum_info.values.clone());
        self.schemas.insert(name.clone(), schema);
        name
    }

    /// Generate an OpenAPI parameter for a query, path or header parameter.
    ///
    /// Returns `None` for body fields, which belong in the request body.
    pub fn generate_parameter(&mut self, param: &ParameterDefinition) -> Option<OpenApiParameter> {
        if param.location == ParameterLocation::Body {
            return None;
        }

        let schema = self.generate_schema(param);
        let is_array = schema.schema_type.as_deref() == Some("array");
        let mut parameter = OpenApiParameter::new(
            param.name.clone(),
            param.location.as_str(),
            param.required || param.location == ParameterLocation::Path,
            schema,
        );
        if !param.description.is_empty() {
            parameter = parameter.with_description(param.description.clone());
        }
        if is_array && param.location == ParameterLocation::Query {
            parameter = parameter.with_style_and_explode("form", true);
        }
        Some(parameter)
    }

    /// Build an object schema from the body parameters of an analysis
    pub fn generate_body_schema(&mut self, analysis: &ValidationAnalysisResult) -> OpenApiSchema {
        let mut properties = IndexMap::new();
        let mut required = Vec::new();

        for param in analysis
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Body)
        {
            let mut schema = self.generate_schema(param);
            if schema.description.is_none() {
                if let Some(label) = analysis.attribute_for(&param.name) {
                    schema = schema.with_description(label);
                }
            }
            properties.insert(param.name.clone(), schema);

            if param.required {
                required.push(param.name.clone());
            }
        }

        OpenApiSchema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() { None } else { Some(required) },
            ..OpenApiSchema::default()
        }
    }

    /// Build a request body, switching to multipart when a file is uploaded
    pub fn generate_request_body(&mut self, analysis: &ValidationAnalysisResult) -> Option<OpenApiRequestBody> {
        let has_body = analysis
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Body);
        if !has_body {
            return None;
        }

        let schema = self.generate_body_schema(analysis);
        let content_type = if analysis.parameters.iter().any(ParameterDefinition::is_file_upload) {
            "multipart/form-data"
        } else {
            "application/json"
        };
        let required = schema.required.is_some();
        Some(OpenApiRequestBody::single(content_type, schema, required))
    }

    /// Get all generated component schemas
    pub fn get_schemas(&self) -> &IndexMap<String, OpenApiSchema> {
        &self.schemas
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{EnumBackingType, FileUploadInfo};
    use crate::validation::{ConditionalRuleSet, RuleValue};
    use serde_json::json;

    fn status_enum() -> EnumInfo {
        EnumInfo::new(
            "App\\Enums\\OrderStatus",
            vec![json!("pending"), json!("shipped")],
            EnumBackingType::String,
        )
    }

    #[test]
    fn test_primitive_types() {
        let mut generator = SchemaGenerator::new();

        for (param_type, expected) in [
            ("integer", "integer"),
            ("number", "number"),
            ("boolean", "boolean"),
            ("string", "string"),
            ("mystery", "string"),
        ] {
            let param = ParameterDefinition::new("x", ParameterLocation::Body, true, param_type);
            let schema = generator.generate_schema(&param);
            assert_eq!(schema.schema_type.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_array_type() {
        let mut generator = SchemaGenerator::new();
        let param = ParameterDefinition::new("tags", ParameterLocation::Body, false, "array");
        let schema = generator.generate_schema(&param);

        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.items.unwrap().schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_format_pattern_nullable() {
        let mut generator = SchemaGenerator::new();
        let param = ParameterDefinition::from_rules("email", &RuleValue::from("nullable|email|regex:/@acme\\.test$/"));
        let schema = generator.generate_schema(&param);

        assert_eq!(schema.format.as_deref(), Some("email"));
        assert_eq!(schema.pattern.as_deref(), Some("@acme\\.test$"));
        assert_eq!(schema.nullable, Some(true));
    }

    #[test]
    fn test_enum_generates_component_once() {
        let mut generator = SchemaGenerator::new();
        let param = ParameterDefinition::new("status", ParameterLocation::Body, true, "string")
            .with_enum(status_enum());

        let first = generator.generate_schema(&param);
        let second = generator.generate_schema(&param);

        assert_eq!(first.reference.as_deref(), Some("#/components/schemas/OrderStatus"));
        assert_eq!(first, second);
        assert_eq!(generator.get_schemas().len(), 1);
        let component = &generator.get_schemas()["OrderStatus"];
        assert_eq!(component.schema_type.as_deref(), Some("string"));
        assert_eq!(component.enum_values.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_int_backed_enum() {
        let mut generator = SchemaGenerator::new();
        let param = ParameterDefinition::new("priority", ParameterLocation::Body, true, "integer")
            .with_enum(EnumInfo::new("App\\Enums\\Priority", vec![json!(1), json!(2)], EnumBackingType::Int));
        generator.generate_schema(&param);

        assert_eq!(generator.get_schemas()["Priority"].schema_type.as_deref(), Some("integer"));
    }

    #[test]
    fn test_file_upload_schema() {
        let mut generator = SchemaGenerator::new();
        let single = ParameterDefinition::from_rules("avatar", &RuleValue::from("required|image"));
        let schema = generator.generate_schema(&single);
        assert_eq!(schema.format.as_deref(), Some("binary"));

        let multiple = ParameterDefinition::new("photos", ParameterLocation::Body, false, "file")
            .with_file_info(FileUploadInfo {
                multiple: true,
                ..FileUploadInfo::default()
            });
        let schema = generator.generate_schema(&multiple);
        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.items.unwrap().format.as_deref(), Some("binary"));
    }

    #[test]
    fn test_generate_parameter_skips_body() {
        let mut generator = SchemaGenerator::new();
        let body = ParameterDefinition::new("name", ParameterLocation::Body, true, "string");
        assert!(generator.generate_parameter(&body).is_none());
    }

    #[test]
    fn test_generate_query_array_parameter() {
        let mut generator = SchemaGenerator::new();
        let param = ParameterDefinition::new("ids", ParameterLocation::Query, false, "array")
            .with_description("Filter by id");
        let parameter = generator.generate_parameter(&param).unwrap();

        assert_eq!(parameter.location, "query");
        assert!(!parameter.required);
        assert_eq!(parameter.style.as_deref(), Some("form"));
        assert_eq!(parameter.explode, Some(true));
        assert_eq!(parameter.description.as_deref(), Some("Filter by id"));
    }

    #[test]
    fn test_path_parameter_always_required() {
        let mut generator = SchemaGenerator::new();
        let param = ParameterDefinition::new("user", ParameterLocation::Path, false, "integer");
        assert!(generator.generate_parameter(&param).unwrap().required);
    }

    #[test]
    fn test_body_schema_and_request_body() {
        let mut generator = SchemaGenerator::new();
        let analysis = ValidationAnalysisResult::new(
            vec![
                ParameterDefinition::new("name", ParameterLocation::Body, true, "string"),
                ParameterDefinition::new("age", ParameterLocation::Body, false, "integer"),
                ParameterDefinition::new("page", ParameterLocation::Query, false, "integer"),
            ],
            ConditionalRuleSet::empty(),
        )
        .with_attributes(IndexMap::from([("name".to_string(), "Full name".to_string())]));

        let schema = generator.generate_body_schema(&analysis);
        let properties = schema.properties.as_ref().unwrap();
        let names: Vec<_> = properties.keys().cloned().collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(properties["name"].description.as_deref(), Some("Full name"));
        assert_eq!(schema.required, Some(vec!["name".to_string()]));

        let body = generator.generate_request_body(&analysis).unwrap();
        assert!(body.required);
        assert!(body.content.contains_key("application/json"));
    }

    #[test]
    fn test_request_body_multipart_and_absent() {
        let mut generator = SchemaGenerator::new();
        let upload = ValidationAnalysisResult::new(
            vec![ParameterDefinition::from_rules("document", &RuleValue::from("file|mimes:pdf"))],
            ConditionalRuleSet::empty(),
        );
        let body = generator.generate_request_body(&upload).unwrap();
        assert!(body.content.contains_key("multipart/form-data"));
        assert!(!body.required);

        let query_only = ValidationAnalysisResult::new(
            vec![ParameterDefinition::new("q", ParameterLocation::Query, false, "string")],
            ConditionalRuleSet::empty(),
        );
        assert!(generator.generate_request_body(&query_only).is_none());
    }
}

//! OpenAPI 3.0 value objects.
//!
//! These are the shapes the rule model is converted into. They are plain
//! data with `with_*` helpers that return updated copies; assembling them
//! into a full document from routes is left to the caller.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OpenAPI Schema object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSchema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "email", "date", "binary")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Properties for object types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, OpenApiSchema>>,
    /// Required field names for object types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<OpenApiSchema>>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Reference to a component schema
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl OpenApiSchema {
    pub fn of_type(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Self::default()
        }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn array_of(items: OpenApiSchema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiParameter {
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: OpenApiSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
}

impl OpenApiParameter {
    pub fn new(name: impl Into<String>, location: impl Into<String>, required: bool, schema: OpenApiSchema) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            required,
            schema,
            description: None,
            example: None,
            style: None,
            explode: None,
        }
    }

    /// Serialization style for array/object query parameters
    pub fn with_style_and_explode(mut self, style: impl Into<String>, explode: bool) -> Self {
        self.style = Some(style.into());
        self.explode = Some(explode);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiMediaType {
    pub schema: OpenApiSchema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Content type -> media type
    pub content: IndexMap<String, OpenApiMediaType>,
}

impl OpenApiRequestBody {
    /// Request body with a single content type
    pub fn single(content_type: impl Into<String>, schema: OpenApiSchema, required: bool) -> Self {
        let mut content = IndexMap::new();
        content.insert(content_type.into(), OpenApiMediaType { schema });
        Self {
            description: None,
            required,
            content,
        }
    }

    pub fn json(schema: OpenApiSchema) -> Self {
        Self::single("application/json", schema, true)
    }
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiResponse {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, OpenApiMediaType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, Value>>,
}

impl OpenApiResponse {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: None,
            links: None,
        }
    }

    pub fn json(description: impl Into<String>, schema: OpenApiSchema) -> Self {
        let mut content = IndexMap::new();
        content.insert("application/json".to_string(), OpenApiMediaType { schema });
        Self {
            description: description.into(),
            content: Some(content),
            links: None,
        }
    }
}

/// OpenAPI Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<OpenApiParameter>,
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<OpenApiRequestBody>,
    /// Status code -> response
    pub responses: IndexMap<String, OpenApiResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

impl OpenApiOperation {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            summary: None,
            description: None,
            operation_id: Some(operation_id.into()),
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
            security: Vec::new(),
        }
    }

    pub fn with_response(mut self, status: impl Into<String>, response: OpenApiResponse) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    pub fn with_request_body(mut self, body: OpenApiRequestBody) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<OpenApiParameter>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiInfo {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiComponents {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, OpenApiSchema>,
    #[serde(rename = "securitySchemes", default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, Value>,
}

impl OpenApiComponents {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.security_schemes.is_empty()
    }
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: OpenApiInfo,
    /// Path -> lower-case method -> operation
    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, OpenApiOperation>>,
    #[serde(default, skip_serializing_if = "OpenApiComponents::is_empty")]
    pub components: OpenApiComponents,
}

impl OpenApiSpec {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: "3.0.0".to_string(),
            info: OpenApiInfo {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            paths: IndexMap::new(),
            components: OpenApiComponents::default(),
        }
    }

    pub fn operation(&self, path: &str, method: &str) -> Option<&OpenApiOperation> {
        self.paths.get(path)?.get(&method.to_ascii_lowercase())
    }

    pub fn operation_count(&self) -> usize {
        self.paths.values().map(IndexMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_schema_with_helpers_return_copies() {
        let base = OpenApiSchema::of_type("string");
        let with_enum = base.clone().with_enum(vec![json!("a"), json!("b")]);

        assert!(base.enum_values.is_none());
        assert_eq!(with_enum.enum_values, Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_schema_serialization_skips_empty() {
        let schema = OpenApiSchema::of_type("string").with_format("email").nullable();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "string", "format": "email", "nullable": true})
        );
    }

    #[test]
    fn test_reference_schema() {
        let schema = OpenApiSchema::reference("#/components/schemas/Status");
        assert!(schema.is_reference());
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"$ref": "#/components/schemas/Status"})
        );
    }

    #[test]
    fn test_parameter_style_and_explode() {
        let param = OpenApiParameter::new(
            "ids",
            "query",
            false,
            OpenApiSchema::array_of(OpenApiSchema::of_type("integer")),
        )
        .with_style_and_explode("form", true);

        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({
                "name": "ids",
                "in": "query",
                "required": false,
                "schema": {"type": "array", "items": {"type": "integer"}},
                "style": "form",
                "explode": true
            })
        );
    }

    #[test]
    fn test_operation_wire_names() {
        let operation = OpenApiOperation::new("users.store")
            .with_request_body(OpenApiRequestBody::json(OpenApiSchema::of_type("object")))
            .with_response("201", OpenApiResponse::new("Created"));

        let value = serde_json::to_value(&operation).unwrap();
        assert_eq!(value["operationId"], "users.store");
        assert_eq!(value["requestBody"]["required"], true);
        assert!(value["requestBody"]["content"]["application/json"].is_object());
        assert_eq!(value["responses"]["201"]["description"], "Created");
        assert!(value.get("parameters").is_none());
    }

    #[test]
    fn test_spec_round_trip_keeps_path_order() {
        let mut spec = OpenApiSpec::new("API", "1.0.0");
        for path in ["/users", "/posts", "/albums"] {
            let mut methods = IndexMap::new();
            methods.insert(
                "get".to_string(),
                OpenApiOperation::new(format!("{}.index", &path[1..]))
                    .with_response("200", OpenApiResponse::new("OK")),
            );
            spec.paths.insert(path.to_string(), methods);
        }

        let json = serde_json::to_string(&spec).unwrap();
        let restored: OpenApiSpec = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, spec);
        let paths: Vec<_> = restored.paths.keys().cloned().collect();
        assert_eq!(paths, vec!["/users", "/posts", "/albums"]);
        assert_eq!(restored.operation_count(), 3);
        assert!(restored.operation("/posts", "GET").is_some());
        assert!(!json.contains("components"));
    }
}

//! Response-side DTOs: API resources, response links and password rules.
//!
//! Unlike the rule model these validate their input and fail with
//! [`Error::InvalidArgument`] on structurally invalid data.

use crate::error::{Error, Result};
use crate::openapi::OpenApiSchema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One field of a `JsonResource::toArray()` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceFieldInfo {
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Wrapped in `$this->when(...)` / `whenLoaded(...)`
    #[serde(default)]
    pub conditional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_field_type() -> String {
    "string".to_string()
}

impl ResourceFieldInfo {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            nullable: false,
            example: None,
            conditional: false,
            description: None,
        }
    }

    pub fn to_schema(&self) -> OpenApiSchema {
        let mut schema = OpenApiSchema::of_type(self.field_type.clone());
        if self.nullable {
            schema = schema.nullable();
        }
        if let Some(example) = &self.example {
            schema = schema.with_example(example.clone());
        }
        if let Some(description) = &self.description {
            schema = schema.with_description(description.clone());
        }
        schema
    }
}

/// Shape of an API resource class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub properties: IndexMap<String, ResourceFieldInfo>,
    /// Extra top-level keys added through `with()`
    #[serde(default)]
    pub with: IndexMap<String, Value>,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub nested_resources: Vec<String>,
}

impl ResourceInfo {
    pub fn new(class: impl Into<String>, properties: IndexMap<String, ResourceFieldInfo>) -> Self {
        Self {
            class: class.into(),
            properties,
            with: IndexMap::new(),
            is_collection: false,
            nested_resources: Vec::new(),
        }
    }

    pub fn has_conditional_fields(&self) -> bool {
        self.properties.values().any(|field| field.conditional)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    pub fn has_nested_resources(&self) -> bool {
        !self.nested_resources.is_empty()
    }

    /// Object schema of one resource item; conditional fields are optional
    pub fn to_schema(&self) -> OpenApiSchema {
        let properties: IndexMap<String, OpenApiSchema> = self
            .properties
            .iter()
            .map(|(name, field)| (name.clone(), field.to_schema()))
            .collect();
        let required: Vec<String> = self
            .properties
            .iter()
            .filter(|(_, field)| !field.conditional)
            .map(|(name, _)| name.clone())
            .collect();

        let item = OpenApiSchema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() { None } else { Some(required) },
            ..OpenApiSchema::default()
        };

        if self.is_collection {
            OpenApiSchema::array_of(item)
        } else {
            item
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidArgument("resource must be an object".to_string()));
        }
        Self::deserialize(value).map_err(|e| Error::InvalidArgument(format!("resource: {}", e)))
    }
}

/// An OpenAPI link from a response to another operation.
///
/// Exactly one of `operation_id` and `operation_ref` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResponseLink")]
pub struct ResponseLinkInfo {
    status_code: u16,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_ref: Option<String>,
    /// Target parameter -> runtime expression (e.g. `$response.body#/id`)
    parameters: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawResponseLink {
    status_code: u16,
    name: String,
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    operation_ref: Option<String>,
    #[serde(default)]
    parameters: IndexMap<String, String>,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<RawResponseLink> for ResponseLinkInfo {
    type Error = Error;

    fn try_from(raw: RawResponseLink) -> Result<Self> {
        let link = ResponseLinkInfo::new(
            raw.status_code,
            raw.name,
            raw.operation_id,
            raw.operation_ref,
            raw.parameters,
        )?;
        Ok(ResponseLinkInfo {
            description: raw.description,
            ..link
        })
    }
}

impl ResponseLinkInfo {
    pub fn new(
        status_code: u16,
        name: impl Into<String>,
        operation_id: Option<String>,
        operation_ref: Option<String>,
        parameters: IndexMap<String, String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidArgument("link name must not be empty".to_string()));
        }
        match (&operation_id, &operation_ref) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidArgument(format!(
                    "link '{}' sets both operation_id and operation_ref",
                    name
                )))
            }
            (None, None) => {
                return Err(Error::InvalidArgument(format!(
                    "link '{}' needs operation_id or operation_ref",
                    name
                )))
            }
            _ => {}
        }

        Ok(Self {
            status_code,
            name,
            operation_id,
            operation_ref,
            parameters,
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    pub fn operation_ref(&self) -> Option<&str> {
        self.operation_ref.as_deref()
    }

    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.parameters
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The OpenAPI Link object for `responses.<status>.links.<name>`
    pub fn to_openapi_link(&self) -> Value {
        let mut link = Map::new();
        if let Some(id) = &self.operation_id {
            link.insert("operationId".to_string(), Value::String(id.clone()));
        }
        if let Some(reference) = &self.operation_ref {
            link.insert("operationRef".to_string(), Value::String(reference.clone()));
        }
        if !self.parameters.is_empty() {
            let parameters = self
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            link.insert("parameters".to_string(), Value::Object(parameters));
        }
        if let Some(description) = &self.description {
            link.insert("description".to_string(), Value::String(description.clone()));
        }
        Value::Object(link)
    }
}

/// Constraints from Laravel's `Password::min(8)->mixedCase()->...` builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPasswordRule")]
pub struct PasswordRuleInfo {
    min_length: u32,
    max_length: Option<u32>,
    mixed_case: bool,
    letters: bool,
    numbers: bool,
    symbols: bool,
    uncompromised: bool,
}

#[derive(Deserialize)]
struct RawPasswordRule {
    #[serde(default = "default_min_length")]
    min_length: i64,
    #[serde(default)]
    max_length: Option<i64>,
    #[serde(default)]
    mixed_case: bool,
    #[serde(default)]
    letters: bool,
    #[serde(default)]
    numbers: bool,
    #[serde(default)]
    symbols: bool,
    #[serde(default)]
    uncompromised: bool,
}

fn default_min_length() -> i64 {
    8
}

impl TryFrom<RawPasswordRule> for PasswordRuleInfo {
    type Error = Error;

    fn try_from(raw: RawPasswordRule) -> Result<Self> {
        let min_length = to_length("min_length", raw.min_length)?;
        let max_length = raw
            .max_length
            .map(|max| to_length("max_length", max))
            .transpose()?;

        Ok(PasswordRuleInfo {
            mixed_case: raw.mixed_case,
            letters: raw.letters,
            numbers: raw.numbers,
            symbols: raw.symbols,
            uncompromised: raw.uncompromised,
            ..PasswordRuleInfo::new(min_length, max_length)?
        })
    }
}

fn to_length(key: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{} must be a non-negative length, got {}", key, value)))
}

impl PasswordRuleInfo {
    pub fn new(min_length: u32, max_length: Option<u32>) -> Result<Self> {
        if let Some(max) = max_length {
            if min_length > max {
                return Err(Error::InvalidArgument(format!(
                    "min_length {} exceeds max_length {}",
                    min_length, max
                )));
            }
        }
        Ok(Self {
            min_length,
            max_length,
            mixed_case: false,
            letters: false,
            numbers: false,
            symbols: false,
            uncompromised: false,
        })
    }

    pub fn mixed_case(mut self) -> Self {
        self.mixed_case = true;
        self
    }

    pub fn letters(mut self) -> Self {
        self.letters = true;
        self
    }

    pub fn numbers(mut self) -> Self {
        self.numbers = true;
        self
    }

    pub fn symbols(mut self) -> Self {
        self.symbols = true;
        self
    }

    pub fn uncompromised(mut self) -> Self {
        self.uncompromised = true;
        self
    }

    pub fn min_length(&self) -> u32 {
        self.min_length
    }

    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    pub fn requires_mixed_case(&self) -> bool {
        self.mixed_case
    }

    pub fn requires_letters(&self) -> bool {
        self.letters
    }

    pub fn requires_numbers(&self) -> bool {
        self.numbers
    }

    pub fn requires_symbols(&self) -> bool {
        self.symbols
    }

    pub fn requires_uncompromised(&self) -> bool {
        self.uncompromised
    }

    /// Human-readable summary used as the schema description
    pub fn description(&self) -> String {
        let mut parts = vec![match self.max_length {
            Some(max) => format!("between {} and {} characters", self.min_length, max),
            None => format!("at least {} characters", self.min_length),
        }];
        if self.mixed_case {
            parts.push("upper and lower case letters".to_string());
        } else if self.letters {
            parts.push("at least one letter".to_string());
        }
        if self.numbers {
            parts.push("at least one number".to_string());
        }
        if self.symbols {
            parts.push("at least one symbol".to_string());
        }
        if self.uncompromised {
            parts.push("not found in known data leaks".to_string());
        }
        format!("Password must contain {}", parts.join(", "))
    }

    pub fn to_schema(&self) -> OpenApiSchema {
        OpenApiSchema::of_type("string")
            .with_format("password")
            .with_description(self.description())
    }
}

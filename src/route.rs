//! Route facts consumed alongside the validation model.
//!
//! A [`RouteInfo`] is what the route collector reports for one Laravel route:
//! its URI template, methods, controller action and middleware. The helpers
//! here translate the URI template into OpenAPI form and derive the
//! authentication requirement from middleware.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a Laravel route can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Methods that normally carry a request body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            _ => Err(Error::UnknownDiscriminant {
                kind: "HTTP method",
                value: s.to_string(),
            }),
        }
    }
}

/// A `{name}` or `{name?}` segment of a route URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParameter {
    pub name: String,
    pub optional: bool,
}

/// Complete information about a single Laravel route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    /// URI template (e.g., "api/users/{user}")
    pub uri: String,
    pub methods: Vec<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
}

impl RouteInfo {
    /// Create a new RouteInfo with minimal required fields
    pub fn new(uri: impl Into<String>, methods: Vec<HttpMethod>) -> Self {
        Self {
            uri: uri.into(),
            methods,
            name: None,
            controller: None,
            action: None,
            middleware: Vec::new(),
        }
    }

    /// Convert the URI template to an OpenAPI path.
    ///
    /// A leading slash is added and optional markers are dropped:
    /// `api/users/{user?}` becomes `/api/users/{user}`.
    pub fn openapi_path(&self) -> String {
        let converted: Vec<String> = self
            .uri
            .trim_start_matches('/')
            .split('/')
            .map(|part| {
                if part.starts_with('{') && part.ends_with("?}") {
                    format!("{{{}}}", &part[1..part.len() - 2])
                } else {
                    part.to_string()
                }
            })
            .collect();

        format!("/{}", converted.join("/"))
    }

    pub fn path_parameters(&self) -> Vec<PathParameter> {
        self.uri
            .split('/')
            .filter_map(|part| part.strip_prefix('{')?.strip_suffix('}'))
            .map(|inner| match inner.strip_suffix('?') {
                Some(name) => PathParameter {
                    name: name.to_string(),
                    optional: true,
                },
                None => PathParameter {
                    name: inner.to_string(),
                    optional: false,
                },
            })
            .collect()
    }

    pub fn requires_auth(&self) -> bool {
        self.auth_guard().is_some()
    }

    /// Guard named by `auth:<guard>` middleware; plain `auth` is `"default"`
    pub fn auth_guard(&self) -> Option<&str> {
        self.middleware.iter().find_map(|middleware| {
            if middleware == "auth" {
                Some("default")
            } else {
                middleware.strip_prefix("auth:")
            }
        })
    }

    /// Stable operation id: the route name, else `controller@action`, else method + path
    pub fn operation_id(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let (Some(controller), Some(action)) = (&self.controller, &self.action) {
            let short = controller.rsplit('\\').next().unwrap_or(controller.as_str());
            return format!("{}@{}", short, action);
        }
        let method = self.methods.first().map(HttpMethod::as_str).unwrap_or("ANY");
        format!("{} {}", method, self.openapi_path())
    }
}

/// An OpenAPI security scheme inferred from auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AuthenticationScheme {
    /// HTTP bearer token (Sanctum, Passport)
    pub fn bearer(bearer_format: Option<String>) -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format,
            name: None,
            location: None,
            description: None,
        }
    }

    /// API key in a header, query parameter or cookie
    pub fn api_key(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            scheme: None,
            bearer_format: None,
            name: Some(name.into()),
            location: Some(location.into()),
            description: None,
        }
    }

    /// Scheme for a Laravel guard name, if it is one we recognise
    pub fn for_guard(guard: &str) -> Option<Self> {
        match guard {
            "sanctum" | "api" | "default" => Some(Self::bearer(None)),
            "passport" => Some(Self::bearer(Some("JWT".to_string()))),
            _ => None,
        }
    }

    pub fn is_bearer(&self) -> bool {
        self.scheme_type == "http" && self.scheme.as_deref() == Some("bearer")
    }

    /// OpenAPI Security Scheme object (camelCase keys)
    pub fn to_openapi(&self) -> Value {
        let mut value = json!({ "type": self.scheme_type });
        if let Some(scheme) = &self.scheme {
            value["scheme"] = json!(scheme);
        }
        if let Some(format) = &self.bearer_format {
            value["bearerFormat"] = json!(format);
        }
        if let Some(name) = &self.name {
            value["name"] = json!(name);
        }
        if let Some(location) = &self.location {
            value["in"] = json!(location);
        }
        if let Some(description) = &self.description {
            value["description"] = json!(description);
        }
        value
    }
}

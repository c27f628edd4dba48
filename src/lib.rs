//! Laravel OpenAPI Rules - Typed model of Laravel validation analyses.
//!
//! A Laravel form request's `rules()` method often returns different rules
//! depending on the HTTP method, the current user or other request fields.
//! The analyzer that traces those branches caches its findings as JSON or
//! YAML. This library gives that data a typed, lossless shape and turns it
//! into OpenAPI schema fragments.
//!
//! # Architecture
//!
//! 1. [`validation`] - Conditions, conditional rules, merged rule sets and the
//!    per-request analysis result
//! 2. [`parameter`] - Parameter definitions inferred from rules (enums, file
//!    uploads, conditional rule details)
//! 3. [`resource`] - API resource, response link and password rule facts
//! 4. [`route`] - Route facts and authentication schemes
//! 5. [`openapi`] - OpenAPI 3.0 DTOs
//! 6. [`schema_generator`] - Converts parameters to OpenAPI schemas
//! 7. [`scanner`] - Finds cached analysis files
//! 8. [`serializer`] - Loads analyses and serializes output to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use laravel_openapi_rules::{
//!     schema_generator::SchemaGenerator,
//!     serializer::serialize_json,
//!     validation::ValidationAnalysisResult,
//! };
//! use serde_json::json;
//!
//! let analysis = ValidationAnalysisResult::from_value(&json!({
//!     "parameters": [
//!         {"name": "title", "in": "body", "required": true, "type": "string"}
//!     ],
//!     "conditional_rules": {
//!         "rules_sets": [
//!             {"condition": "POST", "rules": {"title": "required|string"}},
//!             {"condition": "PUT", "rules": {"title": "sometimes|string"}}
//!         ]
//!     }
//! }))
//! .unwrap();
//!
//! let put_rules = analysis.conditional_rules.rules_for_http_method("put");
//! assert_eq!(put_rules["title"].tokens(), vec!["sometimes", "string"]);
//!
//! let mut schema_gen = SchemaGenerator::new();
//! let body = schema_gen.generate_request_body(&analysis).unwrap();
//! println!("{}", serialize_json(&body).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod error;
pub mod openapi;
pub mod parameter;
pub mod resource;
pub mod route;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod validation;

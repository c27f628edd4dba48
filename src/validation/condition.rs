use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description carried by an else branch when the analyzer found none.
pub const DEFAULT_ELSE_DESCRIPTION: &str = "Default case";

const HTTP_VERBS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// One condition under which a subset of validation rules applies.
///
/// Each variant carries only the facts that make sense for it, so a request
/// field name can never end up on an HTTP method check. `expression` holds the
/// source text the analyzer saw (for `ElseBranch` it is a human-readable
/// description and travels as `description` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", try_from = "RawCondition")]
pub enum ConditionResult {
    /// `$this->isMethod('POST')` and friends
    #[serde(rename = "http_method")]
    HttpMethod {
        method: Option<String>,
        expression: String,
    },
    /// `$this->user()->can(...)`, `isAdmin()`, ...
    #[serde(rename = "user_check")]
    UserCheck {
        method: Option<String>,
        expression: String,
    },
    /// `$this->has('field')`, `$this->filled('field')`, ...
    #[serde(rename = "request_field")]
    RequestField {
        check: Option<String>,
        field: Option<String>,
        expression: String,
    },
    /// `Rule::when(...)`
    #[serde(rename = "rule_when")]
    RuleWhen { expression: String },
    #[serde(rename = "custom")]
    Custom { expression: String },
    #[serde(rename = "else")]
    ElseBranch {
        #[serde(rename = "description")]
        expression: String,
    },
}

impl ConditionResult {
    pub fn http_method(method: Option<String>, expression: impl Into<String>) -> Self {
        ConditionResult::HttpMethod {
            method,
            expression: expression.into(),
        }
    }

    pub fn user_check(method: Option<String>, expression: impl Into<String>) -> Self {
        ConditionResult::UserCheck {
            method,
            expression: expression.into(),
        }
    }

    pub fn request_field(
        check: Option<String>,
        field: Option<String>,
        expression: impl Into<String>,
    ) -> Self {
        ConditionResult::RequestField {
            check,
            field,
            expression: expression.into(),
        }
    }

    pub fn rule_when(expression: impl Into<String>) -> Self {
        ConditionResult::RuleWhen {
            expression: expression.into(),
        }
    }

    pub fn custom(expression: impl Into<String>) -> Self {
        ConditionResult::Custom {
            expression: expression.into(),
        }
    }

    pub fn else_branch(description: impl Into<String>) -> Self {
        ConditionResult::ElseBranch {
            expression: description.into(),
        }
    }

    /// Else branch with the stock "Default case" description
    pub fn default_else() -> Self {
        Self::else_branch(DEFAULT_ELSE_DESCRIPTION)
    }

    /// Upgrades a condition string from the old `{condition, rules}` cache shape.
    ///
    /// Bare HTTP verbs become [`ConditionResult::HttpMethod`], `else`/`default`
    /// become an else branch described by that same word, and anything else is
    /// kept as a custom expression.
    pub fn from_legacy_descriptor(descriptor: &str) -> Self {
        let trimmed = descriptor.trim();
        let upper = trimmed.to_ascii_uppercase();

        if HTTP_VERBS.contains(&upper.as_str()) {
            return Self::http_method(Some(upper), descriptor);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "else" | "default" => Self::else_branch(trimmed),
            _ => Self::custom(descriptor),
        }
    }

    pub fn is_http_method(&self) -> bool {
        matches!(self, ConditionResult::HttpMethod { .. })
    }

    pub fn is_user_check(&self) -> bool {
        matches!(self, ConditionResult::UserCheck { .. })
    }

    pub fn is_request_field(&self) -> bool {
        matches!(self, ConditionResult::RequestField { .. })
    }

    pub fn is_rule_when(&self) -> bool {
        matches!(self, ConditionResult::RuleWhen { .. })
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ConditionResult::Custom { .. })
    }

    pub fn is_else_branch(&self) -> bool {
        matches!(self, ConditionResult::ElseBranch { .. })
    }

    /// Wire discriminant of this condition
    pub fn type_as_str(&self) -> &'static str {
        match self {
            ConditionResult::HttpMethod { .. } => "http_method",
            ConditionResult::UserCheck { .. } => "user_check",
            ConditionResult::RequestField { .. } => "request_field",
            ConditionResult::RuleWhen { .. } => "rule_when",
            ConditionResult::Custom { .. } => "custom",
            ConditionResult::ElseBranch { .. } => "else",
        }
    }

    pub fn expression(&self) -> &str {
        match self {
            ConditionResult::HttpMethod { expression, .. }
            | ConditionResult::UserCheck { expression, .. }
            | ConditionResult::RequestField { expression, .. }
            | ConditionResult::RuleWhen { expression }
            | ConditionResult::Custom { expression }
            | ConditionResult::ElseBranch { expression } => expression,
        }
    }

    /// Method name for HTTP method and user checks
    pub fn method(&self) -> Option<&str> {
        match self {
            ConditionResult::HttpMethod { method, .. } | ConditionResult::UserCheck { method, .. } => {
                method.as_deref()
            }
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ConditionResult::RequestField { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    pub fn check(&self) -> Option<&str> {
        match self {
            ConditionResult::RequestField { check, .. } => check.as_deref(),
            _ => None,
        }
    }

    /// True when `descriptor` names this condition, either by its raw
    /// expression or by its method (case-insensitive).
    pub fn matches_descriptor(&self, descriptor: &str) -> bool {
        self.expression() == descriptor
            || self
                .method()
                .is_some_and(|method| method.eq_ignore_ascii_case(descriptor))
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

/// Permissive view of a serialized condition; every key is optional.
#[derive(Deserialize)]
struct RawCondition {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    check: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    expression: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<RawCondition> for ConditionResult {
    type Error = Error;

    fn try_from(raw: RawCondition) -> Result<Self> {
        let kind = raw.kind.unwrap_or_default();
        let expression = raw.expression.unwrap_or_default();

        let condition = match kind.as_str() {
            "http_method" => ConditionResult::HttpMethod {
                method: raw.method,
                expression,
            },
            "user_check" => ConditionResult::UserCheck {
                method: raw.method,
                expression,
            },
            "request_field" => ConditionResult::RequestField {
                check: raw.check,
                field: raw.field,
                expression,
            },
            "rule_when" => ConditionResult::RuleWhen { expression },
            "custom" => ConditionResult::Custom { expression },
            "else" => ConditionResult::ElseBranch {
                expression: raw
                    .description
                    .unwrap_or_else(|| DEFAULT_ELSE_DESCRIPTION.to_string()),
            },
            _ => {
                return Err(Error::UnknownDiscriminant {
                    kind: "condition",
                    value: kind,
                })
            }
        };

        Ok(condition)
    }
}

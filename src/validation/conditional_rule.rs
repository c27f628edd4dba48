use super::condition::ConditionResult;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name -> rule value, in declaration order.
pub type RuleMap = IndexMap<String, RuleValue>;

/// A Laravel rule value exactly as written in the form request.
///
/// `'required|email'` and `['required', 'email']` are kept apart so that
/// re-serialized output matches the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Pipe(String),
    List(Vec<String>),
}

impl RuleValue {
    /// Individual rule tokens, e.g. `["required", "max:255"]`
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            RuleValue::Pipe(rules) => rules
                .split('|')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect(),
            RuleValue::List(rules) => rules.iter().map(String::as_str).collect(),
        }
    }

    /// Whether a rule with this name is present, ignoring its `:parameters`
    pub fn contains_rule(&self, name: &str) -> bool {
        self.tokens()
            .iter()
            .any(|token| token.split(':').next() == Some(name))
    }
}

impl From<&str> for RuleValue {
    fn from(rules: &str) -> Self {
        RuleValue::Pipe(rules.to_string())
    }
}

impl From<Vec<&str>> for RuleValue {
    fn from(rules: Vec<&str>) -> Self {
        RuleValue::List(rules.into_iter().map(str::to_string).collect())
    }
}

fn default_probability() -> f64 {
    1.0
}

/// One branch of a request's rules: the rules that apply when every
/// condition holds.
///
/// An empty condition list means the branch is always active. `probability`
/// is a static estimate of how often the branch is taken, used when picking
/// examples; it always lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConditionalRule")]
pub struct ConditionalRule {
    conditions: Vec<ConditionResult>,
    rules: RuleMap,
    probability: f64,
}

impl ConditionalRule {
    pub fn new(conditions: Vec<ConditionResult>, rules: RuleMap) -> Self {
        Self {
            conditions,
            rules,
            probability: default_probability(),
        }
    }

    /// A branch that applies regardless of the request
    pub fn unconditional(rules: RuleMap) -> Self {
        Self::new(Vec::new(), rules)
    }

    pub fn with_probability(mut self, probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::InvalidArgument(format!(
                "probability must be within [0, 1], got {}",
                probability
            )));
        }
        self.probability = probability;
        Ok(self)
    }

    pub fn conditions(&self) -> &[ConditionResult] {
        &self.conditions
    }

    pub fn rules(&self) -> &RuleMap {
        &self.rules
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Classified by the leading condition only.
    pub fn is_http_method_condition(&self) -> bool {
        self.conditions
            .first()
            .is_some_and(ConditionResult::is_http_method)
    }

    /// Method of the leading condition when it is an HTTP method check
    pub fn http_method(&self) -> Option<&str> {
        match self.conditions.first() {
            Some(condition @ ConditionResult::HttpMethod { .. }) => condition.method(),
            _ => None,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

/// Accepts both the typed `{conditions, rules, probability}` shape and the
/// older `{condition, rules}` shape written by earlier analyzer versions.
#[derive(Deserialize)]
struct RawConditionalRule {
    #[serde(default)]
    conditions: Option<Vec<ConditionResult>>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    rules: RuleMap,
    #[serde(default = "default_probability")]
    probability: f64,
}

impl TryFrom<RawConditionalRule> for ConditionalRule {
    type Error = Error;

    fn try_from(raw: RawConditionalRule) -> Result<Self> {
        let conditions = match (raw.conditions, raw.condition) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidArgument(
                    "rule set entry has both 'conditions' and 'condition'".to_string(),
                ))
            }
            (Some(conditions), None) => conditions,
            (None, Some(descriptor)) if descriptor.trim().is_empty() => Vec::new(),
            (None, Some(descriptor)) => vec![ConditionResult::from_legacy_descriptor(&descriptor)],
            (None, None) => Vec::new(),
        };

        ConditionalRule::new(conditions, raw.rules).with_probability(raw.probability)
    }
}

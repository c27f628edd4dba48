use super::rule_set::ConditionalRuleSet;
use crate::error::Result;
use crate::parameter::ParameterDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the validation analyzer learned about one form request or
/// inline `validate()` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationAnalysisResult {
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub conditional_rules: ConditionalRuleSet,
    /// Field -> human-readable label (`attributes()` in the form request)
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// `field.rule` -> custom error message
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

impl ValidationAnalysisResult {
    pub fn new(parameters: Vec<ParameterDefinition>, conditional_rules: ConditionalRuleSet) -> Self {
        Self {
            parameters,
            conditional_rules,
            attributes: IndexMap::new(),
            messages: IndexMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: IndexMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_messages(mut self, messages: IndexMap<String, String>) -> Self {
        self.messages = messages;
        self
    }

    pub fn has_conditional_rules(&self) -> bool {
        self.conditional_rules.has_conditions()
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn parameter_by_name(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> Vec<&ParameterDefinition> {
        self.parameters.iter().filter(|p| p.required).collect()
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// No parameters and no rule branches
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.conditional_rules.is_empty()
    }

    pub fn count(&self) -> usize {
        self.parameters.len()
    }

    pub fn attribute_for(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }

    pub fn message_for(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// `(rule, message)` pairs for every `field.rule` message of `field`.
    ///
    /// Field names may themselves be dotted (`items.*.name`); the rule is the
    /// last segment of the key, so nested fields are not included.
    pub fn messages_for_field(&self, field: &str) -> Vec<(&str, &str)> {
        self.messages
            .iter()
            .filter_map(|(key, message)| {
                let (key_field, rule) = key.rsplit_once('.')?;
                (key_field == field).then_some((rule, message.as_str()))
            })
            .collect()
    }

    /// Merged-rule fields that have no matching parameter
    pub fn fields_without_parameters(&self) -> Vec<&str> {
        self.conditional_rules
            .merged_rules()
            .keys()
            .filter(|field| self.parameter_by_name(field).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let result = Self::deserialize(value)?;
        result.conditional_rules.warn_if_inconsistent();
        Ok(result)
    }
}

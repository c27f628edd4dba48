//! Conditional validation-rule model.
//!
//! Laravel form requests often return different rules depending on the
//! request: `isMethod('POST')`, a user permission check, the presence of a
//! sibling field, or `Rule::when(...)`. This module models what the analyzer
//! discovers about those branches and how they combine.
//!
//! The pieces, leaves first:
//!
//! 1. [`ConditionResult`] - one condition (HTTP method, user check, ...)
//! 2. [`ConditionalRule`] - the rules that apply when all its conditions hold
//! 3. [`ConditionalRuleSet`] - every branch for a target plus the merged view
//! 4. [`ValidationAnalysisResult`] - parameters, rule set, attribute labels
//!    and custom messages for one endpoint
//!
//! Every type round-trips through [`serde_json::Value`] with `to_value` /
//! `from_value`, keeping map order intact.
//!
//! # Example
//!
//! ```
//! use laravel_openapi_rules::validation::{
//!     ConditionResult, ConditionalRule, ConditionalRuleSet, RuleMap, RuleValue,
//! };
//!
//! let post = ConditionalRule::new(
//!     vec![ConditionResult::http_method(Some("POST".to_string()), "isMethod('POST')")],
//!     RuleMap::from([("name".to_string(), RuleValue::from("required"))]),
//! );
//! let set = ConditionalRuleSet::merge(vec![post]);
//!
//! assert!(set.has_conditions());
//! assert_eq!(set.rules_for_http_method("POST").len(), 1);
//! assert!(set.rules_for_http_method("DELETE").is_empty());
//! ```

pub mod analysis;
pub mod condition;
pub mod conditional_rule;
pub mod rule_set;

pub use analysis::ValidationAnalysisResult;
pub use condition::ConditionResult;
pub use conditional_rule::{ConditionalRule, RuleMap, RuleValue};
pub use rule_set::ConditionalRuleSet;

use super::condition::ConditionResult;
use super::conditional_rule::{ConditionalRule, RuleMap};
use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every conditional rule branch found for one validation target, together
/// with the flattened per-field view of those branches.
///
/// `merged_rules` and `has_conditions` are stored as the producer supplied
/// them; use [`ConditionalRuleSet::merge`] to compute them from the branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRuleSet {
    #[serde(rename = "rules_sets", default)]
    rule_sets: Vec<ConditionalRule>,
    #[serde(default)]
    merged_rules: RuleMap,
    #[serde(default)]
    has_conditions: bool,
}

impl ConditionalRuleSet {
    pub fn new(rule_sets: Vec<ConditionalRule>, merged_rules: RuleMap, has_conditions: bool) -> Self {
        Self {
            rule_sets,
            merged_rules,
            has_conditions,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), RuleMap::new(), false)
    }

    /// Builds a rule set whose merged view is derived from `rule_sets`.
    ///
    /// Unconditional branches are applied first, then conditioned branches,
    /// each group in order; when two branches set the same field the later
    /// one wins. Fields keep the position of their first appearance.
    pub fn merge(rule_sets: Vec<ConditionalRule>) -> Self {
        let mut merged_rules = RuleMap::new();

        let (baseline, conditioned): (Vec<_>, Vec<_>) =
            rule_sets.iter().partition(|rule| !rule.has_conditions());

        for rule in baseline.into_iter().chain(conditioned) {
            for (field, value) in rule.rules() {
                merged_rules.insert(field.clone(), value.clone());
            }
        }

        let has_conditions = rule_sets.iter().any(ConditionalRule::has_conditions);
        debug!(
            "Merged {} rule sets into {} fields (conditional: {})",
            rule_sets.len(),
            merged_rules.len(),
            has_conditions
        );

        Self::new(rule_sets, merged_rules, has_conditions)
    }

    pub fn rule_sets(&self) -> &[ConditionalRule] {
        &self.rule_sets
    }

    pub fn merged_rules(&self) -> &RuleMap {
        &self.merged_rules
    }

    pub fn has_conditions(&self) -> bool {
        self.has_conditions
    }

    /// Only looks at the branches; the merged view and flag are ignored.
    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }

    pub fn count(&self) -> usize {
        self.rule_sets.len()
    }

    /// Every condition of every branch, in order, duplicates included
    pub fn all_conditions(&self) -> Vec<&ConditionResult> {
        self.rule_sets
            .iter()
            .flat_map(|rule| rule.conditions())
            .collect()
    }

    /// Rules of the first branch with a condition matching `descriptor`
    /// (by expression or method), or an empty map.
    pub fn rules_for_condition(&self, descriptor: &str) -> RuleMap {
        self.rule_sets
            .iter()
            .find(|rule| {
                rule.conditions()
                    .iter()
                    .any(|condition| condition.matches_descriptor(descriptor))
            })
            .map(|rule| rule.rules().clone())
            .unwrap_or_default()
    }

    /// Rules of the first branch led by an HTTP method check for `method`
    pub fn rules_for_http_method(&self, method: &str) -> RuleMap {
        self.rule_sets
            .iter()
            .find(|rule| {
                rule.is_http_method_condition()
                    && rule
                        .http_method()
                        .is_some_and(|m| m.eq_ignore_ascii_case(method))
            })
            .map(|rule| rule.rules().clone())
            .unwrap_or_default()
    }

    /// Every rule in force for a request with `method`.
    ///
    /// Unconditional branches are applied first, then branches whose
    /// conditions are all HTTP method checks for `method`, each group in
    /// order with later writes winning as in [`ConditionalRuleSet::merge`].
    /// Branches that also depend on anything else are left out.
    pub fn active_rules_for_http_method(&self, method: &str) -> RuleMap {
        let matches_method = |rule: &&ConditionalRule| {
            rule.has_conditions()
                && rule.conditions().iter().all(|condition| {
                    condition.is_http_method()
                        && condition
                            .method()
                            .is_some_and(|m| m.eq_ignore_ascii_case(method))
                })
        };

        let baseline = self.rule_sets.iter().filter(|rule| !rule.has_conditions());
        let for_method = self.rule_sets.iter().filter(matches_method);

        let mut active = RuleMap::new();
        for rule in baseline.chain(for_method) {
            for (field, value) in rule.rules() {
                active.insert(field.clone(), value.clone());
            }
        }
        active
    }

    /// Whether the stored `has_conditions` flag agrees with the branches
    pub fn condition_flag_is_consistent(&self) -> bool {
        self.has_conditions == self.rule_sets.iter().any(ConditionalRule::has_conditions)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let rule_set = Self::deserialize(value)?;
        rule_set.warn_if_inconsistent();
        Ok(rule_set)
    }

    pub(crate) fn warn_if_inconsistent(&self) {
        if !self.condition_flag_is_consistent() {
            warn!(
                "Rule set reports has_conditions={} but its {} branches disagree",
                self.has_conditions,
                self.rule_sets.len()
            );
        }
    }
}

impl Default for ConditionalRuleSet {
    fn default() -> Self {
        Self::empty()
    }
}

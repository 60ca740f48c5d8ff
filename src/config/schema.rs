use crate::builtin::DEFAULT_TARGET;
use crate::pipeline::MatchPolicy;
use crate::rule::{Replacement, Rule, RuleError, RuleSet};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }

            if rule.pattern.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "pattern",
                });
            } else if let Err(e) = Regex::new(&rule.pattern) {
                issues.push(ValidationIssue::InvalidPattern {
                    rule_id: rule.id.clone(),
                    message: e.to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Compile into an executable rule set, preserving rule order.
    pub fn to_rule_set(&self) -> Result<RuleSet, RuleError> {
        let rules = self
            .rules
            .iter()
            .map(RuleDefinition::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let name = if self.meta.name.trim().is_empty() {
            "unnamed"
        } else {
            self.meta.name.as_str()
        };
        let target = self.meta.target.as_deref().unwrap_or(DEFAULT_TARGET);
        let policy = if self.meta.strict {
            MatchPolicy::Strict
        } else {
            MatchPolicy::Lenient
        };

        let mut set = RuleSet::new(name, target, rules).with_policy(policy);
        if let Some(description) = &self.meta.description {
            set = set.with_description(description.clone());
        }
        if let Some(message) = &self.meta.message {
            set = set.with_message(message.clone());
        }
        Ok(set)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// File to patch; defaults to `main.js`
    #[serde(default)]
    pub target: Option<String>,
    /// Printed after a successful run
    #[serde(default)]
    pub message: Option<String>,
    /// Treat a rule that matches nothing as an error
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    pub pattern: String,
    pub replacement: String,
    /// Insert `replacement` verbatim instead of expanding `$` references
    #[serde(default)]
    pub literal: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl RuleDefinition {
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let replacement = if self.literal {
            Replacement::Literal(self.replacement.clone())
        } else {
            Replacement::Template(self.replacement.clone())
        };
        let rule = Rule::new(self.id.clone(), &self.pattern, replacement)?;
        Ok(match &self.description {
            Some(description) => rule.with_description(description.clone()),
            None => rule,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
    InvalidPattern {
        rule_id: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule config contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is used more than once")
            }
            ValidationIssue::InvalidPattern { rule_id, message } => {
                write!(f, "rule '{rule_id}' has an invalid pattern: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: &str, pattern: &str) -> RuleDefinition {
        RuleDefinition {
            id: id.to_string(),
            pattern: pattern.to_string(),
            replacement: "x".to_string(),
            literal: false,
            description: None,
        }
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let config = RuleConfig {
            meta: Metadata::default(),
            rules: vec![
                definition("", "a"),
                definition("dup", "b"),
                definition("dup", "c"),
                definition("bad", "(open"),
                definition("blank", ""),
            ],
        };

        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 4);
        let text = err.to_string();
        assert!(text.contains("missing required field 'id'"));
        assert!(text.contains("'dup' is used more than once"));
        assert!(text.contains("'bad' has an invalid pattern"));
        assert!(text.contains("'blank' missing required field 'pattern'"));
    }

    #[test]
    fn test_validate_empty() {
        let err = RuleConfig::default().validate().unwrap_err();
        assert!(matches!(err.issues[0], ValidationIssue::EmptyRuleList));
    }

    #[test]
    fn test_to_rule_set_applies_meta() {
        let config = RuleConfig {
            meta: Metadata {
                name: "demo".to_string(),
                description: Some("demo rules".to_string()),
                target: Some("app.js".to_string()),
                message: Some("done".to_string()),
                strict: true,
            },
            rules: vec![definition("one", "a")],
        };

        let set = config.to_rule_set().unwrap();
        assert_eq!(set.name(), "demo");
        assert_eq!(set.description(), Some("demo rules"));
        assert_eq!(set.target(), std::path::Path::new("app.js"));
        assert_eq!(set.message(), "done");
        assert_eq!(set.policy(), MatchPolicy::Strict);
        assert_eq!(set.rules()[0].id(), "one");
    }

    #[test]
    fn test_literal_flag_selects_replacement_kind() {
        let mut def = definition("lit", "a");
        def.literal = true;
        let rule = def.compile().unwrap();
        assert!(matches!(rule.replacement(), Replacement::Literal(_)));
    }

    #[test]
    fn test_compile_carries_description() {
        let mut def = definition("described", "a");
        def.description = Some("explains the rule".to_string());
        assert_eq!(def.compile().unwrap().description(), Some("explains the rule"));
        assert_eq!(definition("bare", "a").compile().unwrap().description(), None);
    }
}

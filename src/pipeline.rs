//! Ordered application of rules to a document buffer.
//!
//! [`apply_rules`] is a fold: each rule receives the buffer produced by the
//! rules before it. Nothing here touches the filesystem.

use crate::rule::Rule;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// How a rule that matches nothing is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Zero matches leaves the buffer as it was and carries on.
    #[default]
    Lenient,
    /// Zero matches stops the pipeline.
    Strict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("rule '{rule}' matched no locations")]
    NoMatch { rule: String },
}

/// How many replacements a rule made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: String,
    pub replacements: usize,
}

impl RuleOutcome {
    pub fn matched(&self) -> bool {
        self.replacements > 0
    }
}

/// Buffer after every rule has run, plus one outcome per rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl Patched {
    fn start(text: &str, capacity: usize) -> Self {
        Self {
            text: text.to_string(),
            outcomes: Vec::with_capacity(capacity),
        }
    }

    /// Rules that left the buffer untouched.
    pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.matched())
    }

    pub fn total_replacements(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.replacements).sum()
    }
}

/// Apply `rules` to `buffer` in order.
pub fn apply_rules(
    buffer: &str,
    rules: &[Rule],
    policy: MatchPolicy,
) -> Result<Patched, PipelineError> {
    rules
        .iter()
        .try_fold(Patched::start(buffer, rules.len()), |mut patched, rule| {
            let (text, replacements) = rule.apply(&patched.text);
            let next = match text {
                Cow::Owned(text) => Some(text),
                Cow::Borrowed(_) => None,
            };

            if replacements == 0 && policy == MatchPolicy::Strict {
                return Err(PipelineError::NoMatch {
                    rule: rule.id().to_string(),
                });
            }

            if let Some(text) = next {
                patched.text = text;
            }
            patched.outcomes.push(RuleOutcome {
                rule: rule.id().to_string(),
                replacements,
            });
            Ok(patched)
        })
}

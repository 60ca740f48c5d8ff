//! Substitution rules and rule sets.
//!
//! A [`Rule`] is an immutable `(pattern, replacement)` record. Applying it to a
//! buffer replaces every non-overlapping match and reports how many there were.
//! A [`RuleSet`] is an ordered list of rules plus the file it targets and the
//! message printed once it has run.

use crate::pipeline::MatchPolicy;
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What a match is replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Capture references (`$1`, `${1}`, `$name`) are expanded.
    Template(String),
    /// Inserted verbatim, `$` included.
    Literal(String),
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule '{id}' has an invalid pattern: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

/// A single regex substitution, applied to every match in the buffer.
#[derive(Debug, Clone)]
#[must_use = "Rule does nothing until apply() is called"]
pub struct Rule {
    id: String,
    description: Option<String>,
    pattern: Regex,
    replacement: Replacement,
}

impl Rule {
    /// Compile a rule.
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        replacement: Replacement,
    ) -> Result<Self, RuleError> {
        let id = id.into();
        let pattern = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            id: id.clone(),
            source,
        })?;
        Ok(Self {
            id,
            description: None,
            pattern,
            replacement,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Rule whose replacement expands capture references.
    pub fn template(
        id: impl Into<String>,
        pattern: &str,
        template: impl Into<String>,
    ) -> Result<Self, RuleError> {
        Self::new(id, pattern, Replacement::Template(template.into()))
    }

    /// Rule whose replacement is inserted as-is.
    pub fn literal(
        id: impl Into<String>,
        pattern: &str,
        text: impl Into<String>,
    ) -> Result<Self, RuleError> {
        Self::new(id, pattern, Replacement::Literal(text.into()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    /// Number of non-overlapping matches in `text`.
    pub fn count_matches(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    /// Replace every match in `text`.
    ///
    /// Returns the resulting text and the number of replacements. When nothing
    /// matches the input is handed back borrowed and the count is zero.
    pub fn apply<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let count = self.count_matches(text);
        if count == 0 {
            return (Cow::Borrowed(text), 0);
        }

        let replaced = match &self.replacement {
            Replacement::Template(template) => self.pattern.replace_all(text, template.as_str()),
            Replacement::Literal(literal) => {
                self.pattern.replace_all(text, NoExpand(literal.as_str()))
            }
        };
        (replaced, count)
    }
}

/// An ordered, named list of rules aimed at one file.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    description: Option<String>,
    target: PathBuf,
    message: String,
    policy: MatchPolicy,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, target: impl Into<PathBuf>, rules: Vec<Rule>) -> Self {
        let name = name.into();
        let message = format!("{name} rules applied successfully!");
        Self {
            name,
            description: None,
            target: target.into(),
            message,
            policy: MatchPolicy::default(),
            rules,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Message printed after a successful run.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_expands_captures() {
        let rule = Rule::template("wrap", r"(foo)", "[${1}]").unwrap();
        let (out, count) = rule.apply("foo bar foo");
        assert_eq!(out, "[foo] bar [foo]");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_literal_keeps_dollar_signs() {
        let rule = Rule::literal("price", r"cost", "$1.00").unwrap();
        let (out, count) = rule.apply("cost");
        assert_eq!(out, "$1.00");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_no_match_borrows_input() {
        let rule = Rule::template("absent", r"missing", "x").unwrap();
        let (out, count) = rule.apply("nothing to see");
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_invalid_pattern_names_rule() {
        let err = Rule::template("broken", r"(unclosed", "x").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_whitespace_class_spans_lines() {
        let rule = Rule::template("block", r"(\{\s+body\(\);\s+\})", "${1} // done").unwrap();
        let (out, _) = rule.apply("{\n  body();\n}");
        assert_eq!(out, "{\n  body();\n} // done");
    }

    #[test]
    fn test_rule_set_defaults() {
        let set = RuleSet::new("demo", "main.js", Vec::new());
        assert_eq!(set.policy(), MatchPolicy::Lenient);
        assert_eq!(set.target(), Path::new("main.js"));
        assert!(set.message().contains("demo"));
        assert!(set.description().is_none());
    }
}

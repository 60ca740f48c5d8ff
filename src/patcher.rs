//! Sequential text patcher: load a file, fold rules over it, store it back.
//!
//! [`plan`] does the first two steps and returns a [`Plan`] that can be
//! inspected (diffs, dry runs) before [`Plan::commit`] writes it. [`run`] and
//! [`check`] are the one-shot forms.

use crate::document::{fingerprint, Document, DocumentError};
use crate::pipeline::{apply_rules, MatchPolicy, Patched, PipelineError, RuleOutcome};
use crate::rule::Rule;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("{file}: {source}")]
    Pipeline {
        file: PathBuf,
        #[source]
        source: PipelineError,
    },
}

/// What a run did to the target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "RunReport should be checked for unmatched rules"]
pub struct RunReport {
    pub file: PathBuf,
    pub outcomes: Vec<RuleOutcome>,
    pub changed: bool,
    pub fingerprint_before: u64,
    pub fingerprint_after: u64,
    pub written: bool,
}

impl RunReport {
    /// Rules that matched nothing.
    pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.matched())
    }

    pub fn total_replacements(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.replacements).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matched = self.outcomes.iter().filter(|o| o.matched()).count();
        write!(
            f,
            "{}: {}/{} rules matched, {} replacements{}",
            self.file.display(),
            matched,
            self.outcomes.len(),
            self.total_replacements(),
            if self.written { "" } else { " (not written)" }
        )
    }
}

/// A loaded document with every rule applied, not yet written.
#[derive(Debug, Clone)]
#[must_use = "Plan does nothing until commit() is called"]
pub struct Plan {
    document: Document,
    patched: Patched,
}

impl Plan {
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn original(&self) -> &str {
        self.document.text()
    }

    pub fn patched(&self) -> &str {
        &self.patched.text
    }

    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.patched.outcomes
    }

    pub fn is_changed(&self) -> bool {
        self.original() != self.patched()
    }

    /// Report without writing anything.
    pub fn report(&self) -> RunReport {
        self.build_report(false)
    }

    /// Overwrite the target with the patched buffer.
    ///
    /// The file is written even when no rule matched.
    pub fn commit(self) -> Result<RunReport, PatchError> {
        self.document.store(&self.patched.text)?;
        Ok(self.build_report(true))
    }

    fn build_report(&self, written: bool) -> RunReport {
        RunReport {
            file: self.document.path().to_path_buf(),
            outcomes: self.patched.outcomes.clone(),
            changed: self.is_changed(),
            fingerprint_before: self.document.fingerprint(),
            fingerprint_after: fingerprint(&self.patched.text),
            written,
        }
    }
}

/// Load `path` and apply `rules` to it in memory.
pub fn plan(
    path: impl AsRef<Path>,
    rules: &[Rule],
    policy: MatchPolicy,
) -> Result<Plan, PatchError> {
    let document = Document::load(path)?;
    let patched =
        apply_rules(document.text(), rules, policy).map_err(|source| PatchError::Pipeline {
            file: document.path().to_path_buf(),
            source,
        })?;
    Ok(Plan { document, patched })
}

/// Apply `rules` to the file at `path` and write the result back.
pub fn run(
    path: impl AsRef<Path>,
    rules: &[Rule],
    policy: MatchPolicy,
) -> Result<RunReport, PatchError> {
    plan(path, rules, policy)?.commit()
}

/// Like [`run`], without writing.
pub fn check(
    path: impl AsRef<Path>,
    rules: &[Rule],
    policy: MatchPolicy,
) -> Result<RunReport, PatchError> {
    Ok(plan(path, rules, policy)?.report())
}

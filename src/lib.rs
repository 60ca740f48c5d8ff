//! Modal Patcher: ordered regex rule sets for a web front-end's main script
//!
//! Wires new modal panels into `main.js` by applying a fixed list of
//! find-and-replace rules: extend the click handler's type condition, append
//! the new modal call after the previous one, append the state resets.
//!
//! # Architecture
//!
//! A [`Rule`] is an immutable `(pattern, replacement)` record. Rules are
//! folded over the document buffer in order by [`apply_rules`]; each rule sees
//! the output of the rules before it. [`patcher::run`] wraps the fold with a
//! single read and a single atomic write of the target file.
//!
//! # Behavior worth knowing
//!
//! - A rule that matches nothing is skipped silently unless
//!   [`MatchPolicy::Strict`] is requested.
//! - Rule sets are not idempotent: running one twice can insert its blocks twice.
//! - No backup is made; the target is overwritten in place.
//!
//! # Example
//!
//! ```no_run
//! use modal_patcher::{builtin, patcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let medical = builtin::medical()?;
//! let report = patcher::run(medical.target(), medical.rules(), medical.policy())?;
//! println!("{report}");
//! println!("{}", medical.message());
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod config;
pub mod document;
pub mod patcher;
pub mod pipeline;
pub mod rule;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, RuleConfig};
pub use document::{Document, DocumentError};
pub use patcher::{check, plan, run, PatchError, Plan, RunReport};
pub use pipeline::{apply_rules, MatchPolicy, Patched, PipelineError, RuleOutcome};
pub use rule::{Replacement, Rule, RuleError, RuleSet};

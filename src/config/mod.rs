pub mod loader;
pub mod schema;

pub use loader::{discover_rule_files, load_from_path, load_from_str, ConfigError};
pub use schema::{Metadata, RuleConfig, RuleDefinition, ValidationError, ValidationIssue};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use modal_patcher::config::{discover_rule_files, load_from_path};
use modal_patcher::{builtin, patcher, MatchPolicy, RuleOutcome, RuleSet};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "modal-patcher")]
#[command(about = "Apply ordered regex rule sets to a front-end script", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Built-in rule set to run (medical, forvia)
    #[arg(required_unless_present = "rules", conflicts_with = "rules")]
    set: Option<String>,

    /// TOML rule file to run instead of a built-in set
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// File to patch (defaults to the rule set's target, usually main.js)
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a rule set to the target file
    Apply {
        #[command(flatten)]
        source: Source,

        /// Dry run - show what would change without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes (ignored with --json)
        #[arg(short, long)]
        diff: bool,

        /// Fail if any rule matches nothing
        #[arg(short, long)]
        strict: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Show per-rule replacement counts
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report which rules would match, without writing
    Check {
        #[command(flatten)]
        source: Source,
    },

    /// List built-in rule sets and rule files
    List {
        /// Directory holding *.toml rule files (default: ./rules)
        #[arg(long)]
        rules_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            source,
            dry_run,
            diff,
            strict,
            json,
            verbose,
        } => cmd_apply(source, dry_run, diff, strict, json, verbose),

        Commands::Check { source } => cmd_check(source),

        Commands::List { rules_dir } => cmd_list(rules_dir),
    }
}

/// Resolve the rule set named on the command line.
fn load_rule_set(source: &Source) -> Result<RuleSet> {
    if let Some(path) = &source.rules {
        let config = load_from_path(path)?;
        return config
            .to_rule_set()
            .with_context(|| format!("failed to compile rules from {}", path.display()));
    }

    let name = source.set.as_deref().unwrap_or_default();
    match builtin::by_name(name) {
        Some(set) => Ok(set?),
        None => anyhow::bail!(
            "Unknown rule set '{}'. Built-in sets: {}",
            name,
            builtin::names().join(", ")
        ),
    }
}

/// Resolve the rule file directory.
///
/// Priority order:
/// 1. Explicit --rules-dir flag
/// 2. MODAL_PATCHER_RULES_DIR environment variable
/// 3. ./rules
fn resolve_rules_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir;
    }

    if let Ok(env_dir) = env::var("MODAL_PATCHER_RULES_DIR") {
        return PathBuf::from(env_dir);
    }

    PathBuf::from("rules")
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_outcome(outcome: &RuleOutcome, description: Option<&str>) {
    if outcome.matched() {
        println!(
            "{} {}: {} replacement(s)",
            "✓".green(),
            outcome.rule,
            outcome.replacements
        );
    } else {
        println!("{} {}: {}", "⊙".yellow(), outcome.rule, "no match".dimmed());
    }

    if let Some(description) = description {
        println!("    {}", description.dimmed());
    }
}

/// Per-rule outcomes next to the description of the rule that produced them.
fn print_outcomes(rule_set: &RuleSet, outcomes: &[RuleOutcome]) {
    for (rule, outcome) in rule_set.rules().iter().zip(outcomes) {
        print_outcome(outcome, rule.description());
    }
}

fn cmd_apply(
    source: Source,
    dry_run: bool,
    show_diff: bool,
    strict: bool,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let rule_set = load_rule_set(&source)?;
    let target = source
        .file
        .clone()
        .unwrap_or_else(|| rule_set.target().to_path_buf());
    let policy = if strict {
        MatchPolicy::Strict
    } else {
        rule_set.policy()
    };

    let plan = patcher::plan(&target, rule_set.rules(), policy)?;

    if verbose && !json {
        println!("{}", format!("Rule set: {}", rule_set.name()).dimmed());
        print_outcomes(&rule_set, plan.outcomes());
    }

    // JSON output stays machine-readable, so the diff is skipped
    if show_diff && !json && plan.is_changed() {
        display_diff(plan.path(), plan.original(), plan.patched());
    }

    let report = if dry_run {
        plan.report()
    } else {
        plan.commit()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if dry_run {
        println!(
            "{} {}",
            "[DRY RUN]".cyan(),
            format!("{report}").dimmed()
        );
    } else {
        println!("{}", rule_set.message());
    }

    Ok(())
}

fn cmd_check(source: Source) -> Result<()> {
    let rule_set = load_rule_set(&source)?;
    let target = source
        .file
        .clone()
        .unwrap_or_else(|| rule_set.target().to_path_buf());

    let report = patcher::check(&target, rule_set.rules(), MatchPolicy::Lenient)?;

    println!("{}", "Rule Check Report".bold());
    println!("Rule set: {}", rule_set.name());
    println!("File: {}", target.display());
    println!();

    print_outcomes(&rule_set, &report.outcomes);

    let unmatched = report.unmatched().count();
    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} matched",
        format!("{}", report.outcomes.len() - unmatched).green()
    );
    println!("  {} unmatched", format!("{}", unmatched).yellow());

    if unmatched > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(rules_dir: Option<PathBuf>) -> Result<()> {
    println!("{}", "Built-in rule sets:".bold());
    for name in builtin::names() {
        if let Some(set) = builtin::by_name(name) {
            let set = set?;
            println!(
                "  {} ({} rules) {}",
                set.name().green(),
                set.rules().len(),
                set.description().unwrap_or_default().dimmed()
            );
        }
    }

    let dir = resolve_rules_dir(rules_dir);
    let files = discover_rule_files(&dir)?;

    println!();
    println!("{}", format!("Rule files in {}:", dir.display()).bold());
    if files.is_empty() {
        println!("  {}", "none".dimmed());
    }

    for file in files {
        match load_from_path(&file) {
            Ok(config) => println!(
                "  {} ({} rules) {}",
                config.meta.name.green(),
                config.rules.len(),
                file.display().to_string().dimmed()
            ),
            Err(e) => eprintln!("  {} {}: {}", "✗".red(), file.display(), e),
        }
    }

    Ok(())
}

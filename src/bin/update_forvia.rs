//! Add the FORVIA car modal to `./main.js`.

use anyhow::Result;
use modal_patcher::{builtin, patcher};

fn main() -> Result<()> {
    let rule_set = builtin::forvia()?;
    let _report = patcher::run(rule_set.target(), rule_set.rules(), rule_set.policy())?;
    println!("{}", rule_set.message());
    Ok(())
}

//! Built-in rule sets for wiring new modal panels into `main.js`.
//!
//! Each set extends the click handler's "no camera movement" condition with a
//! new object type, appends the modal call after the previous panel's call, and
//! appends the modal-state reset after the previous panel's resets. Inserted
//! text carries the indentation the target file uses at those sites.

use crate::rule::{Rule, RuleError, RuleSet};

/// File the built-in sets patch, relative to the working directory.
pub const DEFAULT_TARGET: &str = "main.js";

pub const MEDICAL: &str = "medical";
pub const FORVIA: &str = "forvia";

/// Names accepted by [`by_name`], in the order the sets were introduced.
pub fn names() -> &'static [&'static str] {
    &[MEDICAL, FORVIA]
}

pub fn by_name(name: &str) -> Option<Result<RuleSet, RuleError>> {
    match name {
        MEDICAL => Some(medical()),
        FORVIA => Some(forvia()),
        _ => None,
    }
}

/// Medical information panel, added after the sensorSensei panel.
pub fn medical() -> Result<RuleSet, RuleError> {
    let rules = vec![
        Rule::literal(
            "condition",
            r"if \(object\.userData\.type === 'trashTruck' \|\| object\.userData\.type === 'convoyeur' \|\| object\.userData\.type === 'sensorSensei'\)",
            "if (object.userData.type === 'trashTruck' || object.userData.type === 'convoyeur' || object.userData.type === 'sensorSensei' || object.userData.type === 'medical')",
        )?
        .with_description("Add medical to the no-camera-movement condition"),
        Rule::template(
            "modal-call",
            r"(\s+if \(object\.userData\.type === 'sensorSensei' && !sensorSenseiModalClosed\) \{\s+showSensorSenseiModal\(\);\s+\})",
            "${1}\n        if (object.userData.type === 'medical' && !medicalModalClosed) {\n          showMedicalModal();\n        }",
        )?
        .with_description("Open the medical modal after the sensorSensei one"),
        Rule::template(
            "reset-on-navigate",
            r"(\s+// Reset sensorSensei modal state when navigating to different areas\s+sensorSenseiModalClosed = false;\s+sensorSenseiModalOpened = false;)",
            "${1}\n      \n      // Reset medical modal state when navigating to different areas\n      medicalModalClosed = false;\n      medicalModalOpened = false;",
        )?,
        Rule::literal(
            "comment",
            r"// Handle objects that don't need camera movement \(trashTruck, convoyeur, sensorSensei\)",
            "// Handle objects that don't need camera movement (trashTruck, convoyeur, sensorSensei, medical)",
        )?,
    ];

    Ok(RuleSet::new(MEDICAL, DEFAULT_TARGET, rules)
        .with_description("Add the medical modal next to the sensorSensei modal")
        .with_message("Medical integration completed successfully!"))
}

/// FORVIA car-brand panel, added after the medical panel.
pub fn forvia() -> Result<RuleSet, RuleError> {
    let rules = vec![
        Rule::literal(
            "condition",
            r"(object\.userData\.type === 'trashTruck' \|\| object\.userData\.type === 'convoyeur' \|\| object\.userData\.type === 'sensorSensei' \|\| object\.userData\.type === 'medical')",
            "object.userData.type === 'trashTruck' || object.userData.type === 'convoyeur' || object.userData.type === 'sensorSensei' || object.userData.type === 'medical' || object.userData.type === 'forviaCAR'",
        )?
        .with_description("Add forviaCAR to the no-camera-movement condition"),
        Rule::template(
            "modal-call",
            r"(\s+if \(object\.userData\.type === 'medical' && !medicalModalClosed\) \{\s+showMedicalModal\(\);\s+\})",
            "${1}\n        if (object.userData.type === 'forviaCAR' && !forviaCarModalClosed) {\n          showForviaCarModal();\n        }",
        )?
        .with_description("Open the FORVIA car modal after the medical one"),
        Rule::literal(
            "comment",
            r"// Handle objects that don't need camera movement \(trashTruck, convoyeur, sensorSensei, medical\)",
            "// Handle objects that don't need camera movement (trashTruck, convoyeur, sensorSensei, medical, forviaCAR)",
        )?,
        Rule::template(
            "reset-on-overview",
            r"(\s+// Reset medical modal state when going back to overview\s+medicalModalClosed = false;\s+medicalModalOpened = false;)",
            "${1}\n    \n    // Reset forviaCAR modal state when going back to overview\n    forviaCarModalClosed = false;\n    forviaCarModalOpened = false;",
        )?,
        Rule::template(
            "reset-on-navigate",
            r"(\s+// Reset medical modal state when navigating to different areas\s+medicalModalClosed = false;\s+medicalModalOpened = false;)",
            "${1}\n      \n      // Reset forviaCAR modal state when navigating to different areas\n      forviaCarModalClosed = false;\n      forviaCarModalOpened = false;",
        )?,
    ];

    Ok(RuleSet::new(FORVIA, DEFAULT_TARGET, rules)
        .with_description("Add the FORVIA car modal next to the medical modal")
        .with_message("FORVIA car integration completed successfully!"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MatchPolicy;
    use std::path::Path;

    #[test]
    fn test_builtin_sets_compile() {
        let medical = medical().unwrap();
        assert_eq!(medical.rules().len(), 4);
        assert_eq!(medical.target(), Path::new(DEFAULT_TARGET));
        assert_eq!(medical.policy(), MatchPolicy::Lenient);

        let forvia = forvia().unwrap();
        assert_eq!(forvia.rules().len(), 5);
    }

    #[test]
    fn test_by_name() {
        for name in names() {
            let set = by_name(name).unwrap().unwrap();
            assert_eq!(set.name(), *name);
        }
        assert!(by_name("sensorSensei").is_none());
    }

    #[test]
    fn test_rule_ids_are_unique() {
        for name in names() {
            let set = by_name(name).unwrap().unwrap();
            let mut ids: Vec<_> = set.rules().iter().map(|r| r.id()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), set.rules().len(), "duplicate rule id in {name}");
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            medical().unwrap().message(),
            "Medical integration completed successfully!"
        );
        assert_eq!(
            forvia().unwrap().message(),
            "FORVIA car integration completed successfully!"
        );
    }
}

//! Property tests for rule application.

use modal_patcher::{apply_rules, builtin, MatchPolicy, Rule};
use proptest::prelude::*;

const CONDITION: &str = "if (object.userData.type === 'trashTruck' || object.userData.type === 'convoyeur' || object.userData.type === 'sensorSensei')";
const EXTENDED: &str = "if (object.userData.type === 'trashTruck' || object.userData.type === 'convoyeur' || object.userData.type === 'sensorSensei' || object.userData.type === 'medical')";

proptest! {
    #[test]
    fn text_without_any_site_is_untouched(text in "[a-z0-9 \n;(){}=]{0,200}") {
        for name in builtin::names() {
            let set = builtin::by_name(name).unwrap().unwrap();
            let patched = apply_rules(&text, set.rules(), MatchPolicy::Lenient).unwrap();
            prop_assert_eq!(&patched.text, &text);
            prop_assert_eq!(patched.total_replacements(), 0);
        }
    }

    #[test]
    fn single_condition_is_replaced_once(
        prefix in "[a-z ;\n]{0,40}",
        suffix in "[a-z ;\n]{0,40}",
    ) {
        let input = format!("{prefix}{CONDITION}{suffix}");
        let set = builtin::medical().unwrap();
        let patched = apply_rules(&input, set.rules(), MatchPolicy::Lenient).unwrap();

        prop_assert_eq!(patched.text.matches(EXTENDED).count(), 1);
        prop_assert!(!patched.text.contains(CONDITION));
        prop_assert_eq!(patched.text, format!("{prefix}{EXTENDED}{suffix}"));
    }

    #[test]
    fn literal_rule_replaces_every_occurrence(
        parts in prop::collection::vec("[a-z]{0,8}", 1..6),
    ) {
        let input = parts.join("MARK");
        let rule = Rule::literal("mark", "MARK", "mark").unwrap();
        let patched = apply_rules(&input, &[rule], MatchPolicy::Lenient).unwrap();

        prop_assert_eq!(patched.outcomes[0].replacements, parts.len() - 1);
        prop_assert_eq!(patched.text, parts.join("mark"));
    }
}

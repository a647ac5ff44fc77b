//! Rule selection.
//!
//! A selector decides, once per rule and before any validator runs, whether
//! a rule takes part in the current run.

use crate::context::ExecutionState;
use crate::rule::{RuleDescriptor, RuleKind};
use regex::Regex;
use std::fmt::Debug;
use std::sync::OnceLock;

/// Name of the implicit rule set of rules declared outside any rule set.
pub const DEFAULT_RULE_SET: &str = "default";

/// What a selector can see about the run besides the rule itself.
#[derive(Debug, Clone, Copy)]
pub struct SelectorScope<'s> {
    /// Shared state of the run
    pub state: &'s ExecutionState,
    /// `true` inside a nested validator
    pub is_child_context: bool,
}

/// Decides whether a rule executes.
pub trait ValidatorSelector: Debug + Send + Sync {
    fn can_execute(
        &self,
        rule: &RuleDescriptor<'_>,
        property_path: &str,
        scope: &SelectorScope<'_>,
    ) -> bool;
}

/// Selects rules that are not in a rule set, or are in the `default` set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSelector;

impl ValidatorSelector for DefaultSelector {
    fn can_execute(
        &self,
        rule: &RuleDescriptor<'_>,
        _property_path: &str,
        _scope: &SelectorScope<'_>,
    ) -> bool {
        rule.rule_sets.is_empty()
            || rule
                .rule_sets
                .iter()
                .any(|set| set.eq_ignore_ascii_case(DEFAULT_RULE_SET))
    }
}

/// Selects rules by rule-set name.
///
/// `"*"` selects every rule; `"default"` also selects rules declared outside
/// any rule set. Names compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RuleSetSelector {
    rule_sets: Vec<String>,
}

impl RuleSetSelector {
    pub const WILDCARD: &'static str = "*";

    pub fn new<I, S>(rule_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule_sets: rule_sets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn rule_sets(&self) -> &[String] {
        &self.rule_sets
    }
}

impl ValidatorSelector for RuleSetSelector {
    fn can_execute(
        &self,
        rule: &RuleDescriptor<'_>,
        _property_path: &str,
        _scope: &SelectorScope<'_>,
    ) -> bool {
        if self.rule_sets.iter().any(|s| s == Self::WILDCARD) {
            return true;
        }
        if rule.rule_sets.is_empty() {
            return self
                .rule_sets
                .iter()
                .any(|s| s.eq_ignore_ascii_case(DEFAULT_RULE_SET));
        }
        rule.rule_sets
            .iter()
            .any(|set| self.rule_sets.iter().any(|s| s.eq_ignore_ascii_case(set)))
    }
}

/// Selects rules by property path.
///
/// A selected path also selects everything nested below it and every parent
/// needed to reach it. `[]` in a member name matches any collection index,
/// so `Orders[].Total` selects `Orders[0].Total`, `Orders[1].Total` and so on.
#[derive(Debug, Clone, Default)]
pub struct MemberNameSelector {
    members: Vec<String>,
}

impl MemberNameSelector {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    fn matches(member: &str, path: &str) -> bool {
        let related = |a: &str, b: &str| {
            a == b
                || b.strip_prefix(a)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        };
        if related(member, path) || related(path, member) {
            return true;
        }
        let member = normalize_indexers(member);
        let path = normalize_indexers(path);
        related(&member, &path) || related(&path, &member)
    }
}

impl ValidatorSelector for MemberNameSelector {
    fn can_execute(
        &self,
        rule: &RuleDescriptor<'_>,
        property_path: &str,
        scope: &SelectorScope<'_>,
    ) -> bool {
        if rule.kind == RuleKind::Include {
            return true;
        }
        // A nested validator only runs because its parent property was
        // selected, so everything inside it runs too unless a nested member
        // path was asked for explicitly.
        if scope.is_child_context
            && !scope.state.selector_cascade_disabled()
            && !self.members.iter().any(|m| m.contains('.'))
        {
            return true;
        }
        self.members
            .iter()
            .any(|member| Self::matches(member, property_path))
    }
}

fn indexer_regex() -> &'static Regex {
    static INDEXER: OnceLock<Regex> = OnceLock::new();
    INDEXER.get_or_init(|| Regex::new(r"\[[^\]]*\]").expect("indexer pattern is valid"))
}

fn normalize_indexers(path: &str) -> String {
    indexer_regex().replace_all(path, "[]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionState;
    use crate::options::ValidationOptions;

    fn descriptor<'a>(sets: &'a [String], kind: RuleKind) -> RuleDescriptor<'a> {
        RuleDescriptor {
            property_name: Some("Name"),
            rule_sets: sets,
            kind,
        }
    }

    #[test]
    fn default_selector() {
        let state = ExecutionState::for_tests();
        let scope = SelectorScope {
            state: &state,
            is_child_context: false,
        };
        let none: Vec<String> = vec![];
        let default = vec!["Default".to_string()];
        let admin = vec!["Admin".to_string()];

        assert!(DefaultSelector.can_execute(&descriptor(&none, RuleKind::Property), "Name", &scope));
        assert!(DefaultSelector.can_execute(&descriptor(&default, RuleKind::Property), "Name", &scope));
        assert!(!DefaultSelector.can_execute(&descriptor(&admin, RuleKind::Property), "Name", &scope));
    }

    #[test]
    fn rule_set_selector() {
        let state = ExecutionState::for_tests();
        let scope = SelectorScope {
            state: &state,
            is_child_context: false,
        };
        let none: Vec<String> = vec![];
        let admin = vec!["admin".to_string()];

        let selector = RuleSetSelector::new(["Admin"]);
        assert!(selector.can_execute(&descriptor(&admin, RuleKind::Property), "Name", &scope));
        assert!(!selector.can_execute(&descriptor(&none, RuleKind::Property), "Name", &scope));

        let selector = RuleSetSelector::new(["Admin", "default"]);
        assert!(selector.can_execute(&descriptor(&none, RuleKind::Property), "Name", &scope));

        let selector = RuleSetSelector::new(["*"]);
        assert!(selector.can_execute(&descriptor(&admin, RuleKind::Property), "Name", &scope));
    }

    #[test]
    fn member_name_matching() {
        assert!(MemberNameSelector::matches("Name", "Name"));
        assert!(!MemberNameSelector::matches("Name", "Names"));
        assert!(MemberNameSelector::matches("Address", "Address.Line1"));
        assert!(MemberNameSelector::matches("Address.Line1", "Address"));
        assert!(MemberNameSelector::matches("Orders[].Total", "Orders[3].Total"));
        assert!(MemberNameSelector::matches("Orders[].Total", "Orders"));
        assert!(!MemberNameSelector::matches("Orders[].Total", "Orders[3].Name"));
    }

    #[test]
    fn member_selector_child_context() {
        let state = ExecutionState::for_tests();
        let none: Vec<String> = vec![];
        let selector = MemberNameSelector::new(["Address"]);
        let child = SelectorScope {
            state: &state,
            is_child_context: true,
        };
        assert!(selector.can_execute(&descriptor(&none, RuleKind::Property), "Unrelated", &child));

        let top = SelectorScope {
            state: &state,
            is_child_context: false,
        };
        assert!(!selector.can_execute(&descriptor(&none, RuleKind::Property), "Unrelated", &top));
        assert!(selector.can_execute(&descriptor(&none, RuleKind::Include), "", &top));
    }

    #[test]
    fn member_selector_child_context_without_cascade() {
        let options = ValidationOptions::new().disable_selector_cascade();
        let state = ExecutionState::from_options(&options, false);
        assert!(state.selector_cascade_disabled());
        assert!(!ExecutionState::for_tests().selector_cascade_disabled());

        let none: Vec<String> = vec![];
        let selector = MemberNameSelector::new(["Address"]);
        let child = SelectorScope {
            state: &state,
            is_child_context: true,
        };
        assert!(!selector.can_execute(&descriptor(&none, RuleKind::Property), "Unrelated", &child));
        assert!(selector.can_execute(
            &descriptor(&none, RuleKind::Property),
            "Address.Line1",
            &child
        ));
    }
}

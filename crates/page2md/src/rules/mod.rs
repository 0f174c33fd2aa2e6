//! Rule system for HTML to Markdown conversion.

mod builtin;
mod rule;

pub use builtin::builtin_rules;
pub use rule::{Filter, Rule};

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::options::RuleConfig;

/// Collection of rules for conversion.
///
/// Lookup is ordered: custom rules in registration order, then built-ins.
/// A node no rule claims is unwrapped by the transformer.
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Built-in rules
    builtin_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            builtin_rules: builtin_rules(),
        }
    }

    /// Add a custom rule. Re-using a key replaces that rule in place.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Names of the registered custom rules, in lookup order
    pub fn custom_keys(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    /// Find the appropriate rule for a node
    pub fn for_node<'a>(&'a self, node: &NodeRef, config: &RuleConfig) -> Option<&'a Rule> {
        let tag = node.tag_name();

        self.custom_rules
            .values()
            .chain(self.builtin_rules.iter())
            .find(|rule| rule.matches(&tag, node, config))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

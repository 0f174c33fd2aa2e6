//! Conversion rules: a filter that claims elements plus a replacement that
//! renders them.

use std::fmt;

use crate::node::NodeRef;
use crate::options::RuleConfig;

/// Renders a claimed element from its children's Markdown
pub type ReplacementFn = Box<dyn Fn(&NodeRef, &str, &RuleConfig) -> String + Send + Sync>;

/// Decides whether a rule claims an element. Gets the lowercase tag name.
pub type PredicateFn = Box<dyn Fn(&str, &NodeRef, &RuleConfig) -> bool + Send + Sync>;

/// Which elements a rule applies to
pub enum Filter {
    /// Any of these tag names (stored lowercase)
    Tags(Vec<String>),
    Predicate(PredicateFn),
}

impl Filter {
    pub fn tag(name: &str) -> Self {
        Self::tags(&[name])
    }

    pub fn tags(names: &[&str]) -> Self {
        Filter::Tags(names.iter().map(|name| name.to_ascii_lowercase()).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &RuleConfig) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// `tag` must already be lowercase
    pub fn matches(&self, tag: &str, node: &NodeRef, config: &RuleConfig) -> bool {
        match self {
            Filter::Tags(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, config),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Tags(tags) => f.debug_tuple("Tags").field(tags).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// How one element (or class of elements) becomes Markdown.
///
/// The replacement receives the node, the Markdown already produced for its
/// children, and the active config. It returns the full fragment for the
/// node, block spacing included.
pub struct Rule {
    pub filter: Filter,
    pub replacement: ReplacementFn,
}

impl Rule {
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &RuleConfig) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &RuleConfig) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &RuleConfig) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    pub fn matches(&self, tag: &str, node: &NodeRef, config: &RuleConfig) -> bool {
        self.filter.matches(tag, node, config)
    }

    pub fn replace(&self, node: &NodeRef, content: &str, config: &RuleConfig) -> String {
        (self.replacement)(node, content, config)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("filter", &self.filter).finish_non_exhaustive()
    }
}

//! MarkdownTransformer - the entry point for Node to Markdown conversion.

use std::borrow::Cow;

use crate::node::{Node, NodeRef, NodeType};
use crate::options::RuleConfig;
use crate::rules::{Rule, Rules};
use crate::utilities::{
    collapse_blank_lines, collapse_whitespace, decode_entities, escape_markdown, is_block,
    trim_leading_blank_lines,
};

/// Converts a [`Node`] tree into Markdown.
///
/// The conversion is a post-order fold: children are converted first, then
/// the rule matching the parent receives their Markdown. Apart from the rule
/// set, the transformer holds no state between calls, so it can be shared
/// across threads once every custom rule is registered.
pub struct MarkdownTransformer {
    config: RuleConfig,
    rules: Rules,
}

impl MarkdownTransformer {
    /// Create a new MarkdownTransformer with default options
    pub fn new() -> Self {
        Self::with_config(RuleConfig::default())
    }

    /// Create a MarkdownTransformer with custom options
    pub fn with_config(config: RuleConfig) -> Self {
        Self {
            config,
            rules: Rules::new(),
        }
    }

    /// Convert a Node tree to Markdown using the transformer's own config
    pub fn transform(&self, node: &Node) -> String {
        self.transform_with(node, &self.config)
    }

    /// Convert a Node tree to Markdown with a per-call config.
    ///
    /// Never fails: unknown elements are unwrapped and an empty tree
    /// yields an empty string.
    pub fn transform_with(&self, node: &Node, config: &RuleConfig) -> String {
        let output = match node.node_type {
            NodeType::Element => self.process_node(NodeRef::new(node), config),
            NodeType::Text => {
                let text = node.node_value.as_deref().unwrap_or("");
                collapse_whitespace(&decoded(text, config)).trim().to_string()
            }
            NodeType::Comment => String::new(),
            NodeType::Document | NodeType::DocumentFragment => self.process_children(node, config),
        };

        post_process(&output)
    }

    /// Parse an HTML fragment and convert it to Markdown.
    ///
    /// The parser has already decoded character references, so text is not
    /// decoded a second time.
    pub fn transform_html(&self, html: &str) -> String {
        let config = RuleConfig {
            decode_entities: false,
            ..self.config.clone()
        };
        self.transform_with(&crate::html::parse_html(html), &config)
    }

    /// Add a custom rule. Custom rules are consulted before the built-ins,
    /// in registration order.
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Get the current options
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Get mutable access to options
    pub fn config_mut(&mut self) -> &mut RuleConfig {
        &mut self.config
    }

    /// Process children of a node
    fn process_children(&self, parent: &Node, config: &RuleConfig) -> String {
        let mut result = String::new();

        for (index, child) in parent.child_nodes().iter().enumerate() {
            match child.node_type {
                NodeType::Text => result.push_str(&process_text(parent, index, child, config)),
                NodeType::Element => {
                    let node = NodeRef::with_parent(child, parent, index);
                    result.push_str(&self.process_node(node, config));
                }
                _ => {}
            }
        }

        result
    }

    /// Process a single element: children first, then the matching rule
    fn process_node(&self, node: NodeRef, config: &RuleConfig) -> String {
        let content = self.process_children(node.node, config);

        match self.rules.for_node(&node, config) {
            Some(rule) => {
                log::trace!("applying rule to <{}>", node.tag_name());
                rule.replace(&node, &content, config)
            }
            // Unknown element: drop the tag, keep what its children produced
            None => content,
        }
    }
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn decoded<'t>(text: &'t str, config: &RuleConfig) -> Cow<'t, str> {
    if config.decode_entities {
        decode_entities(text)
    } else {
        Cow::Borrowed(text)
    }
}

/// Decode and collapse a text node, trimming it where it touches a block boundary
fn process_text(parent: &Node, index: usize, text: &Node, config: &RuleConfig) -> String {
    let raw = text.node_value.as_deref().unwrap_or("");
    let collapsed = collapse_whitespace(&decoded(raw, config));

    let siblings = parent.child_nodes();
    let prev = index.checked_sub(1).and_then(|i| siblings.get(i));
    let next = siblings.get(index + 1);

    let parent_is_block = !parent.is_element() || is_block(&parent.node_name);
    let at_block_edge = |sibling: Option<&Node>| match sibling {
        None => parent_is_block,
        Some(node) => node.is_element() && is_block(&node.node_name),
    };

    let mut text: &str = &collapsed;
    if at_block_edge(prev) || prev.is_some_and(|n| n.is_tag("br")) {
        text = text.trim_start();
    }
    if at_block_edge(next) {
        text = text.trim_end();
    }
    text.to_string()
}

/// Collapse blank-line runs left by nested block rules and drop leading blank lines
fn post_process(output: &str) -> String {
    let collapsed = collapse_blank_lines(output);
    trim_leading_blank_lines(&collapsed).into_owned()
}

//! CSS selectors evaluated over [`Node`] trees.
//!
//! Parsing and matching go through the `selectors` engine with scraper's
//! selector implementation, so everything scraper accepts works here:
//! attribute operators (`^=`, `*=`, `~=`, ...), all four combinators,
//! `:not()`, `:is()`, `:has()` and the structural pseudo-classes.
//! Pseudo-classes tied to user interaction (`:hover`, `:visited`) are
//! rejected with [`Page2mdError::InvalidSelector`].
//!
//! [`Node`] keeps no parent links, so matching runs against an
//! `ElementTree`: a preorder index of the elements under a root with
//! parent and sibling positions.

use std::fmt;

use cssparser::ParserInput;
use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, QuirksMode, SelectorCaches,
};
use selectors::parser::ParseRelative;
use selectors::{Element, OpaqueElement, SelectorImpl, SelectorList};

use crate::node::Node;
use crate::{Page2mdError, Result};

type Namespace = <Simple as SelectorImpl>::NamespaceUrl;

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    list: SelectorList<Simple>,
}

impl Selector {
    /// Parse a selector string
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);

        let list = SelectorList::parse(&Parser, &mut parser, ParseRelative::No).map_err(|e| {
            Page2mdError::InvalidSelector {
                selector: source.to_string(),
                reason: SelectorErrorKind::from(e).to_string(),
            }
        })?;

        Ok(Self {
            source: source.trim().to_string(),
            list,
        })
    }

    /// The selector text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn matches(&self, element: &TreeElement<'_>) -> bool {
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );

        self.list
            .slice()
            .iter()
            .any(|selector| matching::matches_selector(selector, 0, None, element, &mut context))
    }
}

/// Position of an element inside an [`ElementTree`]
pub(crate) type ElementId = usize;

struct Entry<'a> {
    node: &'a Node,
    parent: Option<ElementId>,
    prev: Option<ElementId>,
    next: Option<ElementId>,
    /// One past the last element of this subtree
    end: ElementId,
}

/// Preorder index of `root` and every element below it.
///
/// Entry 0 is always the root, whatever its node type. Ids double as
/// document order, and a subtree occupies the contiguous range
/// `id..end`.
pub(crate) struct ElementTree<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> ElementTree<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        let mut tree = Self { entries: Vec::new() };
        tree.push(root, None);
        tree
    }

    fn push(&mut self, node: &'a Node, parent: Option<ElementId>) -> ElementId {
        let id = self.entries.len();
        self.entries.push(Entry {
            node,
            parent,
            prev: None,
            next: None,
            end: id + 1,
        });

        let mut prev = None;
        for child in node.element_children() {
            let child_id = self.push(child, Some(id));
            self.entries[child_id].prev = prev;
            if let Some(prev) = prev {
                self.entries[prev].next = Some(child_id);
            }
            prev = Some(child_id);
        }

        self.entries[id].end = self.entries.len();
        id
    }

    pub(crate) fn node(&self, id: ElementId) -> &'a Node {
        self.entries[id].node
    }

    /// Every element below the root, in document order
    pub(crate) fn descendants(&self) -> impl Iterator<Item = ElementId> {
        1..self.entries.len()
    }

    fn element(&self, id: ElementId) -> TreeElement<'_> {
        TreeElement { tree: self, id }
    }

    /// Descendants matching `selector`, in document order
    pub(crate) fn select<'s>(&'s self, selector: &'s Selector) -> impl Iterator<Item = ElementId> + 's {
        let tree: &'s ElementTree<'s> = self;
        tree.descendants()
            .filter(move |&id| selector.matches(&tree.element(id)))
    }

    /// One flag per element, set where any of `selectors` matches
    pub(crate) fn mark(&self, selectors: &[Selector]) -> Vec<bool> {
        let mut marked = vec![false; self.entries.len()];
        for selector in selectors {
            for id in self.select(selector) {
                marked[id] = true;
            }
        }
        marked
    }

    /// Copy of the subtree at `id` without the marked elements
    fn copy_unmarked(&self, id: ElementId, marked: &[bool]) -> Node {
        let node = self.node(id);
        let mut copy = Node {
            node_type: node.node_type,
            node_name: node.node_name.clone(),
            node_value: node.node_value.clone(),
            attributes: node.attributes.clone(),
            children: node.children.as_ref().map(|_| Vec::new()),
        };

        let mut child_id = id + 1;
        for child in node.child_nodes() {
            if !child.is_element() {
                copy.add_child(child.clone());
                continue;
            }
            let current = child_id;
            child_id = self.entries[current].end;
            if !marked[current] {
                copy.add_child(self.copy_unmarked(current, marked));
            }
        }
        copy
    }
}

/// An element of an [`ElementTree`], as seen by the selector engine
#[derive(Clone, Copy)]
struct TreeElement<'a> {
    tree: &'a ElementTree<'a>,
    id: ElementId,
}

impl<'a> TreeElement<'a> {
    fn node(&self) -> &'a Node {
        self.tree.node(self.id)
    }

    fn entry(&self) -> &'a Entry<'a> {
        &self.tree.entries[self.id]
    }

    fn at(&self, id: Option<ElementId>) -> Option<Self> {
        id.map(|id| self.tree.element(id))
    }
}

impl fmt::Debug for TreeElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeElement")
            .field("id", &self.id)
            .field("tag", &self.node().node_name)
            .finish()
    }
}

/// Non-tree pseudo-classes never match.
impl Element for TreeElement<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node())
    }

    fn parent_element(&self) -> Option<Self> {
        self.at(self.entry().parent)
            .filter(|parent| parent.node().is_element())
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.at(self.entry().prev)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.at(self.entry().next)
    }

    fn first_element_child(&self) -> Option<Self> {
        let first = self.id + 1;
        (first < self.entry().end).then(|| self.tree.element(first))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.node().node_name.eq_ignore_ascii_case(&name.0)
    }

    fn has_namespace(&self, namespace: &Namespace) -> bool {
        &**namespace == "http://www.w3.org/1999/xhtml"
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.node().node_name.eq_ignore_ascii_case(&other.node().node_name)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        // Host-supplied attributes carry no namespace
        let no_namespace = match ns {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Specific(url) => url.is_empty(),
        };

        no_namespace
            && self
                .node()
                .attrs()
                .any(|(name, value)| name.eq_ignore_ascii_case(&local_name.0) && operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        (self.node().is_tag("a") || self.node().is_tag("area")) && self.node().has_attr("href")
    }

    fn is_html_slot_element(&self) -> bool {
        self.node().is_tag("slot")
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.node()
            .id()
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.node()
            .classes()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self
            .node()
            .children()
            .any(|child| child.is_element() || child.node_value.as_deref().is_some_and(|v| !v.is_empty()))
    }

    fn is_root(&self) -> bool {
        self.id == 0 || self.entry().parent.is_some_and(|parent| !self.tree.node(parent).is_element())
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

/// All descendants of `root` matching `selector`, in document order.
/// `root` itself is never part of the result.
pub fn query_selector_all<'a>(root: &'a Node, selector: &Selector) -> Vec<&'a Node> {
    let tree = ElementTree::new(root);
    tree.select(selector).map(|id| tree.node(id)).collect()
}

/// Detached copy of `root` without the descendants matching any selector.
///
/// Used to strip `script`, `style`, and similar regions before conversion
/// while leaving the host's tree untouched.
pub fn remove_matching(root: &Node, selectors: &[Selector]) -> Node {
    let tree = ElementTree::new(root);
    let marked = tree.mark(selectors);
    tree.copy_unmarked(0, &marked)
}

/// Copies of every outermost match of `selector`, gathered under one
/// document fragment in document order. Matches nested inside an earlier
/// match are already part of it and are not repeated.
///
/// Returns `None` when nothing matches.
pub fn select_fragment(root: &Node, selector: &Selector) -> Option<Node> {
    let tree = ElementTree::new(root);
    let mut fragment = Node::document_fragment();

    let mut id = 1;
    while id < tree.entries.len() {
        if selector.matches(&tree.element(id)) {
            fragment.add_child(tree.node(id).clone());
            id = tree.entries[id].end;
        } else {
            id += 1;
        }
    }

    if fragment.child_nodes().is_empty() {
        None
    } else {
        Some(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    fn tree() -> Node {
        // <body><main id="main"><div class="post lead"><p>x</p></div></main><nav><p>y</p></nav></body>
        Node::element("body")
            .with_child(
                Node::element_with_attrs("main", vec![("id", "main")]).with_child(
                    Node::element_with_attrs("div", vec![("class", "post lead"), ("data-kind", "story")])
                        .with_child(Node::element("p").with_child(Node::text("x"))),
                ),
            )
            .with_child(Node::element("nav").with_child(Node::element("p").with_child(Node::text("y"))))
    }

    fn texts(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.text_content()).collect()
    }

    #[test]
    fn test_simple_selectors() {
        let root = tree();
        let by = |s: &str| query_selector_all(&root, &Selector::parse(s).unwrap()).len();

        assert_eq!(by("p"), 2);
        assert_eq!(by("P"), 2);
        assert_eq!(by("#main"), 1);
        assert_eq!(by(".post"), 1);
        assert_eq!(by("div.post.lead"), 1);
        assert_eq!(by("div.post.missing"), 0);
        assert_eq!(by("[data-kind]"), 1);
        assert_eq!(by("[data-kind=\"story\"]"), 1);
        assert_eq!(by("[data-kind=other]"), 0);
        assert_eq!(by("*"), 5);
    }

    #[test]
    fn test_attribute_operators() {
        let root = Node::element("body")
            .with_child(Node::element_with_attrs("div", vec![("id", "post-12"), ("class", "page-content wide")]))
            .with_child(Node::element_with_attrs("div", vec![("id", "footer"), ("lang", "en-US")]));
        let ids = |s: &str| -> Vec<String> {
            query_selector_all(&root, &Selector::parse(s).unwrap())
                .iter()
                .filter_map(|n| n.id().map(str::to_string))
                .collect()
        };

        assert_eq!(ids("[class*=content]"), vec!["post-12"]);
        assert_eq!(ids("div[id^=post]"), vec!["post-12"]);
        assert_eq!(ids("[id$=\"12\"]"), vec!["post-12"]);
        assert_eq!(ids("[class~=wide]"), vec!["post-12"]);
        assert_eq!(ids("[lang|=en]"), vec!["footer"]);
        assert_eq!(ids("[class*=CONTENT i]"), vec!["post-12"]);
    }

    #[test]
    fn test_combinators() {
        let root = tree();
        let query = |s: &str| texts(&query_selector_all(&root, &Selector::parse(s).unwrap()));

        assert_eq!(query("main p"), vec!["x"]);
        assert_eq!(query("main > p"), Vec::<String>::new());
        assert_eq!(query("main > div > p"), vec!["x"]);
        assert_eq!(query("nav>p"), vec!["y"]);
        assert_eq!(query("body p"), vec!["x", "y"]);
        assert_eq!(query("main + nav"), vec!["y"]);
        assert_eq!(query("main ~ nav p"), vec!["y"]);
        assert_eq!(query("nav + main"), Vec::<String>::new());
    }

    #[test]
    fn test_sibling_combinator_skips_text() {
        let root = Node::element("div")
            .with_child(Node::element("h2").with_child(Node::text("Title")))
            .with_child(Node::text("\n  "))
            .with_child(Node::element("p").with_child(Node::text("lead")))
            .with_child(Node::element("p").with_child(Node::text("rest")));

        let found = query_selector_all(&root, &Selector::parse("h2 + p").unwrap());
        assert_eq!(texts(&found), vec!["lead"]);
    }

    #[test]
    fn test_pseudo_classes() {
        let root = Node::element("body")
            .with_child(Node::element_with_attrs("article", vec![("class", "ad")]).with_child(Node::text("buy")))
            .with_child(Node::element("article").with_child(Node::text("story")))
            .with_child(Node::element("section"));
        let query = |s: &str| texts(&query_selector_all(&root, &Selector::parse(s).unwrap()));

        assert_eq!(query("article:not(.ad)"), vec!["story"]);
        assert_eq!(query("article:first-child"), vec!["buy"]);
        assert_eq!(query("body > :last-child"), vec![""]);
        assert_eq!(query(":empty"), vec![""]);
        assert_eq!(query("body:has(> section) article.ad"), vec!["buy"]);
        assert_eq!(query("body:has(> table) article"), Vec::<String>::new());
    }

    #[test]
    fn test_groups_in_document_order() {
        let root = tree();
        let found = query_selector_all(&root, &Selector::parse("nav, main").unwrap());
        let tags: Vec<String> = found.iter().map(|n| n.tag_name()).collect();
        assert_eq!(tags, vec!["main", "nav"]);
    }

    #[test]
    fn test_root_not_included() {
        let root = tree();
        assert!(query_selector_all(&root, &Selector::parse("body").unwrap()).is_empty());
        assert_eq!(query_selector_all(&root, &Selector::parse("body > main").unwrap()).len(), 1);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "a:hover", "div >", "> p", "a,,b", "#", "p::before", "div:nth-child("] {
            assert!(
                matches!(Selector::parse(bad), Err(Page2mdError::InvalidSelector { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_selector_reason_is_reported() {
        let err = Selector::parse("div >").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Invalid selector `div >`: "), "{message}");
        assert!(message.len() > "Invalid selector `div >`: ".len());
    }

    #[test]
    fn test_remove_matching_leaves_original_untouched() {
        let root = tree();
        let selectors = vec![Selector::parse("nav").unwrap(), Selector::parse(".lead p").unwrap()];
        let cleaned = remove_matching(&root, &selectors);

        assert_eq!(cleaned.text_content(), "");
        assert!(cleaned.find_first("nav").is_none());
        assert!(cleaned.find_first("div").is_some());
        assert_eq!(root.text_content(), "xy");
    }

    #[test]
    fn test_remove_matching_keeps_text_between_elements() {
        let root = Node::element("p")
            .with_child(Node::text("a "))
            .with_child(Node::element("script").with_child(Node::text("x()")))
            .with_child(Node::text("b "))
            .with_child(Node::element("em").with_child(Node::text("c")));

        let cleaned = remove_matching(&root, &[Selector::parse("script").unwrap()]);
        assert_eq!(cleaned.text_content(), "a b c");
        assert_eq!(cleaned.child_nodes().len(), 3);
    }

    #[test]
    fn test_select_fragment_keeps_outermost_matches() {
        let root = tree();
        let fragment = select_fragment(&root, &Selector::parse("main, p").unwrap()).unwrap();

        assert_eq!(fragment.node_type, NodeType::DocumentFragment);
        let tags: Vec<String> = fragment.element_children().map(Node::tag_name).collect();
        assert_eq!(tags, vec!["main", "p"]);
        assert_eq!(fragment.text_content(), "xy");

        assert!(select_fragment(&root, &Selector::parse("table").unwrap()).is_none());
    }

    #[test]
    fn test_fragment_root_children_have_no_parent_element() {
        let root = Node::document_fragment()
            .with_child(Node::element("p").with_child(Node::text("top")))
            .with_child(Node::element("div").with_child(Node::element("p").with_child(Node::text("inner"))));

        let query = |s: &str| texts(&query_selector_all(&root, &Selector::parse(s).unwrap()));
        assert_eq!(query(":root"), vec!["top", "inner"]);
        assert_eq!(query("* > p"), vec!["inner"]);
        assert_eq!(query("p + div p"), vec!["inner"]);
    }
}

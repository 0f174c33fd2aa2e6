//! Main-content heuristic.
//!
//! [`ContentLocator`] answers "which element is the article?" in two passes:
//!
//! 1. Each priority selector in turn. The first selector that matches
//!    anything decides; among its matches the one with the longest text wins.
//! 2. Otherwise every `div` and `section` that does not look navigational is
//!    scored by text length. Blocks without text never qualify.
//!
//! Ties go to the element seen first in document order. Elements matching an
//! exclude selector are never returned. The navigational check is a
//! best-effort guess based on tag, class, and id; it will misjudge some pages.
//!
//! `None` means nothing qualified and the user should pick an element by hand.

use crate::node::Node;
use crate::selector::{ElementTree, Selector};

/// Selectors tried in order to find the article body
pub const DEFAULT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".article",
    ".post",
    ".content",
    ".main-content",
    "#content",
    "#main",
    ".article-content",
    ".post-content",
];

/// Regions that are never treated as content
pub const DEFAULT_EXCLUDE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    ".navigation",
    ".menu",
    ".sidebar",
    ".comments",
    ".related",
    ".advertisement",
    "script",
    "style",
    "iframe",
];

const NAVIGATIONAL_TAGS: &[&str] = &["nav", "footer", "header"];
const NAVIGATIONAL_MARKERS: &[&str] = &["nav", "menu", "footer", "header"];

/// Locates the main content element of a document
#[derive(Debug, Clone)]
pub struct ContentLocator {
    selectors: Vec<Selector>,
    excludes: Vec<Selector>,
}

impl ContentLocator {
    /// Build a locator from selector strings. Invalid entries are skipped
    /// with a warning.
    pub fn new<S, E>(selectors: &[S], excludes: &[E]) -> Self
    where
        S: AsRef<str>,
        E: AsRef<str>,
    {
        Self {
            selectors: parse_all(selectors),
            excludes: parse_all(excludes),
        }
    }

    /// Priority selectors, in the order they are tried
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn excludes(&self) -> &[Selector] {
        &self.excludes
    }

    /// Find the element most likely to hold the main content of `root`
    pub fn locate<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        let tree = ElementTree::new(root);
        let excluded = tree.mark(&self.excludes);

        for selector in &self.selectors {
            let matches = tree.select(selector).filter(|&id| !excluded[id]);

            if let Some(best) = largest_by_text(matches.map(|id| tree.node(id))) {
                log::debug!("main content matched selector `{}`", selector.as_str());
                return Some(best);
            }
        }

        log::debug!("no priority selector matched, falling back to text-density scan");
        let blocks = tree
            .descendants()
            .filter(|&id| !excluded[id])
            .map(|id| tree.node(id))
            .filter(|node| (node.is_tag("div") || node.is_tag("section")) && !is_navigational(node))
            .filter(|node| node.text_len() > 0);

        let found = largest_by_text(blocks);
        if found.is_none() {
            log::debug!("no content candidates found");
        }
        found
    }
}

impl Default for ContentLocator {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTORS, DEFAULT_EXCLUDE_SELECTORS)
    }
}

/// One-shot form of [`ContentLocator::locate`]
pub fn locate<'a, S, E>(root: &'a Node, selectors: &[S], excludes: &[E]) -> Option<&'a Node>
where
    S: AsRef<str>,
    E: AsRef<str>,
{
    ContentLocator::new(selectors, excludes).locate(root)
}

/// Heuristic check for navigation, header, and footer regions
pub fn is_navigational(node: &Node) -> bool {
    if NAVIGATIONAL_TAGS.iter().any(|tag| node.is_tag(tag)) {
        return true;
    }

    let class = node.attr("class").unwrap_or("").to_lowercase();
    let id = node.id().unwrap_or("").to_lowercase();
    NAVIGATIONAL_MARKERS
        .iter()
        .any(|marker| class.contains(marker) || id.contains(marker))
}

fn parse_all<S: AsRef<str>>(sources: &[S]) -> Vec<Selector> {
    sources
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.trim().is_empty())
        .filter_map(|source| match Selector::parse(source) {
            Ok(selector) => Some(selector),
            Err(e) => {
                log::warn!("skipping selector: {e}");
                None
            }
        })
        .collect()
}

/// Node with the longest text; the earliest wins a tie
fn largest_by_text<'a>(nodes: impl Iterator<Item = &'a Node>) -> Option<&'a Node> {
    let mut best: Option<(&'a Node, usize)> = None;
    for node in nodes {
        let size = node.text_len();
        if best.map_or(true, |(_, max)| size > max) {
            best = Some((node, size));
        }
    }
    best.map(|(node, _)| node)
}

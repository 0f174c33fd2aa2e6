//! # page2md
//!
//! Pick the main content of a web page and convert it to Markdown.
//!
//! Two independent pieces, composed by the caller:
//!
//! - [`ContentLocator`] guesses which element holds the article body, first
//!   through a prioritized selector list, then through a text-length scan.
//! - [`MarkdownTransformer`] folds a [`Node`] tree into Markdown using a set of
//!   per-tag [`Rule`]s. Rules registered by the caller win over the built-ins.
//!
//! ## Design
//!
//! Both pieces operate on a CDP-style [`Node`] tree that the host already
//! owns. Any HTML parser can produce that structure; [`parse_html`] and
//! [`parse_document`] build it through scraper. Selectors are parsed and
//! matched by the `selectors` engine that scraper itself uses.
//!
//! ## Example
//!
//! ```rust
//! use page2md::{MarkdownTransformer, Node};
//!
//! let transformer = MarkdownTransformer::new();
//!
//! let mut h1 = Node::element("h1");
//! h1.add_child(Node::text("Hello World"));
//!
//! assert_eq!(transformer.transform(&h1), "# Hello World\n\n");
//! ```
//!
//! ## Example (main content)
//!
//! ```rust
//! use page2md::{parse_document, ContentLocator, MarkdownTransformer};
//!
//! let doc = parse_document("<nav>Home</nav><article><p>Body text</p></article>");
//! let article = ContentLocator::default().locate(&doc).unwrap();
//!
//! // html5ever already decoded character references
//! let mut transformer = MarkdownTransformer::new();
//! transformer.config_mut().decode_entities = false;
//!
//! assert_eq!(transformer.transform(article), "Body text\n\n");
//! ```

pub mod filename;
pub mod html;
pub mod locator;
pub mod node;
mod options;
mod rules;
pub mod selector;
pub mod settings;
mod transformer;
mod utilities;

pub use html::{parse_document, parse_html};
pub use locator::{is_navigational, locate, ContentLocator};
pub use node::{Node, NodeRef, NodeType};
pub use options::{CodeBlockStyle, HeadingStyle, RuleConfig};
pub use rules::{Filter, Rule, Rules};
pub use selector::{query_selector_all, remove_matching, select_fragment, Selector};
pub use settings::Settings;
pub use transformer::MarkdownTransformer;
pub use utilities::*;

/// Error type for page2md operations
#[derive(Debug, thiserror::Error)]
pub enum Page2mdError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),

    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Page2mdError>;

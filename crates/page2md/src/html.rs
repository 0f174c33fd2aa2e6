//! HTML parsing support.
//!
//! Converts scraper's html5ever tree into the [`Node`] structure used by the
//! locator and the transformer. Character references are decoded by the
//! parser; comments are dropped.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML fragment into a Node tree rooted at an `html` element.
///
/// # Example
///
/// ```rust
/// use page2md::{parse_html, MarkdownTransformer};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let transformer = MarkdownTransformer::new();
/// assert_eq!(transformer.transform(&node), "# Hello *World*\n\n");
/// ```
pub fn parse_html(html: &str) -> Node {
    convert(&Html::parse_fragment(html))
}

/// Parse a complete document. Missing `html`/`head`/`body` elements are
/// synthesized by the parser, so the root is always the `html` element.
pub fn parse_document(html: &str) -> Node {
    convert(&Html::parse_document(html))
}

fn convert(document: &Html) -> Node {
    let root = document.root_element();
    log::trace!("converting parsed tree rooted at <{}>", root.value().name());
    element_to_node(root)
}

fn element_to_node(element: ElementRef) -> Node {
    let mut node = Node::element_with_attrs(element.value().name(), element.value().attrs().collect());

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => node.add_child(Node::text(text)),
            ScraperNode::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    node.add_child(element_to_node(child));
                }
            }
            // Comments, doctypes and processing instructions carry no content
            _ => {}
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkdownTransformer;

    #[test]
    fn test_parse_simple_html() {
        let node = parse_html("<p>Hello World</p>");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "html");
        assert_eq!(node.element_children().next().map(Node::tag_name).as_deref(), Some("p"));
    }

    #[test]
    fn test_parse_document_structure() {
        let doc = parse_document("<title>Page</title><p class=\"lead\">Body</p><!-- note -->");
        assert_eq!(doc.tag_name(), "html");
        assert_eq!(doc.find_first("title").map(Node::text_content).as_deref(), Some("Page"));

        let p = doc.find_first("p").unwrap();
        assert_eq!(p.attr("class"), Some("lead"));
        assert_eq!(doc.find_first("body").unwrap().child_nodes().len(), 1);
    }

    #[test]
    fn test_entities_are_decoded_by_parser() {
        let node = parse_html("<p>a &lt; b &amp;&nbsp;c</p>");
        assert_eq!(node.text_content(), "a < b &\u{a0}c");
    }

    #[test]
    fn test_transform_html() {
        let transformer = MarkdownTransformer::new();
        assert_eq!(transformer.transform_html("<p>A</p><p>B</p>"), "A\n\nB\n\n");
        assert_eq!(
            transformer.transform_html("<p>Hello <strong>World</strong></p>"),
            "Hello **World**\n\n"
        );
        assert_eq!(transformer.transform_html(""), "");
    }

    #[test]
    fn test_transform_html_code_with_markup_characters() {
        let transformer = MarkdownTransformer::new();
        let result = transformer.transform_html("<pre><code>a &lt;b&gt; &amp;amp;</code></pre>");
        assert_eq!(result, "```\na <b> &amp;\n```\n\n");
    }

    #[test]
    fn test_escaped_entities_are_decoded_once() {
        let transformer = MarkdownTransformer::new();
        assert_eq!(
            transformer.transform_html("<p>Write &amp;lt;div&amp;gt; and AT&amp;amp;T</p>"),
            "Write &lt;div&gt; and AT&amp;T\n\n"
        );
    }
}

//! Built-in rules for HTML to Markdown conversion.
//!
//! Every block rule returns its fragment wrapped in the blank lines it needs.
//! The transformer collapses the surplus afterwards.

use super::{Filter, Rule};
use crate::node::{Node, NodeRef};
use crate::options::{CodeBlockStyle, HeadingStyle, RuleConfig};
use crate::utilities::{clean_attribute, collapse_blank_lines, longest_run};

/// Create all built-in rules
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        code_block_rule(),
        horizontal_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
        table_rule(),
        table_row_rule(),
        table_cell_rule(),
        drop_rule(),
    ]
}

fn block(text: &str) -> String {
    format!("\n\n{}\n\n", text)
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| {
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }
        block(content)
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| "\n".to_string())
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |node, content, config| {
            let tag = node.tag_name();
            let level: usize = tag[1..].parse().unwrap_or(1);

            // A heading is a single line
            let content = content.split_whitespace().collect::<Vec<_>>().join(" ");
            if content.is_empty() {
                return String::new();
            }

            match config.heading_style {
                HeadingStyle::Setext if level <= 2 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    block(&format!("{}\n{}", content, underline.repeat(content.chars().count())))
                }
                _ => block(&format!("{} {}", "#".repeat(level), content)),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = collapse_blank_lines(content.trim());
        if content.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        block(&quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::new(Filter::tags(&["ul", "ol"]), |node, content, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }

        // Nested lists start on the line after the parent item's text
        let is_nested = node.parent_tag().as_deref() == Some("li");
        if is_nested {
            format!("\n{}\n", content)
        } else {
            format!("\n\n{}\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, config| {
        let content = collapse_blank_lines(content.trim());
        let indented: Vec<String> = content
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 || line.is_empty() {
                    line.to_string()
                } else {
                    format!("  {}", line)
                }
            })
            .collect();

        let prefix = match node.parent() {
            Some(parent) if parent.is_tag("ol") => {
                let start = parent
                    .attr("start")
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(1);
                // Numbering counts only item siblings, whatever sits between them
                let position = node
                    .previous_siblings()
                    .iter()
                    .filter(|sibling| sibling.is_tag("li"))
                    .count() as u64;
                format!("{}. ", start.saturating_add(position))
            }
            _ => format!("{} ", config.bullet_list_marker),
        };

        let item = format!("{}{}", prefix, indented.join("\n"));
        format!("{}\n", item.trim_end())
    })
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |node, _, config| {
        let code_node = node.element_children().find(|c| c.is_tag("code"));
        let code = match code_node {
            Some(code) => code.text_content(),
            None => node.text_content(),
        };
        let code = code.trim_end_matches(['\n', '\r']);
        if code.trim().is_empty() {
            return String::new();
        }

        match config.code_block_style {
            CodeBlockStyle::Fenced => {
                let language = code_node.map(code_language).unwrap_or_default();
                let fence = fence_for(code, &config.fence);
                block(&format!("{}{}\n{}\n{}", fence, language, code, fence))
            }
            CodeBlockStyle::Indented => {
                let indented: Vec<String> = code.lines().map(|line| format!("    {}", line)).collect();
                block(&indented.join("\n"))
            }
        }
    })
}

/// Language hint from a `language-*` or `lang-*` class
fn code_language(code: &Node) -> String {
    code.classes()
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .unwrap_or("")
        .to_string()
}

/// A fence longer than any run of the fence character inside the code
fn fence_for(code: &str, fence: &str) -> String {
    let fence_char = fence.chars().next().unwrap_or('`');
    let len = fence.chars().count().max(3).max(longest_run(code, fence_char) + 1);
    fence_char.to_string().repeat(len)
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, config| block(&config.hr))
}

fn title_part(node: &NodeRef) -> String {
    node.attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default()
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, config| {
        let href = clean_attribute(node.attr("href"));
        if !config.preserve_links || href.is_empty() || content.trim().is_empty() {
            return content.to_string();
        }

        format!("[{}]({}{})", content.trim(), href, title_part(node))
    })
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, config| {
        if !config.preserve_images {
            return String::new();
        }
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return String::new();
        }
        let alt = clean_attribute(node.attr("alt"));

        format!("![{}]({}{})", alt, src, title_part(node))
    })
}

/// Wrap inline content in a delimiter, keeping surrounding whitespace outside it
fn wrap_inline(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{}{}{}{}{}", leading, delimiter, trimmed, delimiter, trailing)
}

fn emphasis_rule() -> Rule {
    Rule::new(Filter::tags(&["em", "i"]), |_, content, config| {
        wrap_inline(content, &config.em_delimiter.to_string())
    })
}

fn strong_rule() -> Rule {
    Rule::new(Filter::tags(&["strong", "b"]), |_, content, config| {
        wrap_inline(content, &config.strong_delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            // Match <code> that is NOT inside <pre>
            tag == "code" && node.parent_tag().as_deref() != Some("pre")
        }),
        |node, _, _| {
            let content = node.text_content();
            if content.is_empty() {
                return String::new();
            }

            let max_consecutive_backticks = longest_run(&content, '`');
            let backticks = "`".repeat(max_consecutive_backticks + 1);

            // Pad when the content itself starts or ends with a backtick
            if content.starts_with('`') || content.ends_with('`') {
                format!("{} {} {}", backticks, content, backticks)
            } else {
                format!("{}{}{}", backticks, content, backticks)
            }
        },
    )
}

/// Tables keep the minimal passthrough: rows render themselves, with no
/// column alignment.
fn table_rule() -> Rule {
    Rule::for_tag("table", |_, content, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }
        block(content)
    })
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |node, content, _| {
        if content.trim().is_empty() {
            return String::new();
        }
        let mut row = format!("|{}\n", content.trim_end());

        let cells: Vec<&Node> = node
            .element_children()
            .filter(|c| c.is_tag("th") || c.is_tag("td"))
            .collect();
        let in_thead = node.parent().is_some_and(|p| p.is_tag("thead"));
        let all_th = !cells.is_empty() && cells.iter().all(|c| c.is_tag("th"));
        let first_row = !node.previous_siblings().iter().any(|s| s.is_tag("tr"));

        if (in_thead || all_th) && first_row {
            row.push('|');
            row.push_str(&" --- |".repeat(cells.len().max(1)));
            row.push('\n');
        }
        row
    })
}

fn table_cell_rule() -> Rule {
    Rule::for_tags(&["th", "td"], |_, content, _| {
        let cell = content.split_whitespace().collect::<Vec<_>>().join(" ");
        format!(" {} |", cell.replace('|', "\\|"))
    })
}

fn drop_rule() -> Rule {
    Rule::for_tags(&["script", "style", "noscript", "template", "head"], |_, _, _| String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_inline_keeps_outer_whitespace() {
        assert_eq!(wrap_inline(" bold ", "**"), " **bold** ");
        assert_eq!(wrap_inline("   ", "**"), "   ");
    }

    #[test]
    fn test_fence_grows_past_inner_backticks() {
        assert_eq!(fence_for("let x = 1;", "```"), "```");
        assert_eq!(fence_for("```\nnested\n```", "```"), "````");
        assert_eq!(fence_for("~~~", "~~~"), "~~~~");
    }

    #[test]
    fn test_code_language() {
        let code = Node::element_with_attrs("code", vec![("class", "hljs language-rust")]);
        assert_eq!(code_language(&code), "rust");
        let code = Node::element_with_attrs("code", vec![("class", "lang-js")]);
        assert_eq!(code_language(&code), "js");
        assert_eq!(code_language(&Node::element("code")), "");
    }
}

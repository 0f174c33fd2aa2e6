//! Download filename derivation.

use chrono::NaiveDate;

/// Characters that are not allowed in filenames on common platforms
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum title length in characters
pub const MAX_TITLE_CHARS: usize = 50;

/// Title used for `[title]` when the page has none
const UNTITLED: &str = "page2md";

/// Replace forbidden filename characters with `_` and cap the length at
/// [`MAX_TITLE_CHARS`] characters.
///
/// ```rust
/// use page2md::filename::sanitize_title;
///
/// assert_eq!(sanitize_title("Q&A: what/why?"), "Q&A_ what_why_");
/// ```
pub fn sanitize_title(title: &str) -> String {
    truncate_chars(&replace_forbidden(title.trim()), MAX_TITLE_CHARS).to_string()
}

/// `<title>.md`, or `page2md_<YYYY-MM-DD>.md` without a usable title
pub fn markdown_filename(title: Option<&str>, date: NaiveDate) -> String {
    match title.map(sanitize_title).filter(|t| !t.trim().is_empty()) {
        Some(title) => format!("{}.md", title),
        None => default_filename(date),
    }
}

/// Expand a filename template.
///
/// `[title]` becomes the sanitized page title and `[date]` the ISO date. The
/// result always ends in `.md`.
pub fn render_template(template: &str, title: Option<&str>, date: NaiveDate) -> String {
    let title = title
        .map(sanitize_title)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let rendered = template
        .replace("[title]", &title)
        .replace("[date]", &date.format("%Y-%m-%d").to_string());
    let stem = replace_forbidden(rendered.trim());

    if stem.trim().is_empty() {
        return default_filename(date);
    }
    if stem.ends_with(".md") {
        stem
    } else {
        format!("{}.md", stem)
    }
}

fn default_filename(date: NaiveDate) -> String {
    format!("page2md_{}.md", date.format("%Y-%m-%d"))
}

fn replace_forbidden(s: &str) -> String {
    s.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_sanitize_replaces_every_forbidden_char() {
        assert_eq!(sanitize_title(r#"a\b/c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_title("  Plain Title "), "Plain Title");
    }

    #[test]
    fn test_sanitize_truncates_by_chars() {
        let long = "é".repeat(80);
        let sanitized = sanitize_title(&long);
        assert_eq!(sanitized.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(sanitize_title("short"), "short");
    }

    #[test]
    fn test_markdown_filename() {
        assert_eq!(markdown_filename(Some("Rust: A Guide"), date()), "Rust_ A Guide.md");
        assert_eq!(markdown_filename(None, date()), "page2md_2024-03-09.md");
        assert_eq!(markdown_filename(Some("   "), date()), "page2md_2024-03-09.md");
    }

    #[test]
    fn test_render_template() {
        assert_eq!(render_template("[title]", Some("Notes"), date()), "Notes.md");
        assert_eq!(
            render_template("[date] - [title]", Some("a/b"), date()),
            "2024-03-09 - a_b.md"
        );
        assert_eq!(render_template("[title].md", None, date()), "page2md.md");
        assert_eq!(render_template("   ", Some("x"), date()), "page2md_2024-03-09.md");
    }
}

//! Conversion options for the Markdown transformer

use serde::{Deserialize, Serialize};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// Options controlling the Markdown produced by the built-in rules.
///
/// Field names serialize in camelCase, matching the persisted settings
/// object. Missing fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleConfig {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Minimum fence for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Emit `![alt](src)` for images; otherwise images are dropped
    pub preserve_images: bool,

    /// Emit `[text](href)` for links; otherwise only the link text is kept
    pub preserve_links: bool,

    /// Decode character references in text nodes. Trees built by an HTML
    /// parser already hold decoded text and convert with this off.
    pub decode_entities: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '*',
            strong_delimiter: "**".to_string(),
            preserve_images: true,
            preserve_links: true,
            decode_entities: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RuleConfig =
            serde_json::from_str(r#"{"headingStyle":"setext","bulletListMarker":"*","preserveLinks":false}"#)
                .unwrap();

        assert_eq!(config.heading_style, HeadingStyle::Setext);
        assert_eq!(config.bullet_list_marker, '*');
        assert!(!config.preserve_links);
        assert!(config.preserve_images);
        assert_eq!(config.code_block_style, CodeBlockStyle::Fenced);
        assert_eq!(config.em_delimiter, '*');
        assert!(config.decode_entities);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(RuleConfig::default()).unwrap();
        assert_eq!(json["headingStyle"], "atx");
        assert_eq!(json["codeBlockStyle"], "fenced");
        assert_eq!(json["bulletListMarker"], "-");
    }
}

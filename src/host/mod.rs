//! The note-taking host: where documents and their attributes actually live.

pub mod local;
pub mod query;
pub mod siyuan;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub use query::{CmpOp, Direction, Query};

/// Block attributes, name -> value
pub type Attrs = BTreeMap<String, String>;

/// Storage operations the recorder needs from its host
#[async_trait]
pub trait Host: Send + Sync {
    /// Create a document at a human-readable path, returns its block id
    async fn create_document(&self, hpath: &str, markdown: &str) -> Result<String>;

    /// Merge attributes into a block
    async fn set_block_attrs(&self, block_id: &str, attrs: &Attrs) -> Result<()>;

    /// Run a read query, rows in query order
    async fn query(&self, query: &Query) -> Result<Vec<Block>>;
}

/// A row of the host's `blocks` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub hpath: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub ial: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

impl Block {
    /// Attributes parsed from the block's inline attribute list
    pub fn attrs(&self) -> Attrs {
        parse_ial(&self.ial)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created)
    }

    pub fn updated_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.updated)
    }
}

/// Host timestamp format, e.g. `20240101093000`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

fn ial_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).expect("valid IAL regex"))
}

/// Parse `{: id="..." custom-x="..."}` into a map
pub fn parse_ial(ial: &str) -> Attrs {
    ial_regex()
        .captures_iter(ial)
        .map(|cap| (cap[1].to_string(), unescape_attr(&cap[2])))
        .collect()
}

/// Render attributes as an inline attribute list
pub fn render_ial(attrs: &Attrs) -> String {
    let body: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_attr(v)))
        .collect();
    format!("{{: {}}}", body.join(" "))
}

pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "_esc_newline_")
}

pub fn unescape_attr(value: &str) -> String {
    value
        .replace("_esc_newline_", "\n")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ial() {
        let ial = r#"{: id="20240101093000-abcdefg" title="Alice" type="doc" custom-friend-tags="[&quot;a&quot;,&quot;b&quot;]" updated="20240102000000"}"#;
        let attrs = parse_ial(ial);

        assert_eq!(attrs["id"], "20240101093000-abcdefg");
        assert_eq!(attrs["title"], "Alice");
        assert_eq!(attrs["custom-friend-tags"], r#"["a","b"]"#);
    }

    #[test]
    fn test_escape_survives_render() {
        let mut attrs = Attrs::new();
        attrs.insert("custom-notes".to_string(), "line \"one\"\n<two> & 'three'".to_string());

        let parsed = parse_ial(&render_ial(&attrs));
        assert_eq!(parsed, attrs);
    }

    #[test]
    fn test_block_timestamps() {
        let block = Block {
            created: "20240101093000".to_string(),
            updated: "garbage".to_string(),
            ..Default::default()
        };
        assert_eq!(
            block.created_at().map(|t| t.to_string()),
            Some("2024-01-01 09:30:00".to_string())
        );
        assert_eq!(block.updated_at(), None);
    }
}

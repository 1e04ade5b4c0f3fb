//! Serializable snapshot of the parts of a chat page extractors read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A message-candidate element selected by the page-side collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub text: String,
}

impl PageNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            tag: "div".into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    /// `document.title`.
    #[serde(rename = "documentTitle", default)]
    pub document_title: String,
    /// Text of title-like elements, most specific first.
    #[serde(rename = "titleCandidates", default)]
    pub title_candidates: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<PageNode>,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// URL path without scheme, host, query or fragment.
    pub fn path(&self) -> &str {
        let rest = match self.url.find("://") {
            Some(i) => &self.url[i + 3..],
            None => self.url.as_str(),
        };
        let path = match rest.find('/') {
            Some(i) => &rest[i..],
            None => "/",
        };
        let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
        &path[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        assert_eq!(PageSnapshot::new("https://claude.ai/chat/abc-123?x=1").path(), "/chat/abc-123");
        assert_eq!(PageSnapshot::new("https://chatgpt.com").path(), "/");
        assert_eq!(PageSnapshot::new("chatgpt.com/c/xyz#top").path(), "/c/xyz");
    }

    #[test]
    fn test_snapshot_json() {
        let page: PageSnapshot = serde_json::from_value(serde_json::json!({
            "url": "https://claude.ai/chat/abc",
            "nodes": [{"attributes": {"data-is-user-message": "true"}, "text": "hi"}]
        }))
        .unwrap();
        assert_eq!(page.nodes[0].attr("data-is-user-message"), Some("true"));
        assert!(page.title_candidates.is_empty());
    }
}

//! Provider registry: URL → extractor.

use std::sync::Arc;

use crate::extractor::{extract, Extractor};
use crate::page::PageSnapshot;
use crate::profile::BUILTIN_PROFILES;
use promptsync_core::{ConversationRecord, Error, Result};

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in profiles.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for profile in BUILTIN_PROFILES.iter() {
            registry.register(Arc::new(profile.clone()));
        }
        registry
    }

    /// Add an extractor. Later registrations win on overlapping URLs.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(0, extractor);
    }

    pub fn detect(&self, url: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.iter().find(|e| e.matches(url)).cloned()
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors
            .iter()
            .find(|e| e.provider() == provider)
            .cloned()
    }

    pub fn providers(&self) -> Vec<String> {
        self.extractors.iter().map(|e| e.provider().to_string()).collect()
    }

    /// Detect the provider for `page.url` and extract.
    pub fn extract(&self, page: &PageSnapshot) -> Result<ConversationRecord> {
        let extractor = self
            .detect(&page.url)
            .ok_or_else(|| Error::Extraction(format!("unsupported page: {}", page.url)))?;
        extract(extractor.as_ref(), page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageNode;
    use promptsync_core::{ErrorKind, Message, Role, DEFAULT_TITLE};

    fn claude_page() -> PageSnapshot {
        PageSnapshot {
            url: "https://claude.ai/chat/abc-123".into(),
            document_title: "Claude".into(),
            title_candidates: vec!["".into(), "Rust lifetimes".into()],
            nodes: vec![
                PageNode::new("What is a lifetime?").with_attr("data-is-user-message", "true"),
                PageNode::new("   ").with_attr("data-is-user-message", "false"),
                PageNode::new("A lifetime is a region...").with_class("font-claude-message"),
                PageNode::new("sidebar").with_class("nav"),
            ],
        }
    }

    #[test]
    fn test_detect_builtin_providers() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.providers().len(), 5);
        assert_eq!(registry.detect("https://chatgpt.com/c/1").unwrap().provider(), "ChatGPT");
        assert_eq!(registry.detect("https://CLAUDE.ai/chat/x").unwrap().provider(), "Claude");
        assert_eq!(
            registry.detect("https://chat.deepseek.com/a/chat/s/1").unwrap().provider(),
            "DeepSeek"
        );
        assert!(registry.detect("https://example.com").is_none());
    }

    #[test]
    fn test_extract_claude_page() {
        let registry = ProviderRegistry::builtin();
        let record = registry.extract(&claude_page()).unwrap();

        assert_eq!(record.provider, "Claude");
        assert_eq!(record.conversation_id, "abc-123");
        assert_eq!(record.title, "Rust lifetimes");
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[0].role, Role::User);
        assert_eq!(record.messages[1].role, Role::Assistant);
        // Index is the node's position on the page
        assert_eq!(record.messages[1].index, 2);
        assert_eq!(record.metadata.message_count, 2);
        assert_eq!(record.metadata.url, "https://claude.ai/chat/abc-123");
    }

    #[test]
    fn test_title_falls_back_to_first_user_message() {
        let registry = ProviderRegistry::builtin();
        let long = "x".repeat(150);
        let page = PageSnapshot {
            url: "https://chatgpt.com/c/abc".into(),
            document_title: "ChatGPT".into(),
            title_candidates: Vec::new(),
            nodes: vec![PageNode::new(long).with_attr("data-message-author-role", "user")],
        };
        let record = registry.extract(&page).unwrap();
        assert_eq!(record.title.chars().count(), 100);

        let only_assistant = PageSnapshot {
            nodes: vec![PageNode::new("hello").with_attr("data-message-author-role", "assistant")],
            ..page
        };
        let record = registry.extract(&only_assistant).unwrap();
        assert_eq!(record.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_no_messages_is_extraction_failure() {
        let registry = ProviderRegistry::builtin();
        let page = PageSnapshot {
            nodes: vec![PageNode::new("sidebar").with_class("nav")],
            ..claude_page()
        };
        let err = registry.extract(&page).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionFailure);
    }

    #[test]
    fn test_no_conversation_id_is_extraction_failure() {
        let registry = ProviderRegistry::builtin();
        let page = PageSnapshot {
            url: "https://claude.ai/new".into(),
            ..claude_page()
        };
        let err = registry.extract(&page).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionFailure);

        let err = registry.extract(&PageSnapshot::new("https://example.com/chat/1")).unwrap_err();
        assert!(err.to_string().contains("unsupported page"));
    }

    #[test]
    fn test_gemini_id_alternation_and_class_hints() {
        let registry = ProviderRegistry::builtin();
        let page = PageSnapshot {
            url: "https://gemini.google.com/app/f00_ba4".into(),
            nodes: vec![
                PageNode::new("hi").with_class("user-query-container").with_class("user-turn"),
                PageNode::new("hello!").with_class("model-response"),
            ],
            ..PageSnapshot::default()
        };
        let record = registry.extract(&page).unwrap();
        assert_eq!(record.conversation_id, "f00_ba4");
        assert_eq!(record.title, "hi");
        assert_eq!(record.messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_extract_deepseek_page() {
        let registry = ProviderRegistry::builtin();
        let page = PageSnapshot {
            url: "https://chat.deepseek.com/chat/9f3c-77".into(),
            nodes: vec![
                PageNode::new("New chat  Today  Settings").with_class("sidebar-container"),
                PageNode::new("hi").with_attr("data-role", "user"),
                PageNode::new("Hello! How can I help?").with_attr("data-role", "assistant"),
                PageNode::new("Sure.").with_class("ds-markdown").with_class("bot-reply"),
                PageNode::new("footer").with_class("main-detail"),
            ],
            ..PageSnapshot::default()
        };
        let record = registry.extract(&page).unwrap();

        assert_eq!(record.provider, "DeepSeek");
        assert_eq!(record.conversation_id, "9f3c-77");
        let roles: Vec<Role> = record.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Assistant]);
        assert_eq!(record.messages[0].content, "hi");
        assert_eq!(record.messages[0].index, 1);
        assert!(record.messages.iter().all(|m| !m.content.contains("Settings")));
    }

    #[test]
    fn test_extract_doubao_page() {
        let registry = ProviderRegistry::builtin();
        let page = PageSnapshot {
            url: "https://www.doubao.com/chat/12_ab-3".into(),
            document_title: "Doubao".into(),
            nodes: vec![
                PageNode::new("History").with_class("nav-bar"),
                PageNode::new("Translate this").with_class("user-message-bubble"),
                PageNode::new("Here it is").with_attr("data-role", "ai"),
                PageNode::new("Anything else?").with_class("ai-answer"),
            ],
            ..PageSnapshot::default()
        };
        let record = registry.extract(&page).unwrap();

        assert_eq!(record.provider, "Doubao");
        assert_eq!(record.conversation_id, "12_ab-3");
        assert_eq!(record.title, "Translate this");
        let roles: Vec<Role> = record.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Assistant]);
        assert_eq!(record.messages[0].index, 1);
    }

    struct StaticExtractor;

    impl Extractor for StaticExtractor {
        fn provider(&self) -> &str {
            "Local"
        }
        fn matches(&self, url: &str) -> bool {
            url.starts_with("http://localhost")
        }
        fn detect_conversation_id(&self, _page: &PageSnapshot) -> Option<String> {
            Some("fixed".into())
        }
        fn detect_title(&self, _page: &PageSnapshot) -> String {
            "Local chat".into()
        }
        fn detect_messages(&self, _page: &PageSnapshot) -> Vec<Message> {
            vec![Message::new(Role::User, "ping", 0)]
        }
    }

    #[test]
    fn test_custom_extractor_plugs_in() {
        let mut registry = ProviderRegistry::builtin();
        registry.register(Arc::new(StaticExtractor));
        let record = registry.extract(&PageSnapshot::new("http://localhost:5173/")).unwrap();
        assert_eq!(record.key(), "history_Local_fixed");
        assert!(registry.get("Local").is_some());
    }
}

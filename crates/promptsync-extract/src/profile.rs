//! Data-driven provider profiles for the supported chat sites.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::extractor::Extractor;
use crate::page::{PageNode, PageSnapshot};
use promptsync_core::{Error, Message, Result, Role, DEFAULT_TITLE};

/// Fallback titles taken from the first user message are cut to this many chars.
const TITLE_FROM_MESSAGE_CHARS: usize = 100;

/// How a profile decides whether a node was written by the user or the assistant.
#[derive(Debug, Clone, Default)]
pub struct RoleDetection {
    /// Attribute carrying the role, checked first.
    pub attribute: Option<String>,
    /// Attribute value → role. Empty means the value is parsed as a role name.
    pub values: Vec<(String, Role)>,
    /// Class substring → role, checked in order.
    pub class_hints: Vec<(String, Role)>,
}

impl RoleDetection {
    pub fn detect(&self, node: &PageNode) -> Option<Role> {
        if let Some(value) = self.attribute.as_deref().and_then(|a| node.attr(a)) {
            let mapped = if self.values.is_empty() {
                Role::from_name(value)
            } else {
                self.values
                    .iter()
                    .find(|(v, _)| v.eq_ignore_ascii_case(value.trim()))
                    .map(|(_, role)| *role)
            };
            if mapped.is_some() {
                return mapped;
            }
        }

        let classes = node.classes.join(" ").to_lowercase();
        self.class_hints
            .iter()
            .find(|(hint, _)| classes.contains(hint.as_str()))
            .map(|(_, role)| *role)
    }
}

/// A provider described by URL patterns, an id pattern and role rules.
#[derive(Debug, Clone)]
pub struct DomProfile {
    id: String,
    url_patterns: Vec<Regex>,
    conversation_id_pattern: Regex,
    role: RoleDetection,
}

impl DomProfile {
    /// The first participating capture group of `conversation_id_pattern` is the id.
    pub fn new(
        id: impl Into<String>,
        url_patterns: &[&str],
        conversation_id_pattern: &str,
        role: RoleDetection,
    ) -> Result<Self> {
        let url_patterns = url_patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(&regex::escape(p))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| Error::Config(format!("bad url pattern {}: {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        let conversation_id_pattern = Regex::new(conversation_id_pattern)
            .map_err(|e| Error::Config(format!("bad id pattern: {}", e)))?;

        Ok(Self {
            id: id.into(),
            url_patterns,
            conversation_id_pattern,
            role,
        })
    }

    fn is_provider_name(&self, text: &str) -> bool {
        text.trim().eq_ignore_ascii_case(&self.id)
    }
}

impl Extractor for DomProfile {
    fn provider(&self) -> &str {
        &self.id
    }

    fn matches(&self, url: &str) -> bool {
        self.url_patterns.iter().any(|p| p.is_match(url))
    }

    fn detect_conversation_id(&self, page: &PageSnapshot) -> Option<String> {
        self.conversation_id_pattern
            .captures(page.path())
            .and_then(|c| c.iter().skip(1).flatten().next())
            .map(|m| m.as_str().to_string())
    }

    fn detect_title(&self, page: &PageSnapshot) -> String {
        let explicit = page
            .title_candidates
            .iter()
            .chain(std::iter::once(&page.document_title))
            .map(|t| t.trim())
            .find(|t| !t.is_empty() && !self.is_provider_name(t));
        if let Some(title) = explicit {
            return title.to_string();
        }

        self.detect_messages(page)
            .into_iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.chars().take(TITLE_FROM_MESSAGE_CHARS).collect())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    fn detect_messages(&self, page: &PageSnapshot) -> Vec<Message> {
        page.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let role = self.role.detect(node)?;
                let content = node.text.trim();
                if content.is_empty() {
                    return None;
                }
                Some(Message::new(role, content, i as u32))
            })
            .collect()
    }
}

fn hints(pairs: &[(&str, Role)]) -> Vec<(String, Role)> {
    pairs.iter().map(|(k, r)| (k.to_string(), *r)).collect()
}

fn builtin(
    id: &str,
    url_patterns: &[&str],
    id_pattern: &str,
    role: RoleDetection,
) -> Option<DomProfile> {
    match DomProfile::new(id, url_patterns, id_pattern, role) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Built-in profile {} disabled: {}", id, e);
            None
        }
    }
}

/// ChatGPT, Claude, Gemini, DeepSeek and Doubao.
pub static BUILTIN_PROFILES: Lazy<Vec<DomProfile>> = Lazy::new(|| {
    use Role::{Assistant, User};

    [
        builtin(
            "ChatGPT",
            &["chat.openai.com", "chatgpt.com"],
            r"/c/([a-zA-Z0-9-]+)",
            RoleDetection {
                attribute: Some("data-message-author-role".into()),
                values: hints(&[("user", User), ("assistant", Assistant)]),
                class_hints: Vec::new(),
            },
        ),
        builtin(
            "Claude",
            &["claude.ai"],
            r"/chat/([a-zA-Z0-9-]+)",
            RoleDetection {
                attribute: Some("data-is-user-message".into()),
                values: hints(&[("true", User), ("false", Assistant)]),
                class_hints: hints(&[
                    ("user", User),
                    ("assistant", Assistant),
                    ("claude", Assistant),
                ]),
            },
        ),
        builtin(
            "Gemini",
            &["gemini.google.com"],
            r"/app/([a-zA-Z0-9_-]+)|/chat/([a-zA-Z0-9_-]+)",
            RoleDetection {
                attribute: None,
                values: Vec::new(),
                class_hints: hints(&[
                    ("user-turn", User),
                    ("user-message", User),
                    ("user", User),
                    ("model", Assistant),
                    ("assistant", Assistant),
                ]),
            },
        ),
        builtin(
            "DeepSeek",
            &["chat.deepseek.com"],
            r"/chat/([a-zA-Z0-9-]+)",
            RoleDetection {
                attribute: Some("data-role".into()),
                values: Vec::new(),
                class_hints: hints(&[("user", User), ("assistant", Assistant), ("bot", Assistant)]),
            },
        ),
        builtin(
            "Doubao",
            &["doubao.com"],
            r"/chat/([a-zA-Z0-9_-]+)",
            RoleDetection {
                attribute: Some("data-role".into()),
                values: Vec::new(),
                class_hints: hints(&[
                    ("user-message", User),
                    ("user", User),
                    ("assistant", Assistant),
                    ("bot", Assistant),
                    ("ai", Assistant),
                ]),
            },
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
});

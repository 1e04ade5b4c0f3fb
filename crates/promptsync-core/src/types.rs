//! Conversation record types: matching the extension's message payloads.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, ErrorKind, Result};

/// Prefix shared by every cached conversation key.
pub const HISTORY_PREFIX: &str = "history_";

/// Title used when the page offers nothing better.
pub const DEFAULT_TITLE: &str = "Untitled Conversation";

/// Build the cache key for a provider-scoped conversation.
pub fn history_key(provider: &str, conversation_id: &str) -> String {
    format!("{}{}_{}", HISTORY_PREFIX, provider, conversation_id)
}

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "user" | "human" => Some(Self::User),
            "assistant" | "ai" | "bot" | "model" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub index: u32,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, index: u32) -> Self {
        Self {
            role,
            content: content.into(),
            index,
        }
    }

    /// Hash over `(role, content, index)`; identical messages collide.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.role.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(self.content.as_bytes());
        hasher.update(b"|");
        hasher.update(self.index.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Where and when a record was extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "extractedAt", default = "Utc::now")]
    pub extracted_at: DateTime<Utc>,
    #[serde(rename = "messageCount", default)]
    pub message_count: usize,
}

impl Default for ConversationMetadata {
    fn default() -> Self {
        Self {
            url: String::new(),
            extracted_at: Utc::now(),
            message_count: 0,
        }
    }
}

/// Normalized conversation produced by one extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub provider: String,
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub metadata: ConversationMetadata,
}

impl ConversationRecord {
    /// Cache key for this record.
    pub fn key(&self) -> String {
        history_key(&self.provider, &self.conversation_id)
    }

    /// Reject records that cannot be accepted into the cache.
    pub fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(Error::Extraction("missing provider".into()));
        }
        if self.conversation_id.trim().is_empty() {
            return Err(Error::Extraction("could not determine conversation id".into()));
        }
        if self.messages.is_empty() {
            return Err(Error::Extraction("no conversation messages found".into()));
        }
        Ok(())
    }

    /// Apply the default title, collapse duplicate messages, refresh the count.
    pub fn normalized(mut self) -> Self {
        let title = self.title.trim();
        self.title = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.to_string()
        };

        let mut seen = HashSet::new();
        self.messages.retain(|m| seen.insert(m.content_hash()));
        self.metadata.message_count = self.messages.len();
        self
    }
}

/// Outcome of a handled extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub saved: bool,
    pub synced: bool,
}

/// One record that could not be pushed during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    #[serde(rename = "errorKind")]
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Aggregate of one batch pass. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncResult {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, conversation_id: &str, error: &Error) {
        self.attempted += 1;
        self.failures.push(SyncFailure {
            conversation_id: conversation_id.to_string(),
            error_kind: error.kind(),
            message: error.to_string(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

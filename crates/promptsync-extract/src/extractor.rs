//! The extractor capability and the record builder on top of it.

use chrono::Utc;
use tracing::debug;

use crate::page::PageSnapshot;
use promptsync_core::{ConversationMetadata, ConversationRecord, Error, Message, Result};

/// Per-provider page reader.
pub trait Extractor: Send + Sync {
    /// Provider identifier written into records (e.g. `"Claude"`).
    fn provider(&self) -> &str;

    fn matches(&self, url: &str) -> bool;

    fn detect_conversation_id(&self, page: &PageSnapshot) -> Option<String>;

    /// Never empty.
    fn detect_title(&self, page: &PageSnapshot) -> String;

    /// Messages in display order.
    fn detect_messages(&self, page: &PageSnapshot) -> Vec<Message>;
}

/// Build a normalized record from `page`, or fail with an extraction error.
pub fn extract(extractor: &dyn Extractor, page: &PageSnapshot) -> Result<ConversationRecord> {
    let conversation_id = extractor
        .detect_conversation_id(page)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::Extraction("could not determine conversation id".into()))?;

    let messages = extractor.detect_messages(page);
    if messages.is_empty() {
        return Err(Error::Extraction("no conversation messages found".into()));
    }

    let record = ConversationRecord {
        provider: extractor.provider().to_string(),
        conversation_id,
        title: extractor.detect_title(page),
        metadata: ConversationMetadata {
            url: page.url.clone(),
            extracted_at: Utc::now(),
            message_count: messages.len(),
        },
        messages,
    }
    .normalized();

    debug!("Extracted {} ({} messages)", record.key(), record.messages.len());
    Ok(record)
}

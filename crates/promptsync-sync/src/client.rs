//! HTTP client for the backend history API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use promptsync_core::{ConversationMetadata, ConversationRecord, Error, Message, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of `POST /ai-histories`.
#[derive(Debug, Serialize)]
pub struct HistoryPayload<'a> {
    pub provider: &'a str,
    pub conversation_id: &'a str,
    pub title: &'a str,
    pub messages: &'a [Message],
    pub metadata: &'a ConversationMetadata,
    /// Submission time, distinct from `metadata.extractedAt`.
    pub extracted_at: DateTime<Utc>,
}

impl<'a> HistoryPayload<'a> {
    pub fn new(record: &'a ConversationRecord, submitted_at: DateTime<Utc>) -> Self {
        Self {
            provider: &record.provider,
            conversation_id: &record.conversation_id,
            title: &record.title,
            messages: &record.messages,
            metadata: &record.metadata,
            extracted_at: submitted_at,
        }
    }
}

#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
}

impl RemoteClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Push one record. Non-2xx is `RemoteRejected`, network failure is `Transport`.
    pub async fn push(
        &self,
        endpoint: &str,
        record: &ConversationRecord,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/ai-histories", endpoint.trim_end_matches('/'));
        let payload = HistoryPayload::new(record, Utc::now());

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Error syncing {} to backend: {}", record.key(), e);
                Error::Transport(format!("POST {} failed: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Backend rejected {}: {} {}", record.key(), status, body);
            return Err(Error::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| {
            Error::Transport(format!("Failed to read response from {}: {}", url, e))
        })?;
        let result: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::RemoteRejected {
                status: status.as_u16(),
                body: format!("invalid JSON body: {}", e),
            })?;

        debug!("Conversation {} synced to backend", record.key());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptsync_core::Role;

    #[test]
    fn test_payload_shape() {
        let record = ConversationRecord {
            provider: "Claude".into(),
            conversation_id: "abc".into(),
            title: "T".into(),
            messages: vec![Message::new(Role::User, "hi", 0)],
            metadata: ConversationMetadata::default(),
        };
        let submitted = Utc::now();
        let v = serde_json::to_value(HistoryPayload::new(&record, submitted)).unwrap();

        assert_eq!(v["provider"], "Claude");
        assert_eq!(v["conversation_id"], "abc");
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["metadata"]["messageCount"], 0);
        assert!(v["metadata"]["extractedAt"].is_string());
        assert_eq!(
            v["extracted_at"],
            serde_json::to_value(submitted).unwrap()
        );
    }
}

//! Request/response envelopes, discriminated by `action`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use promptsync_core::{Config, ConversationRecord, Error, ErrorKind, Result};

/// A message addressed to a responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Page → background: carries the record. Background → page: asks the
    /// page to extract, so `data` is absent.
    ExtractConversation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<ConversationRecord>,
    },
    GetConfig,
    SaveConfig { config: Config },
    /// Push every cached record now, regardless of auto-sync.
    SyncAll,
    ListHistories,
}

const KNOWN_ACTIONS: &[&str] = &[
    "extractConversation",
    "getConfig",
    "saveConfig",
    "syncAll",
    "listHistories",
];

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Self::ExtractConversation { .. } => "extractConversation",
            Self::GetConfig => "getConfig",
            Self::SaveConfig { .. } => "saveConfig",
            Self::SyncAll => "syncAll",
            Self::ListHistories => "listHistories",
        }
    }

    /// Parse an untyped payload, answering unknown actions the way responders do.
    pub fn parse(value: Value) -> std::result::Result<Self, String> {
        let action = match value.get("action").and_then(|a| a.as_str()) {
            Some(a) => a.to_string(),
            None => return Err("Missing action".into()),
        };
        if !KNOWN_ACTIONS.contains(&action.as_str()) {
            return Err("Unknown action".into());
        }
        serde_json::from_value(value).map_err(|e| format!("Invalid {} payload: {}", action, e))
    }
}

/// Responder reply. Absent fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "errorKind", default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            config: None,
            error: None,
            error_kind: None,
        }
    }

    pub fn with_data<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                data: Some(value),
                ..Self::ok()
            },
            Err(e) => Self::failure(format!("Failed to encode response: {}", e)),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: Some(config),
            ..Self::ok()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            config: None,
            error: Some(message.into()),
            error_kind: None,
        }
    }

    /// Failure carrying the error's classification.
    pub fn from_error(error: &Error) -> Self {
        Self {
            error_kind: Some(error.kind()),
            ..Self::failure(error.to_string())
        }
    }

    /// Rebuild the responder's error. Unclassified failures are `Internal`.
    pub fn to_error(&self) -> Error {
        Error::Relayed {
            kind: self.error_kind.unwrap_or(ErrorKind::Internal),
            message: self.error.clone().unwrap_or_else(|| "request failed".into()),
        }
    }

    /// Decode `data` into `T`. Fails if the response is a failure or has no data.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.success {
            return Err(self.to_error());
        }
        let data = self
            .data
            .clone()
            .ok_or_else(|| Error::Internal("response carried no data".into()))?;
        Ok(serde_json::from_value(data)?)
    }
}

//! Sync engine: pushes cached conversations to the backend.
//!
//! `RemoteClient` performs one `POST {endpoint}/ai-histories`. `SyncEngine`
//! pushes single records or the whole cache with per-record failure
//! isolation. `SyncScheduler` runs the gated batch on a timer.

pub mod client;
pub mod engine;
pub mod scheduler;

pub use client::{HistoryPayload, RemoteClient};
pub use engine::SyncEngine;
pub use scheduler::{SyncScheduler, TickReport};

//! Message protocol between page-context agents and the background process.
//!
//! Requests are tagged by an `action` field. `MessageChannel` delivers them
//! over a `Transport` and races the acknowledgment against a deadline;
//! `LocalBus` is the in-process transport.

pub mod bus;
pub mod channel;
pub mod messages;

pub use bus::{Envelope, Inbox, LocalBus};
pub use channel::{Ack, MessageChannel, Target, Transport, DEFAULT_TIMEOUT};
pub use messages::{Request, Response};

//! Conversation extractors: the pluggable per-provider capability.
//!
//! The pipeline only talks to the `Extractor` trait. Built-in providers are
//! data-driven `DomProfile`s over a `PageSnapshot` collected in the page.

pub mod extractor;
pub mod page;
pub mod profile;
pub mod registry;

pub use extractor::{extract, Extractor};
pub use page::{PageNode, PageSnapshot};
pub use profile::{DomProfile, RoleDetection};
pub use registry::ProviderRegistry;

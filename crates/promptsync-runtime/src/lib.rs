//! Runtime: the background side of the pipeline and the page-side agent.
//!
//! `ExtractionHandler` caches then conditionally pushes a record.
//! `Background` answers protocol actions. `ContentAgent` runs in a page
//! context and forwards extracted records to the background.

pub mod background;
pub mod content;
pub mod handler;

pub use background::Background;
pub use content::ContentAgent;
pub use handler::ExtractionHandler;

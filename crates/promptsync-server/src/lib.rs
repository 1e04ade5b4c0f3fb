//! PromptSync background process: bus, scheduler, and local HTTP bridge.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;

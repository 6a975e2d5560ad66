//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TargetState`: Lifecycle of a single crawl target (pending, fetching, fetched, failed)
//! - `SessionState`: Request pacing for the single page-loading session

mod session_state;
mod target_state;

// Re-export main types
pub use session_state::SessionState;
pub use target_state::TargetState;

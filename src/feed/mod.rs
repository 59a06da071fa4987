//! Paginated feed core.
//!
//! - `accumulator` - deduplicated page merging ([`FeedState`])
//! - `filter` - tag/query context, fetch scope and view mode
//! - `orchestrator` - one-in-flight, generation-tagged page requests
//! - `search` - bounded multi-page title scan
//! - `scroll` - scroll position restoration machine
//! - `controller` - ties the above together behind one owner per pane

mod accumulator;
mod controller;
mod filter;
pub mod orchestrator;
pub mod scroll;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::FeedState;
pub use controller::{FeedController, FeedSettings, FeedSnapshot, PageOutcome, ScrollAction};
pub use filter::{FeedScope, FilterContext, ViewMode};
pub use orchestrator::{execute, FetchOrchestrator, PageRequest};
pub use scroll::{ScrollPhase, ScrollRestore};

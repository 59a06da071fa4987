//! devfeed: a terminal client for the dev.to article feed.
//!
//! The binary in `main.rs` wires these modules together; everything below the
//! UI layer is plain state and can be driven from tests without a terminal.

pub mod api;
pub mod app;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod nav;
pub mod preferences;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;

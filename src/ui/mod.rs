//! Terminal user interface.
//!
//! - `loop_runner` - Event loop, terminal setup and teardown
//! - `input` - Key dispatch through the keybinding registry
//! - `events` - Results from background tasks
//! - `helpers` - Spawning fetches and panic containment
//! - `render` - Frame layout and overlay dispatch
//! - `feed` - Grid and list article panes
//! - `detail` - Single article view
//! - `overlays` - Search box and tag picker
//! - `help` - Keybinding table
//! - `status` - Status bar

mod detail;
mod events;
mod feed;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod overlays;
mod render;
mod status;

pub use loop_runner::{run, Action, Services};

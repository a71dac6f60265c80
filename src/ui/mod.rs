//! Terminal user interface.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard dispatch through the keybinding registry
//! - `render` - Layout and overlay dispatch
//! - `movies` - Movie list with inline details
//! - `genres` - Genre filter bar
//! - `poster` - Poster overlay
//! - `help` - Keybinding help overlay
//! - `status` - Status bar

mod genres;
mod help;
mod input;
mod loop_runner;
mod movies;
mod poster;
mod render;
mod status;

pub use loop_runner::{run, Action};

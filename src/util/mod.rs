//! Small helpers shared by the source layer and the UI.
//!
//! - **Text**: terminal-safe sanitizing, width-aware truncation and wrapping
//! - **Links**: checks applied before a URL is handed to the system opener

mod links;
mod text;

pub use links::{validate_link, LinkError};
pub use text::{strip_control_chars, truncate_to_width, wrap_to_width};

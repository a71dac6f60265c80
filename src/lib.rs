//! marquee: browse top-rated movies in the terminal.
//!
//! - [`catalog`] - Catalog state, entries and the filtered snapshot
//! - [`controller`] - Pagination and lazy detail loading over a [`source::CatalogSource`]
//! - [`source`] - The source trait and the TMDB HTTP implementation
//! - [`config`] - Optional TOML configuration
//! - [`keybindings`] - Context-aware key registry
//! - [`app`] / [`ui`] - Terminal front end

pub mod app;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod keybindings;
pub mod source;
pub mod ui;
pub mod util;

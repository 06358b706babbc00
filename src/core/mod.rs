//! Core module for timeline data, viewport math and frame assembly.
//!
//! Nothing in here depends on the GUI toolkit.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod gesture;
pub mod grid;
pub mod parser;
pub mod placement;
pub mod render;
pub mod resize;
pub mod viewport;

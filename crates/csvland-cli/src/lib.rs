//! CLI library components for csvland.

pub mod config;
pub mod logging;
pub mod pipeline;

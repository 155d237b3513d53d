//! Plant care scheduling
//!
//! Computes per-plant watering intervals from physical and environmental
//! attributes and derives urgency-ordered watering and care task lists.
//! The pure scheduling core (`frequency`, `tasks`, `care`, `dates`) is shared
//! by the HTTP handlers and the background recomputation sweep.

pub mod care;
pub mod config;
pub mod dates;
pub mod error;
pub mod frequency;
pub mod handlers;
pub mod models;
pub mod recompute;
pub mod state;
pub mod tasks;
pub mod validation;

//! Screen-level components driving user-facing list behavior.
//!
//! # Responsibility
//! - Orchestrate gateway calls in response to user gestures.
//! - Keep the in-memory row cache and the rendered table consistent.

pub mod task_list_screen;

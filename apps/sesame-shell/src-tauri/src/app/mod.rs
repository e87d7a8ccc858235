//! Application setup and lifecycle management
//!
//! This module contains the application initialization and lifecycle code,
//! kept out of lib.rs so the entry point stays slim.

pub mod lifecycle;
pub mod state;
pub mod window;

pub use lifecycle::*;
pub use state::*;
pub use window::*;

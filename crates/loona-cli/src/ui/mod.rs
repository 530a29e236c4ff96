//! UI primitives for the Loona CLI.
//!
//! - **Context**: environment detection (TTY, color)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badges and colors
//! - **Render**: tables, key-value lines, hints
//! - **Progress**: spinner

mod context;
mod mode;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use progress::Spinner;
pub use render::{badge, hint, kv, simple_table, title, truncate};
pub use theme::Badge;

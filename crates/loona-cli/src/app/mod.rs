//! Application-level utilities for the Loona CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - The per-invocation context (config, stores, gate)
//! - Passphrase prompting with retry logic

mod context;
mod resolver;
mod unlock;

pub use context::AppContext;
pub use resolver::resolve_config_path;
pub use unlock::{resolve_gate, unlock};

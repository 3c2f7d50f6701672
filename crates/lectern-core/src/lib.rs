//! Document session engine: line-indexed text, chapter detection, search,
//! and debounced sidecar persistence.
//!
//! Nothing in this crate touches the filesystem or a real clock. Storage and
//! byte reading are injected through the [`config::ConfigStore`] and
//! [`dispatch::DocumentSource`] traits, and time arrives as plain
//! millisecond ticks, so every contract here is testable in memory.

pub mod config;
pub mod decode;
pub mod dispatch;
pub mod session;

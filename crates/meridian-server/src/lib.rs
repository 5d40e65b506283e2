//! Watch mode for meridian sites.
//!
//! Bundles assets into the source tree, rebuilds them when sources change and
//! serves the tree locally with a WebSocket live-reload channel.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent, WatchScope};

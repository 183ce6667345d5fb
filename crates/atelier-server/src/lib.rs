//! Development server with live reload for atelier builds.
//!
//! Serves the build output with an injected reload client, watches the
//! source tree, and re-runs the matching transform tasks on change.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{classify, dispatch_loop, run_plan, ReloadKind, SourceWatcher, TriggerPlan};

//! Development mode: build once, then serve and watch until interrupted.

use std::path::Path;

use anyhow::Result;
use atelier_pipeline::{clean, ProjectPaths};
use atelier_server::{dispatch_loop, DevServer, DevServerConfig, ReloadHub, SourceWatcher};

use crate::config::load_config;

use super::build::build_all;

/// Run the dev command.
pub async fn run(root: &Path, port: Option<u16>, no_open: bool) -> Result<()> {
    let config = load_config(root)?;
    let source = root.join(&config.paths.source);
    let paths = ProjectPaths::new(source.clone(), root.join(&config.paths.output));

    clean(&paths)?;
    build_all(&paths).await?;

    let hub = ReloadHub::new();
    let (watcher, rx) = SourceWatcher::new(&source)?;
    let dispatch = tokio::spawn(dispatch_loop(paths.clone(), hub.clone(), rx));

    let server = DevServer::new(DevServerConfig {
        out_dir: paths.output,
        port: port.unwrap_or(config.serve.port),
        open: config.serve.open && !no_open,
        quiet: config.serve.quiet,
        ..DevServerConfig::default()
    });

    // Serves until the process is interrupted.
    let result = server.start(hub).await;
    drop(watcher);
    dispatch.abort();
    result?;

    Ok(())
}

//! One-shot build command.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use atelier_pipeline::{clean, run_category, AssetCategory, ProjectPaths, TransformOutcome};

use crate::config::load_config;

/// Run the build command: clean, then every category once.
pub async fn run(root: &Path, out: Option<PathBuf>) -> Result<()> {
    let config = load_config(root)?;
    let paths = ProjectPaths::new(
        root.join(&config.paths.source),
        out.unwrap_or_else(|| root.join(&config.paths.output)),
    );

    tracing::info!("Building {}", paths.source.display());
    let start = Instant::now();

    clean(&paths)?;
    let outcomes = build_all(&paths).await?;

    let written: usize = outcomes.iter().map(|o| o.written.len()).sum();
    let failed: usize = outcomes.iter().map(|o| o.failed).sum();

    tracing::info!(
        "Built {} file(s) in {}ms",
        written,
        start.elapsed().as_millis()
    );
    if failed > 0 {
        tracing::warn!("{} file(s) failed to transform", failed);
    }

    tracing::info!("Output: {}", paths.output.display());

    Ok(())
}

/// Run all six transform tasks as one parallel group. The group completes
/// only when every member completes; the first fatal error stops further
/// scheduling and propagates.
pub async fn build_all(paths: &ProjectPaths) -> Result<Vec<TransformOutcome>> {
    let mut handles = Vec::with_capacity(AssetCategory::ALL.len());
    for category in AssetCategory::ALL {
        let paths = paths.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            run_category(&paths, category)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await??);
    }
    Ok(outcomes)
}

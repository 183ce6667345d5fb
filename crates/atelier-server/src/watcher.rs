//! File watching and the watch dispatch loop.
//!
//! Filesystem events flow through a channel into a single dispatch loop that
//! maps each changed path to an ordered trigger plan. Plans for different
//! categories run on their own tasks and may overlap in time; the tasks
//! inside one plan run strictly in order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use atelier_pipeline::{run_category, AssetCategory, ProjectPaths, TransformOutcome};

use crate::reload::{ReloadHub, ReloadMessage};
use crate::server::ServerError;

/// Reload behavior attached to a trigger plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Full browser reload after the plan completes
    Full,

    /// Hot-swap the stylesheets the plan wrote
    Css,

    /// No signal; archives are excluded from reload triggers
    None,
}

/// Ordered tasks to run for one filesystem change, plus the reload policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPlan {
    pub tasks: Vec<AssetCategory>,
    pub reload: ReloadKind,
}

/// Map a changed path (relative to the source root) to its trigger plan.
///
/// Any markup change under `html/` runs pages before the root page: the root
/// page may inline fragments assembled from the pages tree, so it re-runs
/// last, and the whole sequence ends in a full reload.
pub fn classify(rel: &Path) -> Option<TriggerPlan> {
    if rel == Path::new("index.html") {
        return Some(TriggerPlan {
            tasks: vec![AssetCategory::RootHtml],
            reload: ReloadKind::Full,
        });
    }

    let first = rel.iter().next().and_then(|c| c.to_str()).unwrap_or("");
    let ext = rel.extension().and_then(|e| e.to_str()).unwrap_or("");

    match first {
        "html" if ext == "html" => Some(TriggerPlan {
            tasks: vec![AssetCategory::PagesHtml, AssetCategory::RootHtml],
            reload: ReloadKind::Full,
        }),
        "scss" if ext == "scss" => Some(TriggerPlan {
            tasks: vec![AssetCategory::Styles],
            reload: ReloadKind::Css,
        }),
        "js" if ext == "js" => Some(TriggerPlan {
            tasks: vec![AssetCategory::Scripts],
            reload: ReloadKind::Full,
        }),
        "images" => Some(TriggerPlan {
            tasks: vec![AssetCategory::Images],
            reload: ReloadKind::Full,
        }),
        "archives" => Some(TriggerPlan {
            tasks: vec![AssetCategory::Archives],
            reload: ReloadKind::None,
        }),
        _ => None,
    }
}

/// Filesystem watcher over the project source root.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    /// Watch `root` recursively. Emits changed paths relative to `root`.
    pub fn new(root: &Path) -> Result<(Self, async_mpsc::Receiver<PathBuf>), ServerError> {
        // notify reports canonical paths on some platforms; relativize
        // against the canonical root (best-effort).
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(|e| ServerError::Watch(e.to_string()))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| ServerError::Watch(e.to_string()))?;

        // Forward changed paths from notify's thread into the async world.
        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    continue;
                }
                for path in event.paths {
                    if let Ok(rel) = path.strip_prefix(&root) {
                        if async_tx.blocking_send(rel.to_path_buf()).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Window for coalescing the event bursts a single save produces.
const COALESCE_WINDOW: Duration = Duration::from_millis(100);

/// Consume watch events and run trigger plans until the channel closes.
pub async fn dispatch_loop(
    paths: ProjectPaths,
    hub: ReloadHub,
    mut rx: async_mpsc::Receiver<PathBuf>,
) {
    let mut last_run: HashMap<Vec<AssetCategory>, Instant> = HashMap::new();

    while let Some(rel) = rx.recv().await {
        let Some(plan) = classify(&rel) else {
            tracing::debug!("ignoring change outside watched categories: {}", rel.display());
            continue;
        };

        let now = Instant::now();
        if let Some(prev) = last_run.get(&plan.tasks) {
            if now.duration_since(*prev) < COALESCE_WINDOW {
                continue;
            }
        }
        last_run.insert(plan.tasks.clone(), now);

        tracing::info!("change: {}", rel.display());
        let paths = paths.clone();
        let hub = hub.clone();
        tokio::spawn(async move {
            run_plan(&paths, &hub, plan).await;
        });
    }
}

/// Run a plan's tasks in order, then emit its reload signal. Returns the
/// per-task outcomes in execution order.
pub async fn run_plan(
    paths: &ProjectPaths,
    hub: &ReloadHub,
    plan: TriggerPlan,
) -> Vec<(AssetCategory, TransformOutcome)> {
    let mut runs = Vec::with_capacity(plan.tasks.len());

    for category in plan.tasks {
        let task_paths = paths.clone();
        let joined =
            tokio::task::spawn_blocking(move || run_category(&task_paths, category)).await;
        match joined {
            Ok(Ok(outcome)) => runs.push((category, outcome)),
            Ok(Err(e)) => {
                tracing::error!("{category} failed: {e}");
                return runs;
            }
            Err(e) => {
                tracing::error!("{category} task panicked: {e}");
                return runs;
            }
        }
    }

    match plan.reload {
        ReloadKind::Full => hub.send(ReloadMessage::Reload),
        ReloadKind::Css => {
            let paths: Vec<String> = runs
                .iter()
                .flat_map(|(_, outcome)| &outcome.written)
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("css"))
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .collect();
            hub.send(ReloadMessage::RefreshCss { paths });
        }
        ReloadKind::None => {}
    }

    runs
}

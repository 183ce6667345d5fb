//! Build tasks: output cleaning and the per-category transform runner.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{PipelineError, TransformError};
use crate::paths::{AssetCategory, CategorySpec, ProjectPaths};
use crate::{html, images, scripts, styles};

/// Result of running one category's transform task.
#[derive(Debug, Default)]
pub struct TransformOutcome {
    /// Paths written, relative to the output root.
    pub written: Vec<PathBuf>,

    /// Number of source files whose chain failed.
    pub failed: usize,
}

/// Remove the output root ahead of a build. A missing output directory is a
/// no-op; a removal failure is fatal, since continuing would mix old and new
/// output.
pub fn clean(paths: &ProjectPaths) -> Result<(), PipelineError> {
    if paths.output.exists() {
        fs::remove_dir_all(&paths.output).map_err(|source| PipelineError::Clean {
            path: paths.output.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Run one category's transform chain over every matching source file.
///
/// Files are processed in parallel with no ordering guarantee. A failing
/// file is reported and counted but never aborts the task; only setup
/// failures are fatal.
pub fn run_category(
    paths: &ProjectPaths,
    category: AssetCategory,
) -> Result<TransformOutcome, PipelineError> {
    let spec = paths.spec(category);
    let files = discover(&spec)?;
    if files.is_empty() {
        tracing::debug!("{category}: no sources matched");
        return Ok(TransformOutcome::default());
    }

    let results: Vec<Result<Vec<PathBuf>, TransformError>> = files
        .par_iter()
        .map(|file| transform_file(paths, category, &spec, file))
        .collect();

    let mut outcome = TransformOutcome::default();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(written) => outcome.written.extend(written),
            Err(e) => {
                outcome.failed += 1;
                tracing::error!("[{}] {}: {}", category.title(), file.display(), e);
            }
        }
    }

    tracing::info!("{category}: {} file(s) written", outcome.written.len());
    Ok(outcome)
}

/// Enumerate files matching the category glob. A missing source directory or
/// an empty match set is not an error.
fn discover(spec: &CategorySpec) -> Result<Vec<PathBuf>, PipelineError> {
    let matcher = spec.matcher().map_err(|source| PipelineError::Pattern {
        pattern: spec.pattern.to_string(),
        source,
    })?;

    let files = WalkDir::new(&spec.src_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(&spec.src_dir).ok()?;
            matcher.is_match(rel).then(|| e.path().to_path_buf())
        })
        .collect();

    Ok(files)
}

fn transform_file(
    paths: &ProjectPaths,
    category: AssetCategory,
    spec: &CategorySpec,
    src: &Path,
) -> Result<Vec<PathBuf>, TransformError> {
    let rel = src
        .strip_prefix(&spec.src_dir)
        .map_err(|e| TransformError::Read {
            path: src.display().to_string(),
            message: e.to_string(),
        })?;

    match category {
        AssetCategory::RootHtml | AssetCategory::PagesHtml => {
            let source = read_text(src)?;
            let base_dir = src.parent().unwrap_or(&spec.src_dir);
            let minified = html::transform_html(&source, base_dir)?;
            let dest = spec.dest_dir.join(rel);
            write_file(&dest, &minified)?;
            Ok(vec![relative_to_output(paths, &dest)])
        }

        AssetCategory::Styles => {
            // Underscore-prefixed partials are compile inputs only.
            let name = src.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('_') {
                return Ok(Vec::new());
            }

            let dest = spec.dest_dir.join(rel).with_extension("css");
            let map_dest = dest.with_extension("css.map");
            let map_name = map_dest
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("style.css.map")
                .to_string();

            let compiled = styles::transform_styles(src, &map_name)?;
            write_file(&dest, compiled.css.as_bytes())?;
            write_file(&map_dest, compiled.map.as_bytes())?;
            Ok(vec![
                relative_to_output(paths, &dest),
                relative_to_output(paths, &map_dest),
            ])
        }

        AssetCategory::Scripts => {
            let source = read_text(src)?;
            let code = scripts::transform_scripts(&source)?;
            let dest = spec.dest_dir.join(rel);
            write_file(&dest, code.as_bytes())?;
            Ok(vec![relative_to_output(paths, &dest)])
        }

        AssetCategory::Images => {
            let dest = spec.dest_dir.join(rel);
            ensure_parent(&dest)?;
            let written = images::transform_image(src, &dest)?;
            Ok(written
                .iter()
                .map(|p| relative_to_output(paths, p))
                .collect())
        }

        AssetCategory::Archives => {
            let dest = spec.dest_dir.join(rel);
            ensure_parent(&dest)?;
            fs::copy(src, &dest).map_err(|e| TransformError::Write {
                path: dest.display().to_string(),
                message: e.to_string(),
            })?;
            Ok(vec![relative_to_output(paths, &dest)])
        }
    }
}

fn read_text(path: &Path) -> Result<String, TransformError> {
    fs::read_to_string(path).map_err(|e| TransformError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn ensure_parent(dest: &Path) -> Result<(), TransformError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| TransformError::Write {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

fn write_file(dest: &Path, contents: &[u8]) -> Result<(), TransformError> {
    ensure_parent(dest)?;
    fs::write(dest, contents).map_err(|e| TransformError::Write {
        path: dest.display().to_string(),
        message: e.to_string(),
    })
}

fn relative_to_output(paths: &ProjectPaths, dest: &Path) -> PathBuf {
    dest.strip_prefix(&paths.output)
        .unwrap_or(dest)
        .to_path_buf()
}

//! Markup transform chain: include resolution, then minification.

use std::path::Path;

use minify_html::{minify, Cfg};

use crate::error::TransformError;
use crate::include::resolve_includes;

/// Fixed minification options for all markup output: collapse whitespace,
/// strip comments, minify embedded scripts and styles, unquote attributes,
/// shorten the doctype.
fn minify_cfg() -> Cfg {
    Cfg {
        minify_css: true,
        minify_js: true,
        ..Cfg::default()
    }
}

/// Run the markup chain over one file's contents. `base_dir` is the directory
/// of the source file; include directives resolve against it.
pub fn transform_html(source: &str, base_dir: &Path) -> Result<Vec<u8>, TransformError> {
    let included = resolve_includes(source, base_dir)?;
    Ok(minify(included.as_bytes(), &minify_cfg()))
}

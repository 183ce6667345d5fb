//! Stylesheet chain: SCSS compilation, vendor prefixing, minification, and
//! source-map emission.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::error::TransformError;

/// Browser floor the prefixer targets. Versions are encoded `major << 16`.
fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(90 << 16),
        edge: Some(90 << 16),
        firefox: Some(88 << 16),
        safari: Some(13 << 16),
        ios_saf: Some(13 << 16),
        ..Browsers::default()
    })
}

/// A compiled stylesheet and its source map, ready to write side by side.
#[derive(Debug)]
pub struct CompiledStyles {
    pub css: String,
    pub map: String,
}

/// Compile one SCSS entry point. `map_name` is the file name the trailing
/// `sourceMappingURL` comment points at.
pub fn transform_styles(path: &Path, map_name: &str) -> Result<CompiledStyles, TransformError> {
    let compiled = grass::from_path(path, &grass::Options::default())
        .map_err(|e| TransformError::Scss(e.to_string()))?;

    let filename = path.display().to_string();
    let mut stylesheet = StyleSheet::parse(
        &compiled,
        ParserOptions {
            filename,
            ..ParserOptions::default()
        },
    )
    .map_err(|e| TransformError::Css(e.to_string()))?;

    let targets = browser_targets();
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| TransformError::Css(e.to_string()))?;

    let mut source_map = SourceMap::new("/");
    let output = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: Some(&mut source_map),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| TransformError::Css(e.to_string()))?;

    let map = source_map
        .to_json(None)
        .map_err(|e| TransformError::Css(e.to_string()))?;

    let css = format!("{}\n/*# sourceMappingURL={map_name} */", output.code);
    Ok(CompiledStyles { css, map })
}

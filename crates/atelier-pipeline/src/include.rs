//! `@@include` directive resolution.
//!
//! A directive like `@@include('partials/header.html')` is replaced with the
//! named file's contents, resolved relative to the file containing the
//! directive. Included files may themselves contain directives.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TransformError;

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@@include\(\s*['"]([^'"]+)['"]\s*\)"#).expect("static include regex")
});

/// Include chains deeper than this are treated as cycles.
const MAX_DEPTH: usize = 64;

/// Resolve all `@@include` directives in `source`, relative to `base_dir`.
pub fn resolve_includes(source: &str, base_dir: &Path) -> Result<String, TransformError> {
    resolve_at_depth(source, base_dir, 0)
}

fn resolve_at_depth(source: &str, base_dir: &Path, depth: usize) -> Result<String, TransformError> {
    if depth >= MAX_DEPTH {
        return Err(TransformError::Include(format!(
            "include depth exceeded {MAX_DEPTH} levels (include cycle?)"
        )));
    }

    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in INCLUDE_RE.captures_iter(source) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let path = base_dir.join(name.as_str());
        let included = fs::read_to_string(&path)
            .map_err(|e| TransformError::Include(format!("{}: {}", path.display(), e)))?;

        let parent = path.parent().unwrap_or(base_dir);
        let resolved = resolve_at_depth(&included, parent, depth + 1)?;

        out.push_str(&source[last..whole.start()]);
        out.push_str(&resolved);
        last = whole.end();
    }

    out.push_str(&source[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn inlines_a_directive() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("header.html"), "<header>Site</header>").unwrap();

        let out =
            resolve_includes("<body>@@include('header.html')</body>", temp.path()).unwrap();

        assert_eq!(out, "<body><header>Site</header></body>");
    }

    #[test]
    fn resolves_nested_includes_relative_to_the_including_file() {
        let temp = tempdir().unwrap();
        let partials = temp.path().join("partials");
        fs::create_dir_all(&partials).unwrap();
        fs::write(partials.join("nav.html"), "<nav>@@include(\"logo.html\")</nav>").unwrap();
        fs::write(partials.join("logo.html"), "<b>logo</b>").unwrap();

        let out = resolve_includes("@@include('partials/nav.html')", temp.path()).unwrap();

        assert_eq!(out, "<nav><b>logo</b></nav>");
    }

    #[test]
    fn missing_include_is_an_error() {
        let temp = tempdir().unwrap();

        let err = resolve_includes("@@include('gone.html')", temp.path()).unwrap_err();

        assert!(matches!(err, TransformError::Include(_)));
    }

    #[test]
    fn include_cycles_terminate_with_an_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.html"), "@@include('b.html')").unwrap();
        fs::write(temp.path().join("b.html"), "@@include('a.html')").unwrap();

        let err = resolve_includes("@@include('a.html')", temp.path()).unwrap_err();

        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn text_without_directives_passes_through() {
        let temp = tempdir().unwrap();

        let out = resolve_includes("<p>plain</p>", temp.path()).unwrap();

        assert_eq!(out, "<p>plain</p>");
    }
}

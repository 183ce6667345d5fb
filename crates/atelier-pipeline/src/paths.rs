//! Asset category path configuration.
//!
//! A pure static lookup from category to source glob and destination
//! directory, parameterized only by the project source and output roots.
//! A glob matching nothing is not a failure; downstream tasks simply
//! process zero files.

use std::fmt;
use std::path::PathBuf;

use globset::{Glob, GlobMatcher};

/// The six asset categories the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    RootHtml,
    PagesHtml,
    Styles,
    Scripts,
    Images,
    Archives,
}

impl AssetCategory {
    /// All categories, in the order the build starts them.
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::RootHtml,
        AssetCategory::PagesHtml,
        AssetCategory::Styles,
        AssetCategory::Scripts,
        AssetCategory::Images,
        AssetCategory::Archives,
    ];

    /// Title used in per-file error notifications.
    pub fn title(&self) -> &'static str {
        match self {
            AssetCategory::RootHtml | AssetCategory::PagesHtml => "HTML",
            AssetCategory::Styles => "SCSS",
            AssetCategory::Scripts => "JS",
            AssetCategory::Images => "Images",
            AssetCategory::Archives => "Archives",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetCategory::RootHtml => "root-html",
            AssetCategory::PagesHtml => "pages-html",
            AssetCategory::Styles => "styles",
            AssetCategory::Scripts => "scripts",
            AssetCategory::Images => "images",
            AssetCategory::Archives => "archives",
        };
        f.write_str(name)
    }
}

/// Source and destination binding for one category.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    /// Directory the glob is evaluated against.
    pub src_dir: PathBuf,

    /// Glob pattern, relative to `src_dir`.
    pub pattern: &'static str,

    /// Directory results are written to, preserving relative structure.
    pub dest_dir: PathBuf,
}

impl CategorySpec {
    /// Compile the category glob.
    pub fn matcher(&self) -> Result<GlobMatcher, globset::Error> {
        Ok(Glob::new(self.pattern)?.compile_matcher())
    }
}

/// Resolved source and output roots for a project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl ProjectPaths {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }

    /// Static category lookup. The table is fixed at startup; only the
    /// roots vary.
    pub fn spec(&self, category: AssetCategory) -> CategorySpec {
        let (src, pattern, dest) = match category {
            AssetCategory::RootHtml => ("", "index.html", ""),
            AssetCategory::PagesHtml => ("html/pages", "**/*.html", "html/pages"),
            AssetCategory::Styles => ("scss", "**/*.scss", "css"),
            AssetCategory::Scripts => ("js", "**/*.js", "js"),
            AssetCategory::Images => ("images", "**/*", "images"),
            AssetCategory::Archives => ("archives", "**/*", "archives"),
        };

        let src_dir = if src.is_empty() {
            self.source.clone()
        } else {
            self.source.join(src)
        };
        let dest_dir = if dest.is_empty() {
            self.output.clone()
        } else {
            self.output.join(dest)
        };

        CategorySpec {
            src_dir,
            pattern,
            dest_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn maps_categories_to_disjoint_destinations() {
        let paths = ProjectPaths::new("src", "dist");
        let mut dests: Vec<PathBuf> = AssetCategory::ALL
            .iter()
            .map(|c| paths.spec(*c).dest_dir)
            .collect();
        dests.sort();
        dests.dedup();
        assert_eq!(dests.len(), AssetCategory::ALL.len());
    }

    #[test]
    fn root_html_matches_only_the_root_index() {
        let paths = ProjectPaths::new("src", "dist");
        let spec = paths.spec(AssetCategory::RootHtml);
        let matcher = spec.matcher().unwrap();

        assert!(matcher.is_match(Path::new("index.html")));
        assert!(!matcher.is_match(Path::new("html/pages/index.html")));
    }

    #[test]
    fn pages_glob_is_recursive() {
        let paths = ProjectPaths::new("src", "dist");
        let spec = paths.spec(AssetCategory::PagesHtml);
        let matcher = spec.matcher().unwrap();

        assert!(matcher.is_match(Path::new("about.html")));
        assert!(matcher.is_match(Path::new("blog/post.html")));
        assert!(!matcher.is_match(Path::new("blog/post.txt")));
    }
}

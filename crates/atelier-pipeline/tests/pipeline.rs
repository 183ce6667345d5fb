//! Full-pipeline properties: idempotence, stale-file absence, and the
//! include scenario, run over a small fixture project.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use atelier_pipeline::{clean, run_category, AssetCategory, ProjectPaths};
use image::RgbaImage;
use tempfile::tempdir;

fn write_fixture(root: &Path) {
    let src = root.join("src");
    fs::create_dir_all(src.join("html/pages")).unwrap();
    fs::create_dir_all(src.join("html/sections")).unwrap();
    fs::create_dir_all(src.join("scss")).unwrap();
    fs::create_dir_all(src.join("js")).unwrap();
    fs::create_dir_all(src.join("images")).unwrap();
    fs::create_dir_all(src.join("archives")).unwrap();

    fs::write(
        src.join("index.html"),
        "<!DOCTYPE html>\n<html>\n<body>\n<!-- landing page -->\n@@include('html/sections/header.html')\n<p>welcome</p>\n</body>\n</html>\n",
    )
    .unwrap();
    fs::write(
        src.join("html/sections/header.html"),
        "<header>Atelier</header>",
    )
    .unwrap();
    fs::write(
        src.join("html/pages/about.html"),
        "<html><body>@@include('../sections/header.html')<p>about</p></body></html>",
    )
    .unwrap();

    fs::write(src.join("scss/_vars.scss"), "$accent: #336699;\n").unwrap();
    fs::write(
        src.join("scss/main.scss"),
        "@use 'vars';\n.hero { color: vars.$accent; }\n",
    )
    .unwrap();

    fs::write(
        src.join("js/app.js"),
        "function square(n) {\n    return n * n;\n}\nwindow.answer = square(7);\n",
    )
    .unwrap();

    RgbaImage::from_pixel(8, 8, image::Rgba([200, 100, 50, 255]))
        .save(src.join("images/logo.png"))
        .unwrap();

    fs::write(src.join("archives/report.pdf"), b"%PDF-1.4 fixture bytes").unwrap();
}

fn build_all(paths: &ProjectPaths) {
    clean(paths).unwrap();
    for category in AssetCategory::ALL {
        run_category(paths, category).unwrap();
    }
}

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let rel = entry.path().strip_prefix(dir).unwrap().to_path_buf();
        files.insert(rel, fs::read(entry.path()).unwrap());
    }
    files
}

#[test]
fn building_twice_produces_identical_output_trees() {
    let temp = tempdir().unwrap();
    write_fixture(temp.path());
    let paths = ProjectPaths::new(temp.path().join("src"), temp.path().join("dist"));

    build_all(&paths);
    let first = snapshot(&paths.output);
    assert!(!first.is_empty());

    build_all(&paths);
    let second = snapshot(&paths.output);

    assert_eq!(first, second);
}

#[test]
fn rebuild_leaves_no_stale_files() {
    let temp = tempdir().unwrap();
    write_fixture(temp.path());
    let paths = ProjectPaths::new(temp.path().join("src"), temp.path().join("dist"));

    build_all(&paths);
    fs::write(paths.output.join("left-over.txt"), "from a prior build").unwrap();
    fs::remove_file(paths.source.join("js/app.js")).unwrap();

    build_all(&paths);

    assert!(!paths.output.join("left-over.txt").exists());
    assert!(!paths.output.join("js/app.js").exists());
}

#[test]
fn root_page_inlines_the_header_and_drops_comments() {
    let temp = tempdir().unwrap();
    write_fixture(temp.path());
    let paths = ProjectPaths::new(temp.path().join("src"), temp.path().join("dist"));

    build_all(&paths);

    let index = fs::read_to_string(paths.output.join("index.html")).unwrap();
    assert!(index.contains("<header>Atelier</header>"));
    assert!(index.contains("welcome"));
    assert!(!index.contains("@@include"));
    assert!(!index.contains("landing page"));
}

#[test]
fn pages_resolve_includes_outside_their_own_tree() {
    let temp = tempdir().unwrap();
    write_fixture(temp.path());
    let paths = ProjectPaths::new(temp.path().join("src"), temp.path().join("dist"));

    build_all(&paths);

    let about = fs::read_to_string(paths.output.join("html/pages/about.html")).unwrap();
    assert!(about.contains("<header>Atelier</header>"));
    assert!(about.contains("about"));
}

#[test]
fn every_category_lands_in_its_own_destination() {
    let temp = tempdir().unwrap();
    write_fixture(temp.path());
    let paths = ProjectPaths::new(temp.path().join("src"), temp.path().join("dist"));

    build_all(&paths);

    assert!(paths.output.join("index.html").exists());
    assert!(paths.output.join("html/pages/about.html").exists());
    assert!(paths.output.join("css/main.css").exists());
    assert!(paths.output.join("css/main.css.map").exists());
    assert!(paths.output.join("js/app.js").exists());
    assert!(paths.output.join("images/logo.png").exists());
    assert!(paths.output.join("images/logo.webp").exists());
    assert_eq!(
        fs::read(paths.output.join("archives/report.pdf")).unwrap(),
        b"%PDF-1.4 fixture bytes"
    );
}

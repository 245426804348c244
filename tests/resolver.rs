use std::fs;
use std::path::{Path, PathBuf};
use strata::core::resolver::normalize_path;
use strata::core::{Analysis, AnalysisConfig, StructureAnalyzer};

fn project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap().join("proj");
    fs::create_dir_all(&root).unwrap();
    (dir, root)
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn analyze(root: &Path) -> Analysis {
    StructureAnalyzer::new()
        .unwrap()
        .analyze(&AnalysisConfig::new(root))
        .unwrap()
}

fn deps_of(analysis: &Analysis, root: &Path, relative: &str) -> Vec<PathBuf> {
    let tree = &analysis.tree;
    let id = tree.path_index().get(&root.join(relative)).unwrap();
    tree.entity(id)
        .dependencies()
        .map(|dep| tree.entity(dep).path.clone())
        .collect()
}

#[test]
fn normalize_path_folds_dot_segments_lexically() {
    assert_eq!(
        normalize_path(Path::new("/p/src/./../lib/c.js")),
        PathBuf::from("/p/lib/c.js")
    );
    assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    assert_eq!(
        normalize_path(Path::new("../../x/y")),
        PathBuf::from("../../x/y")
    );
    assert_eq!(normalize_path(Path::new("a/b/../../..")), PathBuf::from(".."));
}

#[test]
fn relative_imports_resolve_to_indexed_modules() {
    let (_dir, root) = project();
    write(
        &root,
        "src/a.js",
        "import b from './b';\n\
         import c from '../lib/c.js';\n\
         import React from 'react';\n\
         import util from './util';\n\
         import again from './b';\n",
    );
    write(&root, "src/b.js", "export default 1;\n");
    write(&root, "lib/c.js", "export default 2;\n");
    write(&root, "src/util/index.js", "export default 3;\n");

    let analysis = analyze(&root);

    assert_eq!(
        deps_of(&analysis, &root, "src/a.js"),
        vec![
            root.join("src/b.js"),
            root.join("lib/c.js"),
            root.join("src/util/index.js"),
        ]
    );
    assert_eq!(analysis.resolution.unresolved, 1);
    assert!(deps_of(&analysis, &root, "src/b.js").is_empty());
}

#[test]
fn self_imports_are_dropped() {
    let (_dir, root) = project();
    write(&root, "self.js", "import me from './self';\nimport other from './other';\n");
    write(&root, "other.js", "");

    let analysis = analyze(&root);

    assert_eq!(
        deps_of(&analysis, &root, "self.js"),
        vec![root.join("other.js")]
    );
    assert_eq!(analysis.resolution.unresolved, 0);
}

#[test]
fn typescript_imports_probe_sibling_extensions() {
    let (_dir, root) = project();
    write(
        &root,
        "app.ts",
        "import { Widget } from './widget';\nimport { api } from './api.js';\n",
    );
    write(&root, "widget.tsx", "export const Widget = () => <div />;\n");
    write(&root, "api.ts", "export const api = 1;\n");

    let analysis = analyze(&root);

    assert_eq!(
        deps_of(&analysis, &root, "app.ts"),
        vec![root.join("widget.tsx"), root.join("api.ts")]
    );
}

#[test]
fn imports_into_excluded_directories_stay_unresolved() {
    let (_dir, root) = project();
    write(&root, "main.js", "import dep from './vendor/dep';\n");
    write(&root, "vendor/dep.js", "");

    let analysis = StructureAnalyzer::new()
        .unwrap()
        .analyze(&AnalysisConfig::new(&root).with_exclude(r"\.vendor$"))
        .unwrap();

    assert!(deps_of(&analysis, &root, "main.js").is_empty());
    assert!(analysis
        .tree
        .path_index()
        .get(&root.join("vendor/dep.js"))
        .is_none());
    assert_eq!(analysis.resolution.unresolved, 1);
}

#[test]
fn missing_header_does_not_resolve_to_its_implementation() {
    let (_dir, root) = project();
    write(&root, "widget.cpp", "#include \"config.h\"\n#include \"util.h\"\n");
    write(&root, "config.cpp", "int config;\n");
    write(&root, "util.h", "int util;\n");

    let analysis = analyze(&root);

    assert_eq!(
        deps_of(&analysis, &root, "widget.cpp"),
        vec![root.join("util.h")]
    );
    assert_eq!(analysis.resolution.unresolved, 1);
}

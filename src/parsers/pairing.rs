//! Header/implementation pairing for C-family sources.
//!
//! `widget.h` and `widget.cpp` in one directory describe one logical module.
//! Grouping keeps enumeration order: a group sits where its first file was
//! seen, and its primary path is the header when there is one.

use indexmap::{IndexMap, IndexSet};
use std::path::{Path, PathBuf};

use crate::core::resolver::normalize_path;

pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];

const GENERATED_SUFFIX: &str = ".generated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub primary: PathBuf,
    pub companions: Vec<PathBuf>,
}

impl FileGroup {
    fn single(path: PathBuf) -> Self {
        Self {
            primary: path,
            companions: Vec::new(),
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.primary).chain(self.companions.iter())
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_header(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_pairable(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| {
        HEADER_EXTENSIONS.contains(&ext.as_str()) || SOURCE_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Group pairable files by directory and stem. Other files pass through as
/// single-file groups.
pub fn group_pairs(paths: Vec<PathBuf>) -> Vec<FileGroup> {
    let mut groups: IndexMap<(PathBuf, String), Vec<PathBuf>> = IndexMap::new();
    let mut order: Vec<Slot> = Vec::with_capacity(paths.len());

    for path in paths {
        let key = match (is_pairable(&path), path.parent(), path.file_stem()) {
            (true, Some(dir), Some(stem)) => {
                Some((dir.to_path_buf(), stem.to_string_lossy().into_owned()))
            }
            _ => None,
        };
        match key {
            Some(key) => {
                if !groups.contains_key(&key) {
                    order.push(Slot::Group(groups.len()));
                }
                groups.entry(key).or_default().push(path);
            }
            None => order.push(Slot::Single(path)),
        }
    }

    let mut members: Vec<Option<Vec<PathBuf>>> =
        groups.into_values().map(Some).collect();

    order
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Single(path) => Some(FileGroup::single(path)),
            Slot::Group(index) => members[index].take().map(into_group),
        })
        .collect()
}

enum Slot {
    Single(PathBuf),
    Group(usize),
}

fn into_group(mut files: Vec<PathBuf>) -> FileGroup {
    let primary_index = files.iter().position(|path| is_header(path)).unwrap_or(0);
    let primary = files.remove(primary_index);
    FileGroup {
        primary,
        companions: files,
    }
}

/// Whether an include target names a generated file (`foo.generated` or
/// `foo.generated.h`).
pub fn is_generated_target(target: &str) -> bool {
    if target.ends_with(GENERATED_SUFFIX) {
        return true;
    }
    Path::new(target)
        .file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(GENERATED_SUFFIX))
}

/// Union of the import lists of one group, first-seen order, without
/// generated-file targets and without targets pointing back into the group.
pub fn merge_imports(group: &FileGroup, import_lists: Vec<Vec<String>>) -> Vec<String> {
    let own_paths: Vec<&PathBuf> = group.paths().collect();
    let mut merged = IndexSet::new();

    for (path, imports) in group.paths().zip(import_lists) {
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        for target in imports {
            if is_generated_target(&target) {
                continue;
            }
            let resolved = normalize_path(&dir.join(&target));
            if own_paths.iter().any(|own| **own == resolved) {
                continue;
            }
            merged.insert(target);
        }
    }

    merged.into_iter().collect()
}

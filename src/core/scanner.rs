use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::config::ValidatedConfig;
use super::error::{AnalysisError, Result};
use super::graph::{EntityId, StructureTree};
use crate::parsers::pairing::{self, FileGroup};
use crate::parsers::ExtractorRegistry;

/// A recognised source file waiting for import extraction.
#[derive(Debug, Clone)]
struct PendingModule {
    parent: EntityId,
    group: FileGroup,
}

/// Builds the package/module tree for one analysis root.
pub struct TreeBuilder<'a> {
    config: &'a ValidatedConfig,
    registry: &'a ExtractorRegistry,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(config: &'a ValidatedConfig, registry: &'a ExtractorRegistry) -> Self {
        Self { config, registry }
    }

    /// Walk the root, build packages for directories and modules for
    /// recognised files, and attach each module's raw imports.
    ///
    /// Children keep filesystem enumeration order. Import extraction runs in
    /// parallel but results are attached in that same order.
    pub fn build(&self) -> Result<StructureTree> {
        let root_path = self.config.root();
        let mut tree = StructureTree::new(root_path, self.config.qualified_name(root_path));
        let mut packages: HashMap<PathBuf, EntityId> = HashMap::new();
        packages.insert(root_path.to_path_buf(), tree.root());

        let mut files: Vec<(EntityId, PathBuf)> = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && self.config.is_excluded(&self.config.qualified_name(entry.path())))
            });

        for entry in walker {
            let entry = entry.map_err(|source| AnalysisError::Walk { source })?;
            let path = entry.path();
            let Some(parent) = path.parent().and_then(|dir| packages.get(dir).copied()) else {
                continue;
            };

            if entry.file_type().is_dir() {
                let package =
                    tree.add_package(parent, path, self.config.qualified_name(path));
                packages.insert(path.to_path_buf(), package);
            } else if entry.file_type().is_file()
                && self.registry.for_path(path).is_some()
                && !self.config.is_excluded(&self.config.qualified_name(path))
            {
                files.push((parent, path.to_path_buf()));
            }
        }

        let pending = self.group_files(files);
        debug!(
            packages = packages.len(),
            modules = pending.len(),
            "walked analysis root"
        );

        let imports = pending
            .par_iter()
            .map(|module| self.extract_group(&module.group))
            .collect::<Result<Vec<_>>>()?;

        for (module, raw_imports) in pending.into_iter().zip(imports) {
            let FileGroup {
                primary,
                companions,
            } = module.group;
            let qualified_name = self.config.qualified_name(&primary);
            tree.add_module(module.parent, primary, qualified_name, raw_imports, companions)?;
        }

        info!(
            root = %root_path.display(),
            packages = packages.len(),
            modules = tree.path_index().len(),
            "built structure tree"
        );
        Ok(tree)
    }

    fn group_files(&self, files: Vec<(EntityId, PathBuf)>) -> Vec<PendingModule> {
        if !self.config.pair_normalization() {
            return files
                .into_iter()
                .map(|(parent, path)| PendingModule {
                    parent,
                    group: FileGroup {
                        primary: path,
                        companions: Vec::new(),
                    },
                })
                .collect();
        }

        let parents: HashMap<PathBuf, EntityId> = files
            .iter()
            .map(|(parent, path)| (path.clone(), *parent))
            .collect();
        pairing::group_pairs(files.into_iter().map(|(_, path)| path).collect())
            .into_iter()
            .filter_map(|group| {
                let parent = *parents.get(&group.primary)?;
                Some(PendingModule { parent, group })
            })
            .collect()
    }

    fn extract_group(&self, group: &FileGroup) -> Result<Vec<String>> {
        let lists = group
            .paths()
            .map(|path| self.extract_file(path))
            .collect::<Result<Vec<_>>>()?;

        if self.config.pair_normalization() && pairing::is_pairable(&group.primary) {
            Ok(pairing::merge_imports(group, lists))
        } else {
            Ok(lists.into_iter().flatten().collect())
        }
    }

    fn extract_file(&self, path: &Path) -> Result<Vec<String>> {
        match self.registry.for_path(path) {
            Some(extractor) => extractor.extract_imports(path),
            None => Ok(Vec::new()),
        }
    }
}

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::graph::{EntityId, StructureTree};
use crate::parsers::ExtractorRegistry;

/// Outcome counts of one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Turns raw import targets into module-to-module dependencies.
///
/// A raw target is read relative to the importing module's directory and
/// normalized lexically before the path-index lookup. Targets that do not
/// land on an indexed module (third-party packages, system headers, assets)
/// are dropped.
pub struct DependencyResolver<'a> {
    registry: &'a ExtractorRegistry,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a ExtractorRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, tree: &mut StructureTree) -> ResolutionStats {
        let mut stats = ResolutionStats::default();

        for module in tree.modules() {
            let entity = tree.entity(module);
            let dir = entity
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let targets: Vec<Option<EntityId>> = entity
                .raw_imports()
                .iter()
                .map(|raw| self.lookup(tree, &entity.path, &dir, raw))
                .collect();

            for target in targets {
                match target {
                    Some(target) if target != module => {
                        tree.add_dependency(module, target);
                        stats.resolved += 1;
                    }
                    Some(_) => {}
                    None => stats.unresolved += 1,
                }
            }
        }

        info!(
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            "resolved module imports"
        );
        stats
    }

    fn lookup(
        &self,
        tree: &StructureTree,
        importer: &Path,
        dir: &Path,
        raw: &str,
    ) -> Option<EntityId> {
        let candidate = normalize_path(&dir.join(raw));
        let index = tree.path_index();
        if let Some(found) = index.get(&candidate) {
            return Some(found);
        }

        let extractor = self.registry.for_path(importer)?;
        let canonical = extractor.canonical_extension();
        let written_extension = candidate.extension().and_then(|ext| ext.to_str());
        if !extractor.appends_extension() || written_extension != Some(canonical) {
            debug!(import = raw, importer = %importer.display(), "unresolved import");
            return None;
        }

        // The canonical extension was appended by the extractor: try the
        // sibling extensions of the same language, then a directory index.
        let extensions = self.registry.extensions_for(extractor.language_name());
        let stem = candidate.with_extension("");
        let found = extensions
            .iter()
            .map(|ext| stem.with_extension(ext))
            .chain(extensions.iter().map(|ext| stem.join(format!("index.{ext}"))))
            .find_map(|probe| index.get(&probe));
        if found.is_none() {
            debug!(import = raw, importer = %importer.display(), "unresolved import");
        }
        found
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

use indexmap::IndexSet;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{AnalysisError, Result};

/// Stable handle of an entity inside a [`StructureTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Module,
    Package,
}

/// Ordered group of siblings sharing one layering depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    entities: Vec<EntityId>,
}

impl Row {
    pub fn new(entities: Vec<EntityId>) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct PackageData {
    packages: Vec<EntityId>,
    modules: Vec<EntityId>,
    rows: Vec<Row>,
}

#[derive(Debug, Clone, Default)]
struct ModuleData {
    raw_imports: Vec<String>,
    alias_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
enum Payload {
    Module(ModuleData),
    Package(PackageData),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub path: PathBuf,
    pub qualified_name: String,
    pub simple_name: String,
    parent: Option<EntityId>,
    dependencies: IndexSet<EntityId>,
    payload: Payload,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self.payload {
            Payload::Module(_) => EntityKind::Module,
            Payload::Package(_) => EntityKind::Package,
        }
    }

    pub fn is_package(&self) -> bool {
        matches!(self.payload, Payload::Package(_))
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn dependencies(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.dependencies.iter().copied()
    }

    /// Raw import targets as extracted from source. Empty for packages.
    pub fn raw_imports(&self) -> &[String] {
        match &self.payload {
            Payload::Module(module) => &module.raw_imports,
            Payload::Package(_) => &[],
        }
    }

    /// Additional files folded into this module (the other half of a
    /// header/implementation pair).
    pub fn alias_paths(&self) -> &[PathBuf] {
        match &self.payload {
            Payload::Module(module) => &module.alias_paths,
            Payload::Package(_) => &[],
        }
    }
}

/// Absolute file path to module lookup, filled while the tree is built.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    modules: HashMap<PathBuf, EntityId>,
}

impl PathIndex {
    pub fn insert(&mut self, path: PathBuf, id: EntityId) -> Result<()> {
        if self.modules.contains_key(&path) {
            return Err(AnalysisError::DuplicateModulePath { path });
        }
        self.modules.insert(path, id);
        Ok(())
    }

    pub fn get(&self, path: &Path) -> Option<EntityId> {
        self.modules.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Package/module hierarchy owned top-down through an arena. Parent links
/// are plain handles used for navigation only.
#[derive(Debug, Clone)]
pub struct StructureTree {
    entities: Vec<Entity>,
    root: EntityId,
    path_index: PathIndex,
}

impl StructureTree {
    pub fn new(root_path: impl Into<PathBuf>, qualified_name: impl Into<String>) -> Self {
        let path = root_path.into();
        let root = Entity {
            simple_name: simple_name_of(&path),
            path,
            qualified_name: qualified_name.into(),
            parent: None,
            dependencies: IndexSet::new(),
            payload: Payload::Package(PackageData::default()),
        };
        Self {
            entities: vec![root],
            root: EntityId(0),
            path_index: PathIndex::default(),
        }
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        (0..self.entities.len()).map(EntityId)
    }

    pub fn path_index(&self) -> &PathIndex {
        &self.path_index
    }

    pub fn add_package(
        &mut self,
        parent: EntityId,
        path: impl Into<PathBuf>,
        qualified_name: impl Into<String>,
    ) -> EntityId {
        let path = path.into();
        let id = self.push(Entity {
            simple_name: simple_name_of(&path),
            path,
            qualified_name: qualified_name.into(),
            parent: Some(parent),
            dependencies: IndexSet::new(),
            payload: Payload::Package(PackageData::default()),
        });
        if let Payload::Package(data) = &mut self.entities[parent.0].payload {
            data.packages.push(id);
        }
        id
    }

    /// Add a module and index it (and its alias paths) for resolution.
    pub fn add_module(
        &mut self,
        parent: EntityId,
        path: impl Into<PathBuf>,
        qualified_name: impl Into<String>,
        raw_imports: Vec<String>,
        alias_paths: Vec<PathBuf>,
    ) -> Result<EntityId> {
        let path = path.into();
        let id = EntityId(self.entities.len());
        self.path_index.insert(path.clone(), id)?;
        for alias in &alias_paths {
            self.path_index.insert(alias.clone(), id)?;
        }
        self.push(Entity {
            simple_name: simple_name_of(&path),
            path,
            qualified_name: qualified_name.into(),
            parent: Some(parent),
            dependencies: IndexSet::new(),
            payload: Payload::Module(ModuleData {
                raw_imports,
                alias_paths,
            }),
        });
        if let Payload::Package(data) = &mut self.entities[parent.0].payload {
            data.modules.push(id);
        }
        Ok(id)
    }

    fn push(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Record `from -> to`. Returns false when the edge already existed.
    pub fn add_dependency(&mut self, from: EntityId, to: EntityId) -> bool {
        self.entities[from.0].dependencies.insert(to)
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities[id.0].parent
    }

    pub fn child_packages(&self, id: EntityId) -> &[EntityId] {
        match &self.entities[id.0].payload {
            Payload::Package(data) => &data.packages,
            Payload::Module(_) => &[],
        }
    }

    pub fn child_modules(&self, id: EntityId) -> &[EntityId] {
        match &self.entities[id.0].payload {
            Payload::Package(data) => &data.modules,
            Payload::Module(_) => &[],
        }
    }

    /// Direct children in placement order: packages first, then modules.
    pub fn children(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.child_packages(id)
            .iter()
            .chain(self.child_modules(id))
            .copied()
    }

    pub fn rows(&self, id: EntityId) -> &[Row] {
        match &self.entities[id.0].payload {
            Payload::Package(data) => &data.rows,
            Payload::Module(_) => &[],
        }
    }

    pub(crate) fn set_rows(&mut self, id: EntityId, rows: Vec<Row>) {
        if let Payload::Package(data) = &mut self.entities[id.0].payload {
            data.rows = rows;
        }
    }

    /// Row index of `id` within its parent's layering.
    pub fn row_of(&self, id: EntityId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.rows(parent).iter().position(|row| row.contains(id))
    }

    /// Packages in post-order: every package appears after all of its
    /// descendants.
    pub fn packages_post_order(&self) -> Vec<EntityId> {
        let mut order = Vec::new();
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.child_packages(id).iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// All modules below `id`, depth first in tree order.
    pub fn modules_under(&self, id: EntityId) -> Vec<EntityId> {
        let mut modules = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let entity = self.entity(current);
            if !entity.is_package() {
                modules.push(current);
                continue;
            }
            let children: Vec<_> = self.children(current).collect();
            stack.extend(children.into_iter().rev());
        }
        modules
    }

    pub fn modules(&self) -> Vec<EntityId> {
        self.modules_under(self.root)
    }

    /// Walk up from `id` to the child of `package` that contains it.
    /// `None` when `id` is not inside `package`.
    pub fn child_of(&self, package: EntityId, id: EntityId) -> Option<EntityId> {
        let mut current = id;
        loop {
            let parent = self.parent(current)?;
            if parent == package {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Nearest package containing both `a` and `b`.
    pub fn common_package(&self, a: EntityId, b: EntityId) -> Option<EntityId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(a);
        while let Some(id) = current {
            ancestors.push(id);
            current = self.parent(id);
        }
        let mut current = self.parent(b);
        while let Some(id) = current {
            if ancestors.contains(&id) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    pub fn find_by_name(&self, qualified_name: &str) -> Option<EntityId> {
        self.ids()
            .find(|&id| self.entity(id).qualified_name == qualified_name)
    }

    /// Every module-level dependency edge in tree order.
    pub fn dependency_pairs(&self) -> Vec<(EntityId, EntityId)> {
        self.modules()
            .into_iter()
            .flat_map(|from| {
                self.entity(from)
                    .dependencies()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    /// Whether `from -> to` flows against the layering: lifted to the
    /// children of their common package, the source row sits at or below
    /// the target row.
    pub fn is_feedback(&self, from: EntityId, to: EntityId) -> bool {
        let Some(package) = self.common_package(from, to) else {
            return false;
        };
        let (Some(source), Some(target)) =
            (self.child_of(package, from), self.child_of(package, to))
        else {
            return false;
        };
        match (self.row_of(source), self.row_of(target)) {
            (Some(source_row), Some(target_row)) => source_row >= target_row,
            _ => false,
        }
    }

    pub fn feedback_pairs(&self) -> Vec<(EntityId, EntityId)> {
        self.dependency_pairs()
            .into_iter()
            .filter(|&(from, to)| self.is_feedback(from, to))
            .collect()
    }
}

fn simple_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

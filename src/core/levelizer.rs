//! Row assignment for the children of every package.
//!
//! Rows are ordered top (index 0) to bottom. An entity is placed below the
//! entities that depend on it and above the ones it depends on; when a cycle
//! makes that impossible, the placement still happens and the offending edge
//! later reports as feedback.

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

use super::error::{AnalysisError, Result};
use super::graph::{EntityId, Row, StructureTree};

/// Dependencies between the direct children of one package.
///
/// A module edge `m -> d` becomes an edge between the children of the
/// package that contain `m` and `d`. Edges leaving the package, and edges
/// whose endpoints fall into the same child, are not recorded.
#[derive(Debug, Clone)]
pub struct EdgeIndex {
    graph: DiGraphMap<EntityId, ()>,
}

impl EdgeIndex {
    pub fn build(tree: &StructureTree, package: EntityId) -> Self {
        let mut graph = DiGraphMap::new();
        for child in tree.children(package) {
            graph.add_node(child);
        }

        for module in tree.modules_under(package) {
            let Some(source) = tree.child_of(package, module) else {
                continue;
            };
            for dependency in tree.entity(module).dependencies() {
                match tree.child_of(package, dependency) {
                    Some(target) if target != source => {
                        graph.add_edge(source, target, ());
                    }
                    _ => {}
                }
            }
        }

        Self { graph }
    }

    pub fn depends(&self, from: EntityId, to: EntityId) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn related(&self, a: EntityId, b: EntityId) -> bool {
        self.depends(a, b) || self.depends(b, a)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.graph.all_edges().map(|(from, to, _)| (from, to))
    }

    /// Whether a dependency path leads from `from` to `to`.
    pub fn reaches(&self, from: EntityId, to: EntityId) -> bool {
        has_path_connecting(&self.graph, from, to, None)
    }

    fn dependents(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.graph.neighbors_directed(id, Direction::Incoming)
    }

    /// Strongly connected groups of children, dependents before their
    /// dependencies.
    fn components(&self) -> Vec<Vec<EntityId>> {
        let mut components = tarjan_scc(&self.graph);
        components.reverse();
        components
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Settled,
    NewTopRow,
}

/// Working row sequence of the package being levelized.
struct RowLayout<'a> {
    index: &'a EdgeIndex,
    rows: Vec<Vec<EntityId>>,
}

impl<'a> RowLayout<'a> {
    fn new(index: &'a EdgeIndex) -> Self {
        Self {
            index,
            rows: Vec::new(),
        }
    }

    /// `(to, from)` for `entity` against row `row`: how many row members
    /// depend on the entity, and how many it depends on.
    fn counts(&self, row: usize, entity: EntityId) -> (usize, usize) {
        let members = &self.rows[row];
        let to = members
            .iter()
            .filter(|&&member| self.index.depends(member, entity))
            .count();
        let from = members
            .iter()
            .filter(|&&member| self.index.depends(entity, member))
            .count();
        (to, from)
    }

    fn unrelated_row(&self, row: usize, entity: EntityId) -> bool {
        self.rows[row]
            .iter()
            .all(|&member| !self.index.related(member, entity))
    }

    /// Scan from the bottom row upward and put `entity` in the first row
    /// that decides its position.
    fn place(&mut self, entity: EntityId) -> Placement {
        for row in (0..self.rows.len()).rev() {
            let (to, from) = self.counts(row, entity);

            if to == 0 {
                if from == 0 && row == 0 {
                    self.rows[0].push(entity);
                    return Placement::Settled;
                }
                continue;
            }

            if to > from {
                let below = row + 1;
                if below < self.rows.len() && self.unrelated_row(below, entity) {
                    self.rows[below].push(entity);
                } else {
                    self.rows.insert(below, vec![entity]);
                }
                return Placement::Settled;
            }
        }

        self.rows.insert(0, vec![entity]);
        Placement::NewTopRow
    }

    fn remove(&mut self, entity: EntityId) {
        if let Some(row) = self.rows.iter().position(|row| row.contains(&entity)) {
            self.rows[row].retain(|&member| member != entity);
            if self.rows[row].is_empty() {
                self.rows.remove(row);
            }
        }
    }

    fn row_index(&self, entity: EntityId) -> Option<usize> {
        self.rows.iter().position(|row| row.contains(&entity))
    }

    fn entities_below_top(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.rows.iter().skip(1).flatten().copied()
    }

    /// Place `entity`; a new top row re-places everything underneath it.
    ///
    /// Each entity is re-placed at most once per insertion, so the pass ends
    /// even when cycles keep pushing entities to the top.
    fn insert(&mut self, entity: EntityId) {
        if self.place(entity) == Placement::Settled {
            return;
        }

        let mut settled: HashSet<EntityId> = HashSet::from([entity]);
        let mut queue: VecDeque<EntityId> = self.entities_below_top().collect();

        while let Some(next) = queue.pop_front() {
            if !settled.insert(next) {
                continue;
            }
            self.remove(next);
            if self.place(next) == Placement::NewTopRow {
                let unsettled: Vec<EntityId> = self
                    .entities_below_top()
                    .filter(|candidate| !settled.contains(candidate) && !queue.contains(candidate))
                    .collect();
                queue.extend(unsettled);
            }
        }
    }

    /// Move every entity below all of its dependents outside its own cycle.
    ///
    /// Components are visited dependents first, so once an entity is moved
    /// no later move lifts it back to or above a dependent: a move only
    /// relocates the moved entity, and row insertions and removals keep the
    /// order of everything else.
    fn sink_below_dependents(&mut self) {
        let components = self.index.components();
        let component_of: HashMap<EntityId, usize> = components
            .iter()
            .enumerate()
            .flat_map(|(number, members)| members.iter().map(move |&member| (member, number)))
            .collect();

        for (number, members) in components.iter().enumerate() {
            for &entity in members {
                let outside: Vec<EntityId> = self
                    .index
                    .dependents(entity)
                    .filter(|dependent| component_of.get(dependent) != Some(&number))
                    .collect();
                let lowest_dependent = |layout: &Self| {
                    outside
                        .iter()
                        .filter_map(|&dependent| layout.row_index(dependent))
                        .max()
                };

                let (Some(floor), Some(current)) =
                    (lowest_dependent(&*self), self.row_index(entity))
                else {
                    continue;
                };
                if current > floor {
                    continue;
                }

                self.remove(entity);
                let below = lowest_dependent(&*self).map_or(0, |floor| floor + 1);
                if below < self.rows.len() && self.unrelated_row(below, entity) {
                    self.rows[below].push(entity);
                } else {
                    self.rows.insert(below, vec![entity]);
                }
                debug!(entity = %entity, row = below, "moved below its dependents");
            }
        }
    }

    /// Hoist entities into the row above when nothing there is related to
    /// them, then drop the rows this empties.
    fn finalize(mut self, package: &str) -> Result<Vec<Vec<EntityId>>> {
        if let Some(empty) = self.rows.iter().position(Vec::is_empty) {
            return Err(AnalysisError::internal(
                package,
                format!("row {empty} is empty before finalization"),
            ));
        }

        for row in (1..self.rows.len()).rev() {
            let candidates = self.rows[row].clone();
            for entity in candidates {
                if self.unrelated_row(row - 1, entity) {
                    self.rows[row].retain(|&member| member != entity);
                    self.rows[row - 1].push(entity);
                }
            }
        }

        self.rows.retain(|row| !row.is_empty());
        Ok(self.rows)
    }
}

/// Summary of one levelization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelizationStats {
    pub packages: usize,
    pub rows: usize,
}

/// Assigns rows to the children of every package, bottom-up.
#[derive(Debug, Default)]
pub struct Levelizer;

impl Levelizer {
    pub fn new() -> Self {
        Self
    }

    pub fn levelize(&self, tree: &mut StructureTree) -> Result<LevelizationStats> {
        let mut stats = LevelizationStats::default();

        for package in tree.packages_post_order() {
            let rows = self.levelize_package(tree, package)?;
            stats.packages += 1;
            stats.rows += rows.len();
            debug!(
                package = %tree.entity(package).qualified_name,
                rows = rows.len(),
                "levelized package"
            );
            tree.set_rows(package, rows);
        }

        info!(packages = stats.packages, rows = stats.rows, "levelization complete");
        Ok(stats)
    }

    /// Rows for the direct children of `package`. Child packages are placed
    /// before child modules, each in tree order.
    pub fn levelize_package(&self, tree: &StructureTree, package: EntityId) -> Result<Vec<Row>> {
        let name = tree.entity(package).qualified_name.clone();
        let index = EdgeIndex::build(tree, package);
        let mut layout = RowLayout::new(&index);

        let children: Vec<EntityId> = tree.children(package).collect();
        for &child in &children {
            layout.insert(child);
        }
        layout.sink_below_dependents();

        let rows = layout.finalize(&name)?;
        check_partition(&name, &index, &children, &rows)?;
        Ok(rows.into_iter().map(Row::new).collect())
    }
}

/// Every child in exactly one row, and no edge inside a row.
fn check_partition(
    package: &str,
    index: &EdgeIndex,
    children: &[EntityId],
    rows: &[Vec<EntityId>],
) -> Result<()> {
    let placed: usize = rows.iter().map(Vec::len).sum();
    let mut seen = HashSet::with_capacity(placed);
    let covers_once = rows.iter().flatten().all(|entity| seen.insert(*entity))
        && placed == children.len()
        && children.iter().all(|child| seen.contains(child));
    if !covers_once {
        return Err(AnalysisError::internal(
            package,
            format!("{placed} placements do not partition {} children", children.len()),
        ));
    }

    for (number, row) in rows.iter().enumerate() {
        for (position, &a) in row.iter().enumerate() {
            if let Some(&b) = row[position + 1..].iter().find(|&&b| index.related(a, b)) {
                return Err(AnalysisError::internal(
                    package,
                    format!("row {number} holds dependent entities {a} and {b}"),
                ));
            }
        }
    }

    Ok(())
}

use serde::Serialize;

use crate::core::{Analysis, EntityId, StructureTree};

/// One node of the layered view: a module, or a package with its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "isGroup")]
    pub is_group: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Vec<ViewNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyPair {
    pub from: String,
    pub to: String,
}

/// What the external viewer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub root: ViewNode,
    pub dependencies: Vec<DependencyPair>,
    pub feedback: Vec<DependencyPair>,
}

impl ViewModel {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let tree = &analysis.tree;
        Self {
            root: view_node(tree, tree.root()),
            dependencies: pairs(tree, analysis.dependencies()),
            feedback: pairs(tree, analysis.feedback()),
        }
    }
}

fn view_node(tree: &StructureTree, id: EntityId) -> ViewNode {
    let entity = tree.entity(id);
    ViewNode {
        id: entity.qualified_name.clone(),
        name: entity.simple_name.clone(),
        is_group: entity.is_package(),
        rows: tree
            .rows(id)
            .iter()
            .map(|row| {
                row.entities()
                    .iter()
                    .map(|&child| view_node(tree, child))
                    .collect()
            })
            .collect(),
    }
}

fn pairs(tree: &StructureTree, edges: &[(EntityId, EntityId)]) -> Vec<DependencyPair> {
    edges
        .iter()
        .map(|&(from, to)| DependencyPair {
            from: tree.entity(from).qualified_name.clone(),
            to: tree.entity(to).qualified_name.clone(),
        })
        .collect()
}

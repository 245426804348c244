use tracing::info;

use super::config::AnalysisConfig;
use super::error::Result;
use super::graph::{EntityId, StructureTree};
use super::levelizer::{LevelizationStats, Levelizer};
use super::resolver::{DependencyResolver, ResolutionStats};
use super::scanner::TreeBuilder;
use crate::parsers::ExtractorRegistry;

/// Result of one analysis run: the levelized tree plus its edge lists.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub tree: StructureTree,
    pub resolution: ResolutionStats,
    pub levelization: LevelizationStats,
    dependencies: Vec<(EntityId, EntityId)>,
    feedback: Vec<(EntityId, EntityId)>,
}

impl Analysis {
    /// Every module-level dependency, in tree order.
    pub fn dependencies(&self) -> &[(EntityId, EntityId)] {
        &self.dependencies
    }

    /// Dependencies that run against the layering.
    pub fn feedback(&self) -> &[(EntityId, EntityId)] {
        &self.feedback
    }

    pub fn is_feedback(&self, from: EntityId, to: EntityId) -> bool {
        self.feedback.contains(&(from, to))
    }
}

/// Batch pipeline: build tree, resolve imports, levelize.
///
/// Every call to [`analyze`](Self::analyze) starts from nothing; no state is
/// shared between runs.
pub struct StructureAnalyzer {
    registry: ExtractorRegistry,
    levelizer: Levelizer,
}

impl StructureAnalyzer {
    /// Analyzer with the built-in language capabilities.
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(ExtractorRegistry::with_builtins()?))
    }

    pub fn with_registry(registry: ExtractorRegistry) -> Self {
        Self {
            registry,
            levelizer: Levelizer::new(),
        }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn analyze(&self, config: &AnalysisConfig) -> Result<Analysis> {
        let validated = config.validate()?;

        info!(root = %validated.root().display(), "building structure tree");
        let mut tree = TreeBuilder::new(&validated, &self.registry).build()?;

        let resolution = DependencyResolver::new(&self.registry).resolve(&mut tree);
        let levelization = self.levelizer.levelize(&mut tree)?;

        let dependencies = tree.dependency_pairs();
        let feedback: Vec<_> = dependencies
            .iter()
            .copied()
            .filter(|&(from, to)| tree.is_feedback(from, to))
            .collect();

        info!(
            dependencies = dependencies.len(),
            feedback = feedback.len(),
            "analysis complete"
        );

        Ok(Analysis {
            tree,
            resolution,
            levelization,
            dependencies,
            feedback,
        })
    }
}

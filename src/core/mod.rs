pub mod analyzer;
pub mod config;
pub mod error;
pub mod graph;
pub mod levelizer;
pub mod resolver;
pub mod scanner;

pub use analyzer::{Analysis, StructureAnalyzer};
pub use config::{AnalysisConfig, ValidatedConfig};
pub use error::{AnalysisError, ErrorKind, Result};
pub use graph::{Entity, EntityId, EntityKind, PathIndex, Row, StructureTree};
pub use levelizer::{EdgeIndex, LevelizationStats, Levelizer};
pub use resolver::{DependencyResolver, ResolutionStats};
pub use scanner::TreeBuilder;

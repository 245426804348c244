use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{AnalysisError, Result};

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub root: PathBuf,
    /// Regular expressions matched against dot-joined qualified names.
    pub exclude_patterns: Vec<String>,
    /// Merge header/implementation file pairs into one logical module.
    pub pair_normalization: bool,
}

impl AnalysisConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_patterns: Vec::new(),
            pair_normalization: false,
        }
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_pair_normalization(mut self, enabled: bool) -> Self {
        self.pair_normalization = enabled;
        self
    }

    /// Check the root and compile the exclude patterns. Runs before any
    /// traversal so a bad configuration never yields a partial tree.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let metadata = match fs::metadata(&self.root) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalysisError::RootNotFound {
                    path: self.root.clone(),
                })
            }
            Err(err) => return Err(AnalysisError::io(&self.root, err)),
        };
        if !metadata.is_dir() {
            return Err(AnalysisError::RootNotDirectory {
                path: self.root.clone(),
            });
        }

        let root = fs::canonicalize(&self.root).map_err(|err| AnalysisError::io(&self.root, err))?;

        let excludes = self
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| AnalysisError::InvalidExcludePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidatedConfig {
            root,
            excludes,
            pair_normalization: self.pair_normalization,
        })
    }
}

/// Configuration whose root is known to be an existing, absolute directory.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    root: PathBuf,
    excludes: Vec<Regex>,
    pair_normalization: bool,
}

impl ValidatedConfig {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pair_normalization(&self) -> bool {
        self.pair_normalization
    }

    pub fn is_excluded(&self, qualified_name: &str) -> bool {
        self.excludes
            .iter()
            .any(|pattern| pattern.is_match(qualified_name))
    }

    /// Dot-joined, lower-cased name of `path` relative to the root's parent.
    pub fn qualified_name(&self, path: &Path) -> String {
        let base = self.root.parent().unwrap_or(&self.root);
        let relative = path.strip_prefix(base).unwrap_or(path);
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().to_lowercase())
            .collect::<Vec<_>>()
            .join(".")
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of an [`AnalysisError`].
///
/// `Configuration` and `Io` mean the input was bad; `Internal` means the
/// engine itself broke one of its invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Io,
    Internal,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis root {path} does not exist")]
    RootNotFound { path: PathBuf },

    #[error("analysis root {path} is not a directory")]
    RootNotDirectory { path: PathBuf },

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory tree: {source}")]
    Walk {
        #[source]
        source: walkdir::Error,
    },

    #[error("module path {path} was indexed twice")]
    DuplicateModulePath { path: PathBuf },

    #[error("failed to load {language} grammar: {message}")]
    LanguageSetup { language: String, message: String },

    #[error("levelization of `{package}` failed: {message}")]
    Internal { package: String, message: String },
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn internal(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            package: package.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RootNotFound { .. }
            | Self::RootNotDirectory { .. }
            | Self::InvalidExcludePattern { .. } => ErrorKind::Configuration,
            Self::Io { .. } | Self::Walk { .. } => ErrorKind::Io,
            Self::DuplicateModulePath { .. }
            | Self::LanguageSetup { .. }
            | Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

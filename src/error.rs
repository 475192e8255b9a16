use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building manifests, extracting metadata
/// from a prior run, resolving a job configuration or rendering a script.
///
/// Every variant carries enough context (path, pattern, directory)
/// to be actionable from the command line.
#[derive(Debug, Error)]
pub enum MothulityError {
    #[error("ERROR: template not found at {path}: {source}")]
    TemplateNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("ERROR: no artifact matching '{pattern}' in {directory}")]
    ArtifactNotFound { pattern: String, directory: PathBuf },

    #[error("ERROR: could not derive a label from files matching '{pattern}' in {directory}")]
    UnresolvableLabel { pattern: String, directory: PathBuf },

    #[error("ERROR: malformed manifest {path} at line {line}: {reason}")]
    MalformedManifest {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("ERROR: unknown resource preset '{0}'")]
    UnknownPreset(String),

    #[error("ERROR: sample '{sample}' has {} files matching '{marker}': {}", files.len(), files.join(", "))]
    AmbiguousPairing {
        sample: String,
        marker: String,
        files: Vec<String>,
    },

    #[error("ERROR: no '{left}'/'{right}' read pairs with extension '{extension}' in {directory}")]
    EmptyManifest {
        directory: PathBuf,
        extension: String,
        left: String,
        right: String,
    },

    #[error("ERROR: continuation mode requires metadata extracted from a prior run")]
    MissingContinuationMetadata,

    #[error("ERROR: could not parse config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("ERROR: could not render template '{name}': {source}")]
    Render { name: String, source: tera::Error },

    #[error("ERROR: I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MothulityError {
    /// Process exit code for this error kind.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// use mothulity::error::MothulityError;
    ///
    /// let err = MothulityError::UnknownPreset("XXL".into());
    /// assert_eq!(err.exit_code(), 6);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            MothulityError::TemplateNotFound { .. } => 2,
            MothulityError::ArtifactNotFound { .. } => 3,
            MothulityError::UnresolvableLabel { .. } => 4,
            MothulityError::MalformedManifest { .. } => 5,
            MothulityError::UnknownPreset(_) => 6,
            MothulityError::AmbiguousPairing { .. } => 7,
            MothulityError::MissingContinuationMetadata => 8,
            MothulityError::ConfigFile { .. } => 9,
            MothulityError::Render { .. } => 10,
            MothulityError::Io { .. } => 11,
            MothulityError::EmptyManifest { .. } => 12,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MothulityError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MothulityError>;

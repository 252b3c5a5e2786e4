//! Pipeline error model.
//!
//! Data-quality rejections never surface here: they are audit records.
//! Every variant is an operational failure that aborts the run.

use std::fmt;
use std::path::PathBuf;

use medallion_store::StoreError;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Bronze,
    Silver,
    Gold,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A store could not be reached.
    #[error("cannot connect to {store}: {source}")]
    Connect {
        store: String,
        #[source]
        source: StoreError,
    },

    /// A store operation failed while running `stage`.
    #[error("{stage} stage failed: {context}: {source}")]
    Store {
        stage: Stage,
        context: String,
        #[source]
        source: StoreError,
    },

    /// A bronze input file could not be read.
    #[error("bronze stage failed: cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bronze input file is not valid CSV.
    #[error("bronze stage failed: malformed CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A bronze input file lacks a required column.
    #[error("bronze stage failed: {} is missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl PipelineError {
    pub(crate) fn store(stage: Stage, context: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            stage,
            context: context.into(),
            source,
        }
    }

    /// Stage the failure happened in, if it happened inside one.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Connect { .. } => None,
            Self::Store { stage, .. } => Some(*stage),
            Self::Io { .. } | Self::Csv { .. } | Self::MissingColumn { .. } => Some(Stage::Bronze),
        }
    }
}

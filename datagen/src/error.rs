use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::SinkKind;
use crate::model::Phase;

/// Sink work that happens outside the five generation phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening the output file or database
    Open,
    /// Dropping and creating tables
    Schema,
    /// Creating indexes after the bulk load
    Indexes,
    /// Committing or flushing the finished output
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Open => f.write_str("open"),
            Stage::Schema => f.write_str("schema"),
            Stage::Indexes => f.write_str("indexes"),
            Stage::Commit => f.write_str("commit"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GenError {
    #[error("I/O Error: {0}")]
    IoError(#[from] io::Error),
    #[error("Database Error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Cannot open {}: {source}", .path.display())]
    OpenError {
        path: PathBuf,
        #[source]
        source: Box<GenError>,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Generated amounts must be finite and non-negative")]
    InvalidAmount,
    #[error("Transactions need at least two accounts, the pool only has {pool}")]
    AccountPoolTooSmall { pool: usize },
    #[error("Could not draw a destination distinct from account {source_account} in {draws} draws")]
    DestinationDrawsExhausted { source_account: u64, draws: usize },
    #[error("{phase} phase failed on the {sink} sink: {source}")]
    Phase {
        phase: Phase,
        sink: SinkKind,
        #[source]
        source: Box<GenError>,
    },
    #[error("{stage} stage failed on the {sink} sink: {source}")]
    Sink {
        stage: Stage,
        sink: SinkKind,
        #[source]
        source: Box<GenError>,
    },
}

impl GenError {
    fn has_context(&self) -> bool {
        matches!(self, GenError::Phase { .. } | GenError::Sink { .. })
    }

    /// Attaches the failing phase and sink to an error, leaving already-wrapped errors alone
    #[must_use]
    pub fn in_phase(self, phase: Phase, sink: SinkKind) -> Self {
        if self.has_context() {
            return self;
        }
        GenError::Phase {
            phase,
            sink,
            source: Box::new(self),
        }
    }

    /// Same as [`GenError::in_phase`] for setup and finalization work
    #[must_use]
    pub fn at_stage(self, stage: Stage, sink: SinkKind) -> Self {
        if self.has_context() {
            return self;
        }
        GenError::Sink {
            stage,
            sink,
            source: Box::new(self),
        }
    }

    /// Names the file or database that could not be opened
    #[must_use]
    pub fn opening(self, path: impl Into<PathBuf>) -> Self {
        GenError::OpenError {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

//! Per-symbol failure taxonomy.

use dayroll_types::{OrderingViolation, SourceError, StoreError, VolumeOverflow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a symbol's ingestion stopped.
///
/// Failures are scoped to one symbol; other symbols in the same run are
/// unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Quotes could not be fetched. Nothing was committed.
    #[error("Quote source unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),

    /// The committed watermark could not be read. Nothing was committed.
    #[error("Watermark resolution failed: {0}")]
    WatermarkResolution(#[source] StoreError),

    /// Quotes arrived out of order. Days emitted before the violation stay
    /// committed.
    #[error("{source} ({committed} aggregates committed before the violation)")]
    OrderingViolation {
        /// The offending quote.
        source: OrderingViolation,
        /// Aggregates committed before the violation.
        committed: usize,
    },

    /// A day's volume did not fit the volume type. Days emitted before it
    /// stay committed.
    #[error("{source} ({committed} aggregates committed before the overflow)")]
    VolumeOverflow {
        /// The overflowing day.
        source: VolumeOverflow,
        /// Aggregates committed before the overflow.
        committed: usize,
    },

    /// An append failed. Earlier appends stay committed.
    #[error("Store write failed: {source} ({committed} aggregates committed before the failure)")]
    StoreWrite {
        /// The store's error.
        source: StoreError,
        /// Aggregates committed before the failure.
        committed: usize,
    },

    /// The symbol's task panicked.
    #[error("Symbol task panicked: {0}")]
    Panicked(String),
}

impl SymbolError {
    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::SourceUnavailable(_) => FailureKind::SourceUnavailable,
            Self::WatermarkResolution(_) => FailureKind::WatermarkResolution,
            Self::OrderingViolation { .. } => FailureKind::OrderingViolation,
            Self::VolumeOverflow { .. } => FailureKind::VolumeOverflow,
            Self::StoreWrite { .. } => FailureKind::StoreWrite,
            Self::Panicked(_) => FailureKind::Panicked,
        }
    }

    /// Returns how many aggregates were committed before the failure.
    #[must_use]
    pub const fn committed(&self) -> usize {
        match self {
            Self::OrderingViolation { committed, .. }
            | Self::VolumeOverflow { committed, .. }
            | Self::StoreWrite { committed, .. } => *committed,
            _ => 0,
        }
    }
}

/// Failure category, as recorded in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// See [`SymbolError::SourceUnavailable`].
    SourceUnavailable,
    /// See [`SymbolError::WatermarkResolution`].
    WatermarkResolution,
    /// See [`SymbolError::OrderingViolation`].
    OrderingViolation,
    /// See [`SymbolError::VolumeOverflow`].
    VolumeOverflow,
    /// See [`SymbolError::StoreWrite`].
    StoreWrite,
    /// See [`SymbolError::Panicked`].
    Panicked,
}

impl FailureKind {
    /// Returns the category as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::WatermarkResolution => "watermark_resolution",
            Self::OrderingViolation => "ordering_violation",
            Self::VolumeOverflow => "volume_overflow",
            Self::StoreWrite => "store_write",
            Self::Panicked => "panicked",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

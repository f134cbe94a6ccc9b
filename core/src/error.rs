// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

/// Failures raised while assembling a [`crate::config::Config`], before the
/// first tick runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown {what}: {name:?}")]
    UnknownPolicy { what: &'static str, name: String },

    #[error("view capacity `c` must be non-negative, got {0}")]
    NegativeCapacity(i64),

    #[error("decay probability `D` must lie in [0, 1], got {0}")]
    DecayOutOfRange(f64),

    #[error("partition at tick {tick} requests {requested} nodes but cluster 0 only ever holds {available}")]
    PartitionTooLarge {
        tick: u64,
        requested: usize,
        available: usize,
    },
}

/// A consistency check that must hold after every tick (§8 of the
/// specification). Raising one of these aborts the run rather than emit a
/// snapshot of a broken state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvariantError {
    #[error("node {node} view holds {len} records, exceeding capacity {c}")]
    ViewOverCapacity { node: u64, len: usize, c: usize },

    #[error("node {node} view holds a duplicate record for index {index}")]
    DuplicateRecord { node: u64, index: u64 },

    #[error("node {node} view contains a self-record")]
    SelfRecord { node: u64 },

    #[error("overlay out-edges of node {node} disagree with its view")]
    OverlayViewMismatch { node: u64 },
}

/// Top-level error type for the simulation core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Invariant(#[from] InvariantError),

    #[error("sink failure: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, Error>;

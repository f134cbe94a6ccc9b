// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The small, closed sum types configuring a [`crate::cluster::Cluster`].
//!
//! Dispatch on these is a tagged match, never dynamic inheritance (§9 of the
//! specification, "Polymorphism of policies").

use crate::error::ConfigError;

/// How a node picks `fanout` peers from its view each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Sample without replacement.
    Random,
    /// Deterministic: sort by hop descending, take the head.
    Tail,
}

impl Selection {
    pub fn from_str(name: &str) -> Result<Self, ConfigError> {
        match name {
            "rand" => Ok(Self::Random),
            "tail" => Ok(Self::Tail),
            other => Err(ConfigError::UnknownPolicy {
                what: "selection policy",
                name: other.to_owned(),
            }),
        }
    }
}

/// How a selected peer is contacted. The specification names only one
/// variant; the type stays open so a future push-only or pull-only mode
/// doesn't require reshaping `Cluster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    PushPull,
}

impl Propagation {
    pub fn from_str(name: &str) -> Result<Self, ConfigError> {
        match name {
            "pushpull" => Ok(Self::PushPull),
            other => Err(ConfigError::UnknownPolicy {
                what: "propagation policy",
                name: other.to_owned(),
            }),
        }
    }
}

/// How two views are reconciled on pull. The specification names only the
/// hop-ordered ("head") merge; kept as its own type for the same reason as
/// [`Propagation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Head,
}

impl Merge {
    pub fn from_str(name: &str) -> Result<Self, ConfigError> {
        match name {
            "head" => Ok(Self::Head),
            other => Err(ConfigError::UnknownPolicy {
                what: "merge policy",
                name: other.to_owned(),
            }),
        }
    }
}

/// Initial overlay shape (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Ring,
    SeededRandomRing,
}

impl Topology {
    pub fn from_str(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ring" => Ok(Self::Ring),
            "rand" => Ok(Self::SeededRandomRing),
            other => Err(ConfigError::UnknownPolicy {
                what: "topology",
                name: other.to_owned(),
            }),
        }
    }
}

/// How nodes are drawn out of a cluster when a partition event fires (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    /// Uniform sample without replacement.
    Rand,
    /// Lowest-indexed prefix.
    Lineal,
}

impl PartitionType {
    pub fn from_str(name: &str) -> Result<Self, ConfigError> {
        match name {
            "rand" => Ok(Self::Rand),
            "lineal" => Ok(Self::Lineal),
            other => Err(ConfigError::UnknownPolicy {
                what: "partition type",
                name: other.to_owned(),
            }),
        }
    }
}

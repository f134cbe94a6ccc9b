// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Discrete-event simulator for a gossip-based peer sampling protocol
//! (PEX): the per-node view, the push-pull exchange, topology
//! initialisation, the partition operator, and the tick-driven scheduler.
//!
//! The command-line surface, on-disk snapshot formats, and metrics
//! backends are external collaborators; this crate only depends on the
//! [`sink::Sink`] trait to emit its results.

pub mod arena;
pub mod cluster;
pub mod config;
pub mod error;
pub mod node;
pub mod overlay;
pub mod policy;
pub mod record;
pub mod scenario;
pub mod sink;
pub mod topology;

pub use {
    cluster::{Cluster, ClusterIdGen},
    config::{ClusterConfig, Config, PartitionEvent, RawConfig},
    error::{ConfigError, Error, InvariantError, Result},
    node::{ClusterId, Node},
    policy::{Merge, PartitionType, Propagation, Selection, Topology},
    record::Record,
    scenario::ScenarioRunner,
    sink::{InMemorySink, Sink, SinkError, Snapshot},
};

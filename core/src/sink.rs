// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The capability the core consumes to emit results (§6). Concrete file
//! and time-series sinks are external collaborators and live in the
//! `pex-sim` binary crate; this module only defines the interface and an
//! in-memory sink the core's own test suite asserts against.

use std::{collections::BTreeMap, fmt};

use crate::{config::Config, node::ClusterId};

/// One tick's worth of a single cluster's overlay, handed to a [`Sink`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub run_id: String,
    pub tick: u64,
    pub cluster_id: ClusterId,
    /// Node indices present in this cluster, ascending.
    pub node_ids: Vec<u64>,
    /// Directed edges `u -> v` with `u` in [`Snapshot::node_ids`], in the
    /// view order of each `u` (i.e. the order `node_attrs`/analytics should
    /// read records in).
    pub views: BTreeMap<u64, Vec<u64>>,
    /// `node_attrs[u] = cluster_id`, per §6 (only one attribute exists
    /// today, so this is a flat map rather than a map-of-maps).
    pub node_attrs: BTreeMap<u64, ClusterId>,
}

impl Snapshot {
    /// Edge list `(u, v)` in node-then-view order, the form a file sink
    /// naturally serialises.
    pub fn edges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.views
            .iter()
            .flat_map(|(&u, vs)| vs.iter().map(move |&v| (u, v)))
    }
}

/// A sink failure. `fatal` distinguishes "log and continue" from "abort the
/// repetition" (§5 "Cancellation and timeouts", §7).
#[derive(Debug, Clone)]
pub struct SinkError {
    pub message: String,
    pub fatal: bool,
}

impl SinkError {
    pub fn non_fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SinkError {}

/// Where per-tick snapshots and per-run configuration go. The simulator
/// only depends on this trait; serialisation format is entirely up to the
/// implementor (§1, §6).
pub trait Sink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<(), SinkError>;
    fn emit_info(&mut self, run_id: &str, config: &Config) -> Result<(), SinkError>;
}

/// Collects every snapshot and info record in memory. Used by the core's
/// own tests (§8's end-to-end scenarios) and handy for embedding the
/// simulator in a larger process that wants in-process analytics.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub snapshots: Vec<Snapshot>,
    pub infos: Vec<(String, Vec<(String, String)>)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots_for(&self, cluster_id: ClusterId) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter().filter(move |s| s.cluster_id == cluster_id)
    }
}

impl Sink for InMemorySink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn emit_info(&mut self, run_id: &str, config: &Config) -> Result<(), SinkError> {
        let fields = vec![
            ("H".to_owned(), config.cluster.healer.to_string()),
            ("S".to_owned(), config.cluster.swapper.to_string()),
            ("R".to_owned(), config.cluster.retain_old.to_string()),
            ("D".to_owned(), config.cluster.decay.to_string()),
            ("c".to_owned(), config.cluster.c.to_string()),
        ];
        self.infos.push((run_id.to_owned(), fields));
        Ok(())
    }
}

// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The directed graph mirroring every node's view (§3, invariant 2).
//!
//! A partition shares its overlay with the sibling it spawns (the Python
//! draft literally does `partition.overlay = self.overlay`): both clusters
//! keep mutating the same graph, distinguishing their nodes only by the
//! `cluster` vertex attribute. `Overlay` is therefore handed around as a
//! `Rc<RefCell<_>>`, the idiomatic single-owner-thread equivalent.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use crate::node::ClusterId;

#[derive(Debug, Default)]
pub struct OverlayGraph {
    edges: BTreeMap<u64, BTreeSet<u64>>,
    cluster_of: BTreeMap<u64, ClusterId>,
}

impl OverlayGraph {
    pub fn add_vertex(&mut self, node: u64, cluster: ClusterId) {
        self.edges.entry(node).or_default();
        self.cluster_of.insert(node, cluster);
    }

    pub fn set_cluster(&mut self, node: u64, cluster: ClusterId) {
        self.cluster_of.insert(node, cluster);
    }

    pub fn cluster_of(&self, node: u64) -> Option<ClusterId> {
        self.cluster_of.get(&node).copied()
    }

    pub fn add_edge(&mut self, from: u64, to: u64) {
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn remove_edge(&mut self, from: u64, to: u64) {
        if let Some(targets) = self.edges.get_mut(&from) {
            targets.remove(&to);
        }
    }

    pub fn out_edges(&self, node: u64) -> impl Iterator<Item = u64> + '_ {
        self.edges.get(&node).into_iter().flatten().copied()
    }

    pub fn has_edge(&self, from: u64, to: u64) -> bool {
        self.edges.get(&from).is_some_and(|t| t.contains(&to))
    }

    /// Reconcile `node`'s out-edges with `target_indices`, the exact set of
    /// indices now in its view. Computes the symmetric difference and
    /// patches only what changed (§4.4 step "Install").
    pub fn reconcile(&mut self, node: u64, target_indices: &BTreeSet<u64>) {
        let current: BTreeSet<u64> = self.out_edges(node).collect();
        for &leaving in current.difference(target_indices) {
            self.remove_edge(node, leaving);
        }
        for &entering in target_indices.difference(&current) {
            self.add_edge(node, entering);
        }
    }

    /// All vertices currently assigned to `cluster`, ascending.
    pub fn vertices_in(&self, cluster: ClusterId) -> impl Iterator<Item = u64> + '_ {
        self.cluster_of
            .iter()
            .filter(move |(_, c)| **c == cluster)
            .map(|(n, _)| *n)
    }
}

pub type SharedOverlay = Rc<RefCell<OverlayGraph>>;

pub fn new_shared() -> SharedOverlay {
    Rc::new(RefCell::new(OverlayGraph::default()))
}

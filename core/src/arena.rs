// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The process-wide node registry, re-architected per §9 ("Shared mutable
//! node registry") as an arena owned by the scenario runner rather than a
//! module-level global. Every [`crate::cluster::Cluster`] looks up `Node`s
//! by index through the arena; no `Node` owns another.
//!
//! Exactly one node mutates its own view per call, and the peer's view is
//! mutated only as part of the same pair exchange (§5), so per-node
//! `RefCell`s never double-borrow during a tick.

use std::cell::{Ref, RefCell, RefMut};

use crate::node::Node;

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<RefCell<Node>>,
}

impl NodeArena {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes: nodes.into_iter().map(RefCell::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<Ref<'_, Node>> {
        self.nodes.get(index as usize).map(|c| c.borrow())
    }

    pub fn get_mut(&self, index: u64) -> Option<RefMut<'_, Node>> {
        self.nodes.get(index as usize).map(|c| c.borrow_mut())
    }
}

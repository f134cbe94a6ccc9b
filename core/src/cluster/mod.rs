// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! A connected component of the simulation after zero or more partitions
//! (§3, §4.3, §4.5).

mod exchange;
mod merge;

use std::collections::BTreeSet;

use rand::Rng;

use crate::{
    arena::NodeArena,
    config::ClusterConfig,
    node::ClusterId,
    overlay::SharedOverlay,
    topology::{self, Topology},
};

/// Mints strictly increasing [`ClusterId`]s for one scenario run, replacing
/// the reference implementation's `Cluster.next_id` class variable (§9).
#[derive(Debug, Default)]
pub struct ClusterIdGen(u64);

impl ClusterIdGen {
    pub fn next(&mut self) -> ClusterId {
        let id = ClusterId(self.0);
        self.0 += 1;
        id
    }
}

#[derive(Debug)]
pub struct Cluster {
    id: ClusterId,
    config: ClusterConfig,
    members: BTreeSet<u64>,
    overlay: SharedOverlay,
    tick: u64,
}

impl Cluster {
    pub fn new(id: ClusterId, config: ClusterConfig, overlay: SharedOverlay) -> Self {
        Self {
            id,
            config,
            members: BTreeSet::new(),
            overlay,
            tick: 0,
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn members(&self) -> impl Iterator<Item = u64> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, index: u64) -> bool {
        self.members.contains(&index)
    }

    /// Adopt `indices` into this cluster: update each node's back-reference
    /// and label its overlay vertex (§3 invariant 3).
    pub fn initialize_nodes(&mut self, arena: &NodeArena, indices: &[u64]) {
        let mut overlay = self.overlay.borrow_mut();
        for &index in indices {
            self.members.insert(index);
            arena
                .get_mut(index)
                .expect("node exists in arena")
                .set_cluster(self.id);
            overlay.add_vertex(index, self.id);
        }
    }

    /// Build the initial overlay per §4.2: every ordered pair of distinct
    /// members that `topology` calls neighbours gets a record and an edge.
    pub fn initialize_topology(&mut self, arena: &NodeArena, topology: Topology) {
        let n = self.members.len() as u64;
        let permutation = topology::prepare(topology, n);
        let members: Vec<u64> = self.members.iter().copied().collect();

        for &i in &members {
            for &j in &members {
                if i == j {
                    continue;
                }
                if topology::are_neighbors(&permutation, i, j, n) {
                    let mut record = arena.get(j).expect("neighbor exists in arena").record();
                    record.age();
                    arena.get_mut(i).expect("node exists in arena").append(record);
                    self.overlay.borrow_mut().add_edge(i, j);
                }
            }
        }
    }

    /// Advance this cluster by one tick (§4.3): every member, in ascending
    /// index order, selects `fanout` peers and push-pulls with whichever
    /// are resolvable within this cluster.
    pub fn tick<R: Rng>(&mut self, arena: &NodeArena, rng: &mut R) {
        let members: Vec<u64> = self.members.iter().copied().collect();

        for u in members {
            let selected = {
                let node = arena.get(u).expect("node exists in arena");
                node.select(self.config.selection, self.config.fanout, rng)
            };

            for record in selected {
                let v = record.index;
                if !self.members.contains(&v) {
                    if self.config.evict_unreachable {
                        arena
                            .get_mut(u)
                            .expect("node exists in arena")
                            .remove_index(v);
                        self.overlay.borrow_mut().remove_edge(u, v);
                    }
                    continue;
                }

                if self.config.propagation == crate::policy::Propagation::PushPull {
                    exchange::push_pull(u, v, arena, &self.overlay, &self.config, rng);
                }
            }
        }

        self.tick += 1;
    }

    /// Carve `drawn` out of this cluster into a freshly created sibling
    /// sharing this cluster's configuration and overlay handle (§4.5).
    pub fn partition(&mut self, arena: &NodeArena, sibling_id: ClusterId, drawn: Vec<u64>) -> Cluster {
        let mut sibling = Cluster::new(sibling_id, self.config, self.overlay.clone());
        for &index in &drawn {
            self.members.remove(&index);
        }
        sibling.initialize_nodes(arena, &drawn);
        sibling
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        config::{Merge, Propagation, Selection},
        node::Node,
        overlay,
    };

    fn cfg() -> ClusterConfig {
        ClusterConfig {
            fanout: 1,
            c: 8,
            selection: Selection::Random,
            propagation: Propagation::PushPull,
            merge: Merge::Head,
            healer: 0,
            swapper: 0,
            retain_old: 0,
            decay: 0.0,
            evict_unreachable: false,
        }
    }

    fn ring_cluster(n: u64) -> (Cluster, NodeArena) {
        let arena = NodeArena::new((0..n).map(|i| Node::new(i, ClusterId(0))).collect());
        let overlay = overlay::new_shared();
        let mut cluster = Cluster::new(ClusterId(0), cfg(), overlay);
        let indices: Vec<u64> = (0..n).collect();
        cluster.initialize_nodes(&arena, &indices);
        cluster.initialize_topology(&arena, Topology::Ring);
        (cluster, arena)
    }

    #[test]
    fn ring_topology_gives_every_node_two_view_entries() {
        let (_cluster, arena) = ring_cluster(10);
        for i in 0..10 {
            assert_eq!(arena.get(i).unwrap().view_len(), 2);
        }
    }

    #[test]
    fn ticking_preserves_capacity_invariant() {
        let (mut cluster, arena) = ring_cluster(10);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            cluster.tick(&arena, &mut rng);
            for i in 0..10 {
                assert!(arena.get(i).unwrap().view_len() <= cfg().c);
            }
        }
        assert_eq!(cluster.tick_count(), 20);
    }

    #[test]
    fn partition_of_size_zero_is_a_noop() {
        let (mut cluster, arena) = ring_cluster(6);
        let mut ids = ClusterIdGen::default();
        ids.next();
        let sibling = cluster.partition(&arena, ids.next(), vec![]);
        assert_eq!(cluster.len(), 6);
        assert_eq!(sibling.len(), 0);
    }

    #[test]
    fn partition_of_full_size_empties_source() {
        let (mut cluster, arena) = ring_cluster(6);
        let mut ids = ClusterIdGen::default();
        ids.next();
        let drawn: Vec<u64> = (0..6).collect();
        let sibling = cluster.partition(&arena, ids.next(), drawn);
        assert_eq!(cluster.len(), 0);
        assert_eq!(sibling.len(), 6);
    }
}

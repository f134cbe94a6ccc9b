// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The push-pull exchange between a resolved pair of nodes (§4.4), wired
//! up against the arena and the shared overlay.

use std::collections::BTreeSet;

use rand::Rng;

use super::merge;
use crate::{arena::NodeArena, config::ClusterConfig, overlay::SharedOverlay, record::Record};

/// Head-shuffle `producer`'s view in place, then slice off and deep-copy a
/// send buffer of `min(c/2, len)` entries plus the producer's own fresh
/// record (§4.4 "Push").
fn push<R: Rng>(producer: u64, arena: &NodeArena, cfg: &ClusterConfig, rng: &mut R) -> Vec<Record> {
    let mut node = arena.get_mut(producer).expect("producer exists in arena");
    let mut view = node.view().to_vec();
    merge::head_shuffle(&mut view, cfg.healer, rng);
    node.set_view(view.clone());

    let k = (cfg.c / 2).min(view.len());
    let mut buffer: Vec<Record> = view[..k].to_vec();
    buffer.push(node.record());
    buffer
}

/// Reconcile `consumer`'s view against an incoming `buffer` and install the
/// result, patching the overlay and ageing every surviving record
/// (§4.4 "Pull" steps 1-4).
fn pull<R: Rng>(
    consumer: u64,
    buffer: Vec<Record>,
    arena: &NodeArena,
    overlay: &SharedOverlay,
    cfg: &ClusterConfig,
    rng: &mut R,
) {
    let mut node = arena.get_mut(consumer).expect("consumer exists in arena");

    let merged = merge::merge(node.view(), &buffer, consumer);
    let swapped = merge::swap(merged, cfg.swapper, cfg.c);
    let mut installed = merge::retain_and_decay(swapped, cfg.retain_old, cfg.decay, cfg.c, rng);
    for r in installed.iter_mut() {
        r.age();
    }

    let new_indices: BTreeSet<u64> = installed.iter().map(|r| r.index).collect();
    overlay.borrow_mut().reconcile(consumer, &new_indices);
    node.set_view(installed);
}

/// Perform a full symmetric push-pull exchange between `u` and `v`
/// (§4.4). Both pushes happen (each reorders only its own producer's
/// view) before either pull is applied, matching the reference pipeline.
pub fn push_pull<R: Rng>(
    u: u64,
    v: u64,
    arena: &NodeArena,
    overlay: &SharedOverlay,
    cfg: &ClusterConfig,
    rng: &mut R,
) {
    let buffer_for_v = push(u, arena, cfg, rng);
    let buffer_for_u = push(v, arena, cfg, rng);
    pull(v, buffer_for_v, arena, overlay, cfg, rng);
    pull(u, buffer_for_u, arena, overlay, cfg, rng);
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        config::{ClusterConfig, Merge, Propagation, Selection},
        node::{ClusterId, Node},
        overlay,
    };

    fn cfg() -> ClusterConfig {
        ClusterConfig {
            fanout: 1,
            c: 4,
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

    #[test]
    fn exchange_never_leaves_self_record_in_either_view() {
        let mut a = Node::new(0, ClusterId(0));
        a.append(Record::fresh(1));
        let mut b = Node::new(1, ClusterId(0));
        b.append(Record::fresh(0));

        let arena = NodeArena::new(vec![a, b]);
        let overlay = overlay::new_shared();
        overlay.borrow_mut().add_vertex(0, ClusterId(0));
        overlay.borrow_mut().add_vertex(1, ClusterId(0));

        let mut rng = StdRng::seed_from_u64(9);
        push_pull(0, 1, &arena, &overlay, &cfg(), &mut rng);

        assert!(arena.get(0).unwrap().view().iter().all(|r| r.index != 0));
        assert!(arena.get(1).unwrap().view().iter().all(|r| r.index != 1));
    }

    #[test]
    fn exchange_respects_capacity() {
        let mut a = Node::new(0, ClusterId(0));
        for i in 1..10 {
            a.append(Record::new(i, i as u32));
        }
        let mut b = Node::new(1, ClusterId(0));
        for i in 2..10 {
            b.append(Record::new(i, i as u32));
        }

        let arena = NodeArena::new(vec![a, b]);
        let overlay = overlay::new_shared();
        overlay.borrow_mut().add_vertex(0, ClusterId(0));
        overlay.borrow_mut().add_vertex(1, ClusterId(0));

        let mut rng = StdRng::seed_from_u64(3);
        push_pull(0, 1, &arena, &overlay, &cfg(), &mut rng);

        assert!(arena.get(0).unwrap().view_len() <= cfg().c);
        assert!(arena.get(1).unwrap().view_len() <= cfg().c);
    }
}

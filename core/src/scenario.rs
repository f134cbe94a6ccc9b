// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Drives the simulation end to end (§4.6): builds the arena and cluster
//! 0, applies the partition schedule, and advances clusters one tick at a
//! time, emitting snapshots to a [`Sink`].

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::{
    arena::NodeArena,
    cluster::{Cluster, ClusterIdGen},
    config::Config,
    error::{Error, InvariantError},
    node::{ClusterId, Node},
    overlay::{self, SharedOverlay},
    policy::PartitionType,
    sink::{Sink, Snapshot},
};

const RUN_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const RUN_ID_LEN: usize = 16;

fn random_token<R: Rng>(rng: &mut R) -> String {
    (0..RUN_ID_LEN)
        .map(|_| {
            let i = rng.gen_range(0..RUN_ID_ALPHABET.len());
            RUN_ID_ALPHABET[i] as char
        })
        .collect()
}

fn draw_partition<R: Rng>(
    partition_type: PartitionType,
    members: &[u64],
    size: usize,
    rng: &mut R,
) -> Vec<u64> {
    let size = size.min(members.len());
    match partition_type {
        PartitionType::Rand => members.choose_multiple(rng, size).copied().collect(),
        PartitionType::Lineal => members[..size].to_vec(),
    }
}

/// Verify invariants 1 and 2 from §3. Called after every tick; any
/// violation is fatal (§7, §8).
fn check_invariants(arena: &NodeArena, cluster: &Cluster, overlay: &SharedOverlay) -> Result<(), InvariantError> {
    for index in cluster.members() {
        let node = arena.get(index).expect("member exists in arena");
        let view = node.view();

        if view.len() > cluster.config().c {
            return Err(InvariantError::ViewOverCapacity {
                node: index,
                len: view.len(),
                c: cluster.config().c,
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for r in view {
            if r.index == index {
                return Err(InvariantError::SelfRecord { node: index });
            }
            if !seen.insert(r.index) {
                return Err(InvariantError::DuplicateRecord {
                    node: index,
                    index: r.index,
                });
            }
        }

        let overlay_targets: std::collections::BTreeSet<u64> =
            overlay.borrow().out_edges(index).collect();
        let view_targets: std::collections::BTreeSet<u64> = view.iter().map(|r| r.index).collect();
        if overlay_targets != view_targets {
            return Err(InvariantError::OverlayViewMismatch { node: index });
        }
    }
    Ok(())
}

fn snapshot_of(run_id: &str, tick: u64, cluster: &Cluster, arena: &NodeArena) -> Snapshot {
    let node_ids: Vec<u64> = cluster.members().collect();
    let mut views = BTreeMap::new();
    let mut node_attrs = BTreeMap::new();
    for &index in &node_ids {
        let node = arena.get(index).expect("member exists in arena");
        views.insert(index, node.view().iter().map(|r| r.index).collect());
        node_attrs.insert(index, cluster.id());
    }
    Snapshot {
        run_id: run_id.to_owned(),
        tick,
        cluster_id: cluster.id(),
        node_ids,
        views,
        node_attrs,
    }
}

pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run `config.repetitions` independent repetitions, emitting to
    /// `sink`. A non-fatal sink error is logged and the run continues; a
    /// fatal one aborts the current repetition (§5). Returns the run id
    /// minted for each repetition, in order, so a caller assembling the
    /// scenario index file (§6) can append one path per repetition.
    pub fn run(config: &Config, sink: &mut dyn Sink) -> Result<Vec<String>, Error> {
        let mut run_ids = Vec::with_capacity(config.repetitions as usize);
        for repetition in 0..config.repetitions {
            run_ids.push(Self::run_repetition(config, repetition, sink)?);
        }
        Ok(run_ids)
    }

    fn run_repetition(config: &Config, repetition: u64, sink: &mut dyn Sink) -> Result<String, Error> {
        let mut rng = Pcg32::seed_from_u64(config.seed.wrapping_add(repetition));
        let run_id = random_token(&mut rng);

        if let Err(e) = sink.emit_info(&run_id, config) {
            tracing::warn!(err = %e, "sink failed to write run info");
            if e.fatal {
                return Err(Error::Sink(e.message));
            }
        }

        let nodes: Vec<Node> = (0..config.nodes_amount)
            .map(|i| Node::new(i, ClusterId(0)))
            .collect();
        let arena = NodeArena::new(nodes);
        let overlay = overlay::new_shared();

        let mut ids = ClusterIdGen::default();
        let mut clusters = vec![Cluster::new(ids.next(), config.cluster, overlay.clone())];
        let all_indices: Vec<u64> = (0..config.nodes_amount).collect();
        clusters[0].initialize_nodes(&arena, &all_indices);
        clusters[0].initialize_topology(&arena, config.topology);

        tracing::info!(nodes = config.nodes_amount, run = %run_id, "repetition started");

        for tick in 1..=config.ticks {
            for event in &config.partitions {
                if event.tick == tick {
                    let members: Vec<u64> = clusters[0].members().collect();
                    let drawn = draw_partition(config.partition_type, &members, event.size, &mut rng);
                    let sibling_id = ids.next();
                    let sibling = clusters[0].partition(&arena, sibling_id, drawn);
                    tracing::debug!(cluster = sibling_id.0, tick, "partitioned");
                    clusters.push(sibling);
                }
            }

            for cluster in clusters.iter_mut() {
                if cluster.is_empty() {
                    continue;
                }
                cluster.tick(&arena, &mut rng);
                check_invariants(&arena, cluster, &overlay)?;
            }

            for cluster in &clusters {
                if cluster.is_empty() {
                    continue;
                }
                let snapshot = snapshot_of(&run_id, tick, cluster, &arena);
                if let Err(e) = sink.emit(&snapshot) {
                    tracing::warn!(err = %e, tick, "sink failed to emit snapshot");
                    if e.fatal {
                        return Err(Error::Sink(e.message));
                    }
                }
            }
        }

        tracing::info!(nodes = config.nodes_amount, run = %run_id, "repetition finished");
        Ok(run_id)
    }
}

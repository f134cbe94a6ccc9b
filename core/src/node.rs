// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! A single participant in the simulation.

use rand::{seq::IteratorRandom, Rng};

use crate::{policy::Selection, record::Record};

/// Monotonically assigned identity of a [`crate::cluster::Cluster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(pub u64);

/// A participant, created once at scenario start and alive for the whole
/// run. `view` is the only persisted ordering: the head is "freshest"
/// after a head-merge (§3).
#[derive(Debug, Clone)]
pub struct Node {
    index: u64,
    view: Vec<Record>,
    cluster: ClusterId,
}

impl Node {
    pub fn new(index: u64, cluster: ClusterId) -> Self {
        Self {
            index,
            view: Vec::new(),
            cluster,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }

    pub fn set_cluster(&mut self, cluster: ClusterId) {
        self.cluster = cluster;
    }

    pub fn view(&self) -> &[Record] {
        &self.view
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Append `record` to the view. Callers are responsible for upholding
    /// invariant 1 (no duplicate index, no self-entry, `len <= c`); this is
    /// a primitive, not a policy.
    pub fn append(&mut self, record: Record) {
        self.view.push(record);
    }

    /// Remove the (at most one) view entry matching `index`, returning it.
    pub fn remove_index(&mut self, index: u64) -> Option<Record> {
        let pos = self.view.iter().position(|r| r.index == index)?;
        Some(self.view.remove(pos))
    }

    /// Replace the whole view with `records`, as done after a merge.
    pub fn set_view(&mut self, records: Vec<Record>) {
        self.view = records;
    }

    /// A record announcing this node to others, with a fresh hop of 0.
    pub fn record(&self) -> Record {
        Record::fresh(self.index)
    }

    /// Select up to `fanout` peers from the view per the configured
    /// [`Selection`] policy (§4.1). Never panics: if `fanout` exceeds the
    /// view length the whole view is returned.
    pub fn select<R: Rng>(&self, selection: Selection, fanout: usize, rng: &mut R) -> Vec<Record> {
        let fanout = fanout.min(self.view.len());
        match selection {
            Selection::Random => self.view.iter().copied().choose_multiple(rng, fanout),
            Selection::Tail => {
                let mut sorted: Vec<Record> = self.view.clone();
                sorted.sort_by(|a, b| b.hop.cmp(&a.hop));
                sorted.truncate(fanout);
                sorted
            },
        }
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn node_with(records: &[(u64, u32)]) -> Node {
        let mut n = Node::new(0, ClusterId(0));
        for &(index, hop) in records {
            n.append(Record::new(index, hop));
        }
        n
    }

    #[test]
    fn select_random_never_exceeds_view() {
        let n = node_with(&[(1, 0), (2, 0), (3, 0)]);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = n.select(Selection::Random, 10, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn select_random_has_distinct_indices() {
        let n = node_with(&[(1, 0), (2, 0), (3, 0), (4, 0)]);
        let mut rng = StdRng::seed_from_u64(42);
        let picked = n.select(Selection::Random, 2, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0].index, picked[1].index);
    }

    #[test]
    fn select_tail_prefers_oldest() {
        let n = node_with(&[(1, 0), (2, 5), (3, 2)]);
        let mut rng = StdRng::seed_from_u64(0);
        let picked = n.select(Selection::Tail, 1, &mut rng);
        assert_eq!(picked[0].index, 2);
    }

    #[test]
    fn remove_index_drops_matching_record_only() {
        let mut n = node_with(&[(1, 0), (2, 0)]);
        let removed = n.remove_index(1);
        assert!(removed.is_some());
        assert_eq!(n.view().len(), 1);
        assert_eq!(n.view()[0].index, 2);
    }
}

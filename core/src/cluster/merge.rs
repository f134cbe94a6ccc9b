// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The pull-side pipeline (§4.4 steps 1-3): merge, swap, retain+decay.
//! Kept as pure functions over `Vec<Record>` so the pipeline is testable
//! without an arena or overlay.

use rand::{seq::SliceRandom, Rng};

use crate::record::Record;

/// Sort `view` by hop descending (stable — ties keep insertion order),
/// protect the oldest `h` entries from the shuffle, and shuffle the rest.
/// This is the "head-shuffle" the push side applies to its own view before
/// slicing off a send buffer (§4.4 Push step 1).
pub fn head_shuffle<R: Rng>(view: &mut Vec<Record>, h: usize, rng: &mut R) {
    view.sort_by(|a, b| b.hop.cmp(&a.hop));
    let h = h.min(view.len());
    let mut younger = view.split_off(h);
    let oldest = std::mem::take(view);
    younger.shuffle(rng);
    younger.extend(oldest);
    *view = younger;
}

/// Reconcile `view` (the consumer's current records) with `buffer` (the
/// incoming push), deduping by index. Identity is index-only (§9 open
/// question (b)): hop only decides which copy of a shared index survives.
/// Never lets an entry with `own_index` enter the result.
pub fn merge(view: &[Record], buffer: &[Record], own_index: u64) -> Vec<Record> {
    let mut kept = Vec::with_capacity(view.len());
    for &r1 in view {
        // Keep r1 unless the buffer holds a copy that is at least as fresh
        // (lower or equal hop) — in that case the buffer's copy wins via
        // the loop below instead.
        let keep_r1 = match buffer.iter().find(|r2| r2.same_peer(&r1)) {
            None => true,
            Some(r2) => r2.hop > r1.hop,
        };
        if keep_r1 {
            kept.push(r1);
        }
    }

    for &r2 in buffer {
        if r2.index == own_index {
            continue;
        }
        if kept.iter().any(|k| k.same_peer(&r2)) {
            continue;
        }
        kept.push(r2);
    }

    kept
}

/// Drop the freshest entries when the merged buffer overflows capacity
/// (§4.4 step 2, "Swap").
pub fn swap(mut records: Vec<Record>, s: usize, c: usize) -> Vec<Record> {
    let overflow = records.len().saturating_sub(c);
    let s = s.min(overflow);
    records.drain(0..s);
    records
}

/// Protect `r` oldest entries, probabilistically decay them under
/// remaining overflow, and trim the rest to fit (§4.4 step 3,
/// "Retain-old + decay").
pub fn retain_and_decay<R: Rng>(
    mut records: Vec<Record>,
    r: usize,
    d: f64,
    c: usize,
    rng: &mut R,
) -> Vec<Record> {
    records.sort_by(|a, b| b.hop.cmp(&a.hop));
    let r_prime = r.min(records.len()).min(c);
    let mut rest = records.split_off(r_prime);
    let mut oldest = records;

    oldest.shuffle(rng);
    rest.shuffle(rng);

    while oldest.len() + rest.len() > c && !oldest.is_empty() && rng.gen::<f64>() < d {
        oldest.pop();
    }

    let budget = c.saturating_sub(oldest.len());
    rest.truncate(budget);
    rest.extend(oldest);
    rest
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn rec(index: u64, hop: u32) -> Record {
        Record::new(index, hop)
    }

    #[test]
    fn merge_is_idempotent_when_buffer_equals_view() {
        let view = vec![rec(1, 2), rec(2, 5)];
        let merged = merge(&view, &view, 0);
        let mut idx: Vec<u64> = merged.iter().map(|r| r.index).collect();
        idx.sort_unstable();
        assert_eq!(idx, vec![1, 2]);
    }

    #[test]
    fn merge_never_admits_own_index() {
        let view = vec![rec(1, 0)];
        let buffer = vec![rec(0, 0), rec(2, 0)];
        let merged = merge(&view, &buffer, 0);
        assert!(merged.iter().all(|r| r.index != 0));
    }

    #[test]
    fn merge_keeps_fresher_copy_on_conflicting_hop() {
        // View has a stale copy of 5 (hop=9); buffer has a fresher one
        // (hop=1, strictly less). The fresher entry must win.
        let view = vec![rec(5, 9)];
        let buffer = vec![rec(5, 1)];
        let merged = merge(&view, &buffer, 0);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].hop, 1);
    }

    #[test]
    fn merge_deduplicates_by_index_only() {
        let view = vec![rec(5, 1)];
        let buffer = vec![rec(5, 100)];
        let merged = merge(&view, &buffer, 0);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn swap_empties_when_s_at_least_len() {
        let records = vec![rec(1, 0), rec(2, 0), rec(3, 0)];
        let swapped = swap(records, 10, 0);
        assert!(swapped.is_empty());
    }

    #[test]
    fn swap_noop_under_capacity() {
        let records = vec![rec(1, 0), rec(2, 0)];
        let swapped = swap(records.clone(), 5, 10);
        assert_eq!(swapped.len(), records.len());
    }

    #[test]
    fn retain_and_decay_respects_capacity() {
        let mut rng = StdRng::seed_from_u64(7);
        let records: Vec<Record> = (0..20).map(|i| rec(i, i as u32)).collect();
        let out = retain_and_decay(records, 4, 0.8, 8, &mut rng);
        assert!(out.len() <= 8);
    }

    #[test]
    fn retain_old_larger_than_capacity_still_respects_capacity() {
        // R=40 with D=0 and c=32 must not leave `oldest` alone over capacity.
        let mut rng = StdRng::seed_from_u64(11);
        let records: Vec<Record> = (0..50).map(|i| rec(i, i as u32)).collect();
        let out = retain_and_decay(records, 40, 0.0, 32, &mut rng);
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn decay_one_drains_oldest_before_trimming_rest() {
        // D=1 guarantees every reduction step pops from `oldest` while it
        // remains non-empty and capacity is exceeded.
        let mut rng = StdRng::seed_from_u64(3);
        let records: Vec<Record> = (0..10).map(|i| rec(i, 10 - i as u32)).collect();
        let out = retain_and_decay(records, 4, 1.0, 5, &mut rng);
        assert!(out.len() <= 5);
    }

    #[test]
    fn head_shuffle_preserves_len() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut view = vec![rec(1, 3), rec(2, 1), rec(3, 9)];
        let len_before = view.len();
        head_shuffle(&mut view, 1, &mut rng);
        assert_eq!(view.len(), len_before);
    }

    #[test]
    fn head_shuffle_with_h_covering_whole_view_preserves_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut view = vec![rec(1, 9), rec(2, 5), rec(3, 1)];
        let before = view.clone();
        head_shuffle(&mut view, view.len(), &mut rng);
        let before_idx: Vec<u64> = before.iter().map(|r| r.index).collect();
        let after_idx: Vec<u64> = view.iter().map(|r| r.index).collect();
        assert_eq!(before_idx, after_idx);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::{collection, prelude::*};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn gen_records(own_index: u64) -> impl Strategy<Value = Vec<Record>> {
        collection::vec((0..50u64, 0..20u32), 0..16).prop_map(move |raw| {
            raw.into_iter()
                .filter(|&(index, _)| index != own_index)
                .map(|(index, hop)| Record::new(index, hop))
                .collect()
        })
    }

    fn prop_merge_never_admits_own_index(view: Vec<Record>, buffer: Vec<Record>, own_index: u64) {
        let merged = merge(&view, &buffer, own_index);
        assert!(merged.iter().all(|r| r.index != own_index));
    }

    fn prop_merge_never_duplicates_an_index(view: Vec<Record>, buffer: Vec<Record>, own_index: u64) {
        let merged = merge(&view, &buffer, own_index);
        let mut seen = std::collections::BTreeSet::new();
        assert!(merged.iter().all(|r| seen.insert(r.index)));
    }

    fn prop_swap_never_exceeds_len(records: Vec<Record>, s: usize, c: usize) {
        let len_before = records.len();
        let overflow = len_before.saturating_sub(c);
        let swapped = swap(records, s, c);
        assert!(swapped.len() <= len_before);
        if s >= overflow {
            assert!(swapped.len() <= c);
        }
    }

    fn prop_retain_and_decay_respects_capacity(records: Vec<Record>, r: usize, d: f64, c: usize, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = retain_and_decay(records, r, d, c, &mut rng);
        assert!(out.len() <= c);
    }

    proptest! {
        #[test]
        fn merge_never_admits_own_index(view in gen_records(0), buffer in gen_records(0)) {
            prop_merge_never_admits_own_index(view, buffer, 0)
        }

        #[test]
        fn merge_never_duplicates_an_index(view in gen_records(0), buffer in gen_records(0)) {
            prop_merge_never_duplicates_an_index(view, buffer, 0)
        }

        #[test]
        fn swap_never_exceeds_len(records in gen_records(0), s in 0..32usize, c in 0..16usize) {
            prop_swap_never_exceeds_len(records, s, c)
        }

        #[test]
        fn retain_and_decay_respects_capacity(
            records in gen_records(0),
            r in 0..16usize,
            d in 0.0..1.0f64,
            c in 0..16usize,
            seed in any::<u64>(),
        ) {
            prop_retain_and_decay_respects_capacity(records, r, d, c, seed)
        }
    }
}

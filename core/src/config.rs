// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Validated configuration (§6, §7). [`RawConfig`] holds whatever a caller
//! (the CLI, a test) produced in unchecked form; [`RawConfig::validate`]
//! performs every Configuration-class check up front and hands back a
//! [`Config`] nothing downstream re-checks.

use crate::{
    error::ConfigError,
    policy::{Merge, PartitionType, Propagation, Selection, Topology},
};

/// A scheduled partition: at the start of `tick`, draw `size` nodes out of
/// cluster 0 into a fresh sibling (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEvent {
    pub tick: u64,
    pub size: usize,
}

/// The knobs the push-pull exchange (§4.4) reads every tick.
#[derive(Debug, Clone, Copy)]
pub struct ClusterConfig {
    pub fanout: usize,
    pub c: usize,
    pub selection: Selection,
    pub propagation: Propagation,
    pub merge: Merge,
    pub healer: usize,
    pub swapper: usize,
    pub retain_old: usize,
    pub decay: f64,
    pub evict_unreachable: bool,
}

/// A fully validated run configuration for one value of `N`.
#[derive(Debug, Clone)]
pub struct Config {
    pub nodes_amount: u64,
    pub ticks: u64,
    pub repetitions: u64,
    pub seed: u64,
    pub topology: Topology,
    pub partition_type: PartitionType,
    pub partitions: Vec<PartitionEvent>,
    pub cluster: ClusterConfig,
}

/// Unchecked input, with the same shape a CLI parser or a test builds
/// naturally: signed integers so an accidental negative count is a data
/// value, not a parser panic, and raw policy names as strings.
#[derive(Debug, Clone)]
pub struct RawConfig {
    pub nodes_amount: u64,
    pub ticks: u64,
    pub repetitions: u64,
    pub seed: u64,
    pub fanout: i64,
    pub c: i64,
    pub topology: String,
    pub selection: String,
    pub propagation: String,
    pub merge: String,
    pub healer: i64,
    pub swapper: i64,
    pub retain_old: i64,
    pub decay: f64,
    pub evict_unreachable: bool,
    pub partitions: Vec<(u64, i64)>,
    pub partition_type: String,
}

impl RawConfig {
    pub fn validate(self) -> Result<Config, ConfigError> {
        let c = non_negative(self.c)?;
        let fanout = non_negative(self.fanout)?;
        let healer = non_negative(self.healer)?;
        let swapper = non_negative(self.swapper)?;
        let retain_old = non_negative(self.retain_old)?;

        if !(0.0..=1.0).contains(&self.decay) {
            return Err(ConfigError::DecayOutOfRange(self.decay));
        }

        let mut partitions = Vec::with_capacity(self.partitions.len());
        for (tick, size) in self.partitions {
            let size = non_negative(size)? as usize;
            if size as u64 > self.nodes_amount {
                return Err(ConfigError::PartitionTooLarge {
                    tick,
                    requested: size,
                    available: self.nodes_amount as usize,
                });
            }
            partitions.push(PartitionEvent { tick, size });
        }
        partitions.sort_by_key(|p| p.tick);

        Ok(Config {
            nodes_amount: self.nodes_amount,
            ticks: self.ticks,
            repetitions: self.repetitions,
            seed: self.seed,
            topology: Topology::from_str(&self.topology)?,
            partition_type: PartitionType::from_str(&self.partition_type)?,
            partitions,
            cluster: ClusterConfig {
                fanout,
                c,
                selection: Selection::from_str(&self.selection)?,
                propagation: Propagation::from_str(&self.propagation)?,
                merge: Merge::from_str(&self.merge)?,
                healer,
                swapper,
                retain_old,
                decay: self.decay,
                evict_unreachable: self.evict_unreachable,
            },
        })
    }
}

fn non_negative(value: i64) -> Result<usize, ConfigError> {
    if value < 0 {
        Err(ConfigError::NegativeCapacity(value))
    } else {
        Ok(value as usize)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn base() -> RawConfig {
        RawConfig {
            nodes_amount: 10,
            ticks: 10,
            repetitions: 1,
            seed: 1,
            fanout: 1,
            c: 8,
            topology: "ring".into(),
            selection: "rand".into(),
            propagation: "pushpull".into(),
            merge: "head".into(),
            healer: 0,
            swapper: 0,
            retain_old: 0,
            decay: 0.0,
            evict_unreachable: false,
            partitions: vec![],
            partition_type: "rand".into(),
        }
    }

    #[test]
    fn rejects_negative_capacity() {
        let mut raw = base();
        raw.c = -1;
        assert!(matches!(raw.validate(), Err(ConfigError::NegativeCapacity(-1))));
    }

    #[test]
    fn rejects_decay_out_of_range() {
        let mut raw = base();
        raw.decay = 1.5;
        assert!(matches!(raw.validate(), Err(ConfigError::DecayOutOfRange(_))));
    }

    #[test]
    fn rejects_unknown_policy() {
        let mut raw = base();
        raw.selection = "bogus".into();
        assert!(matches!(raw.validate(), Err(ConfigError::UnknownPolicy { .. })));
    }

    #[test]
    fn rejects_oversized_partition() {
        let mut raw = base();
        raw.partitions = vec![(5, 20)];
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::PartitionTooLarge { .. })
        ));
    }

    #[test]
    fn accepts_well_formed_config() {
        assert!(base().validate().is_ok());
    }
}

// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Command-line surface, one flag per row of the configuration table in
//! §6 of the specification. Short flags mirror the original `click`-based
//! Python tool.

use argh::FromArgs;
use pex_core::RawConfig;

#[derive(FromArgs)]
/// Discrete-event simulator for a gossip peer-sampling protocol.
pub struct Options {
    /// number of simulation ticks
    #[argh(option, short = 't', default = "50")]
    pub ticks: u64,

    /// independent runs per N
    #[argh(option, short = 'r', default = "1")]
    pub repetitions: u64,

    /// smallest N in the sweep
    #[argh(option, default = "3")]
    pub min_nodes: u64,

    /// largest N in the sweep
    #[argh(option, default = "3")]
    pub max_nodes: u64,

    /// step between successive N in the sweep
    #[argh(option, short = 's', default = "1")]
    pub step: u64,

    /// peers contacted per node per tick
    #[argh(option, short = 'f', default = "1")]
    pub fanout: i64,

    /// view capacity
    #[argh(option, default = "32")]
    pub c: i64,

    /// initial overlay shape: `ring` or `rand`
    #[argh(option, default = "String::from(\"ring\")")]
    pub topology: String,

    /// peer selection policy: `rand` or `tail`
    #[argh(option, default = "String::from(\"rand\")")]
    pub selection: String,

    /// propagation policy (only `pushpull` is defined)
    #[argh(option, default = "String::from(\"pushpull\")")]
    pub propagation: String,

    /// merge policy (only `head` is defined)
    #[argh(option, default = "String::from(\"head\")")]
    pub merge: String,

    /// healer: oldest entries protected from the head-shuffle
    #[argh(option, default = "0")]
    pub h: i64,

    /// swapper: freshest entries dropped on overflow
    #[argh(option, default = "0")]
    pub s: i64,

    /// retain-old: oldest entries carried through decay
    #[argh(option, default = "0")]
    pub big_r: i64,

    /// decay probability in [0, 1]
    #[argh(option, default = "0.0")]
    pub d: f64,

    /// evict unreachable neighbours instead of skipping them
    #[argh(switch)]
    pub e: bool,

    /// a scheduled partition as `tick:size`, may be repeated
    #[argh(option)]
    pub partition: Vec<String>,

    /// how scheduled partitions draw their nodes: `rand` or `lineal`
    #[argh(option, default = "String::from(\"rand\")")]
    pub partition_type: String,

    /// deterministic PRNG seed
    #[argh(option, default = "1")]
    pub seed: u64,

    /// output folder for the reference file sinks
    #[argh(option)]
    pub folder: Option<String>,

    /// write per-node time-series points instead of graph snapshot files
    #[argh(switch)]
    pub timeseries: bool,

    /// log level (default: info)
    #[argh(option, default = "tracing::Level::INFO")]
    pub log: tracing::Level,
}

impl Options {
    pub fn from_env() -> Self {
        argh::from_env()
    }

    /// Parse a `tick:size` token from `--partition`.
    fn parse_partition(token: &str) -> (u64, i64) {
        let (tick, size) = token
            .split_once(':')
            .unwrap_or_else(|| panic!("malformed --partition value {token:?}, expected tick:size"));
        (
            tick.parse().expect("partition tick must be an integer"),
            size.parse().expect("partition size must be an integer"),
        )
    }

    /// One [`RawConfig`] per value of `N` in `[min_nodes, max_nodes]` by
    /// `step` (§6).
    pub fn into_raw_configs(self) -> Vec<RawConfig> {
        let partitions: Vec<(u64, i64)> = self.partition.iter().map(|s| Self::parse_partition(s)).collect();
        let max_nodes = self.max_nodes.max(self.min_nodes);
        let step = self.step.max(1);

        let mut n = self.min_nodes;
        let mut configs = Vec::new();
        while n <= max_nodes {
            configs.push(RawConfig {
                nodes_amount: n,
                ticks: self.ticks,
                repetitions: self.repetitions,
                seed: self.seed,
                fanout: self.fanout,
                c: self.c,
                topology: self.topology.clone(),
                selection: self.selection.clone(),
                propagation: self.propagation.clone(),
                merge: self.merge.clone(),
                healer: self.h,
                swapper: self.s,
                retain_old: self.big_r,
                decay: self.d,
                evict_unreachable: self.e,
                partitions: partitions.clone(),
                partition_type: self.partition_type.clone(),
            });
            n += step;
        }
        configs
    }
}

// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Writes one file per `(run_id, tick)` under `{folder}/{run_id}/`, plus a
//! single `info.sim` per run (§6).
//!
//! `networkx.write_gpickle`, what the original Python tool used, is a
//! Python-pickle format with no Rust-idiomatic equivalent; this sink
//! writes the same information (directed edges plus the `cluster` vertex
//! attribute) as a small line-oriented text format instead. Downstream
//! analytics scripts are an external collaborator per §1 and would need
//! to be adjusted to read it — noted in DESIGN.md.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use pex_core::{Config, Sink, SinkError, Snapshot};

pub struct FileSink {
    folder: PathBuf,
}

impl FileSink {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.folder.join(run_id)
    }

    fn ensure_dir(dir: &Path) -> Result<(), SinkError> {
        fs::create_dir_all(dir).map_err(|e| SinkError::fatal(format!("create_dir_all({dir:?}): {e}")))
    }
}

impl Sink for FileSink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        let dir = self.run_dir(&snapshot.run_id);
        Self::ensure_dir(&dir)?;

        let path = dir.join(format!("{}.{}.partition.sim", snapshot.run_id, snapshot.tick));
        let mut file =
            fs::File::create(&path).map_err(|e| SinkError::non_fatal(format!("create({path:?}): {e}")))?;

        for &node in &snapshot.node_ids {
            let cluster = snapshot.node_attrs.get(&node).map(|c| c.0).unwrap_or_default();
            writeln!(file, "node {node} cluster={cluster}")
                .map_err(|e| SinkError::non_fatal(e.to_string()))?;
        }
        for (u, v) in snapshot.edges() {
            writeln!(file, "edge {u} {v}").map_err(|e| SinkError::non_fatal(e.to_string()))?;
        }

        Ok(())
    }

    fn emit_info(&mut self, run_id: &str, config: &Config) -> Result<(), SinkError> {
        let dir = self.run_dir(run_id);
        Self::ensure_dir(&dir)?;

        let path = dir.join("info.sim");
        let mut file =
            fs::File::create(&path).map_err(|e| SinkError::fatal(format!("create({path:?}): {e}")))?;

        let cluster = &config.cluster;
        writeln!(file, "H={}", cluster.healer).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "S={}", cluster.swapper).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "R={}", cluster.retain_old).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "D={}", cluster.decay).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "c={}", cluster.c).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "fanout={}", cluster.fanout).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "E={}", cluster.evict_unreachable).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "seed={}", config.seed).map_err(|e| SinkError::fatal(e.to_string()))?;

        Ok(())
    }
}

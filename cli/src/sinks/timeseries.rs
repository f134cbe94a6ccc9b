// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Writes one point per node per tick, the flat table shape the original
//! Python tool's `--timeseries` mode produced for plotting (§6).

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use pex_core::{Config, Sink, SinkError, Snapshot};

pub struct TimeSeriesSink {
    folder: PathBuf,
    header_written: bool,
}

impl TimeSeriesSink {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into(), header_written: false }
    }

    fn points_path(&self, run_id: &str) -> PathBuf {
        self.folder.join(run_id).join(format!("{run_id}.timeseries.sim"))
    }

    fn ensure_dir(dir: &Path) -> Result<(), SinkError> {
        fs::create_dir_all(dir).map_err(|e| SinkError::fatal(format!("create_dir_all({dir:?}): {e}")))
    }
}

impl Sink for TimeSeriesSink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        let dir = self.folder.join(&snapshot.run_id);
        Self::ensure_dir(&dir)?;

        let path = self.points_path(&snapshot.run_id);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SinkError::non_fatal(format!("open({path:?}): {e}")))?;

        if !self.header_written {
            writeln!(file, "node\trecords\ttick\trun\tcluster")
                .map_err(|e| SinkError::non_fatal(e.to_string()))?;
            self.header_written = true;
        }

        for &node in &snapshot.node_ids {
            let records = snapshot
                .views
                .get(&node)
                .map(|view| view.iter().map(u64::to_string).collect::<Vec<_>>().join("-"))
                .unwrap_or_default();
            let cluster = snapshot.node_attrs.get(&node).map(|c| c.0).unwrap_or_default();
            writeln!(file, "{node}\t{records}\t{}\t{}\t{cluster}", snapshot.tick, snapshot.run_id)
                .map_err(|e| SinkError::non_fatal(e.to_string()))?;
        }

        Ok(())
    }

    fn emit_info(&mut self, run_id: &str, config: &Config) -> Result<(), SinkError> {
        let dir = self.folder.join(run_id);
        Self::ensure_dir(&dir)?;

        let path = dir.join("info.sim");
        let mut file =
            fs::File::create(&path).map_err(|e| SinkError::fatal(format!("create({path:?}): {e}")))?;
        writeln!(file, "nodes_amount={}", config.nodes_amount).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "ticks={}", config.ticks).map_err(|e| SinkError::fatal(e.to_string()))?;
        writeln!(file, "seed={}", config.seed).map_err(|e| SinkError::fatal(e.to_string()))?;
        Ok(())
    }
}

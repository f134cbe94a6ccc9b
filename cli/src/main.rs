// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Binary entry point: parses CLI flags, wires up a tracing subscriber and
//! a file-based [`pex_core::Sink`], and drives one [`pex_core::ScenarioRunner`]
//! per value of N in the configured sweep.

mod args;
mod sinks;

use std::{fs, io::Write as _, path::PathBuf, process::ExitCode};

use pex_core::{Error, ScenarioRunner, Sink};
use rand::Rng;
use tracing_subscriber::FmtSubscriber;

use args::Options;
use sinks::{file::FileSink, timeseries::TimeSeriesSink};

/// §6 exit codes: 0 on success, non-zero on invalid configuration or a
/// fatal sink error.
const EXIT_CONFIG_ERROR: u8 = 1;
const EXIT_RUNTIME_ERROR: u8 = 2;

const SCENARIO_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SCENARIO_ID_LEN: usize = 16;

fn main() -> ExitCode {
    let options = Options::from_env();

    let subscriber = FmtSubscriber::builder().with_max_level(options.log).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a global tracing subscriber was already installed");
    }

    let folder = options.folder.clone().unwrap_or_else(|| "pex-sim-out".to_owned());
    let timeseries = options.timeseries;
    let min_nodes = options.min_nodes;
    let max_nodes = options.max_nodes;
    let repetitions = options.repetitions;
    let step = options.step;

    let raw_configs = options.into_raw_configs();
    let mut configs = Vec::with_capacity(raw_configs.len());
    for raw in raw_configs {
        match raw.validate() {
            Ok(config) => configs.push(config),
            Err(err) => {
                tracing::error!(%err, "invalid configuration");
                return ExitCode::from(EXIT_CONFIG_ERROR);
            },
        }
    }

    let scenario_id = scenario_token();
    let index_path = PathBuf::from(&folder).join(format!("{scenario_id}.partition.pex.sim"));
    if let Err(err) = write_scenario_index_header(&index_path, min_nodes, max_nodes, repetitions, step) {
        tracing::error!(%err, "failed to write scenario index");
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    }

    for config in &configs {
        let mut sink: Box<dyn Sink> = if timeseries {
            Box::new(TimeSeriesSink::new(PathBuf::from(&folder)))
        } else {
            Box::new(FileSink::new(PathBuf::from(&folder)))
        };

        tracing::info!(nodes = config.nodes_amount, "starting scenario");
        let run_ids = match ScenarioRunner::run(config, sink.as_mut()) {
            Ok(run_ids) => run_ids,
            Err(err) => {
                return match &err {
                    Error::Config(_) => {
                        tracing::error!(%err, "configuration rejected mid-run");
                        ExitCode::from(EXIT_CONFIG_ERROR)
                    },
                    Error::Invariant(_) | Error::Sink(_) => {
                        tracing::error!(%err, "scenario aborted");
                        ExitCode::from(EXIT_RUNTIME_ERROR)
                    },
                    _ => {
                        tracing::error!(%err, "scenario aborted");
                        ExitCode::from(EXIT_RUNTIME_ERROR)
                    },
                };
            },
        };

        if let Err(err) = append_scenario_index_runs(&index_path, &folder, &run_ids) {
            tracing::error!(%err, "failed to write scenario index");
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    ExitCode::SUCCESS
}

fn scenario_token() -> String {
    let mut rng = rand::thread_rng();
    (0..SCENARIO_ID_LEN)
        .map(|_| {
            let i = rng.gen_range(0..SCENARIO_ID_ALPHABET.len());
            SCENARIO_ID_ALPHABET[i] as char
        })
        .collect()
}

/// The scenario index file (§6): a four-token header of
/// `min_nodes max_nodes repetitions step`, named `{id}.partition.pex.sim`
/// so concurrent scenarios don't clobber each other's index.
fn write_scenario_index_header(
    path: &PathBuf,
    min_nodes: u64,
    max_nodes: u64,
    repetitions: u64,
    step: u64,
) -> std::io::Result<()> {
    fs::create_dir_all(path.parent().unwrap_or_else(|| std::path::Path::new(".")))?;
    let mut file = fs::File::create(path)?;
    writeln!(file, "{min_nodes} {max_nodes} {repetitions} {step}")?;
    Ok(())
}

/// Append one `{folder}/{run_id}` line per repetition just completed (§6).
fn append_scenario_index_runs(path: &PathBuf, folder: &str, run_ids: &[String]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new().append(true).open(path)?;
    for run_id in run_ids {
        writeln!(file, "{}", PathBuf::from(folder).join(run_id).display())?;
    }
    Ok(())
}

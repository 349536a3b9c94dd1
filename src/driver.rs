use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::aggregate::{self, COMPUTED_OUT};
use crate::config::SweepConfig;
use crate::reduce::{self, PROCESS_OUT};
use crate::runner::{Capture, CommandRunner};
use crate::sweep;
use crate::types::{BlockSummary, CommandSpec, PublishCommand, SweepReport};

/// Per-invocation inputs that are not part of the sweep configuration.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub tracefile: PathBuf,
    pub ipfile: PathBuf,
    pub work_dir: PathBuf,
    pub skip_run: bool,
    pub strict: bool,
    /// Where the publish client's stdout goes.
    pub client_capture: Capture,
}

/// Hooks for progress output, so the binary can choose where it is printed.
pub trait Progress {
    fn running(&mut self, command: &CommandSpec);
    fn block_appended(&mut self, summary: &BlockSummary);
}

/// Run, reduce and aggregate, in that order.
pub fn run_driver<R: CommandRunner, P: Progress>(
    runner: &mut R,
    config: &SweepConfig,
    options: &DriverOptions,
    progress: &mut P,
) -> Result<SweepReport> {
    let started_at = Utc::now();
    // Built once; the run phase names files by it and aggregation slices by it.
    let plan = config.plan()?;
    info!(
        combinations = plan.combinations.len(),
        count = plan.count,
        "Sweep plan ready"
    );

    let runs = if options.skip_run {
        info!("Skipping run phase");
        Vec::new()
    } else {
        sweep::run_sweep(
            runner,
            config,
            &plan,
            &options.ipfile,
            options.client_capture.clone(),
            |publish: &PublishCommand| progress.running(&publish.command),
        )
    };

    let latency = reduce::latency_command(config, &options.tracefile);
    progress.running(&latency);
    let latency_ok = reduce::reduce_trace(runner, &latency, Path::new(PROCESS_OUT));

    let report_file = options.work_dir.join(COMPUTED_OUT);
    let aggregation = aggregate::aggregate_file(
        &plan,
        &options.work_dir.join(PROCESS_OUT),
        &report_file,
        options.strict,
        |summary| progress.block_appended(summary),
    )?;
    info!(
        blocks = aggregation.blocks.len(),
        report = %report_file.display(),
        "Aggregation complete"
    );

    Ok(SweepReport {
        started_at,
        tracefile: options.tracefile.clone(),
        report_file,
        runs,
        latency_ok,
        data_lines: aggregation.data_lines,
        expected_lines: plan.expected_lines(),
        blocks: aggregation.blocks,
    })
}

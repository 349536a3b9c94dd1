use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One (datasize, frequency) pair of the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combination {
    pub datasize: u64,
    pub frequency: String,
}

impl Combination {
    pub fn new(datasize: u64, frequency: impl Into<String>) -> Self {
        Self {
            datasize,
            frequency: frequency.into(),
        }
    }

    /// Name of the file the publish client writes for this combination.
    pub fn output_file_name(&self) -> String {
        format!("{}-{}-output.txt", self.datasize, self.frequency)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "datasize={}, freq={}", self.datasize, self.frequency)
    }
}

/// Ordered sweep, generated once and shared by the run and aggregation phases.
///
/// Order is datasize-major: every frequency is visited for the first datasize
/// before moving on to the next one. Block `i` of the latency output belongs
/// to `combinations[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub combinations: Vec<Combination>,
    pub count: usize,
}

impl SweepPlan {
    pub fn new(datasizes: &[u64], frequencies: &[String], count: usize) -> Self {
        let combinations = datasizes
            .iter()
            .flat_map(|&datasize| {
                frequencies
                    .iter()
                    .map(move |freq| Combination::new(datasize, freq.clone()))
            })
            .collect();
        Self {
            combinations,
            count,
        }
    }

    /// Number of data lines a complete latency output should contain.
    pub fn expected_lines(&self) -> usize {
        self.combinations.len() * self.count
    }
}

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Space-joined rendering, as printed before execution.
    pub fn display(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }
}

/// Publish client invocation for a single combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCommand {
    pub combination: Combination,
    pub output_file: String,
    pub command: CommandSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub combination: Combination,
    pub output_file: String,
    pub success: bool,
}

/// Per-combination averages over one block of latency rows.
#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub combination: Combination,
    #[serde(skip)]
    pub lines: Vec<String>,
    pub rows: usize,
    pub avg_mean: f64,
    pub avg_p90: f64,
    pub avg_p95: f64,
}

/// Everything a single driver invocation did, for the end-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub tracefile: PathBuf,
    pub report_file: PathBuf,
    pub runs: Vec<RunOutcome>,
    pub latency_ok: bool,
    pub data_lines: usize,
    pub expected_lines: usize,
    pub blocks: Vec<BlockSummary>,
}

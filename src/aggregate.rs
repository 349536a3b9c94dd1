use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use crate::errors::SweepError;
use crate::parse::{self, DataLine};
use crate::types::{BlockSummary, Combination, SweepPlan};

/// Report file, relative to the working directory.
pub const COMPUTED_OUT: &str = "computed.out";

pub fn header_row() -> String {
    format!(
        "{:<10}\t{:<10}\t{:<10}\t{:<10}\t{:<10}\n",
        "msgid", "n", "mean", "p90", "p95"
    )
}

/// Split data lines into one block per combination, in plan order.
///
/// Block `i` covers `[i * count, (i + 1) * count)`, clamped to the lines
/// available, so trailing blocks may be short or empty. Lines beyond the
/// sweep size belong to no block.
pub fn partition<'p, 'l, 'a>(
    plan: &'p SweepPlan,
    lines: &'l [DataLine<'a>],
) -> Vec<(&'p Combination, &'l [DataLine<'a>])> {
    plan.combinations
        .iter()
        .enumerate()
        .map(|(i, combination)| {
            let start = (i * plan.count).min(lines.len());
            let end = (start + plan.count).min(lines.len());
            (combination, &lines[start..end])
        })
        .collect()
}

/// Average the mean/p90/p95 columns of a block. An empty block averages to 0.
pub fn summarize_block(
    combination: &Combination,
    lines: &[DataLine<'_>],
) -> Result<BlockSummary, SweepError> {
    let mut total_mean = 0.0;
    let mut total_p90 = 0.0;
    let mut total_p95 = 0.0;

    for line in lines {
        let row = parse::parse_row(line.text).map_err(|detail| SweepError::MalformedLine {
            line_no: line.line_no,
            text: line.text.to_string(),
            detail,
        })?;
        total_mean += row.mean;
        total_p90 += row.p90;
        total_p95 += row.p95;
    }

    let rows = lines.len();
    let avg = |total: f64| if rows == 0 { 0.0 } else { total / rows as f64 };

    Ok(BlockSummary {
        combination: combination.clone(),
        lines: lines.iter().map(|l| l.text.trim_end().to_string()).collect(),
        rows,
        avg_mean: avg(total_mean),
        avg_p90: avg(total_p90),
        avg_p95: avg(total_p95),
    })
}

pub fn summary_line(summary: &BlockSummary) -> String {
    format!(
        "# datasize={} freq={} avg_mean={:.2} avg_p90={:.2} avg_p95={:.2}\n",
        summary.combination.datasize,
        summary.combination.frequency,
        summary.avg_mean,
        summary.avg_p90,
        summary.avg_p95
    )
}

/// Raw rows, the summary comment and a blank separator line.
pub fn format_block(summary: &BlockSummary) -> String {
    let mut out = String::new();
    for line in &summary.lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&summary_line(summary));
    out.push('\n');
    out
}

/// Compare the data line count with the sweep size.
///
/// A mismatch means blocks will not line up with combinations. It is fatal
/// when `strict`, otherwise only logged.
pub fn check_line_count(plan: &SweepPlan, actual: usize, strict: bool) -> Result<(), SweepError> {
    let expected = plan.expected_lines();
    if actual == expected {
        return Ok(());
    }

    if strict {
        return Err(SweepError::LineCountMismatch {
            actual,
            expected,
            combinations: plan.combinations.len(),
            count: plan.count,
        });
    }

    warn!(
        actual,
        expected,
        "Latency output line count does not match the sweep, blocks may be misaligned"
    );
    Ok(())
}

/// Result of one aggregation pass.
#[derive(Debug)]
pub struct Aggregation {
    /// Data lines found in the latency output, before partitioning.
    pub data_lines: usize,
    pub blocks: Vec<BlockSummary>,
}

/// Aggregate `content` block by block, appending to the report at `report`.
///
/// The header is written first, then each block as soon as it parses. A
/// malformed line aborts before its block is written; earlier blocks stay in
/// the report.
pub fn aggregate(
    plan: &SweepPlan,
    content: &str,
    report: &Path,
    strict: bool,
    mut on_block: impl FnMut(&BlockSummary),
) -> Result<Aggregation> {
    let lines = parse::filter_data_lines(content);
    debug!(data_lines = lines.len(), "Filtered latency output");
    check_line_count(plan, lines.len(), strict)?;

    let report_err = |source: std::io::Error| SweepError::ReportIo {
        path: report.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report)
        .map_err(report_err)?;
    file.write_all(header_row().as_bytes()).map_err(report_err)?;

    let mut blocks = Vec::with_capacity(plan.combinations.len());
    for (combination, block) in partition(plan, &lines) {
        let summary = summarize_block(combination, block)?;
        file.write_all(format_block(&summary).as_bytes())
            .map_err(report_err)?;
        on_block(&summary);
        blocks.push(summary);
    }

    Ok(Aggregation {
        data_lines: lines.len(),
        blocks,
    })
}

/// Read `process_out` and aggregate it into `report`.
pub fn aggregate_file(
    plan: &SweepPlan,
    process_out: &Path,
    report: &Path,
    strict: bool,
    on_block: impl FnMut(&BlockSummary),
) -> Result<Aggregation> {
    let content =
        std::fs::read_to_string(process_out).map_err(|source| SweepError::ProcessOutputRead {
            path: process_out.to_path_buf(),
            source,
        })?;
    aggregate(plan, &content, report, strict, on_block)
}

use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::types::{BlockSummary, CommandSpec, SweepReport};

// Style constants
fn style_label() -> Style {
    Style::new().cyan().bold()
}

fn style_failed() -> Style {
    Style::new().red().bold()
}

/// `Running command: <program> <args...>`, printed before each external command.
pub fn format_running(command: &CommandSpec, stream: Stream) -> String {
    format!(
        "{} {}",
        "Running command:".if_supports_color(stream, |s| s.style(style_label())),
        command.display()
    )
}

/// Progress confirmation after a block has been appended to the report.
pub fn format_block_appended(summary: &BlockSummary, stream: Stream) -> String {
    format!(
        "{} datasize={}, freq={}",
        "Appended averages to trace file:".if_supports_color(stream, |s| s.green()),
        summary.combination.datasize,
        summary.combination.frequency
    )
}

/// Human-readable end-of-run table.
pub fn format_text(report: &SweepReport) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(
        &"Sweep summary:"
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');

    if !report.runs.is_empty() {
        let failed = report.runs.iter().filter(|r| !r.success).count();
        out.push_str(&format!(
            "  runs: {} ({} failed)\n",
            report.runs.len(),
            failed
        ));
    }

    let latency = if report.latency_ok {
        "ok".to_string()
    } else {
        "failed"
            .if_supports_color(Stream::Stdout, |s| s.style(style_failed()))
            .to_string()
    };
    out.push_str(&format!("  latency utility: {}\n", latency));
    out.push_str(&format!(
        "  data lines: {} (expected {})\n\n",
        report.data_lines, report.expected_lines
    ));

    let freq_width = report
        .blocks
        .iter()
        .map(|b| b.combination.frequency.len())
        .max()
        .unwrap_or(0)
        .max(4);

    out.push_str(&format!(
        "  {:>9}  {:<freq_width$}  {:>4}  {:>10}  {:>10}  {:>10}\n",
        "datasize",
        "freq",
        "rows",
        "avg_mean",
        "avg_p90",
        "avg_p95",
        freq_width = freq_width
    ));
    for block in &report.blocks {
        let rows = format!("{:>4}", block.rows);
        let rows = if block.rows == 0 {
            rows.if_supports_color(Stream::Stdout, |s| s.style(style_failed()))
                .to_string()
        } else {
            rows
        };
        out.push_str(&format!(
            "  {:>9}  {:<freq_width$}  {}  {:>10.2}  {:>10.2}  {:>10.2}\n",
            block.combination.datasize,
            block.combination.frequency,
            rows,
            block.avg_mean,
            block.avg_p90,
            block.avg_p95,
            freq_width = freq_width
        ));
    }

    out.push('\n');
    out.push_str(&format!("Report: {}\n", report.report_file.display()));
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a SweepReport,
    failed_runs: usize,
}

pub fn format_json(report: &SweepReport) -> String {
    let json = JsonReport {
        report,
        failed_runs: report.runs.iter().filter(|r| !r.success).count(),
    };
    // SweepReport holds only strings, numbers and paths, none of which fail to serialize.
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Combination, RunOutcome};
    use chrono::Utc;
    use std::path::PathBuf;

    fn make_block(datasize: u64, freq: &str, rows: usize, avg: f64) -> BlockSummary {
        BlockSummary {
            combination: Combination::new(datasize, freq),
            lines: vec!["raw".to_string(); rows],
            rows,
            avg_mean: avg,
            avg_p90: avg * 2.0,
            avg_p95: avg * 3.0,
        }
    }

    fn make_report() -> SweepReport {
        SweepReport {
            started_at: Utc::now(),
            tracefile: PathBuf::from("trace.log"),
            report_file: PathBuf::from("computed.out"),
            runs: vec![
                RunOutcome {
                    combination: Combination::new(3000, "0.5s"),
                    output_file: "3000-0.5s-output.txt".into(),
                    success: true,
                },
                RunOutcome {
                    combination: Combination::new(3000, "1s"),
                    output_file: "3000-1s-output.txt".into(),
                    success: false,
                },
            ],
            latency_ok: true,
            data_lines: 3,
            expected_lines: 4,
            blocks: vec![make_block(3000, "0.5s", 2, 1.5), make_block(3000, "1s", 1, 10.0)],
        }
    }

    #[test]
    fn running_line_contains_full_command() {
        let cmd = CommandSpec::new("python3", vec!["x.py".into(), "-i".into(), "t".into()]);
        let line = format_running(&cmd, Stream::Stdout);
        assert!(line.contains("Running command:"));
        assert!(line.ends_with("python3 x.py -i t"));
    }

    #[test]
    fn block_appended_line() {
        let line = format_block_appended(&make_block(30000, "5s", 5, 1.0), Stream::Stdout);
        assert!(line.contains("Appended averages to trace file:"));
        assert!(line.ends_with("datasize=30000, freq=5s"));
    }

    #[test]
    fn text_summary_lists_every_block() {
        let out = format_text(&make_report());
        assert!(out.contains("runs: 2 (1 failed)"));
        assert!(out.contains("data lines: 3 (expected 4)"));
        assert!(out.contains("0.5s"));
        assert!(out.contains("1.50"));
        assert!(out.contains("30.00"));
        assert!(out.contains("Report: computed.out"));
    }

    #[test]
    fn text_summary_omits_runs_when_skipped() {
        let mut report = make_report();
        report.runs.clear();
        assert!(!format_text(&report).contains("runs:"));
    }

    #[test]
    fn json_summary_fields() {
        let out = format_json(&make_report());
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["failed_runs"], 1);
        assert_eq!(parsed["latency_ok"], true);
        assert_eq!(parsed["data_lines"], 3);
        assert_eq!(parsed["expected_lines"], 4);
        assert!(parsed["started_at"].as_str().unwrap().ends_with('Z'));

        let blocks = parsed["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["combination"]["datasize"], 3000);
        assert_eq!(blocks[0]["combination"]["frequency"], "0.5s");
        assert_eq!(blocks[0]["rows"], 2);
        assert_eq!(blocks[0]["avg_mean"], 1.5);
        // Raw rows stay in computed.out only.
        assert!(blocks[0].get("lines").is_none());
    }
}

//! Parsing of the latency utility's output.
//!
//! The utility prints a few header/comment lines followed by one
//! whitespace-separated row per message id:
//!
//! ```text
//! msgid   n   mean   p90   p95 ...
//! ```

/// A retained row of latency output, with its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine<'a> {
    pub line_no: usize,
    pub text: &'a str,
}

/// The three statistics averaged per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyRow {
    pub mean: f64,
    pub p90: f64,
    pub p95: f64,
}

const MEAN_COLUMN: usize = 2;
const P90_COLUMN: usize = 3;
const P95_COLUMN: usize = 4;

/// A line is data iff it is not blank and does not start with `#` or `msgid`.
///
/// The prefix checks look at the raw line: an indented `#` is still data.
pub fn is_data_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with('#') && !line.starts_with("msgid")
}

pub fn filter_data_lines(content: &str) -> Vec<DataLine<'_>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| is_data_line(line))
        .map(|(i, text)| DataLine {
            line_no: i + 1,
            text,
        })
        .collect()
}

/// Parse the mean, p90 and p95 columns of a data line.
pub fn parse_row(line: &str) -> Result<LatencyRow, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let column = |idx: usize, name: &str| -> Result<f64, String> {
        let field = parts
            .get(idx)
            .ok_or_else(|| format!("missing {} column", name))?;
        field
            .parse::<f64>()
            .map_err(|_| format!("{} column {:?} is not a number", name, field))
    };

    Ok(LatencyRow {
        mean: column(MEAN_COLUMN, "mean")?,
        p90: column(P90_COLUMN, "p90")?,
        p95: column(P95_COLUMN, "p95")?,
    })
}

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("Invalid sweep configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read latency output {path}: {source}")]
    ProcessOutputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write report {path}: {source}")]
    ReportIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed data line {line_no}: {detail} ({text:?})")]
    MalformedLine {
        line_no: usize,
        text: String,
        detail: String,
    },

    #[error(
        "Latency output has {actual} data lines but the sweep expects {expected} \
         ({combinations} combinations x {count})"
    )]
    LineCountMismatch {
        actual: usize,
        expected: usize,
        combinations: usize,
        count: usize,
    },
}

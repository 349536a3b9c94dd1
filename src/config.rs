use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::SweepError;
use crate::types::SweepPlan;

pub const DEFAULT_DATASIZES: [u64; 3] = [3000, 30000, 300000];
pub const DEFAULT_FREQUENCIES: [&str; 3] = ["0.5s", "1s", "5s"];
pub const DEFAULT_COUNT: usize = 5;
pub const DEFAULT_CLIENT: &str = "./p2p_client_multi_streams_publish";
pub const DEFAULT_LATENCY_SCRIPT: &str =
    "../../optimum-infra/utilities/compute-messages-latency-from-trace.py";
pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_TOPIC: &str = "topicA";
pub const DEFAULT_START_INDEX: u32 = 1;
pub const DEFAULT_END_INDEX: u32 = 2;

/// Resolved settings for one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub datasizes: Vec<u64>,
    pub frequencies: Vec<String>,
    pub count: usize,
    pub client: String,
    pub latency_script: String,
    pub python: String,
    pub topic: String,
    pub start_index: u32,
    pub end_index: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            datasizes: DEFAULT_DATASIZES.to_vec(),
            frequencies: DEFAULT_FREQUENCIES.iter().map(|s| s.to_string()).collect(),
            count: DEFAULT_COUNT,
            client: DEFAULT_CLIENT.to_string(),
            latency_script: DEFAULT_LATENCY_SCRIPT.to_string(),
            python: DEFAULT_PYTHON.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            start_index: DEFAULT_START_INDEX,
            end_index: DEFAULT_END_INDEX,
        }
    }
}

/// Partial settings from a TOML file or the command line. Unset fields keep
/// whatever the layer below provided.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub datasizes: Option<Vec<u64>>,
    pub frequencies: Option<Vec<String>>,
    pub count: Option<usize>,
    pub client: Option<String>,
    pub latency_script: Option<String>,
    pub python: Option<String>,
    pub topic: Option<String>,
    pub start_index: Option<u32>,
    pub end_index: Option<u32>,
}

impl ConfigOverrides {
    /// Load overrides from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SweepError> {
        let content = std::fs::read_to_string(path).map_err(|source| SweepError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SweepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SweepConfig {
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.datasizes {
            self.datasizes = v;
        }
        if let Some(v) = overrides.frequencies {
            self.frequencies = v;
        }
        if let Some(v) = overrides.count {
            self.count = v;
        }
        if let Some(v) = overrides.client {
            self.client = v;
        }
        if let Some(v) = overrides.latency_script {
            self.latency_script = v;
        }
        if let Some(v) = overrides.python {
            self.python = v;
        }
        if let Some(v) = overrides.topic {
            self.topic = v;
        }
        if let Some(v) = overrides.start_index {
            self.start_index = v;
        }
        if let Some(v) = overrides.end_index {
            self.end_index = v;
        }
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        let invalid = |detail: &str| SweepError::InvalidConfig {
            detail: detail.to_string(),
        };

        if self.datasizes.is_empty() {
            return Err(invalid("datasizes must not be empty"));
        }
        if self.datasizes.contains(&0) {
            return Err(invalid("datasizes must be positive"));
        }
        if self.frequencies.is_empty() {
            return Err(invalid("frequencies must not be empty"));
        }
        // Frequencies end up in output file names and on the client's command line.
        for freq in &self.frequencies {
            if freq.is_empty()
                || freq.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\')
            {
                return Err(SweepError::InvalidConfig {
                    detail: format!("invalid frequency {:?}", freq),
                });
            }
        }
        if self.count == 0 {
            return Err(invalid("count must be at least 1"));
        }
        if self.client.is_empty() {
            return Err(invalid("client path must not be empty"));
        }
        if self.python.is_empty() {
            return Err(invalid("python interpreter must not be empty"));
        }
        Ok(())
    }

    /// Validate and build the ordered sweep.
    pub fn plan(&self) -> Result<SweepPlan, SweepError> {
        self.validate()?;
        Ok(SweepPlan::new(&self.datasizes, &self.frequencies, self.count))
    }
}

/// `<config dir>/p2p-sweep/sweep.toml`, e.g. `~/.config/p2p-sweep/sweep.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("p2p-sweep").join("sweep.toml"))
}

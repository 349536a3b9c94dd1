use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{ArgAction, Parser};
use owo_colors::Stream;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use p2p_sweep::config::{ConfigOverrides, SweepConfig, default_config_path};
use p2p_sweep::display;
use p2p_sweep::driver::{self, DriverOptions, Progress};
use p2p_sweep::normalize_go_flags;
use p2p_sweep::runner::{Capture, ProcessRunner};
use p2p_sweep::types::{BlockSummary, CommandSpec};

#[derive(Parser)]
#[command(
    name = "p2p-sweep",
    version,
    args_override_self = true,
    about = "Run p2p_client_multi_streams_publish with variable datasize and frequency"
)]
struct Cli {
    /// Path to the trace output file
    #[arg(long)]
    tracefile: PathBuf,

    /// Path to file with the p2p node IPs
    #[arg(long)]
    ipfile: PathBuf,

    /// TOML file with sweep settings (default: <config dir>/p2p-sweep/sweep.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated payload sizes in bytes
    #[arg(long, value_delimiter = ',')]
    datasizes: Option<Vec<u64>>,

    /// Comma-separated send intervals, e.g. 0.5s,1s,5s
    #[arg(long, value_delimiter = ',')]
    frequencies: Option<Vec<String>>,

    /// Messages published per combination
    #[arg(long)]
    count: Option<usize>,

    /// Publish client executable
    #[arg(long)]
    client: Option<String>,

    /// Latency computation script
    #[arg(long)]
    latency_script: Option<String>,

    /// Interpreter for the latency script
    #[arg(long)]
    python: Option<String>,

    #[arg(long)]
    topic: Option<String>,

    /// Directory the tools run in and the output files are written to
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Only reduce and aggregate an existing trace
    #[arg(long)]
    skip_run: bool,

    /// Fail if the latency output does not have exactly one block per combination
    #[arg(long)]
    strict: bool,

    /// Print a JSON summary on stdout; progress goes to stderr
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            datasizes: self.datasizes.clone(),
            frequencies: self.frequencies.clone(),
            count: self.count,
            client: self.client.clone(),
            latency_script: self.latency_script.clone(),
            python: self.python.clone(),
            topic: self.topic.clone(),
            start_index: None,
            end_index: None,
        }
    }
}

/// Prints progress to stdout, or to stderr when stdout carries JSON.
struct ConsoleProgress {
    to_stderr: bool,
}

impl ConsoleProgress {
    fn stream(&self) -> Stream {
        if self.to_stderr {
            Stream::Stderr
        } else {
            Stream::Stdout
        }
    }

    fn emit(&self, line: String) {
        if self.to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

impl Progress for ConsoleProgress {
    fn running(&mut self, command: &CommandSpec) {
        self.emit(display::format_running(command, self.stream()));
    }

    fn block_appended(&mut self, summary: &BlockSummary) {
        self.emit(display::format_block_appended(summary, self.stream()));
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<SweepConfig> {
    let mut config = SweepConfig::default();

    let file = match &cli.config {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|p| p.is_file()),
    };
    if let Some(path) = file {
        debug!(path = %path.display(), "Loading config file");
        config.apply(ConfigOverrides::load(&path)?);
    }

    config.apply(cli.overrides());
    Ok(config)
}

fn run() -> Result<()> {
    let cli = Cli::parse_from(normalize_go_flags(std::env::args_os()));
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    info!(
        tracefile = %cli.tracefile.display(),
        ipfile = %cli.ipfile.display(),
        work_dir = %cli.work_dir.display(),
        "Starting sweep"
    );

    let options = DriverOptions {
        tracefile: cli.tracefile.clone(),
        ipfile: cli.ipfile.clone(),
        work_dir: cli.work_dir.clone(),
        skip_run: cli.skip_run,
        strict: cli.strict,
        client_capture: if cli.json {
            Capture::Stderr
        } else {
            Capture::Inherit
        },
    };
    let mut progress = ConsoleProgress {
        to_stderr: cli.json,
    };
    let mut runner = ProcessRunner::new(&cli.work_dir);

    let report = driver::run_driver(&mut runner, &config, &options, &mut progress)?;

    if cli.json {
        print!("{}", display::format_json(&report));
    } else {
        print!("{}", display::format_text(&report));
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}

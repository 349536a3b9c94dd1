use std::path::Path;

use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::runner::{Capture, CommandRunner};
use crate::types::CommandSpec;

/// Captured latency utility output, relative to the working directory.
pub const PROCESS_OUT: &str = "process.out";

pub fn latency_command(config: &SweepConfig, tracefile: &Path) -> CommandSpec {
    CommandSpec::new(
        config.python.clone(),
        vec![
            config.latency_script.clone(),
            "-i".to_string(),
            tracefile.to_string_lossy().into_owned(),
        ],
    )
}

/// Run the latency utility once, writing its combined stdout/stderr to
/// `process_out`. Failures are logged, never returned: aggregation reads
/// whatever ended up in the file.
pub fn reduce_trace<R: CommandRunner>(
    runner: &mut R,
    command: &CommandSpec,
    process_out: &Path,
) -> bool {
    match runner.run(command, Capture::File(process_out.to_path_buf())) {
        Ok(true) => {
            info!(output = %process_out.display(), "Latency utility finished");
            true
        }
        Ok(false) => {
            warn!(output = %process_out.display(), "Latency utility exited with failure");
            false
        }
        Err(e) => {
            warn!(error = %e, "Failed to start latency utility");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::tests::RecordingRunner;
    use std::path::PathBuf;

    #[test]
    fn latency_command_matches_utility_contract() {
        let config = SweepConfig::default();
        let cmd = latency_command(&config, Path::new("trace.log"));
        assert_eq!(
            cmd.display(),
            "python3 ../../optimum-infra/utilities/compute-messages-latency-from-trace.py -i trace.log"
        );
    }

    #[test]
    fn latency_command_uses_configured_interpreter_and_script() {
        let config = SweepConfig {
            python: "/usr/bin/python3.12".into(),
            latency_script: "latency.py".into(),
            ..Default::default()
        };
        let cmd = latency_command(&config, Path::new("t"));
        assert_eq!(cmd.program, "/usr/bin/python3.12");
        assert_eq!(cmd.args, vec!["latency.py", "-i", "t"]);
    }

    #[test]
    fn reduce_captures_into_process_out() {
        let mut runner = RecordingRunner::default();
        let cmd = latency_command(&SweepConfig::default(), Path::new("trace.log"));

        assert!(reduce_trace(&mut runner, &cmd, Path::new(PROCESS_OUT)));
        assert_eq!(runner.calls.len(), 1);
        assert_eq!(runner.calls[0].1, Capture::File(PathBuf::from("process.out")));
    }

    #[test]
    fn reduce_failure_is_not_an_error() {
        let mut runner = RecordingRunner::default();
        runner.results.push_back(Ok(false));
        runner.results.push_back(Err(std::io::Error::other("boom")));
        let cmd = latency_command(&SweepConfig::default(), Path::new("trace.log"));

        assert!(!reduce_trace(&mut runner, &cmd, Path::new(PROCESS_OUT)));
        assert!(!reduce_trace(&mut runner, &cmd, Path::new(PROCESS_OUT)));
    }
}

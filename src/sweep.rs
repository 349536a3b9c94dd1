use std::path::Path;

use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::runner::{Capture, CommandRunner};
use crate::types::{Combination, CommandSpec, PublishCommand, RunOutcome, SweepPlan};

/// Build the publish client invocation for one combination.
pub fn publish_command(
    config: &SweepConfig,
    ipfile: &Path,
    count: usize,
    combination: &Combination,
) -> PublishCommand {
    let output_file = combination.output_file_name();
    let args = vec![
        "-start-index".to_string(),
        config.start_index.to_string(),
        "-end-index".to_string(),
        config.end_index.to_string(),
        "-ipfile".to_string(),
        ipfile.to_string_lossy().into_owned(),
        "-topic".to_string(),
        config.topic.clone(),
        "-count".to_string(),
        count.to_string(),
        "-sleep".to_string(),
        combination.frequency.clone(),
        "-datasize".to_string(),
        combination.datasize.to_string(),
        "-output".to_string(),
        output_file.clone(),
    ];

    PublishCommand {
        combination: combination.clone(),
        output_file,
        command: CommandSpec::new(config.client.clone(), args),
    }
}

/// Run the publish client once per combination, in plan order.
///
/// Each run blocks until the client exits. A failed or unstartable run is
/// logged and the sweep moves on.
pub fn run_sweep<R: CommandRunner>(
    runner: &mut R,
    config: &SweepConfig,
    plan: &SweepPlan,
    ipfile: &Path,
    capture: Capture,
    mut on_start: impl FnMut(&PublishCommand),
) -> Vec<RunOutcome> {
    let mut outcomes = Vec::with_capacity(plan.combinations.len());

    for combination in &plan.combinations {
        let publish = publish_command(config, ipfile, plan.count, combination);
        on_start(&publish);

        let success = match runner.run(&publish.command, capture.clone()) {
            Ok(true) => {
                info!(
                    datasize = combination.datasize,
                    freq = %combination.frequency,
                    output = %publish.output_file,
                    "Publish run finished"
                );
                true
            }
            Ok(false) => {
                warn!(
                    datasize = combination.datasize,
                    freq = %combination.frequency,
                    "Publish client exited with failure, continuing sweep"
                );
                false
            }
            Err(e) => {
                warn!(
                    datasize = combination.datasize,
                    freq = %combination.frequency,
                    error = %e,
                    "Failed to start publish client, continuing sweep"
                );
                false
            }
        };

        outcomes.push(RunOutcome {
            combination: combination.clone(),
            output_file: publish.output_file,
            success,
        });
    }

    outcomes
}

//! Command lines of the external collaborators.

use hybridlab_flow::actions::command::CommandAction;

use crate::config::ExperimentConfig;
use crate::layout;
use crate::scenario::Scenario;

fn tool_action(argv: &[String], tool: &str) -> CommandAction {
    if argv.is_empty() {
        panic!("Error: {} command line is empty", tool);
    }
    CommandAction::from_argv(argv)
}

/// Optimizer invocation for one scenario. The optimizer resolves the pricing
/// CSVs and the workload directory against its working directory and names
/// its outputs after the scenario code.
pub fn optimizer(config: &ExperimentConfig, scenario: &Scenario, workloads_dir: Option<&str>) -> CommandAction {
    let mut action = tool_action(&config.optimizer, "optimizer")
        .arg("--n-apps")
        .arg(config.n_apps.to_string())
        .arg("--first-app")
        .arg(config.first_app.to_string())
        .arg("--perf-factor")
        .arg(config.perf_factor.to_string())
        .arg("--quant-factor")
        .arg(config.quant_factor.to_string())
        .arg("--output-prefix")
        .arg("opt")
        .arg("--priv-n")
        .arg(scenario.priv_new.to_string())
        .arg("--priv-prev-n")
        .arg(scenario.priv_prev.to_string())
        .arg("--priv-ecus")
        .arg(scenario.priv_ecus.to_string())
        .arg("--priv-cost")
        .arg(scenario.priv_cost.to_string())
        .arg("--scenario")
        .arg(&scenario.code);
    if let Some(dir) = workloads_dir {
        action = action.arg("--workloads").arg(dir);
    }
    action.current_dir(&config.root)
}

/// Simulator invocation replaying one solution against one workload method.
/// Its stdout/stderr go to the per-run log file.
pub fn simulator(config: &ExperimentConfig, code: &str, method: &str) -> CommandAction {
    let mut action = tool_action(&config.simulator, "simulator")
        .arg("--solution")
        .arg(layout::solution_file_rel(code))
        .arg("--workloads")
        .arg(layout::second_prefix_rel(method))
        .arg("--period")
        .arg(config.sim_period.to_string())
        .arg("--output-prefix")
        .arg(format!("{}_{}", code, method))
        .arg("--output-dir")
        .arg(layout::SIM_RESULTS_DIR_REL)
        .arg("--duration")
        .arg(config.sim_duration.to_string());
    if config.save_events {
        action = action.arg("--save-evs");
    }
    if config.save_utilization {
        action = action.arg("--save-utils");
    }
    action
        .current_dir(&config.root)
        .log_to(layout::sim_log_file(config, code, method))
}

/// Resampler invocation converting one per-second trace into hourly buckets
/// using the percentile within each hour.
pub fn resampler(config: &ExperimentConfig, percentile: f64, code: &str, app: usize) -> CommandAction {
    tool_action(&config.resampler, "resampler")
        .arg("--percentile")
        .arg(percentile.to_string())
        .arg(layout::second_file_rel(&config.resample_method, app))
        .arg(layout::resampled_file_rel(code, app))
        .current_dir(&config.root)
}

#[cfg(test)]
mod tests {
    use crate::scenario::{default_scenarios, percentile_scenario};

    use super::*;

    #[test]
    fn test_optimizer_flags() {
        let config = ExperimentConfig::default();
        let rendered = optimizer(&config, &default_scenarios()[1], None).rendered();
        assert!(rendered.starts_with("python3 hybrid.py"));
        assert!(rendered.contains("--n-apps 4"));
        assert!(rendered.contains("--first-app 0"));
        assert!(rendered.contains("--output-prefix opt"));
        assert!(rendered.contains("--priv-n 20"));
        assert!(rendered.contains("--priv-prev-n 0"));
        assert!(rendered.contains("--priv-ecus 14"));
        assert!(rendered.contains("--priv-cost 0.28"));
        assert!(rendered.contains("--scenario new20"));
        assert!(!rendered.contains("--workloads"));
    }

    #[test]
    fn test_optimizer_workloads_dir_override() {
        let config = ExperimentConfig::default();
        let scenario = percentile_scenario(0.95);
        let rendered = optimizer(&config, &scenario, Some("workloads/hours_p95")).rendered();
        assert!(rendered.contains("--scenario p95"));
        assert!(rendered.ends_with("--workloads workloads/hours_p95"));
    }

    #[test]
    fn test_simulator_flags() {
        let config = ExperimentConfig::default();
        let rendered = simulator(&config, "od", "smooth").rendered();
        assert!(rendered.contains("--solution sols/od_sol.p"));
        assert!(rendered.contains("--workloads workloads/seconds/smooth/wl"));
        assert!(rendered.contains("--period 1"));
        assert!(rendered.contains("--output-prefix od_smooth"));
        assert!(rendered.contains("--output-dir results/sim"));
        assert!(rendered.contains("--duration 86400"));
        assert!(rendered.contains("--save-evs"));
        assert!(rendered.contains("--save-utils"));
    }

    #[test]
    fn test_simulator_trace_flags_off() {
        let config = ExperimentConfig {
            save_events: false,
            save_utilization: false,
            ..ExperimentConfig::default()
        };
        let rendered = simulator(&config, "od", "smooth").rendered();
        assert!(!rendered.contains("--save-evs"));
        assert!(!rendered.contains("--save-utils"));
    }

    #[test]
    fn test_resampler_line() {
        let config = ExperimentConfig::default();
        let rendered = resampler(&config, 0.95, "p95", 2).rendered();
        assert_eq!(
            rendered,
            "python3 resample_load.py --percentile 0.95 \
             workloads/seconds/uniform/wl2.csv workloads/hours_p95/wl2.csv"
        );
    }
}

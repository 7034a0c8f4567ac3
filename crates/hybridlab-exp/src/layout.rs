//! File layout of the experiment tree.
//!
//! The external tools run with the experiment root as working directory and
//! address files by root-relative paths, while the task graph needs the same
//! files as full paths. The `*_rel` functions build the relative form, the
//! remaining functions resolve it under `config.root`.

use std::path::PathBuf;

use crate::config::ExperimentConfig;

pub fn workloads_dir(config: &ExperimentConfig) -> PathBuf {
    config.root.join("workloads")
}

pub fn hour_file(config: &ExperimentConfig, app: usize) -> PathBuf {
    config.root.join(format!("workloads/hours/wl{}.csv", app))
}

pub fn second_file_rel(method: &str, app: usize) -> String {
    format!("workloads/seconds/{}/wl{}.csv", method, app)
}

pub fn second_file(config: &ExperimentConfig, method: &str, app: usize) -> PathBuf {
    config.root.join(second_file_rel(method, app))
}

/// Workload path prefix the simulator expands with `{app}.csv`.
pub fn second_prefix_rel(method: &str) -> String {
    format!("workloads/seconds/{}/wl", method)
}

pub fn resampled_dir_rel(code: &str) -> String {
    format!("workloads/hours_{}", code)
}

pub fn resampled_file_rel(code: &str, app: usize) -> String {
    format!("workloads/hours_{}/wl{}.csv", code, app)
}

pub fn resampled_file(config: &ExperimentConfig, code: &str, app: usize) -> PathBuf {
    config.root.join(resampled_file_rel(code, app))
}

pub fn ec2_data_file(config: &ExperimentConfig) -> PathBuf {
    config.root.join("amazon_ec2_data.csv")
}

pub fn s3_data_file(config: &ExperimentConfig) -> PathBuf {
    config.root.join("amazon_s3_data.csv")
}

pub fn solution_file_rel(code: &str) -> String {
    format!("sols/{}_sol.p", code)
}

pub fn solution_file(config: &ExperimentConfig, code: &str) -> PathBuf {
    config.root.join(solution_file_rel(code))
}

pub fn opt_result_file(config: &ExperimentConfig, code: &str) -> PathBuf {
    config.root.join(format!("results/opt/{}_opt.csv", code))
}

pub const SIM_RESULTS_DIR_REL: &str = "results/sim";

pub fn sim_result_file(config: &ExperimentConfig, code: &str, method: &str) -> PathBuf {
    config.root.join(format!("results/sim/{}_{}.csv", code, method))
}

pub fn sim_log_file(config: &ExperimentConfig, code: &str, method: &str) -> PathBuf {
    config.root.join(format!("results/sim/{}_{}.log", code, method))
}

pub fn optimization_summary(config: &ExperimentConfig) -> PathBuf {
    config.root.join("results/optimization_summary.csv")
}

pub fn simulation_summary(config: &ExperimentConfig) -> PathBuf {
    config.root.join("results/simulation_summary.csv")
}

pub fn percentile_summary(config: &ExperimentConfig) -> PathBuf {
    config.root.join("results/percentile_summary.csv")
}

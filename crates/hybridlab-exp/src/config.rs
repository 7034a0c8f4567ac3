//! Experiment configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scenario::{default_scenarios, Scenario};

/// Holds raw experiment config parsed from YAML file.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
struct RawExperimentConfig {
    pub root: Option<PathBuf>,
    pub workload_archive: Option<PathBuf>,
    pub ec2_data_archive: Option<PathBuf>,
    pub s3_data_archive: Option<PathBuf>,
    pub apps: Option<usize>,
    pub n_apps: Option<usize>,
    pub first_app: Option<usize>,
    pub perf_factor: Option<u32>,
    pub quant_factor: Option<u32>,
    pub methods: Option<Vec<String>>,
    pub percentiles: Option<Vec<f64>>,
    pub resample_method: Option<String>,
    pub optimizer: Option<Vec<String>>,
    pub simulator: Option<Vec<String>>,
    pub resampler: Option<Vec<String>>,
    pub sim_period: Option<u64>,
    pub sim_duration: Option<u64>,
    pub save_events: Option<bool>,
    pub save_utilization: Option<bool>,
    pub scenarios: Option<Vec<Scenario>>,
}

/// Represents experiment configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ExperimentConfig {
    /// Experiment working directory. All other paths are resolved under it,
    /// and the external tools are executed with it as working directory.
    pub root: PathBuf,
    /// Archive with the workload traces.
    pub workload_archive: PathBuf,
    /// Gzipped CSV with EC2 instance types, capacities and prices.
    pub ec2_data_archive: PathBuf,
    /// Gzipped CSV with S3 prices per region.
    pub s3_data_archive: PathBuf,
    /// Number of applications (one workload trace per application).
    pub apps: usize,
    /// Number of applications passed to the optimizer (defaults to `apps`).
    pub n_apps: usize,
    /// Index of the first application passed to the optimizer.
    pub first_app: usize,
    /// Performance scaling factor passed to the optimizer.
    pub perf_factor: u32,
    /// Quantization factor passed to the optimizer.
    pub quant_factor: u32,
    /// Workload synthesis methods the simulator replays against.
    pub methods: Vec<String>,
    /// Percentiles of the resampled-workload study.
    pub percentiles: Vec<f64>,
    /// Synthesis method of the per-second traces used for resampling.
    pub resample_method: String,
    /// Command line prefix of the external optimizer.
    pub optimizer: Vec<String>,
    /// Command line prefix of the external simulator.
    pub simulator: Vec<String>,
    /// Command line prefix of the external workload resampler.
    pub resampler: Vec<String>,
    /// Workload sampling period in seconds passed to the simulator.
    pub sim_period: u64,
    /// Total simulated duration in seconds.
    pub sim_duration: u64,
    /// Whether the simulator saves the event trace.
    pub save_events: bool,
    /// Whether the simulator saves the utilization trace.
    pub save_utilization: bool,
    /// Private-cloud scenarios to optimize and simulate.
    pub scenarios: Vec<Scenario>,
}

impl ExperimentConfig {
    /// Creates experiment config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Self {
        let raw: RawExperimentConfig = serde_yaml::from_str(
            &std::fs::read_to_string(file_name).unwrap_or_else(|_| panic!("Can't read file {}", file_name)),
        )
        .unwrap_or_else(|err| panic!("Can't parse YAML from file {}: {}", file_name, err));
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawExperimentConfig) -> Self {
        let apps = raw.apps.unwrap_or(4);
        Self {
            root: raw.root.unwrap_or_else(|| PathBuf::from(".")),
            workload_archive: raw.workload_archive.unwrap_or_else(|| PathBuf::from("workloads.tar.gz")),
            ec2_data_archive: raw
                .ec2_data_archive
                .unwrap_or_else(|| PathBuf::from("amazon_ec2_data.csv.gz")),
            s3_data_archive: raw
                .s3_data_archive
                .unwrap_or_else(|| PathBuf::from("amazon_s3_data.csv.gz")),
            apps,
            n_apps: raw.n_apps.unwrap_or(apps),
            first_app: raw.first_app.unwrap_or(0),
            perf_factor: raw.perf_factor.unwrap_or(1),
            quant_factor: raw.quant_factor.unwrap_or(1),
            methods: raw
                .methods
                .unwrap_or_else(|| vec!["smooth".to_string(), "uniform".to_string()]),
            percentiles: raw.percentiles.unwrap_or_else(|| vec![0.5, 0.9, 0.95, 0.99, 1.0]),
            resample_method: raw.resample_method.unwrap_or_else(|| "uniform".to_string()),
            optimizer: raw
                .optimizer
                .unwrap_or_else(|| vec!["python3".to_string(), "hybrid.py".to_string()]),
            simulator: raw
                .simulator
                .unwrap_or_else(|| vec!["python3".to_string(), "simulate.py".to_string()]),
            resampler: raw
                .resampler
                .unwrap_or_else(|| vec!["python3".to_string(), "resample_load.py".to_string()]),
            sim_period: raw.sim_period.unwrap_or(1),
            sim_duration: raw.sim_duration.unwrap_or(86400),
            save_events: raw.save_events.unwrap_or(true),
            save_utilization: raw.save_utilization.unwrap_or(true),
            scenarios: raw.scenarios.unwrap_or_else(default_scenarios),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::from_raw(RawExperimentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.apps, 4);
        assert_eq!(config.n_apps, 4);
        assert_eq!(config.methods, vec!["smooth", "uniform"]);
        assert_eq!(config.resample_method, "uniform");
        assert_eq!(config.scenarios.len(), 5);
        assert!(config.save_events);
    }

    #[test]
    fn test_from_file_overrides() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("experiment.yaml");
        fs::write(
            &file,
            concat!(
                "root: /data/exp\n",
                "apps: 2\n",
                "methods: [uniform]\n",
                "optimizer: [./opt]\n",
                "scenarios:\n",
                "  - code: tiny\n",
                "    priv_new: 1\n",
                "    priv_prev: 0\n",
                "    priv_ecus: 14\n",
                "    priv_cost: 0.28\n",
            ),
        )
        .unwrap();
        let config = ExperimentConfig::from_file(file.to_str().unwrap());
        assert_eq!(config.root, PathBuf::from("/data/exp"));
        assert_eq!(config.apps, 2);
        // n_apps follows apps unless set explicitly
        assert_eq!(config.n_apps, 2);
        assert_eq!(config.methods, vec!["uniform"]);
        assert_eq!(config.optimizer, vec!["./opt"]);
        assert_eq!(config.scenarios, vec![Scenario::new("tiny", 1, 0, 14, 0.28)]);
        // untouched knobs keep their defaults
        assert_eq!(config.sim_duration, 86400);
    }
}

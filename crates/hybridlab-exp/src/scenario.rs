//! Scenario parameter tables.

use serde::{Deserialize, Serialize};

/// Private-cloud capacity plan driving one optimizer run.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Scenario {
    /// Short code used to name the scenario's artifacts.
    pub code: String,
    /// Number of newly provisioned private nodes.
    pub priv_new: u32,
    /// Number of pre-existing private nodes.
    pub priv_prev: u32,
    /// Compute capacity units of one private node.
    pub priv_ecus: u32,
    /// Hourly cost of one new private node in dollars.
    pub priv_cost: f64,
}

impl Scenario {
    pub fn new(code: &str, priv_new: u32, priv_prev: u32, priv_ecus: u32, priv_cost: f64) -> Self {
        Self {
            code: code.to_string(),
            priv_new,
            priv_prev,
            priv_ecus,
            priv_cost,
        }
    }
}

/// The built-in scenario table: on-demand only, growing shares of newly
/// bought private nodes, previously bought private nodes, and a mix of both.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("od", 0, 0, 14, 0.28),
        Scenario::new("new20", 20, 0, 14, 0.28),
        Scenario::new("new40", 40, 0, 14, 0.28),
        Scenario::new("prev20", 0, 20, 14, 0.28),
        Scenario::new("mix20", 10, 10, 14, 0.28),
    ]
}

/// Scenario code of a percentile-resampled workload, e.g. `0.95 -> "p95"`.
pub fn percentile_code(percentile: f64) -> String {
    format!("p{}", (percentile * 100.0).round() as u32)
}

/// Percentile runs reuse the capacity plan of the `new20` scenario; only the
/// workload fed to the optimizer changes.
pub fn percentile_scenario(percentile: f64) -> Scenario {
    Scenario::new(&percentile_code(percentile), 20, 0, 14, 0.28)
}

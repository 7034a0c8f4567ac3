//! Experiment suite comparing cost-optimization strategies for hybrid cloud
//! deployments.
//!
//! The suite does not implement any optimization or simulation itself: it
//! builds file-dependency task graphs that unpack the input datasets, invoke
//! an external optimizer per scenario, replay the solutions with an external
//! simulator, and aggregate the per-scenario CSV outputs into summary tables.

pub mod config;
pub mod layout;
pub mod pipeline;
pub mod scenario;
pub mod summary;
pub mod tools;

//! A library for describing and running file-based build graphs.
//!
//! Tasks declare the files they read and write; the graph derives the
//! dependency edges from the shared paths and the executor runs the ready
//! tasks on a thread pool, skipping tasks whose outputs are already newer
//! than their inputs.

pub mod action;
pub mod actions;
pub mod artifact;
pub mod error;
pub mod executor;
pub mod graph;
pub mod task;

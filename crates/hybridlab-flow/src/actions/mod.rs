//! Ready-made task actions.

pub mod archive;
pub mod command;

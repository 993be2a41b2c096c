//! Command implementations

pub mod demo;
pub mod predict;
pub mod status;

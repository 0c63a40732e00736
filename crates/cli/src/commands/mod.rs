//! Command implementations

pub mod predict;
pub mod train;

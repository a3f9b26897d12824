//! Shared infrastructure for the cellmap workspace.

pub mod telemetry;

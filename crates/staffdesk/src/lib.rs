//! Faculty absence reporting with automatic substitute assignment.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

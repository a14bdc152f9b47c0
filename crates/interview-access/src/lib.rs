//! Grants or revokes a privilege based on interview panel participation.

pub mod access;
pub mod config;
pub mod error;
pub mod telemetry;

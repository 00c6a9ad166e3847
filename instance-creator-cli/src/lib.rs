//! Operator tooling for `instance-creator`: show where the artifact root is
//! and which candidate names a scan would see.

pub mod cli;
pub mod logging;

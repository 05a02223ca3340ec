//! Port traits: the boundaries between the engine and its data, clock
//! and configuration sources.

pub mod clock_port;
pub mod config_port;
pub mod data_port;

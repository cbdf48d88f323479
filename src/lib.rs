//! Traffic Flow Library
//!
//! Simulates vehicle flow and traffic-light cycling over a small directed
//! road network whose state lives in a flat key=value store.

pub mod simulation;
pub mod store;

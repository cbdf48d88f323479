//! Discrete-time road traffic simulation
//!
//! This module contains the simulation logic: the road network, the traffic
//! light cycle, vehicle injection and movement, and the end-of-run metrics.
//! It reads and writes state only through [`crate::store`].

mod config;
mod flow;
mod metrics;
mod road_network;
mod sample;
mod traffic_light;
mod types;
mod world;

// Re-export public types for external use
pub use config::{
    parse_int, SimConfig, DEFAULT_FIXED_YELLOW_TIME, DEFAULT_NUMBER_OF_ROADS,
    DEFAULT_SIMULATION_STEP, KEY_AVERAGE_WAIT_TIME, KEY_CURRENT_TIME, KEY_FIXED_YELLOW_TIME,
    KEY_MAP_NAME, KEY_MOST_CONGESTED_ROAD, KEY_NUMBER_OF_ROADS, KEY_SIMULATION_STEP,
    KEY_TOTAL_VEHICLES,
};
pub use flow::{inject, move_vehicles, vehicles_per_step, Injection, Movement};
pub use metrics::{Metrics, StepReport};
pub use road_network::SimRoadNetwork;
pub use sample::{init_store, SAMPLE_STORE};
pub use traffic_light::{advance as advance_light, LightTiming};
pub use types::{
    LightColor, RoadDefaults, RoadId, RoadRuntime, SimRoad, DEFAULT_MAX_CAPACITY,
    SECONDS_PER_MINUTE,
};
pub use world::{run_store_file, RunOutcome, SimWorld};

//! Simulation-wide configuration read from the store

use crate::store::Store;

/// Default values for the scalar store keys
pub const DEFAULT_NUMBER_OF_ROADS: u64 = 2;
pub const DEFAULT_SIMULATION_STEP: u64 = 5;
pub const DEFAULT_FIXED_YELLOW_TIME: i64 = 4;

/// Store keys for the scalar configuration and summary fields
pub const KEY_MAP_NAME: &str = "mapName";
pub const KEY_NUMBER_OF_ROADS: &str = "numberOfRoads";
pub const KEY_SIMULATION_STEP: &str = "simulationStep";
pub const KEY_CURRENT_TIME: &str = "currentSimulationTime";
pub const KEY_FIXED_YELLOW_TIME: &str = "fixedYellowTime";
pub const KEY_TOTAL_VEHICLES: &str = "totalVehicles";
pub const KEY_AVERAGE_WAIT_TIME: &str = "averageWaitTime";
pub const KEY_MOST_CONGESTED_ROAD: &str = "mostCongestedRoad";

/// Configuration for one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub map_name: Option<String>,
    /// Roads `1..=number_of_roads` make up the network
    pub number_of_roads: u64,
    /// Simulated seconds per step
    pub step_seconds: u64,
    /// Yellow phase length, shared by every road
    pub fixed_yellow_time: i64,
    /// Running clock, advanced by `step_seconds` each step
    pub current_time: i64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_name: None,
            number_of_roads: DEFAULT_NUMBER_OF_ROADS,
            step_seconds: DEFAULT_SIMULATION_STEP,
            fixed_yellow_time: DEFAULT_FIXED_YELLOW_TIME,
            current_time: 0,
        }
    }
}

impl SimConfig {
    /// Read the configuration from a decoded store
    ///
    /// Missing or unparsable values take the defaults; road count, step and
    /// yellow time are raised to at least 1.
    pub fn from_store(store: &Store) -> Self {
        let defaults = Self::default();
        let int = |key: &str, default: i64| store.get(key).and_then(parse_int).unwrap_or(default);

        Self {
            map_name: store.get(KEY_MAP_NAME).map(str::to_string),
            number_of_roads: int(KEY_NUMBER_OF_ROADS, defaults.number_of_roads as i64).max(1) as u64,
            step_seconds: int(KEY_SIMULATION_STEP, defaults.step_seconds as i64).max(1) as u64,
            fixed_yellow_time: int(KEY_FIXED_YELLOW_TIME, defaults.fixed_yellow_time).max(1),
            current_time: int(KEY_CURRENT_TIME, defaults.current_time),
        }
    }

    /// Step length as a signed quantity, for light timers
    pub fn step_secs_signed(&self) -> i64 {
        i64::try_from(self.step_seconds).unwrap_or(i64::MAX)
    }
}

/// Parse an integer store value, accepting decimal forms like `"30.0"`
///
/// The value goes through a float parse and is truncated toward zero.
/// Non-numeric and non-finite values yield `None`.
pub fn parse_int(value: &str) -> Option<i64> {
    let parsed: f64 = value.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(parsed.trunc() as i64)
}

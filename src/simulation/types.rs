//! Core types for the traffic simulation

use std::fmt;

/// Identifier of a road segment
///
/// Destination ids may name roads outside the network, so any integer the
/// store supplies is a valid `RoadId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoadId(pub i64);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of a road's traffic light
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightColor {
    Green,
    Yellow,
    Red,
    /// Any color the store supplied that is not one of the three phases.
    /// Kept verbatim until the light next changes, and never lets traffic out.
    Unknown(String),
}

impl LightColor {
    /// Parse a store value, case-insensitively
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "green" => LightColor::Green,
            "yellow" => LightColor::Yellow,
            "red" => LightColor::Red,
            other => LightColor::Unknown(other.to_string()),
        }
    }

    /// Whether vehicles may leave a road showing this light
    pub fn permits_departure(&self) -> bool {
        matches!(self, LightColor::Green | LightColor::Yellow)
    }
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightColor::Green => write!(f, "green"),
            LightColor::Yellow => write!(f, "yellow"),
            LightColor::Red => write!(f, "red"),
            LightColor::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// A road segment as persisted in the store
#[derive(Debug, Clone, PartialEq)]
pub struct SimRoad {
    pub id: RoadId,
    pub vehicle_count: u64,
    /// Vehicles per minute entering from outside the network
    pub traffic_rate: u64,
    /// Vehicles per minute that may leave while the light allows it
    pub outflow_rate: u64,
    pub light: LightColor,
    /// Seconds until the next light change. Can dip below zero inside a step.
    pub remaining_time: i64,
    pub max_capacity: u64,
    pub green_light_time: i64,
    pub red_light_time: i64,
}

impl SimRoad {
    /// A road carrying the given defaults
    pub fn new(id: RoadId, defaults: &RoadDefaults) -> Self {
        Self {
            id,
            vehicle_count: defaults.vehicle_count,
            traffic_rate: defaults.traffic_rate,
            outflow_rate: defaults.outflow_rate,
            light: defaults.light.clone(),
            remaining_time: defaults.remaining_time,
            max_capacity: defaults.max_capacity,
            green_light_time: defaults.green_light_time,
            red_light_time: defaults.red_light_time,
        }
    }

    /// Free space left before the road reaches capacity
    pub fn free_space(&self) -> u64 {
        self.max_capacity.saturating_sub(self.vehicle_count)
    }
}

impl fmt::Display for SimRoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Road {}: vehicles={}, in={}/m, out={}/m, light={}({}s), cap={}",
            self.id,
            self.vehicle_count,
            self.traffic_rate,
            self.outflow_rate,
            self.light,
            self.remaining_time,
            self.max_capacity
        )
    }
}

/// Run-scoped bookkeeping paired with a road. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoadRuntime {
    /// Injected vehicles not yet admitted, in sixtieths of a vehicle
    pub in_accumulator: u64,
    /// Vehicle-seconds spent on the road so far
    pub wait_accumulator: u64,
}

/// Values a road takes when the store does not supply a field
#[derive(Debug, Clone, PartialEq)]
pub struct RoadDefaults {
    pub vehicle_count: u64,
    pub traffic_rate: u64,
    pub outflow_rate: u64,
    pub light: LightColor,
    pub remaining_time: i64,
    pub max_capacity: u64,
    pub green_light_time: i64,
    pub red_light_time: i64,
}

impl Default for RoadDefaults {
    fn default() -> Self {
        Self {
            vehicle_count: 0,
            traffic_rate: 0,
            outflow_rate: 0,
            light: LightColor::Red,
            remaining_time: 0,
            max_capacity: DEFAULT_MAX_CAPACITY,
            green_light_time: 30,
            red_light_time: 30,
        }
    }
}

/// Capacity forced onto roads whose store value is not positive
pub const DEFAULT_MAX_CAPACITY: u64 = 1000;

/// Rates in the store are per minute, steps are in seconds
pub const SECONDS_PER_MINUTE: u64 = 60;

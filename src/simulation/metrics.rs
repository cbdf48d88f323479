//! Per-step reports and end-of-run congestion metrics

use std::collections::BTreeMap;
use std::ops::AddAssign;

use super::flow::{Injection, Movement};
use super::road_network::SimRoadNetwork;
use super::types::{RoadId, RoadRuntime};

/// What happened during one step (or, summed, during a run)
///
/// Reporting only; nothing here feeds back into the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Vehicles that left a road, including those that left the network
    pub moved: u64,
    /// Vehicles admitted from outside the network
    pub injected: u64,
    /// Vehicles dropped at injection plus allocations refused by a full road
    pub blocked: u64,
    /// Part of `moved` that exited the network
    pub egress: u64,
    pub blocked_at_injection: u64,
    pub blocked_at_destination: u64,
}

impl StepReport {
    pub fn record_injection(&mut self, injection: Injection) {
        self.injected = self.injected.saturating_add(injection.admitted);
        self.blocked_at_injection = self
            .blocked_at_injection
            .saturating_add(injection.blocked());
        self.blocked = self.blocked.saturating_add(injection.blocked());
    }

    pub fn record_movement(&mut self, movement: Movement) {
        self.moved = self.moved.saturating_add(movement.moved);
        self.egress = self.egress.saturating_add(movement.egress);
        self.blocked_at_destination = self
            .blocked_at_destination
            .saturating_add(movement.blocked);
        self.blocked = self.blocked.saturating_add(movement.blocked);
    }
}

impl AddAssign for StepReport {
    fn add_assign(&mut self, other: Self) {
        self.moved = self.moved.saturating_add(other.moved);
        self.injected = self.injected.saturating_add(other.injected);
        self.blocked = self.blocked.saturating_add(other.blocked);
        self.egress = self.egress.saturating_add(other.egress);
        self.blocked_at_injection = self
            .blocked_at_injection
            .saturating_add(other.blocked_at_injection);
        self.blocked_at_destination = self
            .blocked_at_destination
            .saturating_add(other.blocked_at_destination);
    }
}

/// Summary fields written back to the store after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub total_vehicles: u64,
    /// Accumulated vehicle-seconds divided by vehicles still present, rounded down
    pub average_wait_time: u64,
    /// Road holding the most vehicles; the lowest id wins a tie
    pub most_congested_road: RoadId,
}

impl Metrics {
    /// Compute metrics from the final network state
    ///
    /// Returns `None` for an empty network.
    pub fn compute(
        network: &SimRoadNetwork,
        runtime: &BTreeMap<RoadId, RoadRuntime>,
    ) -> Option<Self> {
        let total_vehicles = network.total_vehicles();
        let vehicle_seconds = runtime
            .values()
            .fold(0u64, |total, r| total.saturating_add(r.wait_accumulator));
        let average_wait_time = if total_vehicles > 0 {
            vehicle_seconds / total_vehicles
        } else {
            0
        };

        let mut most_congested: Option<(RoadId, u64)> = None;
        for road in network.roads() {
            match most_congested {
                Some((_, best)) if road.vehicle_count <= best => {}
                _ => most_congested = Some((road.id, road.vehicle_count)),
            }
        }

        most_congested.map(|(most_congested_road, _)| Self {
            total_vehicles,
            average_wait_time,
            most_congested_road,
        })
    }
}

//! Vehicle injection and movement between roads

use log::debug;

use super::road_network::SimRoadNetwork;
use super::types::{RoadRuntime, SimRoad, SECONDS_PER_MINUTE};

/// Outcome of injecting outside traffic into one road
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Injection {
    /// Whole vehicles released by the accumulator this step
    pub attempted: u64,
    /// Vehicles that fit under the road's capacity
    pub admitted: u64,
}

impl Injection {
    /// Vehicles dropped for lack of space
    pub fn blocked(&self) -> u64 {
        self.attempted - self.admitted
    }
}

/// Totals from one movement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    /// Vehicles that left their origin, including `egress`
    pub moved: u64,
    /// Vehicles that left the network
    pub egress: u64,
    /// Allocations refused because the destination was full
    pub blocked: u64,
}

/// Vehicles a per-minute rate yields over `step_seconds`, rounded down
pub fn vehicles_per_step(rate_per_min: u64, step_seconds: u64) -> u64 {
    rate_per_min.saturating_mul(step_seconds) / SECONDS_PER_MINUTE
}

/// Add this step's outside traffic to a road
///
/// The accumulator keeps the fractional remainder (in sixtieths of a vehicle)
/// so that rates which do not divide evenly into a step still deliver their
/// full per-minute count over time. Vehicles that do not fit are dropped.
pub fn inject(road: &mut SimRoad, runtime: &mut RoadRuntime, step_seconds: u64) -> Injection {
    runtime.in_accumulator = runtime
        .in_accumulator
        .saturating_add(road.traffic_rate.saturating_mul(step_seconds));
    let attempted = runtime.in_accumulator / SECONDS_PER_MINUTE;
    runtime.in_accumulator %= SECONDS_PER_MINUTE;

    let admitted = attempted.min(road.free_space());
    road.vehicle_count += admitted;

    if attempted > 0 {
        debug!(
            "[INJ] Road {}: attempted={}, admitted={}, blocked={}",
            road.id,
            attempted,
            admitted,
            attempted - admitted
        );
    }

    Injection {
        attempted,
        admitted,
    }
}

/// Move vehicles out of every road whose light allows it
///
/// How much each road may send is decided from a snapshot taken before any
/// movement, so vehicles arriving earlier in the same pass never leave again
/// in it. Destination space is read live: origins are handled in ascending id
/// order and lower ids claim shared free space first.
///
/// A road's departures are split evenly over its destinations, with the
/// remainder going one each to the first destinations in list order. Unknown
/// destinations are exits and always accept. A share that does not fit its
/// destination is counted as blocked and stays on the origin.
pub fn move_vehicles(network: &mut SimRoadNetwork, step_seconds: u64) -> Movement {
    let snapshot: Vec<SimRoad> = network.roads().cloned().collect();
    let mut movement = Movement::default();

    for origin in &snapshot {
        if !origin.light.permits_departure() {
            debug!("[STOP] Road {}: light {}", origin.id, origin.light);
            continue;
        }

        let can_cross = origin
            .vehicle_count
            .min(vehicles_per_step(origin.outflow_rate, step_seconds));
        if can_cross == 0 {
            debug!(
                "[NO_MOVE] Road {}: light {} but nothing to send",
                origin.id, origin.light
            );
            continue;
        }

        let destinations = network.destinations_of(origin.id).to_vec();
        if destinations.is_empty() {
            remove_vehicles(network, origin, can_cross);
            movement.moved = movement.moved.saturating_add(can_cross);
            movement.egress = movement.egress.saturating_add(can_cross);
            debug!("[OUT] Road {}: {} vehicles exit", origin.id, can_cross);
            continue;
        }

        let count = destinations.len() as u64;
        let per_dest = can_cross / count;
        let remainder = can_cross % count;

        for (i, &dest_id) in destinations.iter().enumerate() {
            let alloc = per_dest + u64::from((i as u64) < remainder);
            if alloc == 0 {
                continue;
            }

            if !network.contains_road(dest_id) {
                remove_vehicles(network, origin, alloc);
                movement.moved = movement.moved.saturating_add(alloc);
                movement.egress = movement.egress.saturating_add(alloc);
                debug!(
                    "[OUT-DEST] Road {} -> exit {}: {} vehicles",
                    origin.id, dest_id, alloc
                );
                continue;
            }

            let dest_space = network
                .get_road(dest_id)
                .map_or(0, SimRoad::free_space);
            let actually_moved = alloc.min(dest_space);
            movement.blocked = movement.blocked.saturating_add(alloc - actually_moved);
            if actually_moved == 0 {
                debug!(
                    "[BLOCKED] Road {} -> Road {}: attempted {}, no space",
                    origin.id, dest_id, alloc
                );
                continue;
            }

            remove_vehicles(network, origin, actually_moved);
            if let Some(dest) = network.get_road_mut(dest_id) {
                dest.vehicle_count += actually_moved;
            }
            movement.moved = movement.moved.saturating_add(actually_moved);
            debug!(
                "[MOVE] Road {} -> Road {}: attempted={}, moved={}, dest_space={}",
                origin.id, dest_id, alloc, actually_moved, dest_space
            );
        }
    }

    movement
}

fn remove_vehicles(network: &mut SimRoadNetwork, origin: &SimRoad, amount: u64) {
    if let Some(road) = network.get_road_mut(origin.id) {
        road.vehicle_count = road.vehicle_count.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicles_per_step_rounds_down() {
        assert_eq!(vehicles_per_step(45, 5), 3);
        assert_eq!(vehicles_per_step(7, 10), 1);
        assert_eq!(vehicles_per_step(60, 1), 1);
        assert_eq!(vehicles_per_step(59, 1), 0);
        assert_eq!(vehicles_per_step(0, 30), 0);
    }
}

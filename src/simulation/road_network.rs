//! Road network built from the store
//!
//! Holds every road in ascending id order together with the destination
//! routing table.

use log::warn;
use std::collections::BTreeMap;

use crate::store::Store;

use super::config::parse_int;
use super::types::{LightColor, RoadDefaults, RoadId, SimRoad, DEFAULT_MAX_CAPACITY};

/// Routing key prefixes; `destinationRoadId.<idx>` pairs with `destinationId.<idx>`
const ORIGIN_PREFIX: &str = "destinationRoadId.";
const DESTINATION_PREFIX: &str = "destinationId.";

/// Roads plus the destination map
#[derive(Debug, Clone, Default)]
pub struct SimRoadNetwork {
    /// Storage for road data, iterated in ascending id order
    roads: BTreeMap<RoadId, SimRoad>,

    /// Origin road -> ordered destination list. Ids missing from `roads`
    /// are network exits.
    destinations: BTreeMap<RoadId, Vec<RoadId>>,
}

impl SimRoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build roads `1..=road_count` and the destination map from a store
    ///
    /// Each field is read as `field.<id>`, then bare `field`, then taken from
    /// `defaults`. Out-of-range values are normalized afterwards. When the
    /// store has no routing pairs and there are at least two roads, a single
    /// `1 -> 2` edge is installed.
    pub fn from_store(store: &Store, road_count: u64, defaults: &RoadDefaults) -> Self {
        let mut network = Self::new();

        for index in 1..=road_count as i64 {
            network.add_road(read_road(store, RoadId(index), defaults));
        }

        for (origin, destination) in read_routes(store) {
            network.add_destination(origin, destination);
        }

        if network.destinations.is_empty() && road_count >= 2 {
            network.add_destination(RoadId(1), RoadId(2));
        }

        network
    }

    /// Adds a road, replacing any road with the same id
    pub fn add_road(&mut self, road: SimRoad) {
        self.roads.insert(road.id, road);
    }

    /// Appends `destination` to the end of `origin`'s destination list
    pub fn add_destination(&mut self, origin: RoadId, destination: RoadId) {
        self.destinations.entry(origin).or_default().push(destination);
    }

    pub fn get_road(&self, road_id: RoadId) -> Option<&SimRoad> {
        self.roads.get(&road_id)
    }

    pub fn get_road_mut(&mut self, road_id: RoadId) -> Option<&mut SimRoad> {
        self.roads.get_mut(&road_id)
    }

    pub fn contains_road(&self, road_id: RoadId) -> bool {
        self.roads.contains_key(&road_id)
    }

    /// Destinations for `origin`, in routing order. Empty means all traffic
    /// leaving `origin` exits the network.
    pub fn destinations_of(&self, origin: RoadId) -> &[RoadId] {
        self.destinations
            .get(&origin)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn destinations(&self) -> &BTreeMap<RoadId, Vec<RoadId>> {
        &self.destinations
    }

    /// All roads in ascending id order
    pub fn roads(&self) -> impl Iterator<Item = &SimRoad> {
        self.roads.values()
    }

    pub fn roads_mut(&mut self) -> impl Iterator<Item = &mut SimRoad> {
        self.roads.values_mut()
    }

    pub fn road_ids(&self) -> Vec<RoadId> {
        self.roads.keys().copied().collect()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn total_vehicles(&self) -> u64 {
        self.roads
            .values()
            .fold(0, |total, road| total.saturating_add(road.vehicle_count))
    }
}

/// Read and normalize one road
fn read_road(store: &Store, id: RoadId, defaults: &RoadDefaults) -> SimRoad {
    let int = |field: &str, default: i64| {
        store
            .road_field(field, id.0)
            .and_then(parse_int)
            .unwrap_or(default)
    };
    let non_negative = |field: &str, default: u64| int(field, default as i64).max(0) as u64;

    let mut road = SimRoad::new(id, defaults);
    road.vehicle_count = non_negative("vehicleCount", defaults.vehicle_count);
    road.traffic_rate = non_negative("trafficRate", defaults.traffic_rate);
    road.outflow_rate = non_negative("outflowRate", defaults.outflow_rate);
    road.remaining_time = int("remainingTime", defaults.remaining_time).max(0);
    road.green_light_time = int("greenLightTime", defaults.green_light_time);
    road.red_light_time = int("redLightTime", defaults.red_light_time);

    let capacity = int("maxCapacity", defaults.max_capacity as i64);
    road.max_capacity = if capacity <= 0 {
        DEFAULT_MAX_CAPACITY
    } else {
        capacity as u64
    };
    if road.vehicle_count > road.max_capacity {
        warn!(
            "Road {} holds {} vehicles over its capacity of {}; clamping",
            id, road.vehicle_count, road.max_capacity
        );
        road.vehicle_count = road.max_capacity;
    }

    if let Some(color) = store.road_field("trafficLightColor", id.0) {
        road.light = LightColor::parse(color);
    }

    road
}

/// Collect `(origin, destination)` routing pairs in store order
///
/// Pairs whose origin or destination does not parse, or whose destination key
/// is missing, are skipped.
fn read_routes(store: &Store) -> Vec<(RoadId, RoadId)> {
    store
        .values()
        .iter()
        .filter_map(|(key, value)| {
            let label = key.strip_prefix(ORIGIN_PREFIX)?;
            let origin = parse_int(value)?;
            let destination = store
                .get(&format!("{DESTINATION_PREFIX}{label}"))
                .and_then(parse_int)?;
            Some((RoadId(origin), RoadId(destination)))
        })
        .collect()
}

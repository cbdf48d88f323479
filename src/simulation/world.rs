//! Main simulation world that ties everything together
//!
//! A run decodes the store, steps the network the requested number of times
//! and hands the updated fields back to the store for persistence.

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;

use crate::store::{Store, StoreMap};

use super::config::{
    SimConfig, KEY_AVERAGE_WAIT_TIME, KEY_CURRENT_TIME, KEY_MOST_CONGESTED_ROAD,
    KEY_TOTAL_VEHICLES,
};
use super::flow;
use super::metrics::{Metrics, StepReport};
use super::road_network::SimRoadNetwork;
use super::traffic_light::{self, LightTiming};
use super::types::{RoadDefaults, RoadId, RoadRuntime};

/// The main simulation world
pub struct SimWorld {
    pub config: SimConfig,

    /// Roads and routing
    pub road_network: SimRoadNetwork,

    /// Transient per-road accumulators, keyed like the roads
    runtime: BTreeMap<RoadId, RoadRuntime>,

    /// Sum of every step report so far
    pub totals: StepReport,

    /// Number of steps run
    pub steps_run: u64,
}

impl SimWorld {
    pub fn new(config: SimConfig, road_network: SimRoadNetwork) -> Self {
        let runtime = road_network
            .road_ids()
            .into_iter()
            .map(|id| (id, RoadRuntime::default()))
            .collect();

        Self {
            config,
            road_network,
            runtime,
            totals: StepReport::default(),
            steps_run: 0,
        }
    }

    /// Build a world from a decoded store using the stock road defaults
    pub fn from_store(store: &Store) -> Self {
        Self::from_store_with_defaults(store, &RoadDefaults::default())
    }

    pub fn from_store_with_defaults(store: &Store, defaults: &RoadDefaults) -> Self {
        let config = SimConfig::from_store(store);
        let road_network =
            SimRoadNetwork::from_store(store, config.number_of_roads, defaults);
        Self::new(config, road_network)
    }

    /// Runtime accumulators for a road
    pub fn runtime(&self, road_id: RoadId) -> Option<&RoadRuntime> {
        self.runtime.get(&road_id)
    }

    fn light_timing(&self) -> LightTiming {
        LightTiming {
            step_secs: self.config.step_secs_signed(),
            fixed_yellow_time: self.config.fixed_yellow_time,
        }
    }

    /// Run one simulation step
    ///
    /// Phases run strictly in order, each over every road: lights, injection,
    /// movement, wait-time accumulation.
    pub fn tick(&mut self) -> StepReport {
        let step_seconds = self.config.step_seconds;
        let timing = self.light_timing();
        let mut report = StepReport::default();

        for road in self.road_network.roads_mut() {
            traffic_light::advance(road, timing);
        }

        for road in self.road_network.roads_mut() {
            let runtime = self.runtime.entry(road.id).or_default();
            report.record_injection(flow::inject(road, runtime, step_seconds));
        }

        report.record_movement(flow::move_vehicles(&mut self.road_network, step_seconds));

        for road in self.road_network.roads() {
            let runtime = self.runtime.entry(road.id).or_default();
            runtime.wait_accumulator = runtime
                .wait_accumulator
                .saturating_add(road.vehicle_count.saturating_mul(step_seconds));
        }

        self.config.current_time = self
            .config
            .current_time
            .saturating_add(self.config.step_secs_signed());
        self.steps_run = self.steps_run.saturating_add(1);
        self.totals += report;
        report
    }

    /// Run `steps` steps, logging each one. Returns the totals for this call.
    pub fn run(&mut self, steps: u32) -> StepReport {
        let mut totals = StepReport::default();

        for _ in 0..steps {
            let report = self.tick();
            totals += report;

            info!(
                "[STEP {}] moved={}, injected={}, blocked={}, sim_time={}s",
                self.steps_run,
                report.moved,
                report.injected,
                report.blocked,
                self.config.current_time
            );
            for road in self.road_network.roads() {
                debug!("   -> {}", road);
            }
        }

        totals
    }

    /// Final metrics for the current state
    pub fn metrics(&self) -> Option<Metrics> {
        Metrics::compute(&self.road_network, &self.runtime)
    }

    /// Fields to write back to the store
    ///
    /// Per road: vehicle count, light color and remaining time (never below
    /// zero). Then the clock and the summary metrics.
    pub fn store_updates(&self) -> StoreMap {
        let mut updates = StoreMap::new();

        for road in self.road_network.roads() {
            updates.insert(
                format!("vehicleCount.{}", road.id),
                road.vehicle_count.to_string(),
            );
            updates.insert(
                format!("remainingTime.{}", road.id),
                road.remaining_time.max(0).to_string(),
            );
            updates.insert(
                format!("trafficLightColor.{}", road.id),
                road.light.to_string(),
            );
        }

        updates.insert(KEY_CURRENT_TIME, self.config.current_time.to_string());
        if let Some(metrics) = self.metrics() {
            updates.insert(KEY_TOTAL_VEHICLES, metrics.total_vehicles.to_string());
            updates.insert(KEY_AVERAGE_WAIT_TIME, metrics.average_wait_time.to_string());
            updates.insert(
                KEY_MOST_CONGESTED_ROAD,
                metrics.most_congested_road.to_string(),
            );
        }

        updates
    }

    /// Log the configuration, routing and every road
    pub fn print_summary(&self) {
        info!(
            "Map: {}, roads={}, step={}s, current_time={}s",
            self.config.map_name.as_deref().unwrap_or("(unknown)"),
            self.road_network.road_count(),
            self.config.step_seconds,
            self.config.current_time
        );
        info!("Destinations: {:?}", self.road_network.destinations());
        for road in self.road_network.roads() {
            info!("  {}", road);
        }
    }
}

/// Result of running against a store file
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Totals across every step of the run
    pub totals: StepReport,
    pub metrics: Option<Metrics>,
    /// Clock after the last step
    pub current_time: i64,
    /// Whether the store file was rewritten
    pub written: bool,
}

/// Load the store at `path`, run `steps` steps and optionally write back
///
/// A missing store is an error and nothing is written. With `write_back` the
/// previous file is backed up to `<path>.bak` and the new content replaces it
/// atomically.
pub fn run_store_file(path: &Path, steps: u32, write_back: bool) -> Result<RunOutcome> {
    let store = Store::load(path)
        .with_context(|| format!("Failed to load store {}", path.display()))?;

    let mut world = SimWorld::from_store(&store);
    info!("Initial state:");
    world.print_summary();

    let totals = world.run(steps);
    let metrics = world.metrics();

    if write_back {
        store
            .save(path, &world.store_updates())
            .with_context(|| format!("Failed to write store {}", path.display()))?;
        info!("Updated values written to {} (backup .bak created)", path.display());
    }

    info!("=== SIMULATION COMPLETE ===");
    info!("Total moved: {}", totals.moved);
    info!("Total injected: {}", totals.injected);
    info!("Total blocked: {}", totals.blocked);
    if let Some(metrics) = &metrics {
        info!("Total vehicles: {}", metrics.total_vehicles);
        info!("Average wait time: {}s", metrics.average_wait_time);
        info!("Most congested road: {}", metrics.most_congested_road);
    }

    Ok(RunOutcome {
        totals,
        metrics,
        current_time: world.config.current_time,
        written: write_back,
    })
}

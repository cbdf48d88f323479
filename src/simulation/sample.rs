//! Built-in sample store used by `--init`

use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::store::{atomic_create, StoreError};

/// Two-road city centre with both roads draining out of the network
pub const SAMPLE_STORE: &str = "\
# Traffic store - sample map
mapName = \"CityCenter\"
numberOfRoads = 2
simulationStep = 5
currentSimulationTime = 100
systemState = active
fixedYellowTime = 5

# Road 1
trafficRate.1 = 50
vehicleCount.1 = 200
trafficLightColor.1 = green
remainingTime.1 = 30
maxCapacity.1 = 500
outflowRate.1 = 45
greenLightTime.1 = 60
redLightTime.1 = 60

# Road 2
trafficRate.2 = 70
vehicleCount.2 = 350
trafficLightColor.2 = red
remainingTime.2 = 45
maxCapacity.2 = 600
outflowRate.2 = 55
greenLightTime.2 = 50
redLightTime.2 = 70

# Routing
destinationRoadId.1 = 1
destinationId.1 = 101
destinationRoadId.2 = 2
destinationId.2 = 102

# State
mostCongestedRoad = 2
totalVehicles = 550
averageWaitTime = 25
";

/// Write the sample store to `path` unless a file is already there
///
/// Returns whether a file was written. An existing store is never replaced,
/// even one created while the sample is being written.
pub fn init_store(path: &Path) -> Result<bool> {
    match atomic_create(path, SAMPLE_STORE.as_bytes()) {
        Ok(()) => {
            info!("Created sample store at {}", path.display());
            Ok(true)
        }
        Err(StoreError::AlreadyExists { .. }) => {
            info!("Store {} already exists, leaving it in place", path.display());
            Ok(false)
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to create sample store {}", path.display()))
        }
    }
}

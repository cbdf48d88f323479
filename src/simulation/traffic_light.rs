//! Traffic light cycling
//!
//! Each road cycles green -> yellow -> red -> green. Yellow lasts the
//! simulation-wide `fixed_yellow_time`; green and red come from the road.

use log::debug;

use super::types::{LightColor, SimRoad};

/// Durations the light machine needs besides the road's own phase lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightTiming {
    pub step_secs: i64,
    pub fixed_yellow_time: i64,
}

/// Advance one road's light by one step
///
/// The timer counts down first; once it reaches zero or below the light
/// changes and the timer is reset to the full length of the new phase. Any
/// overshoot below zero is dropped rather than carried into the next phase.
/// An unrecognised color falls back to red.
///
/// Returns the new color when the light changed.
pub fn advance(road: &mut SimRoad, timing: LightTiming) -> Option<LightColor> {
    if road.remaining_time > 0 {
        road.remaining_time -= timing.step_secs;
    }
    if road.remaining_time > 0 {
        return None;
    }

    let (next, duration) = match road.light {
        LightColor::Green => (LightColor::Yellow, timing.fixed_yellow_time),
        LightColor::Yellow => (LightColor::Red, road.red_light_time),
        LightColor::Red => (LightColor::Green, road.green_light_time),
        LightColor::Unknown(ref raw) => {
            debug!("Road {}: unknown light '{}', forcing red", road.id, raw);
            (LightColor::Red, road.red_light_time)
        }
    };

    debug!(
        "Road {}: light {} -> {} ({}s)",
        road.id, road.light, next, duration
    );
    road.light = next.clone();
    road.remaining_time = duration;
    Some(next)
}

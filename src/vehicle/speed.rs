use crate::light::LightState;

/// The fraction of its nominal speed a vehicle slows to at a yellow light.
const YELLOW_SPEED_FACTOR: f64 = 0.5;

/// The distances before a stop line within which vehicles react to the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedZones {
    /// Vehicles within this distance stop for a red light.
    pub stop_zone: f64,
    /// Vehicles within this distance slow for a yellow light.
    pub slow_zone: f64,
}

/// What happens to a vehicle's waiting time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waiting {
    Accumulate,
    Hold,
    Reset,
}

/// Decides a vehicle's speed for this tick.
///
/// # Parameters
/// * `nominal` - The vehicle's free-flow speed
/// * `distance` - The signed distance to the governing stop line, if there is one
/// * `light` - The state of the governing light, if there is one
/// * `zones` - The reaction distances
pub fn speed_for(
    nominal: f64,
    distance: Option<f64>,
    light: Option<LightState>,
    zones: &SpeedZones,
) -> (f64, Waiting) {
    let within = |zone: f64| distance.map_or(false, |d| d > 0.0 && d < zone);
    match light {
        Some(LightState::Red) if within(zones.stop_zone) => (0.0, Waiting::Accumulate),
        Some(LightState::Yellow) if within(zones.slow_zone) => {
            (YELLOW_SPEED_FACTOR * nominal, Waiting::Hold)
        }
        _ => (nominal, Waiting::Reset),
    }
}

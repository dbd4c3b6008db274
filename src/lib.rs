pub use cgmath;
pub use config::{
    ConfigError, KineticsConfig, LayoutConfig, SignalConfig, SignalMode, SimulationConfig,
};
pub use detector::Detector;
pub use direction::{Axis, Direction};
pub use intersection::{Approach, Intersection, Topology};
pub use light::{Light, LightState, Timing};
pub use signal::{FixedTwoPhase, SignalPolicy, TimerFallback};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use spawn::{SpawnConfig, SpawnMode};
pub use util::{Bounds, Interval};
pub use vehicle::{SpeedZones, Vehicle, VehicleAttributes, VehicleSnapshot};

mod config;
#[cfg(feature = "debug")]
mod debug;
mod detector;
mod direction;
mod intersection;
mod light;
pub mod math;
mod signal;
mod simulation;
mod spawn;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of an [Intersection].
    pub struct IntersectionId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type IntersectionSet = SlotMap<IntersectionId, Intersection>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;

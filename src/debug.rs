use crate::{IntersectionSet, VehicleSet};
use serde_json::json;

/// Describes the lights and vehicles of a frame as JSON.
pub fn debug_frame(intersections: &IntersectionSet, vehicles: &VehicleSet) -> serde_json::Value {
    let lights = intersections
        .values()
        .flat_map(|intersection| {
            intersection.lights().iter().map(move |light| {
                json!({
                    "intersection": intersection.id(),
                    "direction": light.direction(),
                    "state": light.state(),
                    "timer": light.timer(),
                    "max_timer": light.max_timer(),
                })
            })
        })
        .collect::<Vec<_>>();

    let vehicles = vehicles
        .values()
        .map(|vehicle| {
            json!({
                "vehicle": vehicle.snapshot(),
                "waiting_time": vehicle.waiting_time(),
                "distance_to_stop_line": vehicle.distance_to_stop_line(),
            })
        })
        .collect::<Vec<_>>();

    json!({ "lights": lights, "vehicles": vehicles })
}

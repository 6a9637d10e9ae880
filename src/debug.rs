use crate::math::{Point2d, Vector2d};
use crate::VehicleId;
#[cfg(feature = "debug")]
use serde_json::json;
#[cfg(feature = "debug")]
use slotmap::Key;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records the acceleration steering chose for a vehicle.
#[allow(unused)]
pub fn debug_steering(vehicle: VehicleId, pos: Point2d, acc: Vector2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "steering",
            "vehicle": vehicle.data().as_ffi(),
            "pos": [pos.x, pos.y],
            "acc": [acc.x, acc.y],
        }))
    })
}

/// Records two vehicles found overlapping, and how far they overlapped.
#[allow(unused)]
pub fn debug_contact(a: VehicleId, b: VehicleId, pos: Point2d, overlap: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "contact",
            "vehicles": [a.data().as_ffi(), b.data().as_ffi()],
            "pos": [pos.x, pos.y],
            "overlap": overlap,
        }))
    })
}

#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}

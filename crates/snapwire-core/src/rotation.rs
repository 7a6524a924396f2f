//! Pivot rotation math for joint drags.

use kurbo::Point;
use std::f64::consts::{PI, TAU};

/// Angle swept by the pointer around `pivot` between two frames, in radians.
///
/// Difference of the two `atan2` bearings, wrapped into `(-PI, PI]` so that
/// crossing the negative x axis does not register as a full turn. Callers feed
/// it incrementally, one frame at a time.
pub fn rotation_delta(pivot: Point, prev_pointer: Point, curr_pointer: Point) -> f64 {
    let curr = curr_pointer - pivot;
    let prev = prev_pointer - pivot;
    wrap_angle(curr.y.atan2(curr.x) - prev.y.atan2(prev.x))
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Rotate `point` about `pivot` by `angle` radians.
pub fn rotate_about(point: Point, pivot: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = point - pivot;
    Point::new(
        pivot.x + d.x * cos - d.y * sin,
        pivot.y + d.x * sin + d.y * cos,
    )
}

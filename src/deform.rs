// Closed-form vertex displacements applied around a clicked point.
// Each call works on the current (already deformed) positions, so holding
// the mouse compounds the effect tick after tick.

use crate::types::{DeformMode, GridVertex};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Squash strength.
pub const ALPHA: f32 = 0.6;
/// Vertices closer than this to the center are left alone by both squashes.
pub const SQUASH_INNER: f32 = 0.5;
/// SquashB never pulls a vertex to within this distance of the center.
pub const SQUASH_B_FLOOR: f32 = 1.0;
/// Aspect-scaled distance at which the swirl fades out completely.
pub const SWIRL_RADIUS: f32 = 10.0;
/// Rotation applied at the very center of the swirl.
pub const SWIRL_ANGLE: f32 = TAU;

/// Cubic Hermite step between `edge0` and `edge1`, clamped to [0,1].
/// Works with `edge0 > edge1` (falls from 1 to 0 as `x` grows).
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Apply `mode` to every vertex. `aspect` is grid width / grid height and
/// only matters for the swirl falloff.
pub fn apply(vertices: &mut [GridVertex], center: Vec3, mode: DeformMode, aspect: f32) {
    match mode {
        DeformMode::SquashA => {
            for vert in vertices.iter_mut() {
                if let Some(p) = squash_away(vert.position, center) {
                    vert.position = p;
                }
            }
        }
        DeformMode::SquashB => {
            for vert in vertices.iter_mut() {
                if let Some(p) = squash_toward(vert.position, center) {
                    vert.position = p;
                }
            }
        }
        DeformMode::Swirl => {
            for vert in vertices.iter_mut() {
                vert.position = swirl(vert.position, center, aspect);
            }
        }
    }
}

// 1 / squared planar distance, scaled by ALPHA.
#[inline]
fn falloff(pos: Vec3, center: Vec3) -> f32 {
    ALPHA / pos.truncate().distance_squared(center.truncate())
}

/// New position pushed away from `center`, or `None` if the guard holds it.
fn squash_away(pos: Vec3, center: Vec3) -> Option<Vec3> {
    if pos.distance(center) <= SQUASH_INNER {
        return None;
    }
    Some(pos + falloff(pos, center) * (pos - center))
}

/// New position pulled toward `center`, or `None` if it would come too close.
fn squash_toward(pos: Vec3, center: Vec3) -> Option<Vec3> {
    if pos.distance(center) <= SQUASH_INNER {
        return None;
    }
    let candidate = pos + falloff(pos, center) * (center - pos);
    (candidate.distance(center) > SQUASH_B_FLOOR).then_some(candidate)
}

fn swirl(pos: Vec3, center: Vec3, aspect: f32) -> Vec3 {
    let to_center: Vec2 = pos.truncate() - center.truncate();
    let len = (to_center * Vec2::new(aspect, 1.0)).length();
    let angle = to_center.y.atan2(to_center.x)
        + SWIRL_ANGLE * smoothstep(SWIRL_RADIUS, 0.0, len);
    let radius = to_center.length();
    center + Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
}

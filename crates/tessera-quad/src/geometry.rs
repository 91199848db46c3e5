//! Shape classification of a quad from its four vertex positions.

use bitflags::bitflags;
use tessera_geom::{Axis, Direction, Vec3};

bitflags! {
    /// Shape categories cached in the quad header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GeometryFlags: u8 {
        /// All four vertices share the light face's axis coordinate.
        const AXIS_ALIGNED = 0b001;
        /// Axis aligned and lying on the block's boundary plane for the light face.
        const LIGHT_FACE   = 0b010;
        /// Axis aligned with vertices at all four corners of the unit face.
        const CUBIC        = 0b100;
    }
}

/// Tolerance when comparing two vertex coordinates.
pub const EPS: f32 = 1e-5;
/// Coordinates at or below this count as the block's min plane.
pub const EPS_MIN: f32 = 0.0001;
/// Coordinates at or above this count as the block's max plane.
pub const EPS_MAX: f32 = 1.0 - EPS_MIN;

#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

/// Classifies `p` against its `light_face`.
pub fn compute_shape_flags(p: &[Vec3; 4], light_face: Direction) -> GeometryFlags {
    let mut flags = GeometryFlags::empty();
    if is_quad_parallel_to_face(p, light_face) {
        flags |= GeometryFlags::AXIS_ALIGNED;
        if is_parallel_quad_on_face(p, light_face) {
            flags |= GeometryFlags::LIGHT_FACE;
        }
        if is_quad_cubic(p, light_face) {
            flags |= GeometryFlags::CUBIC;
        }
    }
    flags
}

/// Light face for a quad whose normal points towards `face`.
///
/// A full unit-cube face listed in reverse winding still lies on its own
/// boundary plane, so it takes the direction of that plane.
pub fn resolve_light_face(p: &[Vec3; 4], face: Direction) -> Direction {
    let back = face.opposite();
    if is_quad_parallel_to_face(p, face)
        && !is_parallel_quad_on_face(p, face)
        && is_parallel_quad_on_face(p, back)
        && is_quad_cubic(p, face)
    {
        back
    } else {
        face
    }
}

/// True when every vertex has the same coordinate on `face`'s axis.
pub fn is_quad_parallel_to_face(p: &[Vec3; 4], face: Direction) -> bool {
    let axis = face.axis();
    let v = p[0].component(axis);
    p[1..].iter().all(|q| approx_eq(v, q.component(axis)))
}

/// For a parallel quad, whether it sits on the block boundary plane of `face`.
pub fn is_parallel_quad_on_face(p: &[Vec3; 4], face: Direction) -> bool {
    let v = p[0].component(face.axis());
    if face.is_positive() { v >= EPS_MAX } else { v <= EPS_MIN }
}

/// Whether the in-plane coordinates cover all four corners of the unit square.
pub fn is_quad_cubic(p: &[Vec3; 4], face: Direction) -> bool {
    let (a, b) = in_plane_axes(face);
    let mut corners = 0u8;
    for q in p {
        let (u, v) = (q.component(a), q.component(b));
        let bit = match (edge(u), edge(v)) {
            (Some(false), Some(false)) => 1,
            (Some(false), Some(true)) => 2,
            (Some(true), Some(false)) => 4,
            (Some(true), Some(true)) => 8,
            _ => return false,
        };
        corners |= bit;
    }
    corners == 0b1111
}

/// `Some(false)` on the min edge, `Some(true)` on the max edge.
#[inline]
fn edge(v: f32) -> Option<bool> {
    if v <= EPS_MIN {
        Some(false)
    } else if v >= EPS_MAX {
        Some(true)
    } else {
        None
    }
}

#[inline]
pub fn in_plane_axes(face: Direction) -> (Axis, Axis) {
    match face.axis() {
        Axis::X => (Axis::Y, Axis::Z),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

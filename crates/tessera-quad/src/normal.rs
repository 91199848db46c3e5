//! Face normals and the signed-byte packed normal format.

use tessera_geom::{Axis, Direction, Vec3};

/// Normal of the plane through `p`: `(p2 - p0) x (p3 - p1)`, normalized.
///
/// Degenerate quads (zero-length cross product) return `Vec3::UP`.
pub fn compute_face_normal(p: &[Vec3; 4]) -> Vec3 {
    let n = (p[2] - p[0]).cross(p[3] - p[1]);
    let len = n.length();
    if len <= f32::EPSILON || !len.is_finite() {
        return Vec3::UP;
    }
    n / len
}

/// Nearest cardinal face for `normal`. Ties go to Y, then X, then Z.
pub fn light_face(normal: Vec3) -> Direction {
    let mut axis = Axis::Y;
    let mut longest = normal.y.abs();
    if normal.x.abs() > longest {
        axis = Axis::X;
        longest = normal.x.abs();
    }
    if normal.z.abs() > longest {
        axis = Axis::Z;
    }
    Direction::from_axis(axis, normal.component(axis) > 0.0)
}

#[inline]
fn pack_component(v: f32) -> u32 {
    ((v.clamp(-1.0, 1.0) * 127.0) as i32 as i8 as u8) as u32
}

/// Packs a normal into one word: x, y, z, w as signed bytes scaled by 127.
pub fn pack_normal(x: f32, y: f32, z: f32, w: f32) -> u32 {
    pack_component(x) | (pack_component(y) << 8) | (pack_component(z) << 16) | (pack_component(w) << 24)
}

#[inline]
pub fn pack_normal_vec(n: Vec3) -> u32 {
    pack_normal(n.x, n.y, n.z, 0.0)
}

/// Component `i` (`0..4`) of a packed normal.
#[inline]
pub fn packed_normal_component(packed: u32, i: u32) -> f32 {
    ((packed >> (8 * i)) as u8 as i8) as f32 / 127.0
}

#[inline]
pub fn unpack_normal(packed: u32) -> Vec3 {
    Vec3::new(
        packed_normal_component(packed, 0),
        packed_normal_component(packed, 1),
        packed_normal_component(packed, 2),
    )
}

//! Atlas sprite handles and UV baking.

use bitflags::bitflags;
use tessera_geom::{Direction, Vec3};

/// A sprite's id and its rectangle in atlas UV space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub id: u32,
    pub min_u: f32,
    pub min_v: f32,
    pub max_u: f32,
    pub max_v: f32,
}

impl Sprite {
    pub fn new(id: u32, min_u: f32, min_v: f32, max_u: f32, max_v: f32) -> Self {
        Self {
            id,
            min_u,
            min_v,
            max_u,
            max_v,
        }
    }

    /// Maps a normalized `0..1` coordinate into the sprite's atlas rectangle.
    #[inline]
    pub fn interpolate(&self, u: f32, v: f32) -> (f32, f32) {
        (
            self.min_u + (self.max_u - self.min_u) * u,
            self.min_v + (self.max_v - self.min_v) * v,
        )
    }

    #[inline]
    pub fn contains(&self, u: f32, v: f32) -> bool {
        u >= self.min_u && u < self.max_u && v >= self.min_v && v < self.max_v
    }
}

bitflags! {
    /// Options for [`bake_uvs`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BakeFlags: u8 {
        /// Derive UVs from vertex positions on the nominal face.
        const LOCK_UV    = 0b0000_0001;
        const ROTATE_90  = 0b0000_0010;
        const ROTATE_180 = 0b0000_0100;
        const ROTATE_270 = 0b0000_0110;
        const FLIP_U     = 0b0000_1000;
        const FLIP_V     = 0b0001_0000;
        /// Input UVs are already `0..1` within the sprite.
        const NORMALIZED = 0b0010_0000;
    }
}

const ROTATION_MASK: u8 = 0b0000_0110;

/// UV implied by a position on a face, `0..1` over the unit block.
fn locked_uv(face: Direction, p: Vec3) -> (f32, f32) {
    match face {
        Direction::East => (1.0 - p.z, 1.0 - p.y),
        Direction::West => (p.z, 1.0 - p.y),
        Direction::North => (1.0 - p.x, 1.0 - p.y),
        Direction::South => (p.x, 1.0 - p.y),
        Direction::Down => (p.x, 1.0 - p.z),
        Direction::Up => (p.x, p.z),
    }
}

/// Rewrites `uvs` from sprite-relative coordinates to atlas coordinates.
///
/// Without `NORMALIZED`, input UVs are treated as texel units in `0..16`.
pub fn bake_uvs(
    uvs: &mut [(f32, f32); 4],
    positions: &[Vec3; 4],
    nominal_face: Option<Direction>,
    sprite: &Sprite,
    flags: BakeFlags,
) {
    for (i, uv) in uvs.iter_mut().enumerate() {
        let (mut u, mut v) = match (flags.contains(BakeFlags::LOCK_UV), nominal_face) {
            (true, Some(face)) => locked_uv(face, positions[i]),
            _ if flags.contains(BakeFlags::NORMALIZED) => *uv,
            _ => (uv.0 / 16.0, uv.1 / 16.0),
        };
        match flags.bits() & ROTATION_MASK {
            0b010 => (u, v) = (v, 1.0 - u),
            0b100 => (u, v) = (1.0 - u, 1.0 - v),
            0b110 => (u, v) = (1.0 - v, u),
            _ => {}
        }
        if flags.contains(BakeFlags::FLIP_U) {
            u = 1.0 - u;
        }
        if flags.contains(BakeFlags::FLIP_V) {
            v = 1.0 - v;
        }
        *uv = sprite.interpolate(u, v);
    }
}

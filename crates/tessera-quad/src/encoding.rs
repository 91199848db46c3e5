//! Flat `u32` layout of one encoded quad.
//!
//! ```text
//! [0] header bits   [1] color index   [2] tag
//! [3..35] 4 vertices x { x, y, z, color, u, v, lightmap, normal }
//! ```
//!
//! Header bits: cull face (3) @0, light face (3) @3, normal flags (4) @6,
//! geometry flags (3) @10, material index (7) @13. Direction fields use
//! `0..6` for the faces and [`NO_DIRECTION`] for none.

use tessera_geom::Direction;
use tessera_material::RenderMaterial;

use crate::geometry::GeometryFlags;

pub const HEADER_BITS: usize = 0;
pub const HEADER_COLOR_INDEX: usize = 1;
pub const HEADER_TAG: usize = 2;
pub const HEADER_STRIDE: usize = 3;

pub const VERTEX_X: usize = 0;
pub const VERTEX_Y: usize = 1;
pub const VERTEX_Z: usize = 2;
pub const VERTEX_COLOR: usize = 3;
pub const VERTEX_U: usize = 4;
pub const VERTEX_V: usize = 5;
pub const VERTEX_LIGHTMAP: usize = 6;
pub const VERTEX_NORMAL: usize = 7;
pub const VERTEX_STRIDE: usize = 8;

/// Words covered by the four vertices.
pub const QUAD_STRIDE: usize = VERTEX_STRIDE * 4;
pub const TOTAL_STRIDE: usize = HEADER_STRIDE + QUAD_STRIDE;

pub const NO_DIRECTION: u32 = 6;

const DIRECTION_MASK: u32 = 0b111;
const CULL_SHIFT: u32 = 0;
const LIGHT_FACE_SHIFT: u32 = 3;
const NORMALS_SHIFT: u32 = 6;
const NORMALS_MASK: u32 = 0b1111;
const GEOMETRY_SHIFT: u32 = 10;
const GEOMETRY_MASK: u32 = 0b111;
const MATERIAL_SHIFT: u32 = 13;
const MATERIAL_MASK: u32 = 0x7F;

/// Word offset of attribute `attr` on vertex `vertex`.
#[inline]
pub fn vertex_index(vertex: usize, attr: usize) -> usize {
    debug_assert!(vertex < 4, "vertex index out of range: {vertex}");
    HEADER_STRIDE + vertex * VERTEX_STRIDE + attr
}

#[inline]
pub fn encode_direction(dir: Option<Direction>) -> u32 {
    dir.map_or(NO_DIRECTION, |d| d.index() as u32)
}

#[inline]
pub fn decode_direction(bits: u32) -> Option<Direction> {
    Direction::from_index(bits as usize)
}

#[inline]
pub fn cull_face(header: u32) -> Option<Direction> {
    decode_direction((header >> CULL_SHIFT) & DIRECTION_MASK)
}

#[inline]
pub fn with_cull_face(header: u32, face: Option<Direction>) -> u32 {
    (header & !(DIRECTION_MASK << CULL_SHIFT)) | (encode_direction(face) << CULL_SHIFT)
}

#[inline]
pub fn light_face(header: u32) -> Direction {
    decode_direction((header >> LIGHT_FACE_SHIFT) & DIRECTION_MASK).unwrap_or(Direction::Up)
}

#[inline]
pub fn with_light_face(header: u32, face: Direction) -> u32 {
    (header & !(DIRECTION_MASK << LIGHT_FACE_SHIFT)) | ((face.index() as u32) << LIGHT_FACE_SHIFT)
}

#[inline]
pub fn normal_flags(header: u32) -> u32 {
    (header >> NORMALS_SHIFT) & NORMALS_MASK
}

#[inline]
pub fn with_normal_flags(header: u32, flags: u32) -> u32 {
    (header & !(NORMALS_MASK << NORMALS_SHIFT)) | ((flags & NORMALS_MASK) << NORMALS_SHIFT)
}

#[inline]
pub fn geometry_flags(header: u32) -> GeometryFlags {
    GeometryFlags::from_bits_truncate(((header >> GEOMETRY_SHIFT) & GEOMETRY_MASK) as u8)
}

#[inline]
pub fn with_geometry_flags(header: u32, flags: GeometryFlags) -> u32 {
    (header & !(GEOMETRY_MASK << GEOMETRY_SHIFT)) | ((flags.bits() as u32 & GEOMETRY_MASK) << GEOMETRY_SHIFT)
}

#[inline]
pub fn material(header: u32) -> &'static RenderMaterial {
    RenderMaterial::by_index((header >> MATERIAL_SHIFT) & MATERIAL_MASK)
}

#[inline]
pub fn with_material(header: u32, material: &RenderMaterial) -> u32 {
    (header & !(MATERIAL_MASK << MATERIAL_SHIFT)) | ((material.index() & MATERIAL_MASK) << MATERIAL_SHIFT)
}

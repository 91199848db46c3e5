//! Packed 32-bit light word describing one world cell.
//!
//! | bits   | field                                   |
//! |--------|-----------------------------------------|
//! | 0..4   | block light                             |
//! | 4..8   | sky light                               |
//! | 8..12  | luminance (light emitted by the block)  |
//! | 12..28 | ambient occlusion, fixed point x4096    |
//! | 28     | emissive                                |
//! | 29     | opaque (occludes neighbors' corners)    |
//! | 30     | full opaque cube                        |
//! | 31     | full cube                               |

use tessera_quad::color::{MAX_LIGHTMAP, pack_lightmap};

const BL_SHIFT: u32 = 0;
const SL_SHIFT: u32 = 4;
const LU_SHIFT: u32 = 8;
const AO_SHIFT: u32 = 12;
const EM_BIT: u32 = 1 << 28;
const OP_BIT: u32 = 1 << 29;
const FO_BIT: u32 = 1 << 30;
const FC_BIT: u32 = 1 << 31;

const AO_SCALE: f32 = 4096.0;

#[inline]
pub fn block_light(word: u32) -> u32 {
    (word >> BL_SHIFT) & 0xF
}

#[inline]
pub fn sky_light(word: u32) -> u32 {
    (word >> SL_SHIFT) & 0xF
}

#[inline]
pub fn luminance(word: u32) -> u32 {
    (word >> LU_SHIFT) & 0xF
}

#[inline]
pub fn ao(word: u32) -> f32 {
    ((word >> AO_SHIFT) & 0xFFFF) as f32 / AO_SCALE
}

#[inline]
pub fn is_emissive(word: u32) -> bool {
    word & EM_BIT != 0
}

#[inline]
pub fn is_opaque(word: u32) -> bool {
    word & OP_BIT != 0
}

#[inline]
pub fn is_full_opaque(word: u32) -> bool {
    word & FO_BIT != 0
}

#[inline]
pub fn is_full_cube(word: u32) -> bool {
    word & FC_BIT != 0
}

/// Lightmap of the cell; a luminous block never reads darker than its own light.
#[inline]
pub fn lightmap(word: u32) -> u32 {
    pack_lightmap(block_light(word).max(luminance(word)), sky_light(word))
}

/// Like [`lightmap`] but full bright for emissive cells.
#[inline]
pub fn emissive_lightmap(word: u32) -> u32 {
    if is_emissive(word) { MAX_LIGHTMAP } else { lightmap(word) }
}

/// Unpacked form of a light word, used by hosts to build words.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellLight {
    pub block: u8,
    pub sky: u8,
    pub luminance: u8,
    pub ao: f32,
    pub emissive: bool,
    pub opaque: bool,
    pub full_opaque: bool,
    pub full_cube: bool,
}

impl Default for CellLight {
    fn default() -> Self {
        Self {
            block: 0,
            sky: 0,
            luminance: 0,
            ao: 1.0,
            emissive: false,
            opaque: false,
            full_opaque: false,
            full_cube: false,
        }
    }
}

impl CellLight {
    /// Open cell with the given world light.
    pub fn air(block: u8, sky: u8) -> Self {
        Self {
            block,
            sky,
            ..Self::default()
        }
    }

    /// Full opaque cube with the shading its neighbors see.
    pub fn solid(ao: f32) -> Self {
        Self {
            ao,
            opaque: true,
            full_opaque: true,
            full_cube: true,
            ..Self::default()
        }
    }

    /// Packs into a word.
    ///
    /// Full opaque cells that emit nothing carry no world light, and cells
    /// that emit light never occlude.
    pub fn pack(&self) -> u32 {
        let (block, sky) = if self.full_opaque && self.luminance == 0 {
            (0, 0)
        } else {
            (self.block as u32 & 0xF, self.sky as u32 & 0xF)
        };
        let ao = if self.luminance > 0 { 1.0 } else { self.ao.clamp(0.0, 15.99) };
        let mut word = (block << BL_SHIFT)
            | (sky << SL_SHIFT)
            | ((self.luminance as u32 & 0xF) << LU_SHIFT)
            | (((ao * AO_SCALE) as u32 & 0xFFFF) << AO_SHIFT);
        if self.emissive {
            word |= EM_BIT;
        }
        if self.opaque {
            word |= OP_BIT;
        }
        if self.full_opaque {
            word |= FO_BIT;
        }
        if self.full_cube {
            word |= FC_BIT;
        }
        word
    }

    pub fn unpack(word: u32) -> Self {
        Self {
            block: block_light(word) as u8,
            sky: sky_light(word) as u8,
            luminance: luminance(word) as u8,
            ao: ao(word),
            emissive: is_emissive(word),
            opaque: is_opaque(word),
            full_opaque: is_full_opaque(word),
            full_cube: is_full_cube(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_survive_packing() {
        let cell = CellLight {
            block: 3,
            sky: 12,
            luminance: 0,
            ao: 0.25,
            emissive: true,
            opaque: false,
            full_opaque: false,
            full_cube: true,
        };
        assert_eq!(CellLight::unpack(cell.pack()), cell);
    }

    #[test]
    fn opaque_dark_cells_drop_world_light() {
        let cell = CellLight {
            block: 9,
            sky: 15,
            ..CellLight::solid(0.2)
        };
        let w = cell.pack();
        assert_eq!((block_light(w), sky_light(w)), (0, 0));
        assert!(is_opaque(w) && is_full_opaque(w) && is_full_cube(w));
    }

    #[test]
    fn luminous_cells_are_unshaded_and_lit() {
        let cell = CellLight {
            block: 2,
            sky: 5,
            luminance: 14,
            ..CellLight::solid(0.2)
        };
        let w = cell.pack();
        assert_eq!(ao(w), 1.0);
        assert_eq!(lightmap(w), pack_lightmap(14, 5));
    }

    #[test]
    fn emissive_lightmap_is_full() {
        let w = CellLight {
            emissive: true,
            ..CellLight::air(0, 0)
        }
        .pack();
        assert_eq!(lightmap(w), 0);
        assert_eq!(emissive_lightmap(w), MAX_LIGHTMAP);
    }
}

//! Render materials: interned bit-packed values, finder, and named registry.
#![forbid(unsafe_code)]

pub mod registry;

pub use registry::{MaterialRegistry, MaterialSpec};

use serde::Deserialize;

/// Terrain output bucket a quad is buffered into.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderLayer {
    #[default]
    Solid,
    CutoutMipped,
    Cutout,
    Translucent,
}

impl RenderLayer {
    pub const ALL: [RenderLayer; 4] = [
        RenderLayer::Solid,
        RenderLayer::CutoutMipped,
        RenderLayer::Cutout,
        RenderLayer::Translucent,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Use the block's own default layer.
    #[default]
    Default = 0,
    Solid = 1,
    CutoutMipped = 2,
    Cutout = 3,
    Translucent = 4,
}

impl BlendMode {
    const fn from_bits(bits: u8) -> BlendMode {
        match bits {
            1 => BlendMode::Solid,
            2 => BlendMode::CutoutMipped,
            3 => BlendMode::Cutout,
            4 => BlendMode::Translucent,
            _ => BlendMode::Default,
        }
    }

    /// Explicit layer, or `None` for `Default`.
    pub fn render_layer(self) -> Option<RenderLayer> {
        match self {
            BlendMode::Default => None,
            BlendMode::Solid => Some(RenderLayer::Solid),
            BlendMode::CutoutMipped => Some(RenderLayer::CutoutMipped),
            BlendMode::Cutout => Some(RenderLayer::Cutout),
            BlendMode::Translucent => Some(RenderLayer::Translucent),
        }
    }
}

const BLEND_MODE_MASK: u8 = 0b111;
const COLOR_DISABLE_FLAG: u8 = 1 << 3;
const EMISSIVE_FLAG: u8 = 1 << 4;
const DIFFUSE_DISABLE_FLAG: u8 = 1 << 5;
const AO_DISABLE_FLAG: u8 = 1 << 6;

/// Number of distinct material values; every index below this is valid.
pub const MATERIAL_COUNT: usize = 1 << 7;

/// Immutable material value. Two materials with the same properties are the
/// same `&'static` table entry.
#[derive(Debug, Eq, PartialEq, Hash)]
pub struct RenderMaterial {
    bits: u8,
}

static MATERIALS: [RenderMaterial; MATERIAL_COUNT] = build_table();

const fn canonical_index(index: u32) -> usize {
    let bits = (index as usize & (MATERIAL_COUNT - 1)) as u8;
    if bits & BLEND_MODE_MASK > BlendMode::Translucent as u8 {
        (bits & !BLEND_MODE_MASK) as usize
    } else {
        bits as usize
    }
}

const fn build_table() -> [RenderMaterial; MATERIAL_COUNT] {
    let mut table = [const { RenderMaterial { bits: 0 } }; MATERIAL_COUNT];
    let mut i = 0;
    while i < MATERIAL_COUNT {
        table[i] = RenderMaterial { bits: i as u8 };
        i += 1;
    }
    table
}

impl RenderMaterial {
    /// Looks up the interned value for an encoded index. Out-of-range indices
    /// are masked into range and unknown blend modes read as `Default`, so
    /// equal properties always land on the same entry.
    #[inline]
    pub fn by_index(index: u32) -> &'static RenderMaterial {
        &MATERIALS[canonical_index(index)]
    }

    /// The all-defaults material.
    #[inline]
    pub fn standard() -> &'static RenderMaterial {
        &MATERIALS[0]
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        BlendMode::from_bits(self.bits & BLEND_MODE_MASK)
    }

    #[inline]
    pub fn disable_color_index(&self) -> bool {
        self.bits & COLOR_DISABLE_FLAG != 0
    }

    #[inline]
    pub fn emissive(&self) -> bool {
        self.bits & EMISSIVE_FLAG != 0
    }

    #[inline]
    pub fn disable_diffuse(&self) -> bool {
        self.bits & DIFFUSE_DISABLE_FLAG != 0
    }

    #[inline]
    pub fn disable_ao(&self) -> bool {
        self.bits & AO_DISABLE_FLAG != 0
    }

    /// Same material with the diffuse flag replaced.
    pub fn with_disable_diffuse(&'static self, disable: bool) -> &'static RenderMaterial {
        if self.disable_diffuse() == disable {
            return self;
        }
        let bits = if disable {
            self.bits | DIFFUSE_DISABLE_FLAG
        } else {
            self.bits & !DIFFUSE_DISABLE_FLAG
        };
        RenderMaterial::by_index(bits as u32)
    }
}

/// Builder for materials. `find()` always returns the interned table entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialFinder {
    bits: u8,
}

impl MaterialFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.bits = 0;
        self
    }

    pub fn blend_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.bits = (self.bits & !BLEND_MODE_MASK) | mode as u8;
        self
    }

    pub fn disable_color_index(&mut self, disable: bool) -> &mut Self {
        self.set(COLOR_DISABLE_FLAG, disable)
    }

    pub fn emissive(&mut self, emissive: bool) -> &mut Self {
        self.set(EMISSIVE_FLAG, emissive)
    }

    pub fn disable_diffuse(&mut self, disable: bool) -> &mut Self {
        self.set(DIFFUSE_DISABLE_FLAG, disable)
    }

    pub fn disable_ao(&mut self, disable: bool) -> &mut Self {
        self.set(AO_DISABLE_FLAG, disable)
    }

    pub fn copy_from(&mut self, material: &RenderMaterial) -> &mut Self {
        self.bits = material.bits;
        self
    }

    pub fn find(&self) -> &'static RenderMaterial {
        RenderMaterial::by_index(self.bits as u32)
    }

    fn set(&mut self, flag: u8, on: bool) -> &mut Self {
        self.bits = if on { self.bits | flag } else { self.bits & !flag };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_properties_intern_to_same_entry() {
        let a = MaterialFinder::new()
            .blend_mode(BlendMode::Cutout)
            .emissive(true)
            .find();
        let b = MaterialFinder::new()
            .emissive(true)
            .blend_mode(BlendMode::Cutout)
            .find();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.blend_mode(), BlendMode::Cutout);
        assert!(a.emissive());
        assert!(!a.disable_ao());
    }

    #[test]
    fn finder_roundtrips_every_index() {
        for i in 0..MATERIAL_COUNT as u32 {
            let m = RenderMaterial::by_index(i);
            let again = MaterialFinder::new().copy_from(m).find();
            assert!(std::ptr::eq(m, again));
            if i & BLEND_MODE_MASK as u32 <= BlendMode::Translucent as u32 {
                assert_eq!(again.index(), i);
            }
        }
    }

    #[test]
    fn unknown_blend_bits_read_as_default() {
        for blend in 5..=7u32 {
            let raw = blend | EMISSIVE_FLAG as u32 | AO_DISABLE_FLAG as u32;
            let m = RenderMaterial::by_index(raw);
            let expected = MaterialFinder::new().emissive(true).disable_ao(true).find();
            assert!(std::ptr::eq(m, expected));
            assert_eq!(m.blend_mode(), BlendMode::Default);
            assert!(m.emissive());
        }
        assert!(std::ptr::eq(RenderMaterial::by_index(7 + 256), RenderMaterial::standard()));
    }

    #[test]
    fn diffuse_toggle_keeps_other_bits() {
        let m = MaterialFinder::new()
            .disable_ao(true)
            .blend_mode(BlendMode::Translucent)
            .find();
        let flat = m.with_disable_diffuse(true);
        assert!(flat.disable_diffuse());
        assert!(flat.disable_ao());
        assert_eq!(flat.blend_mode(), BlendMode::Translucent);
        assert!(std::ptr::eq(flat.with_disable_diffuse(false), m));
    }

    #[test]
    fn standard_defers_to_block_layer() {
        assert_eq!(RenderMaterial::standard().blend_mode().render_layer(), None);
        assert_eq!(
            BlendMode::CutoutMipped.render_layer(),
            Some(RenderLayer::CutoutMipped)
        );
    }
}

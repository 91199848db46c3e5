//! Packed ARGB color and lightmap arithmetic.

/// Full block and sky light, the value emissive quads are forced to.
pub const MAX_LIGHTMAP: u32 = 0x00F0_00F0;

/// Packs block/sky levels (`0..=15`) into a lightmap word.
#[inline]
pub fn pack_lightmap(block: u32, sky: u32) -> u32 {
    ((block & 0xF) << 4) | ((sky & 0xF) << 20)
}

#[inline]
pub fn lightmap_block(lightmap: u32) -> u32 {
    lightmap & 0xFFFF
}

#[inline]
pub fn lightmap_sky(lightmap: u32) -> u32 {
    lightmap >> 16
}

/// Component-wise multiply of two ARGB colors. `0xFFFFFFFF` is the identity.
pub fn multiply_color(a: u32, b: u32) -> u32 {
    if a == u32::MAX {
        return b;
    }
    if b == u32::MAX {
        return a;
    }
    let mut out = 0u32;
    for shift in [0, 8, 16, 24] {
        let ca = (a >> shift) & 0xFF;
        let cb = (b >> shift) & 0xFF;
        out |= ((ca * cb / 0xFF) & 0xFF) << shift;
    }
    out
}

/// Scales RGB by `shade` and keeps alpha.
pub fn multiply_rgb(color: u32, shade: f32) -> u32 {
    let scale = |c: u32| -> u32 { ((c & 0xFF) as f32 * shade).clamp(0.0, 255.0) as u32 };
    let a = color & 0xFF00_0000;
    let r = scale(color >> 16);
    let g = scale(color >> 8);
    let b = scale(color);
    a | (r << 16) | (g << 8) | b
}

/// Per-channel max of two lightmaps; a zero lightmap means "unset".
pub fn max_brightness(a: u32, b: u32) -> u32 {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }
    (lightmap_block(a).max(lightmap_block(b))) | (lightmap_sky(a).max(lightmap_sky(b)) << 16)
}

/// ARGB to ABGR and back.
#[inline]
pub fn swap_red_blue(color: u32) -> u32 {
    (color & 0xFF00_FF00) | ((color >> 16) & 0xFF) | ((color & 0xFF) << 16)
}

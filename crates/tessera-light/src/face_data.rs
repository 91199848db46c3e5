use tessera_quad::color::MAX_LIGHTMAP;

/// Smoothed AO and light at the four corners of one block face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AoFaceData {
    pub ao: [f32; 4],
    pub block: [u32; 4],
    pub sky: [u32; 4],
}

impl AoFaceData {
    #[inline]
    pub fn set_light(&mut self, corner: usize, lightmap: u32) {
        self.block[corner] = lightmap & 0xFFFF;
        self.sky[corner] = (lightmap >> 16) & 0xFFFF;
    }

    #[inline]
    pub fn light(&self, corner: usize) -> u32 {
        (self.sky[corner] << 16) | self.block[corner]
    }

    pub fn weighted_ao(&self, w: &[f32; 4]) -> f32 {
        self.ao.iter().zip(w).map(|(a, w)| a * w).sum()
    }

    pub fn weighted_block_light(&self, w: &[f32; 4]) -> u32 {
        weigh(&self.block, w)
    }

    pub fn weighted_sky_light(&self, w: &[f32; 4]) -> u32 {
        weigh(&self.sky, w)
    }

    pub fn weighted_combined_light(&self, w: &[f32; 4]) -> u32 {
        (self.weighted_sky_light(w) << 16) | self.weighted_block_light(w)
    }

    /// Linear blend `a * wa + b * wb`; light channels truncate after mixing.
    pub fn weighted_mean(a: &AoFaceData, wa: f32, b: &AoFaceData, wb: f32) -> AoFaceData {
        let mut out = AoFaceData::default();
        for i in 0..4 {
            out.ao[i] = a.ao[i] * wa + b.ao[i] * wb;
            out.block[i] = (a.block[i] as f32 * wa + b.block[i] as f32 * wb) as u32;
            out.sky[i] = (a.sky[i] as f32 * wa + b.sky[i] as f32 * wb) as u32;
        }
        out
    }
}

fn weigh(values: &[u32; 4], w: &[f32; 4]) -> u32 {
    let sum: f32 = values.iter().zip(w).map(|(v, w)| *v as f32 * w).sum();
    sum as u32 & 0xFF
}

/// Averages four packed lightmaps into one corner value.
///
/// When any sample is zero and `floor` is set, each channel is first raised
/// to the smallest non-zero value that channel has among the samples. Emissive
/// samples are then forced to full bright, so they never feed the floor.
pub fn corner_brightness(samples: [u32; 4], emissive: [bool; 4], floor: bool) -> u32 {
    let mut s = samples;
    if floor && s.contains(&0) {
        for shift in [0u32, 16] {
            let channel = |v: u32| (v >> shift) & 0xFFFF;
            let Some(min) = s.iter().map(|v| channel(*v)).filter(|c| *c != 0).min() else {
                continue;
            };
            for v in s.iter_mut() {
                if channel(*v) < min {
                    *v = (*v & !(0xFFFF << shift)) | (min << shift);
                }
            }
        }
    }
    for (v, em) in s.iter_mut().zip(emissive) {
        if em {
            *v = MAX_LIGHTMAP;
        }
    }
    (s.iter().sum::<u32>() >> 2) & 0x00FF_00FF
}

//! Per-cell light words, the neighborhood light cache, and smooth
//! (ambient occlusion) lighting for block quads.
#![forbid(unsafe_code)]

pub mod cache;
pub mod calc;
pub mod face;
pub mod face_data;
pub mod word;
pub mod world;

pub use cache::LightDataCache;
pub use calc::{AoCalculator, AoContext, AoMode, AoOptions, ReferenceAo};
pub use face::AoFace;
pub use face_data::{AoFaceData, corner_brightness};
pub use word::CellLight;
pub use world::{BlockState, BlockView, LightDataSource};

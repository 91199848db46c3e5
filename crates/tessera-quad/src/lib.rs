//! Packed quad encoding, quad views and emitters, and the geometry helpers
//! that classify a quad from its vertex positions.
#![forbid(unsafe_code)]

pub mod baked;
pub mod color;
pub mod emitter;
pub mod encoding;
pub mod geometry;
pub mod mesh;
pub mod mutable;
pub mod normal;
pub mod sprite;
pub mod view;

pub use baked::BakedQuad;
pub use emitter::{QuadEmitter, QuadSink};
pub use geometry::GeometryFlags;
pub use mesh::{Mesh, MeshBuilder};
pub use mutable::MutableQuad;
pub use sprite::{BakeFlags, Sprite};
pub use view::{EncodedQuad, QuadView};

use std::path::PathBuf;

use tessera_geom::BlockPos;
use tessera_light::BlockState;
use thiserror::Error;

/// Failure reported by a host model while emitting quads.
pub type ModelError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum TessellateError {
    #[error("tessellating block {state:?} at ({}, {}, {})", pos.x, pos.y, pos.z)]
    Block {
        pos: BlockPos,
        state: BlockState,
        #[source]
        source: ModelError,
    },
    #[error("tessellating item model")]
    Item(#[source] ModelError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing renderer config")]
    Parse(#[from] toml::de::Error),
}

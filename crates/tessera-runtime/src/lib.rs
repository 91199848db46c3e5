//! Parallel chunk-section tessellation over a pool of reusable render contexts.
#![forbid(unsafe_code)]

mod context_pool;

use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tessera_geom::{BlockPos, Vec3};
use tessera_light::{BlockState, BlockView};
use tessera_render::{
    BlockModel, ChunkBuildBuffers, RendererConfig, SpriteFinder, TerrainRenderContext, TessellateError,
};

pub use context_pool::{ContextPool, PooledContext};

/// Edge length of a chunk section in blocks.
pub const SECTION_SIZE: i32 = 16;

/// Resolves the model drawn for a block state.
pub trait ModelProvider: Send + Sync {
    fn model(&self, state: BlockState) -> Option<&dyn BlockModel>;

    /// Render offset for blocks that jitter inside their cell.
    fn model_offset(&self, _state: BlockState, _pos: BlockPos) -> Vec3 {
        Vec3::ZERO
    }
}

/// Models keyed by block id; every state of an id shares one model.
#[derive(Default)]
pub struct ModelTable {
    models: HashMap<u16, Box<dyn BlockModel + Send + Sync>>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u16, model: Box<dyn BlockModel + Send + Sync>) {
        self.models.insert(id, model);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelProvider for ModelTable {
    fn model(&self, state: BlockState) -> Option<&dyn BlockModel> {
        self.models.get(&state.id).map(|m| m.as_ref() as &dyn BlockModel)
    }
}

/// One section to build, named by its minimum corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionJob {
    pub origin: BlockPos,
}

impl SectionJob {
    /// Job for section coordinates `(sx, sy, sz)`.
    pub fn at_section(sx: i32, sy: i32, sz: i32) -> Self {
        Self {
            origin: BlockPos::new(sx * SECTION_SIZE, sy * SECTION_SIZE, sz * SECTION_SIZE),
        }
    }
}

pub struct SectionOutput {
    pub origin: BlockPos,
    pub buffers: Result<ChunkBuildBuffers, TessellateError>,
    /// Non-air blocks visited.
    pub blocks: u32,
    pub t_ms: u32,
}

/// Builds sections on a dedicated rayon pool, one pooled context per job.
pub struct SectionBuilder {
    pool: ThreadPool,
    contexts: Arc<ContextPool>,
    models: Arc<dyn ModelProvider>,
}

impl SectionBuilder {
    /// `threads == 0` lets rayon pick the thread count.
    pub fn new(
        threads: usize,
        config: RendererConfig,
        sprites: Arc<dyn SpriteFinder>,
        models: Arc<dyn ModelProvider>,
    ) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tessera-mesh-{i}"))
            .build()?;
        let contexts = ContextPool::with_capacity_from_workers(pool.current_num_threads(), config, sprites);
        Ok(Self {
            pool,
            contexts,
            models,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn contexts(&self) -> &ContextPool {
        &self.contexts
    }

    /// Builds every job in parallel. Output order matches `jobs`.
    pub fn build_sections<V>(&self, view: &V, jobs: &[SectionJob]) -> Vec<SectionOutput>
    where
        V: BlockView + Sync,
    {
        let t0 = Instant::now();
        let out: Vec<SectionOutput> = self.pool.install(|| {
            jobs.par_iter()
                .map(|job| build_section(&self.contexts, self.models.as_ref(), view, *job))
                .collect()
        });
        let quads: usize = out
            .iter()
            .filter_map(|o| o.buffers.as_ref().ok())
            .map(ChunkBuildBuffers::quad_count)
            .sum();
        let failed = out.iter().filter(|o| o.buffers.is_err()).count();
        log::debug!(
            "built {} sections ({} failed): {} quads in {} ms, {} contexts",
            jobs.len(),
            failed,
            quads,
            t0.elapsed().as_millis(),
            self.contexts.allocated()
        );
        out
    }
}

/// Tessellates one section with a context borrowed from `contexts`.
///
/// The first model error aborts the section; the context still goes back
/// to the pool.
pub fn build_section(
    contexts: &ContextPool,
    models: &dyn ModelProvider,
    view: &dyn BlockView,
    job: SectionJob,
) -> SectionOutput {
    let t0 = Instant::now();
    let mut ctx = contexts.acquire();
    let mut blocks = 0u32;
    let buffers = fill_section(&mut ctx, models, view, job.origin, &mut blocks);
    if let Err(err) = &buffers {
        log::warn!("section at {:?} abandoned: {err}", job.origin);
    }
    SectionOutput {
        origin: job.origin,
        buffers,
        blocks,
        t_ms: elapsed_ms(t0.elapsed()),
    }
}

/// Whole milliseconds, saturating at `u32::MAX`.
fn elapsed_ms(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

fn fill_section(
    ctx: &mut TerrainRenderContext,
    models: &dyn ModelProvider,
    view: &dyn BlockView,
    origin: BlockPos,
    blocks: &mut u32,
) -> Result<ChunkBuildBuffers, TessellateError> {
    let mut session = ctx.prepare(view, origin);
    for y in 0..SECTION_SIZE {
        for z in 0..SECTION_SIZE {
            for x in 0..SECTION_SIZE {
                let pos = BlockPos::new(origin.x + x, origin.y + y, origin.z + z);
                let state = view.block_state(pos);
                if state.is_air() {
                    continue;
                }
                *blocks += 1;
                let Some(model) = models.model(state) else {
                    continue;
                };
                session.tessellate_block(state, pos, model, models.model_offset(state, pos))?;
            }
        }
    }
    Ok(session.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_time_saturates() {
        assert_eq!(elapsed_ms(Duration::from_micros(1_500_900)), 1500);
        assert_eq!(elapsed_ms(Duration::from_millis(u32::MAX as u64)), u32::MAX);
        assert_eq!(elapsed_ms(Duration::from_millis(u32::MAX as u64 + 1)), u32::MAX);
        assert_eq!(elapsed_ms(Duration::from_secs(u64::MAX / 1000)), u32::MAX);
    }
}

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use tessera_render::{RendererConfig, SpriteFinder, TerrainRenderContext};

/// Lock-free pool handing each worker job its own `TerrainRenderContext`.
///
/// Contexts are created lazily up to `max_contexts`; past that, `acquire`
/// blocks until another job returns one.
pub struct ContextPool {
    available_tx: Sender<TerrainRenderContext>,
    available_rx: Receiver<TerrainRenderContext>,
    allocated: AtomicUsize,
    max_contexts: usize,
    config: RendererConfig,
    sprites: Arc<dyn SpriteFinder>,
}

impl ContextPool {
    pub fn new(max_contexts: usize, config: RendererConfig, sprites: Arc<dyn SpriteFinder>) -> Self {
        debug_assert!(max_contexts > 0);
        let (tx, rx) = bounded(max_contexts);
        Self {
            available_tx: tx,
            available_rx: rx,
            allocated: AtomicUsize::new(0),
            max_contexts,
            config,
            sprites,
        }
    }

    pub fn with_capacity_from_workers(
        worker_count: usize,
        config: RendererConfig,
        sprites: Arc<dyn SpriteFinder>,
    ) -> Arc<Self> {
        let count = worker_count.max(1) * 2;
        Arc::new(Self::new(count, config, sprites))
    }

    /// Contexts created so far.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    pub fn max_contexts(&self) -> usize {
        self.max_contexts
    }

    pub fn acquire(&self) -> PooledContext<'_> {
        if let Ok(ctx) = self.available_rx.try_recv() {
            return PooledContext {
                ctx: Some(ctx),
                pool: self,
            };
        }

        loop {
            let current = self.allocated.load(Ordering::Acquire);
            if current < self.max_contexts {
                let prev = self.allocated.fetch_add(1, Ordering::AcqRel);
                if prev < self.max_contexts {
                    log::trace!("allocating render context {}", prev + 1);
                    let ctx = TerrainRenderContext::new(&self.config, self.sprites.clone());
                    return PooledContext {
                        ctx: Some(ctx),
                        pool: self,
                    };
                }
                self.allocated.fetch_sub(1, Ordering::AcqRel);
            }

            match self.available_rx.recv() {
                Ok(ctx) => {
                    return PooledContext {
                        ctx: Some(ctx),
                        pool: self,
                    };
                }
                Err(_) => continue,
            }
        }
    }

    fn release(&self, ctx: TerrainRenderContext) {
        let _ = self.available_tx.send(ctx);
    }
}

/// A context on loan; goes back to the pool on drop.
pub struct PooledContext<'pool> {
    ctx: Option<TerrainRenderContext>,
    pool: &'pool ContextPool,
}

impl Deref for PooledContext<'_> {
    type Target = TerrainRenderContext;

    fn deref(&self) -> &Self::Target {
        self.ctx.as_ref().expect("render context already released")
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx.as_mut().expect("render context already released")
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use tessera_render::SpriteAtlas;

    fn pool(max: usize) -> ContextPool {
        ContextPool::new(max, RendererConfig::default(), Arc::new(SpriteAtlas::grid(1, 1)))
    }

    #[test]
    fn released_contexts_are_reused() {
        let pool = pool(4);
        drop(pool.acquire());
        drop(pool.acquire());
        assert_eq!(pool.allocated(), 1);

        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.allocated(), 2);
        drop((a, b));
        let _c = pool.acquire();
        assert_eq!(pool.allocated(), 2);
    }

    #[test]
    fn never_exceeds_capacity() {
        let pool = pool(2);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let ctx = pool.acquire();
                        assert!(ctx.config().ambient_occlusion);
                    }
                });
            }
        });
        assert!(pool.allocated() <= 2);
    }

    #[test]
    fn capacity_scales_with_workers() {
        let sprites: Arc<dyn SpriteFinder> = Arc::new(SpriteAtlas::grid(1, 1));
        let pool = ContextPool::with_capacity_from_workers(0, RendererConfig::default(), sprites.clone());
        assert_eq!(pool.max_contexts(), 2);
        let pool = ContextPool::with_capacity_from_workers(6, RendererConfig::default(), sprites);
        assert_eq!(pool.max_contexts(), 12);
    }
}

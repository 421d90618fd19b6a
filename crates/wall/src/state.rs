use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

/// A rendered view of the whole wall, produced by the external compositor
/// and cached here until any brick state changes.
#[derive(Debug, Clone)]
pub struct RenderedWall {
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct SharedState {
    shutdown: Arc<AtomicBool>,
    render_cache: Arc<RwLock<Option<RenderedWall>>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            render_cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn set_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub async fn cached_render(&self) -> Option<RenderedWall> {
        self.render_cache.read().await.clone()
    }

    pub async fn store_render(&self, rendered: RenderedWall) {
        let mut cache = self.render_cache.write().await;
        *cache = Some(rendered);
    }

    /// Every writer of brick state must call this.
    pub async fn invalidate_render(&self) {
        let mut cache = self.render_cache.write().await;
        if cache.take().is_some() {
            debug!("Invalidated cached wall render");
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use resvg::tiny_skia;

use crate::foundation::error::{ToonletterError, ToonletterResult};

/// Bounded free-list of reusable raster surfaces.
///
/// Checkout and checkin are strictly paired: [`SurfacePool::acquire`] hands
/// out an RAII guard whose drop returns the surface, so a surface makes it
/// back even when rasterization of a box fails mid-way. Each checked-out
/// surface is owned by exactly one caller at a time.
pub struct SurfacePool {
    free: Mutex<Vec<tiny_skia::Pixmap>>,
    capacity: usize,
}

impl SurfacePool {
    /// Pool retaining at most `capacity` idle surfaces.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Check out a cleared surface of exactly `width` x `height` pixels,
    /// reusing an idle one when the dimensions match.
    pub fn acquire(&self, width: u32, height: u32) -> ToonletterResult<PooledSurface<'_>> {
        let reused = {
            let mut free = self
                .free
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            free.iter()
                .position(|p| p.width() == width && p.height() == height)
                .map(|idx| free.swap_remove(idx))
        };

        let pixmap = match reused {
            Some(mut p) => {
                p.fill(tiny_skia::Color::TRANSPARENT);
                p
            }
            None => tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
                ToonletterError::raster(format!(
                    "failed to allocate {width}x{height} balloon surface"
                ))
            })?,
        };

        Ok(PooledSurface {
            pool: self,
            pixmap: Some(pixmap),
        })
    }

    /// Number of idle surfaces currently held.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    fn checkin(&self, pixmap: tiny_skia::Pixmap) {
        let mut free = self
            .free
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if free.len() < self.capacity {
            free.push(pixmap);
        }
    }
}

/// Exclusive handle to a pooled surface; returns it to the pool on drop.
pub struct PooledSurface<'a> {
    pool: &'a SurfacePool,
    pixmap: Option<tiny_skia::Pixmap>,
}

impl std::fmt::Debug for PooledSurface<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl Deref for PooledSurface<'_> {
    type Target = tiny_skia::Pixmap;

    fn deref(&self) -> &Self::Target {
        self.pixmap.as_ref().expect("surface present until drop")
    }
}

impl DerefMut for PooledSurface<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.pixmap.as_mut().expect("surface present until drop")
    }
}

impl Drop for PooledSurface<'_> {
    fn drop(&mut self) {
        if let Some(pixmap) = self.pixmap.take() {
            self.pool.checkin(pixmap);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/pool.rs"]
mod tests;

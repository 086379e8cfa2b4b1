//! Background extraction of every catalog item, one image at a time.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::catalog::Catalog;
use crate::color::Color;

use super::{extract_for_item, ColorCache, ImageSource};

/// A finished extraction for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionUpdate {
    pub id: u32,
    pub color: Color,
}

/// Owns the extraction thread and the receiving end of its results.
///
/// Items are processed strictly in catalog order. Dropping the worker
/// detaches the thread; it stops at its next send and any late result is
/// discarded.
#[derive(Debug)]
pub struct ExtractionWorker {
    rx: Receiver<ExtractionUpdate>,
    handle: Option<JoinHandle<()>>,
}

impl ExtractionWorker {
    pub fn spawn<S>(source: Arc<S>, catalog: Arc<Catalog>) -> std::io::Result<Self>
    where
        S: ImageSource + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("color-extraction".into())
            .spawn(move || {
                for item in catalog.items() {
                    let color = extract_for_item(source.as_ref(), &catalog, item);
                    debug!(id = item.id, title = %item.title, %color, "extracted");
                    if tx.send(ExtractionUpdate { id: item.id, color }).is_err() {
                        debug!("extraction receiver dropped, stopping");
                        return;
                    }
                }
                info!(items = catalog.len(), "color extraction finished");
            })?;

        Ok(Self {
            rx,
            handle: Some(handle),
        })
    }

    /// Move every result that is ready into `cache` without blocking.
    /// Returns how many new colors were stored.
    pub fn drain_into(&self, cache: &mut ColorCache) -> usize {
        let mut stored = 0;
        for update in self.rx.try_iter() {
            if cache.insert(update.id, update.color) {
                stored += 1;
            }
        }
        stored
    }

    /// Wait up to `timeout` for the next result. `None` on timeout or once
    /// every item has been delivered.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ExtractionUpdate> {
        match self.rx.recv_timeout(timeout) {
            Ok(update) => Some(update),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block until every item has been extracted, storing results in `cache`.
    pub fn wait_into(mut self, cache: &mut ColorCache) {
        for update in self.rx.iter() {
            cache.insert(update.id, update.color);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("color extraction thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SampleError;
    use image::DynamicImage;
    use std::time::Instant;

    struct NoImages;

    impl ImageSource for NoImages {
        fn load(&self, locator: &str) -> Result<DynamicImage, SampleError> {
            Err(SampleError::RasterAccess(format!("no image for {locator}")))
        }
    }

    #[test]
    fn drain_counts_only_newly_stored_colors() {
        let catalog = Arc::new(Catalog::builtin());
        let worker = ExtractionWorker::spawn(Arc::new(NoImages), Arc::clone(&catalog)).unwrap();
        let mut cache = ColorCache::new();
        let preset = Color::new(1, 2, 3);
        cache.insert(2, preset);

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut stored = 0;
        while cache.len() < catalog.len() && Instant::now() < deadline {
            stored += worker.drain_into(&mut cache);
            thread::sleep(Duration::from_millis(5));
        }
        stored += worker.drain_into(&mut cache);

        assert_eq!(stored, catalog.len() - 1);
        assert_eq!(cache.get(2), Some(preset));
        assert_eq!(cache.get(1), Some(crate::catalog::GOLDEN));
        assert_eq!(cache.get(3), Some(Color::DEFAULT_FALLBACK));
    }
}

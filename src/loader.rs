// Decoding the source and building the background layer.
// This is the only step that may run off the editor's thread: big photos take
// a while to decode, and the user may close the editor before it finishes.

use crate::codec::{ImageSource, SourceKind};
use crate::error::{Error, Result};
use crate::surface::Surface;
use crate::viewport::Viewport;
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError, bounded};
use image::imageops::{self, FilterType};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// The decoded source, already resampled to its display size.
pub struct LoadedLayers {
    pub background: Surface,
    pub natural_size: (u32, u32),
    pub scale: f64,
    pub kind: SourceKind,
}

/// Decode `source` and scale it to fit `viewport` (blocking).
pub fn load_layers(
    source: &ImageSource,
    viewport: Viewport,
    allow_upscale: bool,
) -> Result<LoadedLayers> {
    load_with_cancel(source, viewport, allow_upscale, &AtomicBool::new(false))
}

fn load_with_cancel(
    source: &ImageSource,
    viewport: Viewport,
    allow_upscale: bool,
    cancelled: &AtomicBool,
) -> Result<LoadedLayers> {
    if cancelled.load(Ordering::Acquire) {
        return Err(Error::LoadCancelled);
    }
    let decoded = source.decode()?;
    let natural_size = decoded.dimensions();
    if cancelled.load(Ordering::Acquire) {
        return Err(Error::LoadCancelled);
    }

    let scale = viewport.fit_scale(natural_size, allow_upscale);
    let (w, h) = viewport.fit(natural_size, allow_upscale);
    debug!("source {}x{} -> display {w}x{h} (scale {scale:.4})", natural_size.0, natural_size.1);

    // Rendered once; the background never changes after this.
    let pixels = if (w, h) == natural_size {
        decoded
    } else {
        imageops::resize(&decoded, w, h, FilterType::Triangle)
    };

    Ok(LoadedLayers {
        background: Surface::from_image(pixels),
        natural_size,
        scale,
        kind: source.kind(),
    })
}

/// A decode running on a worker thread. After `cancel` (or on drop) the
/// worker stops at its next check and any result is thrown away.
pub struct PendingLoad {
    rx: Receiver<Result<LoadedLayers>>,
    cancelled: Arc<AtomicBool>,
}

impl PendingLoad {
    pub fn spawn(source: ImageSource, viewport: Viewport, allow_upscale: bool) -> Self {
        let (tx, rx) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || {
            let result = load_with_cancel(&source, viewport, allow_upscale, &flag);
            // The receiver is gone if the load was abandoned; nothing to report.
            let _ = tx.send(result);
        });

        Self { rx, cancelled }
    }

    /// Ask the worker to stop. Every later `try_take`/`wait` reports
    /// `Error::LoadCancelled`, even if the decode already finished.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Non-blocking check for the result.
    pub fn try_take(&self) -> Option<Result<LoadedLayers>> {
        if self.is_cancelled() {
            return Some(Err(Error::LoadCancelled));
        }
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_vanished())),
        }
    }

    /// Block for at most `timeout` waiting for the result.
    pub fn wait(&self, timeout: Duration) -> Option<Result<LoadedLayers>> {
        if self.is_cancelled() {
            return Some(Err(Error::LoadCancelled));
        }
        match self.rx.recv_timeout(timeout) {
            Ok(_) if self.is_cancelled() => Some(Err(Error::LoadCancelled)),
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(worker_vanished())),
        }
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn worker_vanished() -> Error {
    Error::decode("decoder thread exited without a result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_png;
    use image::{Rgba, RgbaImage};

    fn png(w: u32, h: u32) -> ImageSource {
        let img = RgbaImage::from_pixel(w, h, Rgba([10, 200, 30, 255]));
        encode_png(&img, SourceKind::Bytes).unwrap()
    }

    #[test]
    fn blocking_load_scales_to_viewport() {
        let layers = load_layers(&png(200, 100), Viewport::new(80, 60), true).unwrap();
        assert_eq!(layers.background.dimensions(), (80, 40));
        assert_eq!(layers.natural_size, (200, 100));
        assert!((layers.scale - 0.4).abs() < 1e-9);
        assert_eq!(layers.background.pixel(40, 20), Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn same_size_source_is_not_resampled() {
        let layers = load_layers(&png(30, 20), Viewport::new(300, 20), false).unwrap();
        assert_eq!(layers.background.dimensions(), (30, 20));
        assert_eq!(layers.scale, 1.0);
    }

    #[test]
    fn background_load_delivers_result() {
        let pending = PendingLoad::spawn(png(64, 64), Viewport::new(32, 32), true);
        let layers = pending.wait(Duration::from_secs(10)).expect("decode finished").unwrap();
        assert_eq!(layers.background.dimensions(), (32, 32));
    }

    #[test]
    fn background_load_reports_decode_failure() {
        let garbage = ImageSource::Bytes(vec![1, 2, 3]);
        let pending = PendingLoad::spawn(garbage, Viewport::new(32, 32), true);
        let result = pending.wait(Duration::from_secs(10)).expect("decode finished");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn cancelled_flag_stops_the_worker() {
        let flag = AtomicBool::new(true);
        let result = load_with_cancel(&png(16, 16), Viewport::new(8, 8), true, &flag);
        assert!(matches!(result, Err(Error::LoadCancelled)));
    }

    #[test]
    fn cancelled_load_reports_cancellation() {
        let pending = PendingLoad::spawn(png(64, 64), Viewport::new(32, 32), true);
        pending.cancel();
        assert!(pending.is_cancelled());
        let result = pending.wait(Duration::from_secs(10)).expect("cancellation is reported");
        assert!(matches!(result, Err(Error::LoadCancelled)));
        assert!(matches!(pending.try_take(), Some(Err(Error::LoadCancelled))));
    }
}

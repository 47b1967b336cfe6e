//! Circular buffer of time-slices over a [`VolumetricFrameStore`].
//!
//! The cursor names the layer most recently written. A write advances the cursor first and then
//! overwrites the layer at the new position, so the layer right after the cursor is always the
//! oldest one and the next to be replaced.

use crate::foundation::core::{FrameRGBA, Resolution};
use crate::foundation::error::{EchoError, EchoResult};
use crate::ring::store::VolumetricFrameStore;

/// Normalized depth coordinates of the newest and oldest layers.
///
/// Derived from the ring cursor on every render tick; never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadWindow {
    /// Depth of the layer about to be overwritten, `(layer_index + 1) / frames`.
    pub oldest: f64,
    /// Depth of the most recently written layer, `layer_index / frames`.
    pub newest: f64,
}

impl ReadWindow {
    /// Window for `layer_index` in a ring of `frames` layers.
    ///
    /// `oldest` is not wrapped: at `layer_index == frames - 1` it equals `1.0`, which addresses
    /// layer 0 under a repeating depth axis.
    pub fn for_cursor(layer_index: usize, frames: usize) -> Self {
        let f = frames as f64;
        Self {
            oldest: (layer_index + 1) as f64 / f,
            newest: layer_index as f64 / f,
        }
    }
}

/// Fixed-capacity ring of `frames` RGBA8 layers.
///
/// Constructing the value allocates and zero-fills the store with the cursor at 0, so there is
/// no way to write or read before initialization.
#[derive(Clone, Debug)]
pub struct TemporalRingBuffer {
    store: VolumetricFrameStore,
    layer_index: usize,
    writes: u64,
}

impl TemporalRingBuffer {
    /// Allocate a ring of `frames` layers at `res`. Requires `frames >= 2`.
    pub fn new(res: Resolution, frames: usize) -> EchoResult<Self> {
        if frames < 2 {
            return Err(EchoError::validation(format!(
                "ring buffer needs at least 2 frames, got {frames}"
            )));
        }
        let store = VolumetricFrameStore::new(res, frames)?;
        tracing::debug!(
            width = res.width,
            height = res.height,
            frames,
            bytes = store.as_bytes().len(),
            "allocated volumetric frame store"
        );
        Ok(Self {
            store,
            layer_index: 0,
            writes: 0,
        })
    }

    /// Advance the cursor and commit `frame` into the newly current layer.
    ///
    /// The frame must match the store resolution. On error nothing changes. The cursor value is
    /// updated only after the layer copy completes; `&mut self` keeps readers out for the whole
    /// step.
    pub fn write_layer(&mut self, frame: &FrameRGBA) -> EchoResult<()> {
        if frame.resolution() != self.store.resolution() {
            return Err(EchoError::validation(format!(
                "frame is {}x{}, ring layers are {}x{}",
                frame.width,
                frame.height,
                self.store.resolution().width,
                self.store.resolution().height
            )));
        }
        let next = (self.layer_index + 1) % self.store.frames();
        self.store.write_layer(next, &frame.data)?;
        self.layer_index = next;
        self.writes += 1;
        Ok(())
    }

    /// Current read window; a pure function of the cursor.
    pub fn read_window(&self) -> ReadWindow {
        ReadWindow::for_cursor(self.layer_index, self.store.frames())
    }

    /// Layer most recently written (0 before any write).
    pub fn layer_index(&self) -> usize {
        self.layer_index
    }

    /// Layer that the next write will replace.
    pub fn oldest_layer(&self) -> usize {
        (self.layer_index + 1) % self.store.frames()
    }

    /// Ring depth.
    pub fn frame_count(&self) -> usize {
        self.store.frames()
    }

    /// Layer resolution.
    pub fn resolution(&self) -> Resolution {
        self.store.resolution()
    }

    /// Number of layers committed since construction.
    pub fn writes_committed(&self) -> u64 {
        self.writes
    }

    /// Read-only view of the backing store for presenters.
    pub fn store(&self) -> &VolumetricFrameStore {
        &self.store
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ring/buffer.rs"]
mod tests;

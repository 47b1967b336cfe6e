use crate::foundation::core::Resolution;
use crate::foundation::error::{EchoError, EchoResult};

/// A `width x height x frames` block of RGBA8 texels addressed by `(x, y, layer)`.
///
/// Layers are stored back to back, each tightly packed and row-major, the same layout a 3D
/// texture upload expects. Zero-filled on allocation.
#[derive(Clone, Debug)]
pub struct VolumetricFrameStore {
    res: Resolution,
    frames: usize,
    texels: Vec<u8>,
}

impl VolumetricFrameStore {
    /// Allocate a zeroed store.
    pub fn new(res: Resolution, frames: usize) -> EchoResult<Self> {
        if res.width == 0 || res.height == 0 || frames == 0 {
            return Err(EchoError::validation(
                "volumetric store dimensions must be non-zero",
            ));
        }
        let len = res
            .rgba8_len()
            .checked_mul(frames)
            .ok_or_else(|| EchoError::validation("volumetric store size overflow"))?;
        Ok(Self {
            res,
            frames,
            texels: vec![0u8; len],
        })
    }

    /// Per-layer resolution.
    pub fn resolution(&self) -> Resolution {
        self.res
    }

    /// Depth of the store in layers.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Bytes in a single layer.
    pub fn layer_len(&self) -> usize {
        self.res.rgba8_len()
    }

    /// Borrow one layer. Panics if `layer >= frames`.
    pub fn layer(&self, layer: usize) -> &[u8] {
        let len = self.layer_len();
        &self.texels[layer * len..(layer + 1) * len]
    }

    /// The whole store, layer-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.texels
    }

    /// Fetch one texel. Coordinates must be in range.
    #[inline]
    pub fn texel(&self, x: u32, y: u32, layer: usize) -> [u8; 4] {
        let i = layer * self.layer_len() + (y as usize * self.res.width as usize + x as usize) * 4;
        [
            self.texels[i],
            self.texels[i + 1],
            self.texels[i + 2],
            self.texels[i + 3],
        ]
    }

    pub(crate) fn write_layer(&mut self, layer: usize, pixels: &[u8]) -> EchoResult<()> {
        if layer >= self.frames {
            return Err(EchoError::validation(format!(
                "layer {layer} out of range for {} frames",
                self.frames
            )));
        }
        let len = self.layer_len();
        if pixels.len() != len {
            return Err(EchoError::validation(format!(
                "layer write holds {} bytes, expected {len}",
                pixels.len()
            )));
        }
        self.texels[layer * len..(layer + 1) * len].copy_from_slice(pixels);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ring/store.rs"]
mod tests;

use crate::foundation::error::{EchoError, EchoResult};

pub use kurbo::{Affine, Point, Rect};

/// Absolute 0-based tick index of the host frame loop.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Index of the following tick.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated frame rate.
    pub fn new(num: u32, den: u32) -> EchoResult<Self> {
        if den == 0 {
            return Err(EchoError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(EchoError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Duration of a single frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Visual delay covered by a ring of `frames` layers at this rate.
    pub fn delay_secs(self, frames: usize) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Pixel dimensions of a capture, layer or output surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a resolution, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> EchoResult<Self> {
        if width == 0 || height == 0 {
            return Err(EchoError::validation(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte length of a tightly packed RGBA8 buffer at this resolution.
    pub fn rgba8_len(self) -> usize {
        self.pixel_count() * 4
    }

    /// Full-surface rectangle in pixel space.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// A tightly packed, straight-alpha RGBA8 frame, row-major.
///
/// This is the `ConvertedFrame` handed to the ring buffer as well as the presenter's output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Allocate a zeroed (transparent black) frame.
    pub fn new(res: Resolution) -> Self {
        Self {
            width: res.width,
            height: res.height,
            data: vec![0u8; res.rgba8_len()],
        }
    }

    /// Allocate a frame filled with a single colour.
    pub fn solid(res: Resolution, rgba: [u8; 4]) -> Self {
        Self {
            width: res.width,
            height: res.height,
            data: rgba.repeat(res.pixel_count()),
        }
    }

    /// Dimensions of this frame.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Check that `data` matches `width * height * 4`.
    pub fn validate(&self) -> EchoResult<()> {
        let expected = self.resolution().rgba8_len();
        if self.data.len() != expected {
            return Err(EchoError::validation(format!(
                "rgba8 frame holds {} bytes, expected {expected} for {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Read the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

use crate::foundation::core::Resolution;
use crate::foundation::error::{EchoError, EchoResult};
use crate::pixel::yuv422::{ChromaOrder, RawFrame, encode_yuyv_pair};
use crate::source::state::FrameSource;

/// SMPTE-style bar colours, left to right.
const BARS: [[u8; 3]; 8] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
    [16, 16, 16],
];

/// Deterministic synthetic camera: colour bars scrolling sideways with a bright sweep line.
///
/// Useful without hardware and in tests. Frame `k` only depends on `k` and the options.
#[derive(Clone, Debug)]
pub struct TestPatternSource {
    res: Resolution,
    order: ChromaOrder,
    row_padding: usize,
    scroll_px_per_frame: u32,
    idle_every: Option<u64>,
    frame_limit: Option<u64>,
    polls: u64,
    emitted: u64,
}

impl TestPatternSource {
    /// Pattern at `res` in `Y0 U Y1 V` order. Width must be even.
    pub fn new(res: Resolution) -> EchoResult<Self> {
        if !res.width.is_multiple_of(2) {
            return Err(EchoError::validation(
                "test pattern width must be even for 4:2:2 output",
            ));
        }
        Ok(Self {
            res,
            order: ChromaOrder::Yuyv,
            row_padding: 0,
            scroll_px_per_frame: 4,
            idle_every: None,
            frame_limit: None,
            polls: 0,
            emitted: 0,
        })
    }

    /// Emit bytes in `order`.
    pub fn with_order(mut self, order: ChromaOrder) -> Self {
        self.order = order;
        self
    }

    /// Pad every row with `bytes` of filler after the pixel data.
    pub fn with_row_padding(mut self, bytes: usize) -> Self {
        self.row_padding = bytes;
        self
    }

    /// Horizontal scroll speed.
    pub fn with_scroll(mut self, px_per_frame: u32) -> Self {
        self.scroll_px_per_frame = px_per_frame;
        self
    }

    /// Report "no new frame" on every `n`th poll (1-based), like a camera slower than the loop.
    pub fn with_idle_every(mut self, n: u64) -> Self {
        self.idle_every = (n > 0).then_some(n);
        self
    }

    /// Fail after `n` frames, like a device being unplugged.
    pub fn with_frame_limit(mut self, n: u64) -> Self {
        self.frame_limit = Some(n);
        self
    }

    /// Frames produced so far.
    pub fn frames_emitted(&self) -> u64 {
        self.emitted
    }

    /// Render frame `k` without advancing the source.
    pub fn frame_at(&self, k: u64) -> RawFrame {
        let w = self.res.width as usize;
        let h = self.res.height as usize;
        let stride = w * 2 + self.row_padding;
        let mut data = vec![0u8; stride * h];

        let shift = (k.wrapping_mul(u64::from(self.scroll_px_per_frame)) % w as u64) as usize;
        let sweep_row = (k % h as u64) as usize;

        for (y, row) in data.chunks_exact_mut(stride).enumerate() {
            for (pair, out) in row[..w * 2].chunks_exact_mut(4).enumerate() {
                let x = pair * 2;
                let a = self.color_at(x, y, shift, sweep_row);
                let b = self.color_at(x + 1, y, shift, sweep_row);
                out.copy_from_slice(&reorder(encode_yuyv_pair(a, b), self.order));
            }
            row[w * 2..].fill(0xA5);
        }

        RawFrame {
            data,
            stride,
            width: self.res.width,
            height: self.res.height,
        }
    }

    fn color_at(&self, x: usize, y: usize, shift: usize, sweep_row: usize) -> [u8; 3] {
        if y == sweep_row {
            return [255, 255, 255];
        }
        let w = self.res.width as usize;
        let bar = ((x + shift) % w) * BARS.len() / w;
        BARS[bar]
    }
}

fn reorder(yuyv: [u8; 4], order: ChromaOrder) -> [u8; 4] {
    let [y0, u, y1, v] = yuyv;
    match order {
        ChromaOrder::Yuyv => [y0, u, y1, v],
        ChromaOrder::Uyvy => [u, y0, v, y1],
        ChromaOrder::Yvyu => [y0, v, y1, u],
    }
}

impl FrameSource for TestPatternSource {
    fn resolution(&self) -> Resolution {
        self.res
    }

    fn next_frame(&mut self) -> EchoResult<Option<RawFrame>> {
        self.polls += 1;
        if let Some(limit) = self.frame_limit
            && self.emitted >= limit
        {
            return Err(EchoError::source(format!(
                "test pattern exhausted after {limit} frames"
            )));
        }
        if let Some(n) = self.idle_every
            && self.polls.is_multiple_of(n)
        {
            return Ok(None);
        }
        let frame = self.frame_at(self.emitted);
        self.emitted += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/test_pattern.rs"]
mod tests;

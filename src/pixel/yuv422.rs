//! Packed 4:2:2 luma/chroma to RGBA8 conversion.
//!
//! Uses the ITU-R BT.601 studio-swing transform in 20-bit fixed point. Each pair of horizontally
//! adjacent pixels shares one chroma pair; both luma samples of the pair reuse the chroma terms
//! computed once per pair.

use crate::foundation::core::{FrameRGBA, Resolution};
use crate::foundation::error::{EchoError, EchoResult};
use crate::foundation::math::saturate_u8;

const SHIFT: u32 = 20;
const BIAS: i32 = 1 << (SHIFT - 1);

const CY: i32 = 1_220_542;
const CUB: i32 = 2_116_026;
const CUG: i32 = -409_993;
const CVG: i32 = -852_492;
const CVR: i32 = 1_673_527;

/// Byte order of one packed 4-byte pixel pair.
///
/// The order is fixed by configuration; it is never sniffed from the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromaOrder {
    /// `Y0 U Y1 V` (also known as YUY2), the native webcam order.
    #[default]
    Yuyv,
    /// `U Y0 V Y1`.
    Uyvy,
    /// `Y0 V Y1 U`.
    Yvyu,
}

impl ChromaOrder {
    /// Byte offsets of `(luma0, u, luma1, v)` inside a pixel pair.
    fn offsets(self) -> (usize, usize, usize, usize) {
        match self {
            Self::Yuyv => (0, 1, 2, 3),
            Self::Uyvy => (1, 0, 3, 2),
            Self::Yvyu => (0, 3, 2, 1),
        }
    }

    /// Name understood by `ffmpeg -pix_fmt`.
    pub fn ffmpeg_pix_fmt(self) -> &'static str {
        match self {
            Self::Yuyv => "yuyv422",
            Self::Uyvy => "uyvy422",
            Self::Yvyu => "yvyu422",
        }
    }
}

/// One captured frame in packed 4:2:2 layout.
///
/// `stride` is the byte distance between rows and may exceed `width * 2` when the producer pads
/// rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Packed pixel bytes, at least `stride * height` long.
    pub data: Vec<u8>,
    /// Bytes per row including padding.
    pub stride: usize,
    /// Width in pixels (even).
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RawFrame {
    /// Wrap a tightly packed buffer (`stride == width * 2`).
    pub fn packed(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            stride: width as usize * 2,
            width,
            height,
        }
    }

    /// Dimensions of this frame.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Check the buffer against its declared geometry.
    pub fn validate(&self) -> EchoResult<()> {
        validate_geometry(self.data.len(), self.stride, self.width, self.height)
    }
}

fn validate_geometry(len: usize, stride: usize, width: u32, height: u32) -> EchoResult<()> {
    if width == 0 || height == 0 {
        return Err(EchoError::validation(
            "4:2:2 frame width/height must be non-zero",
        ));
    }
    if !width.is_multiple_of(2) {
        return Err(EchoError::validation(format!(
            "4:2:2 frame width must be even, got {width}"
        )));
    }
    let row_bytes = width as usize * 2;
    if stride < row_bytes {
        return Err(EchoError::validation(format!(
            "4:2:2 stride {stride} is smaller than width*2 ({row_bytes})"
        )));
    }
    let needed = stride
        .checked_mul(height as usize)
        .ok_or_else(|| EchoError::validation("4:2:2 frame size overflow"))?;
    if len < needed {
        return Err(EchoError::validation(format!(
            "4:2:2 frame holds {len} bytes, expected at least {needed}"
        )));
    }
    Ok(())
}

/// Stateless converter bound to a fixed [`ChromaOrder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Yuv422Converter {
    order: ChromaOrder,
}

impl Yuv422Converter {
    /// Create a converter for the given byte order.
    pub fn new(order: ChromaOrder) -> Self {
        Self { order }
    }

    /// Byte order this converter reads.
    pub fn order(&self) -> ChromaOrder {
        self.order
    }

    /// Convert into a freshly allocated frame.
    pub fn convert(&self, raw: &RawFrame) -> EchoResult<FrameRGBA> {
        let mut out = FrameRGBA::new(raw.resolution());
        self.convert_into(raw, &mut out)?;
        Ok(out)
    }

    /// Convert into an existing frame, reusing its allocation when the size already matches.
    pub fn convert_into(&self, raw: &RawFrame, dst: &mut FrameRGBA) -> EchoResult<()> {
        raw.validate()?;
        let len = raw.resolution().rgba8_len();
        dst.width = raw.width;
        dst.height = raw.height;
        dst.data.resize(len, 0);
        convert_rows(
            &raw.data,
            raw.stride,
            raw.width as usize,
            raw.height as usize,
            self.order,
            &mut dst.data,
        );
        Ok(())
    }
}

/// Convert a packed `Y0 U Y1 V` buffer into tightly packed RGBA8 (`width * height * 4` bytes).
///
/// Out-of-range results are clamped silently; alpha is always 255.
pub fn convert_yuv422_to_rgba8(
    src: &[u8],
    stride: usize,
    width: u32,
    height: u32,
) -> EchoResult<Vec<u8>> {
    validate_geometry(src.len(), stride, width, height)?;
    let mut out = vec![0u8; width as usize * height as usize * 4];
    convert_rows(
        src,
        stride,
        width as usize,
        height as usize,
        ChromaOrder::Yuyv,
        &mut out,
    );
    Ok(out)
}

/// Buffer-reusing form of [`convert_yuv422_to_rgba8`]; `dst` is resized to fit.
pub fn convert_yuv422_into(
    src: &[u8],
    stride: usize,
    width: u32,
    height: u32,
    dst: &mut Vec<u8>,
) -> EchoResult<()> {
    validate_geometry(src.len(), stride, width, height)?;
    dst.resize(width as usize * height as usize * 4, 0);
    convert_rows(
        src,
        stride,
        width as usize,
        height as usize,
        ChromaOrder::Yuyv,
        dst,
    );
    Ok(())
}

fn convert_rows(
    src: &[u8],
    stride: usize,
    width: usize,
    height: usize,
    order: ChromaOrder,
    dst: &mut [u8],
) {
    let (y0_at, u_at, y1_at, v_at) = order.offsets();
    let row_in = width * 2;
    let row_out = width * 4;

    for (y, out_row) in dst.chunks_exact_mut(row_out).take(height).enumerate() {
        let in_row = &src[y * stride..y * stride + row_in];
        for (pair, out) in in_row.chunks_exact(4).zip(out_row.chunks_exact_mut(8)) {
            let u = i32::from(pair[u_at]) - 128;
            let v = i32::from(pair[v_at]) - 128;
            let ruv = BIAS + CVR * v;
            let guv = BIAS + CUG * u + CVG * v;
            let buv = BIAS + CUB * u;

            write_texel(&mut out[0..4], pair[y0_at], ruv, guv, buv);
            write_texel(&mut out[4..8], pair[y1_at], ruv, guv, buv);
        }
    }
}

#[inline]
fn write_texel(out: &mut [u8], luma: u8, ruv: i32, guv: i32, buv: i32) {
    // (255 - 16) * CY plus the largest chroma term stays well inside i32.
    let y = (i32::from(luma) - 16).max(0) * CY;
    out[0] = saturate_u8((y + ruv) >> SHIFT);
    out[1] = saturate_u8((y + guv) >> SHIFT);
    out[2] = saturate_u8((y + buv) >> SHIFT);
    out[3] = 255;
}

/// Encode one RGB pair into a packed `Y0 U Y1 V` group using the inverse BT.601 transform.
///
/// Chroma is averaged over the pair. Used by synthetic sources; not bit-exact with the decoder.
pub fn encode_yuyv_pair(a: [u8; 3], b: [u8; 3]) -> [u8; 4] {
    fn luma(c: [u8; 3]) -> i32 {
        let [r, g, b] = c.map(i32::from);
        ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16
    }
    fn chroma(c: [u8; 3]) -> (i32, i32) {
        let [r, g, b] = c.map(i32::from);
        (
            ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128,
            ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128,
        )
    }

    let (ua, va) = chroma(a);
    let (ub, vb) = chroma(b);
    [
        saturate_u8(luma(a)),
        saturate_u8((ua + ub + 1) / 2),
        saturate_u8(luma(b)),
        saturate_u8((va + vb + 1) / 2),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/yuv422.rs"]
mod tests;

//! Tessellated surface whose depth coordinate sweeps the ring.
//!
//! Each vertex's depth is derived from its position: `(t, u)` is rotated about the centre of the
//! unit square, the rotated `t'` is folded through a period-2 triangle wave and the result is
//! mapped across one full wrap of the ring, oldest layer to newest. Folding hides the wrap seam by
//! turning the sweep back on itself along a moving diagonal instead of jumping.

use crate::foundation::core::{Affine, Point, Rect};
use crate::foundation::math::{lerp, unit_step};
use crate::ring::buffer::ReadWindow;

/// How the rotated coordinate becomes a depth value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpMode {
    /// Period-2 triangle fold of the rotated coordinate.
    #[default]
    Fold,
    /// Linear sweep of the rotated coordinate, no fold. Shows the wrap seam once rotated.
    Linear,
}

/// 3D coordinate into the volumetric store.
///
/// `s` and `t` are normalized layer coordinates; `depth` runs over one period per full ring and
/// is meant to be sampled with a repeating depth axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleCoord {
    /// Horizontal texture coordinate in `[0, 1]`.
    pub s: f64,
    /// Vertical texture coordinate in `[0, 1]`.
    pub t: f64,
    /// Depth (time) coordinate.
    pub depth: f64,
}

/// One vertex of the warped surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    /// Screen-space position.
    pub position: Point,
    /// Where this vertex samples the store.
    pub sample: SampleCoord,
}

/// One horizontal band of the tessellation, as a triangle strip.
///
/// Vertices alternate between the band's upper and lower edge, column by column.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleStrip {
    /// Band index, top to bottom.
    pub row: usize,
    /// Strip-ordered vertices (`2 * N` of them).
    pub vertices: Vec<MeshVertex>,
}

impl TriangleStrip {
    /// Decompose into individual triangles in strip order.
    pub fn triangles(&self) -> impl Iterator<Item = [MeshVertex; 3]> + '_ {
        self.vertices.windows(3).map(|w| [w[0], w[1], w[2]])
    }
}

/// Period-2 triangle wave: `0 -> 0`, `1 -> 1`, `2 -> 0`, continuous everywhere.
pub fn triangle_fold(s: f64) -> f64 {
    let m = s.rem_euclid(2.0);
    m.min(2.0 - m)
}

/// Map a normalized sweep value onto the ring's depth range.
///
/// `0` lands on the oldest layer and `1` one full wrap later on the newest, so the sweep crosses
/// the `0/1` boundary of the depth axis without skipping or repeating a layer.
pub fn remap_depth(sweep: f64, window: ReadWindow) -> f64 {
    lerp(window.oldest, 1.0 + window.newest, sweep)
}

/// Generates the warped tessellation for a screen region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpedMeshSampler {
    region: Rect,
    vertices_per_axis: usize,
    mode: WarpMode,
}

impl WarpedMeshSampler {
    /// Sampler covering `region` with `vertices_per_axis` samples along each axis.
    ///
    /// Fewer than 2 vertices per axis produces no geometry.
    pub fn new(region: Rect, vertices_per_axis: usize, mode: WarpMode) -> Self {
        Self {
            region,
            vertices_per_axis,
            mode,
        }
    }

    /// Screen region covered.
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Tessellation density.
    pub fn vertices_per_axis(&self) -> usize {
        self.vertices_per_axis
    }

    /// Depth mapping mode.
    pub fn mode(&self) -> WarpMode {
        self.mode
    }

    /// Number of strips [`Self::generate`] yields.
    pub fn strip_count(&self) -> usize {
        self.vertices_per_axis.saturating_sub(1)
    }

    /// Lazily generate the strips for one render tick.
    ///
    /// `rotation_rad` is applied as given; callers wrap it if they care.
    pub fn generate(&self, window: ReadWindow, rotation_rad: f64) -> StripRows {
        StripRows {
            sampler: *self,
            window,
            rotate: Affine::rotate_about(rotation_rad, Point::new(0.5, 0.5)),
            row: 0,
        }
    }

    /// Depth coordinate for normalized surface position `(t, u)`.
    pub fn depth_at(&self, t: f64, u: f64, window: ReadWindow, rotation_rad: f64) -> f64 {
        let rotate = Affine::rotate_about(rotation_rad, Point::new(0.5, 0.5));
        self.depth_with(rotate, t, u, window)
    }

    fn depth_with(&self, rotate: Affine, t: f64, u: f64, window: ReadWindow) -> f64 {
        let rotated = (rotate * Point::new(t, u)).x;
        let sweep = match self.mode {
            WarpMode::Fold => triangle_fold(rotated),
            WarpMode::Linear => rotated,
        };
        remap_depth(sweep, window)
    }

    fn vertex(&self, rotate: Affine, t: f64, u: f64, window: ReadWindow) -> MeshVertex {
        let r = self.region;
        MeshVertex {
            position: Point::new(lerp(r.x0, r.x1, t), lerp(r.y0, r.y1, u)),
            sample: SampleCoord {
                s: t,
                t: u,
                depth: self.depth_with(rotate, t, u, window),
            },
        }
    }
}

/// Lazy iterator over the strips of one tick, see [`WarpedMeshSampler::generate`].
#[derive(Clone, Debug)]
pub struct StripRows {
    sampler: WarpedMeshSampler,
    window: ReadWindow,
    rotate: Affine,
    row: usize,
}

impl Iterator for StripRows {
    type Item = TriangleStrip;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.sampler.vertices_per_axis;
        if self.row >= self.sampler.strip_count() {
            return None;
        }
        let row = self.row;
        self.row += 1;

        let u = unit_step(row, n);
        let u2 = unit_step(row + 1, n);
        let mut vertices = Vec::with_capacity(n * 2);
        for c in 0..n {
            let t = unit_step(c, n);
            vertices.push(self.sampler.vertex(self.rotate, t, u, self.window));
            vertices.push(self.sampler.vertex(self.rotate, t, u2, self.window));
        }
        Some(TriangleStrip { row, vertices })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.sampler.strip_count().saturating_sub(self.row);
        (left, Some(left))
    }
}

impl ExactSizeIterator for StripRows {}

#[cfg(test)]
#[path = "../../tests/unit/mesh/sampler.rs"]
mod tests;

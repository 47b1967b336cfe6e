use rayon::prelude::*;

use crate::foundation::core::{FrameRGBA, Point, Resolution};
use crate::foundation::error::{EchoError, EchoResult};
use crate::mesh::sampler::{MeshVertex, SampleCoord, TriangleStrip};
use crate::render::presenter::Presenter;
use crate::render::texture::{FilterMode, sample_store};
use crate::ring::store::VolumetricFrameStore;

/// Settings for [`CpuPresenter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuPresenterOpts {
    /// Output surface size.
    pub output: Resolution,
    /// Colour of pixels no triangle covers (straight RGBA8).
    pub clear_rgba: [u8; 4],
    /// Store sampling filter.
    pub filter: FilterMode,
}

/// Software rasterizer for triangle strips.
///
/// Sample coordinates are interpolated affinely across each triangle (no perspective), and pixels
/// are covered when their centre lies inside or on an edge. Output rows are filled in parallel.
/// Presented pixels are always opaque; only store colour is sampled.
pub struct CpuPresenter {
    opts: CpuPresenterOpts,
    triangles: Vec<RasterTri>,
}

impl CpuPresenter {
    /// Create a presenter.
    pub fn new(opts: CpuPresenterOpts) -> Self {
        Self {
            opts,
            triangles: Vec::new(),
        }
    }

    /// Presenter settings.
    pub fn opts(&self) -> &CpuPresenterOpts {
        &self.opts
    }
}

impl Presenter for CpuPresenter {
    fn present(
        &mut self,
        store: &VolumetricFrameStore,
        strips: &mut dyn Iterator<Item = TriangleStrip>,
    ) -> EchoResult<FrameRGBA> {
        let out = self.opts.output;
        if out.width == 0 || out.height == 0 {
            return Err(EchoError::render("presenter output must be non-zero"));
        }

        self.triangles.clear();
        for strip in strips {
            self.triangles
                .extend(strip.triangles().filter_map(|t| RasterTri::setup(t, out)));
        }

        let mut frame = FrameRGBA::solid(out, self.opts.clear_rgba);
        let row_len = out.width as usize * 4;
        let tris = &self.triangles;
        let filter = self.opts.filter;

        frame
            .data
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f64 + 0.5;
                for tri in tris.iter().filter(|t| t.y_min <= y && y < t.y_max) {
                    for x in tri.x_min..tri.x_max {
                        let Some(coord) = tri.sample_at(Point::new(x as f64 + 0.5, py)) else {
                            continue;
                        };
                        let mut texel = sample_store(store, coord, filter);
                        // Unwritten layers are zeroed; the output is always opaque.
                        texel[3] = 255;
                        row[x * 4..x * 4 + 4].copy_from_slice(&texel);
                    }
                }
            });

        Ok(frame)
    }
}

struct RasterTri {
    v: [MeshVertex; 3],
    area: f64,
    x_min: usize,
    x_max: usize,
    y_min: usize,
    y_max: usize,
}

impl RasterTri {
    fn setup(v: [MeshVertex; 3], out: Resolution) -> Option<Self> {
        let [a, b, c] = v.map(|m| m.position);
        let area = edge(a, b, c);
        if area.abs() < 1e-12 {
            return None;
        }

        let (w, h) = (f64::from(out.width), f64::from(out.height));
        let x_min = a.x.min(b.x).min(c.x).floor().clamp(0.0, w) as usize;
        let x_max = a.x.max(b.x).max(c.x).ceil().clamp(0.0, w) as usize;
        let y_min = a.y.min(b.y).min(c.y).floor().clamp(0.0, h) as usize;
        let y_max = a.y.max(b.y).max(c.y).ceil().clamp(0.0, h) as usize;
        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        Some(Self {
            v,
            area,
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    fn sample_at(&self, p: Point) -> Option<SampleCoord> {
        let [a, b, c] = self.v.map(|m| m.position);
        // Dividing by the signed area makes the weights winding-independent.
        let w0 = edge(b, c, p) / self.area;
        let w1 = edge(c, a, p) / self.area;
        let w2 = edge(a, b, p) / self.area;
        const TOL: f64 = -1e-9;
        if w0 < TOL || w1 < TOL || w2 < TOL {
            return None;
        }

        let [sa, sb, sc] = self.v.map(|m| m.sample);
        Some(SampleCoord {
            s: w0 * sa.s + w1 * sb.s + w2 * sc.s,
            t: w0 * sa.t + w1 * sb.t + w2 * sc.t,
            depth: w0 * sa.depth + w1 * sb.depth + w2 * sc.depth,
        })
    }
}

fn edge(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

//! Sampling the volumetric store like a 3D texture.
//!
//! Matches the sampler state of a `GL_TEXTURE_3D` bound with clamp-to-edge on S/T, repeat on R
//! and linear filtering: texel centres sit at `(i + 0.5) / size`.

use crate::mesh::sampler::SampleCoord;
use crate::ring::store::VolumetricFrameStore;

/// Texture filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Trilinear blend of the 8 surrounding texels.
    #[default]
    Linear,
}

/// Sample `store` at `coord`.
pub fn sample_store(store: &VolumetricFrameStore, coord: SampleCoord, filter: FilterMode) -> [u8; 4] {
    let res = store.resolution();
    let (w, h, d) = (res.width as usize, res.height as usize, store.frames());
    match filter {
        FilterMode::Nearest => {
            let x = nearest_clamped(coord.s, w);
            let y = nearest_clamped(coord.t, h);
            let z = nearest_repeat(coord.depth, d);
            store.texel(x as u32, y as u32, z)
        }
        FilterMode::Linear => {
            let (x0, x1, fx) = linear_clamped(coord.s, w);
            let (y0, y1, fy) = linear_clamped(coord.t, h);
            let (z0, z1, fz) = linear_repeat(coord.depth, d);

            let mut acc = [0f32; 4];
            for (z, wz) in [(z0, 1.0 - fz), (z1, fz)] {
                for (y, wy) in [(y0, 1.0 - fy), (y1, fy)] {
                    for (x, wx) in [(x0, 1.0 - fx), (x1, fx)] {
                        let weight = wx * wy * wz;
                        if weight == 0.0 {
                            continue;
                        }
                        let t = store.texel(x as u32, y as u32, z);
                        for c in 0..4 {
                            acc[c] += weight * f32::from(t[c]);
                        }
                    }
                }
            }
            acc.map(|v| v.round().clamp(0.0, 255.0) as u8)
        }
    }
}

fn nearest_clamped(coord: f64, size: usize) -> usize {
    let i = (coord * size as f64).floor();
    i.clamp(0.0, (size - 1) as f64) as usize
}

fn nearest_repeat(coord: f64, size: usize) -> usize {
    ((coord * size as f64).floor() as i64).rem_euclid(size as i64) as usize
}

fn linear_clamped(coord: f64, size: usize) -> (usize, usize, f32) {
    let p = (coord * size as f64 - 0.5).clamp(0.0, (size - 1) as f64);
    let i0 = p.floor();
    let i0u = i0 as usize;
    let i1u = (i0u + 1).min(size - 1);
    (i0u, i1u, (p - i0) as f32)
}

fn linear_repeat(coord: f64, size: usize) -> (usize, usize, f32) {
    let p = coord * size as f64 - 0.5;
    let i0 = p.floor();
    let n = size as i64;
    let z0 = (i0 as i64).rem_euclid(n) as usize;
    let z1 = (z0 + 1) % size;
    (z0, z1, (p - i0) as f32)
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;

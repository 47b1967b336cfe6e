use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{EchoError, EchoResult};
use crate::mesh::sampler::{WarpMode, WarpedMeshSampler};
use crate::pixel::yuv422::ChromaOrder;
use crate::render::cpu::CpuPresenterOpts;
use crate::render::texture::FilterMode;

/// Session configuration, fixed for the life of an [`crate::EchoSession`].
///
/// Every field has a default, so a JSON document only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EchoConfig {
    /// Capture (and ring layer) size.
    pub capture: Resolution,
    /// Ring depth in layers.
    pub frames: usize,
    /// Mesh density along each axis.
    pub vertices_per_axis: usize,
    /// Byte order of the captured 4:2:2 stream.
    pub chroma_order: ChromaOrder,
    /// Presented surface.
    pub output: OutputConfig,
    /// Depth warp parameters.
    pub warp: WarpConfig,
    /// Store sampling filter.
    pub filter: FilterMode,
    /// Colour behind the mesh (straight RGBA8).
    pub clear_rgba: [u8; 4],
}

/// Output surface and tick rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Depth warp parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarpConfig {
    pub mode: WarpMode,
    /// Rotation added every render tick, in degrees.
    pub rotation_deg_per_tick: f64,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            capture: Resolution {
                width: 640,
                height: 480,
            },
            frames: 256,
            vertices_per_axis: 32,
            chroma_order: ChromaOrder::default(),
            output: OutputConfig::default(),
            warp: WarpConfig::default(),
            filter: FilterMode::default(),
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: Fps::default(),
        }
    }
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            mode: WarpMode::Fold,
            rotation_deg_per_tick: 0.5,
        }
    }
}

impl EchoConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> EchoResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| EchoError::serde(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: &Path) -> EchoResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> EchoResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EchoError::serde(e.to_string()))
    }

    /// Check every invariant the session relies on.
    pub fn validate(&self) -> EchoResult<()> {
        Resolution::new(self.capture.width, self.capture.height)?;
        if !self.capture.width.is_multiple_of(2) {
            return Err(EchoError::validation(format!(
                "capture width must be even for 4:2:2 input, got {}",
                self.capture.width
            )));
        }
        if self.frames < 2 {
            return Err(EchoError::validation(format!(
                "frames must be >= 2, got {}",
                self.frames
            )));
        }
        if self.vertices_per_axis < 2 {
            return Err(EchoError::validation(format!(
                "vertices_per_axis must be >= 2, got {}",
                self.vertices_per_axis
            )));
        }
        self.output_resolution()?;
        Fps::new(self.output.fps.num, self.output.fps.den)?;
        if !self.warp.rotation_deg_per_tick.is_finite() {
            return Err(EchoError::validation(
                "rotation_deg_per_tick must be finite",
            ));
        }
        Ok(())
    }

    /// Validated output surface size.
    pub fn output_resolution(&self) -> EchoResult<Resolution> {
        Resolution::new(self.output.width, self.output.height)
    }

    /// Mesh sampler covering the whole output surface.
    pub fn sampler(&self) -> EchoResult<WarpedMeshSampler> {
        Ok(WarpedMeshSampler::new(
            self.output_resolution()?.rect(),
            self.vertices_per_axis,
            self.warp.mode,
        ))
    }

    /// Presenter settings derived from the output section.
    pub fn presenter_opts(&self) -> EchoResult<CpuPresenterOpts> {
        Ok(CpuPresenterOpts {
            output: self.output_resolution()?,
            clear_rgba: self.clear_rgba,
            filter: self.filter,
        })
    }

    /// How far back in time the oldest layer reaches, in seconds.
    ///
    /// The session captures at most one frame per output tick, so this assumes the source keeps up
    /// with `output.fps`. A slower source stretches the delay.
    pub fn delay_secs(&self) -> f64 {
        self.output.fps.delay_secs(self.frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;

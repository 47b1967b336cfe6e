use crate::foundation::core::FrameRGBA;
use crate::foundation::error::EchoResult;
use crate::mesh::sampler::TriangleStrip;
use crate::ring::store::VolumetricFrameStore;

/// Consumes one tick's tessellation and turns it into pixels.
///
/// Implementations own all rasterization; the core only supplies vertex positions and sample
/// coordinates into `store`.
pub trait Presenter {
    /// Draw `strips`, sampling `store`, and return the finished frame.
    fn present(
        &mut self,
        store: &VolumetricFrameStore,
        strips: &mut dyn Iterator<Item = TriangleStrip>,
    ) -> EchoResult<FrameRGBA>;
}

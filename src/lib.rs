//! `chronoecho` renders a live temporal echo of a video stream.
//!
//! Captured 4:2:2 frames are converted to RGBA8 and written into a circular volumetric store
//! (width x height x frames). Every tick a warped mesh samples that store with a depth coordinate
//! that sweeps across the ring, so different parts of the picture show different moments of the
//! recent past.
//!
//! The moving parts:
//! - [`Yuv422Converter`]: BT.601 fixed-point 4:2:2 to RGBA8 conversion.
//! - [`TemporalRingBuffer`]: the store plus its write cursor and read window.
//! - [`WarpedMeshSampler`]: rotated, folded triangle strips addressing the store.
//! - [`CpuPresenter`]: software rasterizer drawing the strips.
//! - [`EchoSession`]: the capture/render loop tying them to a [`FrameSource`] and a [`FrameSink`].

#![forbid(unsafe_code)]

mod config;
mod encode;
mod foundation;
mod mesh;
mod pixel;
mod render;
mod ring;
mod session;
mod source;

pub use config::settings::{EchoConfig, OutputConfig, WarpConfig};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use encode::png::PngSequenceSink;
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Affine, Fps, FrameIndex, FrameRGBA, Point, Rect, Resolution};
pub use foundation::error::{EchoError, EchoResult};
pub use mesh::sampler::{
    MeshVertex, SampleCoord, StripRows, TriangleStrip, WarpMode, WarpedMeshSampler, remap_depth,
    triangle_fold,
};
pub use pixel::yuv422::{
    ChromaOrder, RawFrame, Yuv422Converter, convert_yuv422_into, convert_yuv422_to_rgba8,
    encode_yuyv_pair,
};
pub use render::cpu::{CpuPresenter, CpuPresenterOpts};
pub use render::presenter::Presenter;
pub use render::texture::{FilterMode, sample_store};
pub use ring::buffer::{ReadWindow, TemporalRingBuffer};
pub use ring::store::VolumetricFrameStore;
pub use session::echo_session::{CaptureOutcome, EchoSession, RunStats};
pub use source::ffmpeg::{FfmpegSource, FfmpegSourceOpts};
pub use source::state::{FrameSource, Poll, SourceState};
pub use source::test_pattern::TestPatternSource;

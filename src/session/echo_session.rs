//! The explicit capture/render loop.
//!
//! Each tick first tries to pull one frame from the source into the ring, then draws the warped
//! mesh over whatever the ring holds. A tick without a new frame still renders.

use crate::config::settings::EchoConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{EchoError, EchoResult};
use crate::mesh::sampler::WarpedMeshSampler;
use crate::pixel::yuv422::Yuv422Converter;
use crate::render::cpu::CpuPresenter;
use crate::render::presenter::Presenter;
use crate::ring::buffer::TemporalRingBuffer;
use crate::source::state::{FrameSource, Poll, SourceState};

/// What the capture half of a tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A frame was converted and committed to `layer`.
    Written {
        /// Ring layer now holding the frame.
        layer: usize,
    },
    /// The source had nothing new; the ring is untouched.
    NoNewFrame,
    /// There is no source (never attached, or it failed).
    SourceUnavailable,
}

/// Counters for [`EchoSession::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub frames_captured: u64,
    pub ticks_skipped: u64,
}

/// Owns every piece of per-session state: ring, converter scratch, source, sampler, presenter.
pub struct EchoSession {
    config: EchoConfig,
    converter: Yuv422Converter,
    scratch: FrameRGBA,
    ring: TemporalRingBuffer,
    source: SourceState,
    sampler: WarpedMeshSampler,
    presenter: Box<dyn Presenter>,
    tick: FrameIndex,
}

impl EchoSession {
    /// Build a session with the CPU presenter.
    ///
    /// A source whose resolution differs from `config.capture` is rejected; `None` starts the
    /// session with no capture device, rendering the zero-filled ring.
    pub fn new(config: EchoConfig, source: Option<Box<dyn FrameSource>>) -> EchoResult<Self> {
        let presenter = CpuPresenter::new(config.presenter_opts()?);
        Self::with_presenter(config, source, Box::new(presenter))
    }

    /// Build a session around a caller-provided presenter.
    pub fn with_presenter(
        config: EchoConfig,
        source: Option<Box<dyn FrameSource>>,
        presenter: Box<dyn Presenter>,
    ) -> EchoResult<Self> {
        config.validate()?;
        if let Some(src) = source.as_ref()
            && src.resolution() != config.capture
        {
            let got = src.resolution();
            return Err(EchoError::validation(format!(
                "source delivers {}x{}, capture is configured for {}x{}",
                got.width, got.height, config.capture.width, config.capture.height
            )));
        }

        let ring = TemporalRingBuffer::new(config.capture, config.frames)?;
        let sampler = config.sampler()?;
        tracing::info!(
            frames = config.frames,
            width = config.capture.width,
            height = config.capture.height,
            delay_secs = config.delay_secs(),
            has_source = source.is_some(),
            "echo session ready"
        );

        Ok(Self {
            converter: Yuv422Converter::new(config.chroma_order),
            scratch: FrameRGBA::new(config.capture),
            ring,
            source: SourceState::from_option(source),
            sampler,
            presenter,
            tick: FrameIndex(0),
            config,
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &EchoConfig {
        &self.config
    }

    /// The ring buffer.
    pub fn ring(&self) -> &TemporalRingBuffer {
        &self.ring
    }

    /// Index of the next tick [`Self::step`] will run.
    pub fn tick(&self) -> FrameIndex {
        self.tick
    }

    /// Whether a source is still attached.
    pub fn source_active(&self) -> bool {
        self.source.is_active()
    }

    /// Mesh rotation for `tick`, in radians within `[0, 2pi)`.
    pub fn rotation_at(&self, tick: FrameIndex) -> f64 {
        let deg = (tick.0 as f64 * self.config.warp.rotation_deg_per_tick).rem_euclid(360.0);
        deg.to_radians()
    }

    /// Poll the source once and commit any new frame to the ring.
    #[tracing::instrument(level = "trace", skip(self), fields(tick = self.tick.0))]
    pub fn capture_tick(&mut self) -> EchoResult<CaptureOutcome> {
        let raw = match self.source.poll() {
            Poll::Frame(raw) => raw,
            Poll::Idle => {
                tracing::debug!("no new frame, skipping capture");
                return Ok(CaptureOutcome::NoNewFrame);
            }
            Poll::Unavailable => return Ok(CaptureOutcome::SourceUnavailable),
        };

        self.converter.convert_into(&raw, &mut self.scratch)?;
        self.ring.write_layer(&self.scratch)?;
        Ok(CaptureOutcome::Written {
            layer: self.ring.layer_index(),
        })
    }

    /// Draw the warped mesh over the current ring contents at the current tick's rotation.
    #[tracing::instrument(level = "trace", skip(self), fields(tick = self.tick.0))]
    pub fn render_tick(&mut self) -> EchoResult<FrameRGBA> {
        let window = self.ring.read_window();
        let mut strips = self.sampler.generate(window, self.rotation_at(self.tick));
        self.presenter.present(self.ring.store(), &mut strips)
    }

    /// One full tick: capture, then render, then advance the tick counter.
    pub fn step(&mut self) -> EchoResult<(CaptureOutcome, FrameRGBA)> {
        let outcome = self.capture_tick()?;
        let frame = self.render_tick()?;
        self.tick = self.tick.next();
        Ok((outcome, frame))
    }

    /// Run `ticks` ticks, pushing every presented frame to `sink`.
    #[tracing::instrument(skip(self, sink))]
    pub fn run(&mut self, ticks: u64, sink: &mut dyn FrameSink) -> EchoResult<RunStats> {
        let out = self.config.output_resolution()?;
        sink.begin(SinkConfig {
            width: out.width,
            height: out.height,
            fps: self.config.output.fps,
        })?;

        let mut stats = RunStats::default();
        for _ in 0..ticks {
            let idx = self.tick;
            let (outcome, frame) = self.step()?;
            match outcome {
                CaptureOutcome::Written { .. } => stats.frames_captured += 1,
                CaptureOutcome::NoNewFrame | CaptureOutcome::SourceUnavailable => {
                    stats.ticks_skipped += 1
                }
            }
            sink.push_frame(idx, &frame)?;
            stats.ticks += 1;
        }
        sink.end()?;

        tracing::info!(
            ticks = stats.ticks,
            captured = stats.frames_captured,
            skipped = stats.ticks_skipped,
            "run finished"
        );
        Ok(stats)
    }
}

impl std::fmt::Debug for EchoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EchoSession")
            .field("tick", &self.tick)
            .field("layer_index", &self.ring.layer_index())
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/echo_session.rs"]
mod tests;

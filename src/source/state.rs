use crate::foundation::core::Resolution;
use crate::foundation::error::EchoResult;
use crate::pixel::yuv422::RawFrame;

/// Supplier of captured 4:2:2 frames, polled once per capture tick.
pub trait FrameSource {
    /// Resolution of the frames this source produces.
    fn resolution(&self) -> Resolution;

    /// Fetch the next frame.
    ///
    /// `Ok(None)` means nothing new arrived this tick and the tick should be skipped. An error
    /// means the source is gone; callers stop polling it.
    fn next_frame(&mut self) -> EchoResult<Option<RawFrame>>;
}

/// Availability of the capture device.
pub enum SourceState {
    /// No device, or the device failed. Ticks keep rendering the stored layers.
    Unavailable,
    /// A live source.
    Active(Box<dyn FrameSource>),
}

/// Result of polling a [`SourceState`].
#[derive(Debug)]
pub enum Poll {
    /// A new frame arrived.
    Frame(RawFrame),
    /// The source is live but had nothing new.
    Idle,
    /// No source to poll.
    Unavailable,
}

impl SourceState {
    /// Wrap an optional source.
    pub fn from_option(source: Option<Box<dyn FrameSource>>) -> Self {
        match source {
            Some(s) => Self::Active(s),
            None => Self::Unavailable,
        }
    }

    /// Return `true` while a source is attached.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Poll the source once, demoting it to [`SourceState::Unavailable`] if it fails.
    pub fn poll(&mut self) -> Poll {
        let Self::Active(source) = self else {
            return Poll::Unavailable;
        };
        match source.next_frame() {
            Ok(Some(frame)) => Poll::Frame(frame),
            Ok(None) => Poll::Idle,
            Err(err) => {
                tracing::warn!(error = %err, "frame source failed, continuing without capture");
                *self = Self::Unavailable;
                Poll::Unavailable
            }
        }
    }
}

impl std::fmt::Debug for SourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("Unavailable"),
            Self::Active(s) => f
                .debug_struct("Active")
                .field("resolution", &s.resolution())
                .finish(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/state.rs"]
mod tests;

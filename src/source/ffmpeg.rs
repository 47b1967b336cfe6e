use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::encode::ffmpeg::{is_ffmpeg_on_path, join_stderr_drain, spawn_stderr_drain};
use crate::foundation::core::Resolution;
use crate::foundation::error::{EchoError, EchoResult};
use crate::pixel::yuv422::{ChromaOrder, RawFrame};
use crate::source::state::FrameSource;

/// Options for [`FfmpegSource`].
#[derive(Clone, Debug)]
pub struct FfmpegSourceOpts {
    /// File path, URL or device name handed to `ffmpeg -i`.
    pub input: String,
    /// Explicit demuxer for capture devices (`v4l2`, `avfoundation`, `dshow`).
    pub input_format: Option<String>,
    /// Frames are scaled to this size.
    pub resolution: Resolution,
    /// Packed 4:2:2 byte order requested from ffmpeg.
    pub order: ChromaOrder,
    /// Restart file inputs at EOF.
    pub loop_input: bool,
    /// Read file inputs at their native frame rate (`-re`).
    pub realtime: bool,
}

impl FfmpegSourceOpts {
    /// Options for decoding `input` at `resolution`.
    pub fn new(input: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            input: input.into(),
            input_format: None,
            resolution,
            order: ChromaOrder::Yuyv,
            loop_input: false,
            realtime: false,
        }
    }

    pub(crate) fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-loglevel".into(), "error".into(), "-nostdin".into()];
        if self.loop_input {
            args.extend(["-stream_loop".into(), "-1".into()]);
        }
        if self.realtime {
            args.push("-re".into());
        }
        if let Some(fmt) = &self.input_format {
            args.extend(["-f".into(), fmt.clone()]);
        }
        args.extend([
            "-i".into(),
            self.input.clone(),
            "-an".into(),
            "-vf".into(),
            format!(
                "scale={}:{}",
                self.resolution.width, self.resolution.height
            ),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            self.order.ffmpeg_pix_fmt().into(),
            "pipe:1".into(),
        ]);
        args
    }
}

/// Frame source backed by a system `ffmpeg` child decoding to packed 4:2:2 on stdout.
///
/// Reads block until a whole frame is available, so a live device paces the caller. End of
/// stream is reported as an error, which makes the session treat the source as unplugged.
pub struct FfmpegSource {
    opts: FfmpegSourceOpts,
    child: Child,
    stdout: ChildStdout,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
}

impl FfmpegSource {
    /// Spawn `ffmpeg` for `opts`.
    pub fn spawn(opts: FfmpegSourceOpts) -> EchoResult<Self> {
        if !opts.resolution.width.is_multiple_of(2) {
            return Err(EchoError::validation(
                "ffmpeg source width must be even for 4:2:2 output",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(EchoError::source(
                "ffmpeg is required for video input, but was not found on PATH",
            ));
        }

        let args = opts.args();
        tracing::info!(input = %opts.input, ?args, "spawning ffmpeg frame source");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EchoError::source(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EchoError::source("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EchoError::source("failed to open ffmpeg stderr (unexpected)"))?;

        let frame_len = opts.resolution.pixel_count() * 2;
        Ok(Self {
            opts,
            child,
            stdout,
            stderr_drain: Some(spawn_stderr_drain(stderr)),
            frame_len,
        })
    }

    fn collect_stderr(&mut self) -> String {
        let _ = self.child.wait();
        self.stderr_drain
            .take()
            .map(join_stderr_drain)
            .unwrap_or_default()
    }
}

impl FrameSource for FfmpegSource {
    fn resolution(&self) -> Resolution {
        self.opts.resolution
    }

    fn next_frame(&mut self) -> EchoResult<Option<RawFrame>> {
        let mut data = vec![0u8; self.frame_len];
        match self.stdout.read_exact(&mut data) {
            Ok(()) => Ok(Some(RawFrame::packed(
                data,
                self.opts.resolution.width,
                self.opts.resolution.height,
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                let stderr = self.collect_stderr();
                Err(EchoError::source(format!(
                    "ffmpeg stream '{}' ended: {stderr}",
                    self.opts.input
                )))
            }
            Err(e) => Err(EchoError::source(format!(
                "failed to read frame from ffmpeg: {e}"
            ))),
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/ffmpeg.rs"]
mod tests;

use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig, check_frame};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{EchoError, EchoResult};
use crate::foundation::math::mul_div255_u16;

/// Where and how [`FfmpegSink`] writes its MP4.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Destination file; parent directories are created on `begin`.
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
    /// Colour translucent pixels are composited over before encoding.
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Overwriting MP4 output at `out_path` over opaque black.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    pub(crate) fn args(&self, cfg: &SinkConfig) -> Vec<String> {
        let mut args: Vec<String> = vec![
            if self.overwrite { "-y" } else { "-n" }.into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgba".into(),
            "-s".into(),
            format!("{}x{}", cfg.width, cfg.height),
            // Input rate has to precede `-i` to apply to the raw stream.
            "-r".into(),
            format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i".into(),
            "pipe:0".into(),
            "-an".into(),
            "-c:v".into(),
            "libx264".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-movflags".into(),
            "+faststart".into(),
        ];
        args.push(self.out_path.to_string_lossy().into_owned());
        args
    }
}

/// Streams presented frames into a system `ffmpeg` that encodes H.264 into an MP4.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    running: Option<Encoder>,
}

struct Encoder {
    cfg: SinkConfig,
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
    opaque: Vec<u8>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            running: None,
        }
    }

    fn check_config(&self, cfg: &SinkConfig) -> EchoResult<()> {
        if cfg.width == 0 || cfg.height == 0 || cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(EchoError::validation(format!(
                "ffmpeg sink needs non-zero size and fps, got {}x{} @ {}/{}",
                cfg.width, cfg.height, cfg.fps.num, cfg.fps.den
            )));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(EchoError::validation(format!(
                "yuv420p output needs even dimensions, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(EchoError::validation(format!(
                "refusing to overwrite '{}'",
                self.opts.out_path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip(self), fields(out = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> EchoResult<()> {
        if self.running.is_some() {
            return Err(EchoError::encode("ffmpeg sink already started"));
        }
        self.check_config(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(EchoError::encode(
                "MP4 output needs `ffmpeg` on PATH, and it was not found",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(self.opts.args(&cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EchoError::encode(format!("could not start ffmpeg: {e}")))?;
        let (Some(stdin), Some(stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(EchoError::encode("ffmpeg started without piped stdio"));
        };

        tracing::info!(width = cfg.width, height = cfg.height, "ffmpeg encoder started");
        self.running = Some(Encoder {
            opaque: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            child,
            stdin,
            stderr: spawn_stderr_drain(stderr),
            last_idx: None,
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> EchoResult<()> {
        let enc = self
            .running
            .as_mut()
            .ok_or_else(|| EchoError::encode("ffmpeg sink not started"))?;
        if enc.last_idx.is_some_and(|last| idx <= last) {
            return Err(EchoError::encode(format!(
                "frame {} pushed after frame {}",
                idx.0,
                enc.last_idx.map_or(0, |l| l.0)
            )));
        }
        check_frame(&enc.cfg, frame)?;

        flatten_onto(&mut enc.opaque, &frame.data, self.opts.bg_rgba)?;
        enc.stdin
            .write_all(&enc.opaque)
            .map_err(|e| EchoError::encode(format!("ffmpeg stdin closed early: {e}")))?;
        enc.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> EchoResult<()> {
        let Encoder {
            mut child,
            stdin,
            stderr,
            ..
        } = self
            .running
            .take()
            .ok_or_else(|| EchoError::encode("ffmpeg sink not started"))?;

        // Closing stdin is what tells ffmpeg the stream is over.
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| EchoError::encode(format!("waiting for ffmpeg failed: {e}")))?;
        let log = join_stderr_drain(stderr);
        if !status.success() {
            return Err(EchoError::encode(format!("ffmpeg failed ({status}): {log}")));
        }
        tracing::info!(out = %self.opts.out_path.display(), "mp4 written");
        Ok(())
    }
}

/// Composite straight-alpha RGBA8 `src` over `bg` into fully opaque `dst`.
fn flatten_onto(dst: &mut [u8], src: &[u8], bg: [u8; 4]) -> EchoResult<()> {
    if dst.len() != src.len() || !src.len().is_multiple_of(4) {
        return Err(EchoError::validation(format!(
            "cannot flatten {} rgba8 bytes into {}",
            src.len(),
            dst.len()
        )));
    }

    for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let alpha = u16::from(px[3]);
        if alpha == 255 {
            out.copy_from_slice(px);
            continue;
        }
        for c in 0..3 {
            let fg = mul_div255_u16(u16::from(px[c]), alpha);
            let back = mul_div255_u16(u16::from(bg[c]), 255 - alpha);
            out[c] = (fg + back).min(255) as u8;
        }
        out[3] = 255;
    }
    Ok(())
}

pub(crate) fn spawn_stderr_drain(mut stderr: ChildStderr) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

/// Collected child stderr, trimmed. Empty when the drain thread failed.
pub(crate) fn join_stderr_drain(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> String {
    match handle.join() {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
        _ => String::new(),
    }
}

/// Create the directory containing `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> EchoResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> EchoResult<()> {
    use anyhow::Context as _;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    Ok(())
}

/// Whether `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

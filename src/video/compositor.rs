use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Result, VideoError};
use crate::video::types::{Frame, VideoOutputSpec};

/// Consumes frames in order and finalizes an output video
///
/// `finish` must be called once all frames are written, also after a failed
/// write, so the container gets closed.
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    /// Append one frame
    async fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close the output. Calling it twice is a no-op.
    async fn finish(&mut self) -> Result<()>;

    /// Frames accepted so far
    fn frames_written(&self) -> usize;
}

/// Summary of a finished video file
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: String,
    pub duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
}

/// Encodes raw `rgb24` frames with an FFmpeg child process fed through stdin
pub struct FfmpegEncoder {
    spec: VideoOutputSpec,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_reader: Option<JoinHandle<String>>,
    frames_written: usize,
    finished: bool,
}

impl FfmpegEncoder {
    pub async fn check_ffmpeg_available(program: &str) -> bool {
        Command::new(program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// FFmpeg invocation for `spec`, reading frames from stdin
    pub fn build_command(program: &str, spec: &VideoOutputSpec) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(["-hide_banner", "-loglevel", "error", "-nostats"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s:v")
            .arg(format!("{}x{}", spec.size.0, spec.size.1))
            .arg("-r")
            .arg(spec.fps.to_string())
            .args(["-i", "-", "-an"])
            .arg("-c:v")
            .arg(&spec.codec)
            .arg("-tag:v")
            .arg(&spec.fourcc)
            .arg("-y")
            .arg(&spec.path);
        cmd
    }

    /// Start the encoder process
    pub fn spawn(program: &str, spec: VideoOutputSpec) -> Result<Self> {
        if spec.size.0 == 0 || spec.size.1 == 0 {
            return Err(VideoError::EncodingFailed {
                reason: format!("Cannot encode {}x{} frames", spec.size.0, spec.size.1),
            }.into());
        }

        let mut cmd = Self::build_command(program, &spec);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Spawning encoder: {:?}", cmd.as_std());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                VideoError::EncoderUnavailable { program: program.to_string() }
            } else {
                VideoError::EncodingFailed {
                    reason: format!("Failed to spawn FFmpeg process: {}", e),
                }
            }
        })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "Failed to capture FFmpeg stdin".to_string(),
        })?;

        // Drained concurrently so a chatty encoder can't block on a full pipe
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text).await;
                text
            })
        });

        Ok(Self {
            spec,
            child,
            stdin: Some(stdin),
            stderr_reader,
            frames_written: 0,
            finished: false,
        })
    }

    pub fn spec(&self) -> &VideoOutputSpec {
        &self.spec
    }
}

impl FrameSink for FfmpegEncoder {
    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let (expected_width, expected_height) = self.spec.size;
        if frame.width() != expected_width || frame.height() != expected_height {
            return Err(VideoError::FrameSizeMismatch {
                expected_width,
                expected_height,
                width: frame.width(),
                height: frame.height(),
            }.into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| VideoError::EncodingFailed {
            reason: "Encoder input already closed".to_string(),
        })?;

        stdin.write_all(frame.as_rgb_bytes()).await.map_err(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                VideoError::EncoderClosed { reason: e.to_string() }
            } else {
                VideoError::EncodingFailed {
                    reason: format!("FFmpeg stopped accepting frames: {}", e),
                }
            }
        })?;

        self.frames_written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        if let Some(mut stdin) = self.stdin.take() {
            if let Err(e) = stdin.flush().await {
                warn!("Failed to flush encoder input: {}", e);
            }
        }

        let status = self.child.wait().await.map_err(|e| VideoError::EncodingFailed {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;

        let stderr = match self.stderr_reader.take() {
            Some(reader) => reader.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            return Err(VideoError::EncodingFailed {
                reason: format!("FFmpeg failed ({}): {}", status, stderr.trim()),
            }.into());
        }

        debug!("Encoder finished {} after {} frames", self.spec.path.display(), self.frames_written);
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames_written
    }
}

/// Collects frames in memory
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemorySink {
    pub frames: Vec<Frame>,
    pub finish_calls: usize,
    pub fail_after: Option<usize>,
    pub close_after: Option<usize>,
    pub finish_failure: Option<String>,
}

#[cfg(test)]
impl FrameSink for MemorySink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_after == Some(self.frames.len()) {
            return Err(VideoError::EncodingFailed { reason: "disk full".to_string() }.into());
        }
        if self.close_after == Some(self.frames.len()) {
            return Err(VideoError::EncoderClosed { reason: "Broken pipe (os error 32)".to_string() }.into());
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.finish_calls += 1;
        match &self.finish_failure {
            Some(reason) => Err(VideoError::EncodingFailed { reason: reason.clone() }.into()),
            None => Ok(()),
        }
    }

    fn frames_written(&self) -> usize {
        self.frames.len()
    }
}

/// Writes an executable shell script that stands in for FFmpeg
#[cfg(all(test, unix))]
pub(crate) fn stand_in_encoder(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stand-in body that copies stdin to the last argument, the output path
#[cfg(all(test, unix))]
pub(crate) const CAT_TO_OUTPUT: &str = "for a; do out=\"$a\"; done\ncat > \"$out\"";

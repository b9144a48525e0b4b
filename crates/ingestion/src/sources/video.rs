//! Scene video source
//!
//! Frames are decoded through [`FrameDecoder`]. The production decoder drives
//! the `ffprobe`/`ffmpeg` executables and reads raw RGB frames from a pipe.
//! Each frame is stamped `index * 1000 / fps` milliseconds.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use bytes::Bytes;
use contracts::{
    EventSource, ImageData, ImageFormat, SceneFrame, SourceStats, StreamKind, TimedEvent,
    VideoConfig,
};
use tracing::{debug, info, warn};

use super::common::record_skipped;
use crate::error::{IngestionError, Result};

/// One decoded frame
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Position in the video, milliseconds
    pub timestamp_ms: f64,
    pub image: ImageData,
}

/// Sequential frame decoder
pub trait FrameDecoder: Send {
    /// Next frame, `Ok(None)` at end of stream
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>>;
}

/// Stream geometry reported by `ffprobe`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl VideoProbe {
    /// Parse `key=value` lines from `ffprobe -of default=noprint_wrappers=1`
    pub fn parse(output: &str) -> Result<Self> {
        let mut width = None;
        let mut height = None;
        let mut fps = None;
        for line in output.lines() {
            match line.trim().split_once('=') {
                Some(("width", v)) => width = v.parse::<u32>().ok(),
                Some(("height", v)) => height = v.parse::<u32>().ok(),
                Some(("avg_frame_rate", v)) => fps = parse_frame_rate(v),
                _ => {}
            }
        }
        match (width, height, fps) {
            (Some(width), Some(height), Some(fps)) if width > 0 && height > 0 => {
                Ok(Self { width, height, fps })
            }
            _ => Err(IngestionError::decoder(format!(
                "incomplete stream description: {}",
                output.trim()
            ))),
        }
    }

    /// Bytes in one rgb24 frame
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * ImageFormat::Rgb8.channels()
    }
}

/// `30000/1001` or `25` to frames per second; `None` for `0/0` and the like
fn parse_frame_rate(text: &str) -> Option<f64> {
    let fps = match text.trim().split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.trim().parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Decoder backed by an `ffmpeg` child process
pub struct FfmpegDecoder {
    probe: VideoProbe,
    child: Child,
    stdout: ChildStdout,
    index: u64,
}

impl FfmpegDecoder {
    pub fn spawn(path: &Path, config: &VideoConfig) -> Result<Self> {
        let output = Command::new(&config.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,avg_frame_rate",
                "-of",
                "default=noprint_wrappers=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(IngestionError::decoder(format!(
                "{} exited with {}: {}",
                config.ffprobe,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let probe = VideoProbe::parse(&String::from_utf8_lossy(&output.stdout))?;
        debug!(?probe, "scene video probed");

        let mut child = Command::new(&config.ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| IngestionError::decoder("ffmpeg stdout not captured"))?;

        Ok(Self {
            probe,
            child,
            stdout,
            index: 0,
        })
    }

    pub fn probe(&self) -> VideoProbe {
        self.probe
    }
}

/// Fill `buf` completely; returns bytes read, short only at end of stream
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl FrameDecoder for FfmpegDecoder {
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        let mut buf = vec![0u8; self.probe.frame_len()];
        let filled = read_full(&mut self.stdout, &mut buf)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(IngestionError::decoder(format!(
                "truncated frame {}: {filled} of {} bytes",
                self.index,
                buf.len()
            )));
        }

        let timestamp_ms = self.index as f64 * 1000.0 / self.probe.fps;
        self.index += 1;
        Ok(Some(DecodedFrame {
            timestamp_ms,
            image: ImageData {
                width: self.probe.width,
                height: self.probe.height,
                format: ImageFormat::Rgb8,
                data: Bytes::from(buf),
            },
        }))
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Scene video frames as events
///
/// Any decoder failure ends the stream with a warning.
pub struct SceneVideoSource {
    decoder: Option<Box<dyn FrameDecoder>>,
    index: u64,
    stats: SourceStats,
}

impl SceneVideoSource {
    /// Open the scene video, degrading to an empty stream when the file or
    /// the decoder tools are unavailable
    pub fn open(path: &Path, config: &VideoConfig) -> Self {
        if !config.enabled {
            debug!("scene video disabled");
            return Self::empty();
        }
        if !path.is_file() {
            warn!(path = %path.display(), "scene video missing, stream will be empty");
            return Self::empty();
        }
        match FfmpegDecoder::spawn(path, config) {
            Ok(decoder) => {
                info!(path = %path.display(), fps = decoder.probe().fps, "scene video opened");
                Self::with_decoder(Box::new(decoder))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "scene video unreadable, stream will be empty");
                Self::empty()
            }
        }
    }

    pub fn with_decoder(decoder: Box<dyn FrameDecoder>) -> Self {
        Self {
            decoder: Some(decoder),
            index: 0,
            stats: SourceStats::default(),
        }
    }

    pub fn empty() -> Self {
        Self {
            decoder: None,
            index: 0,
            stats: SourceStats::default(),
        }
    }
}

impl EventSource for SceneVideoSource {
    fn kind(&self) -> StreamKind {
        StreamKind::SceneVideo
    }

    fn next_event(&mut self) -> Option<TimedEvent> {
        let decoder = self.decoder.as_mut()?;
        match decoder.next_frame() {
            Ok(Some(frame)) => {
                let event = TimedEvent::SceneVideo(SceneFrame {
                    timestamp_ms: frame.timestamp_ms,
                    index: self.index,
                    image: frame.image,
                });
                self.index += 1;
                self.stats.emitted += 1;
                Some(event)
            }
            Ok(None) => {
                debug!(frames = self.index, "scene video finished");
                self.decoder = None;
                None
            }
            Err(e) => {
                warn!(frame = self.index, error = %e, "scene video frame unreadable, ending stream");
                self.stats.skipped += 1;
                record_skipped(StreamKind::SceneVideo);
                self.decoder = None;
                None
            }
        }
    }

    fn stats(&self) -> SourceStats {
        self.stats
    }
}

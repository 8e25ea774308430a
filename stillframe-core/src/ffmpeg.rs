//! Thin wrappers around the `ffmpeg` and `ffprobe` executables.

use std::{
    ffi::OsString,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::{
    error::FfmpegError,
    progress_bar,
    settings::{AudioCodec, VideoCodec},
    util::format_seconds,
};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Resolves `binary` on the system path.
#[inline]
pub fn locate(binary: &'static str) -> Result<PathBuf> {
    which::which(binary).map_err(|_| {
        FfmpegError::NotInstalled {
            binary,
        }
        .into()
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaProbe {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format:  Option<ProbeFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type:   Option<String>,
    pub codec_name:   Option<String>,
    pub width:        Option<u32>,
    pub height:       Option<u32>,
    pub r_frame_rate: Option<String>,
    #[serde(default, deserialize_with = "seconds_from_str")]
    pub duration:     Option<f64>,
}

impl ProbeStream {
    /// Frame rate from the `num/den` form ffprobe reports.
    #[inline]
    pub fn frame_rate(&self) -> Option<f64> {
        let (num, den) = self.r_frame_rate.as_deref()?.split_once('/')?;
        let (num, den) = (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?);
        (den != 0.0).then(|| num / den)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    #[serde(default, deserialize_with = "seconds_from_str")]
    pub duration: Option<f64>,
}

impl MediaProbe {
    #[inline]
    pub fn audio_stream(&self) -> Option<&ProbeStream> {
        self.stream_of_type("audio")
    }

    #[inline]
    pub fn video_stream(&self) -> Option<&ProbeStream> {
        self.stream_of_type("video")
    }

    /// Length of the first audio stream, falling back to the container length.
    /// `None` when there is no audio stream at all.
    #[inline]
    pub fn audio_duration(&self) -> Option<f64> {
        let stream = self.audio_stream()?;
        stream.duration.or_else(|| self.format.as_ref().and_then(|format| format.duration))
    }

    fn stream_of_type(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams.iter().find(|stream| stream.codec_type.as_deref() == Some(codec_type))
    }
}

// ffprobe reports durations as decimal strings
fn seconds_from_str<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| s.trim().parse::<f64>().ok()))
}

#[inline]
pub fn probe_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(path.as_os_str().to_owned());
    args
}

/// Runs ffprobe on `path`.
#[tracing::instrument(level = "debug")]
#[inline]
pub fn probe(path: &Path) -> Result<MediaProbe> {
    let out = Command::new(FFPROBE)
        .args(probe_args(path))
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute {FFPROBE}"))?;

    if !out.status.success() {
        bail!(FfmpegError::Failed {
            binary: FFPROBE,
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }

    Ok(parse_probe(&String::from_utf8_lossy(&out.stdout), path)?)
}

#[inline]
pub fn parse_probe(json: &str, path: &Path) -> Result<MediaProbe, FfmpegError> {
    serde_json::from_str(json).map_err(|source| FfmpegError::InvalidProbe {
        path: path.to_path_buf(),
        source,
    })
}

/// Number of frames a clip of `duration` seconds has at `fps`.
#[inline]
pub fn frame_count(duration: f64, fps: u32) -> u64 {
    (duration * f64::from(fps)).ceil().to_u64().unwrap_or(0)
}

fn base_args() -> Vec<OsString> {
    ["-y", "-hide_banner", "-loglevel", "error"].iter().map(OsString::from).collect()
}

/// Arguments that encode the audio of `audio` into the intermediate file.
#[inline]
pub fn audio_stage_args(
    audio: &Path,
    codec: AudioCodec,
    duration: f64,
    temp_audiofile: &Path,
) -> Vec<OsString> {
    let mut args = base_args();
    args.push("-i".into());
    args.push(audio.as_os_str().to_owned());
    for arg in ["-vn", "-map", "0:a:0", "-c:a", codec.into(), "-t"] {
        args.push(arg.into());
    }
    args.push(format_seconds(duration).into());
    args.push("-f".into());
    args.push("mp4".into());
    args.push(temp_audiofile.as_os_str().to_owned());
    args
}

#[derive(Debug, Clone)]
pub struct VideoStage<'a> {
    pub image:          &'a Path,
    pub temp_audiofile: &'a Path,
    pub output:         &'a Path,
    pub duration:       f64,
    pub fps:            u32,
    pub codec:          VideoCodec,
}

/// Arguments that loop the still image for the whole duration and mux the
/// already encoded intermediate audio next to it.
#[inline]
pub fn video_stage_args(stage: &VideoStage) -> Vec<OsString> {
    let fps = stage.fps.to_string();
    let fps = fps.as_str();

    let mut args = base_args();
    for arg in ["-nostats", "-progress", "pipe:1", "-loop", "1", "-framerate", fps, "-i"] {
        args.push(arg.into());
    }
    args.push(stage.image.as_os_str().to_owned());
    args.push("-i".into());
    args.push(stage.temp_audiofile.as_os_str().to_owned());
    for arg in [
        "-map",
        "0:v:0",
        "-map",
        "1:a:0",
        // yuv420p needs even dimensions
        "-vf",
        "scale=trunc(iw/2)*2:trunc(ih/2)*2",
        "-c:v",
        stage.codec.into(),
        "-tune",
        stage.codec.still_image_tune(),
    ] {
        args.push(arg.into());
    }
    for arg in ["-pix_fmt", "yuv420p", "-r", fps, "-c:a", "copy", "-movflags", "+faststart", "-t"] {
        args.push(arg.into());
    }
    args.push(format_seconds(stage.duration).into());
    args.push(stage.output.as_os_str().to_owned());
    args
}

/// Runs ffmpeg to completion, returning its stderr on failure.
#[inline]
pub fn run(args: &[OsString]) -> Result<()> {
    debug!("{} {:?}", FFMPEG, args);
    let out = Command::new(FFMPEG)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute {FFMPEG}"))?;

    if !out.status.success() {
        bail!(FfmpegError::Failed {
            binary: FFMPEG,
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Frame(u64),
    End,
}

/// Parses one `key=value` line of `-progress` output.
#[inline]
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "frame" => value.trim().parse().ok().map(ProgressEvent::Frame),
        "progress" if value.trim() == "end" => Some(ProgressEvent::End),
        _ => None,
    }
}

/// Runs an ffmpeg invocation that reports `-progress pipe:1`, advancing a
/// progress bar of `total_frames` as frames are encoded.
#[inline]
pub fn run_with_progress(args: &[OsString], total_frames: u64) -> Result<()> {
    run_program_with_progress(FFMPEG, args, total_frames)
}

fn run_program_with_progress(
    program: &'static str,
    args: &[OsString],
    total_frames: u64,
) -> Result<()> {
    debug!("{} {:?}", program, args);
    let bar = progress_bar::init_progress_bar(total_frames)?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute {program}"))?;

    let stdout = child.stdout.take().context("child should have STDOUT")?;
    let mut stderr = child.stderr.take().context("child should have STDERR")?;

    // drained separately so a chatty encoder cannot block on a full pipe
    let stderr_thread = thread::spawn(move || -> std::io::Result<String> {
        let mut buf = String::new();
        stderr.read_to_string(&mut buf)?;
        Ok(buf)
    });

    // the child is waited on and its stderr joined even if progress is unreadable
    let progress = track_progress(stdout, &bar, total_frames);
    let status = child.wait()?;
    let stderr = stderr_thread
        .join()
        .map_err(|_| anyhow::Error::msg("Failed to join STDERR thread"))??;

    if !status.success() {
        progress_bar::abandon(&bar);
        bail!(FfmpegError::Failed {
            binary: program,
            status,
            stderr,
        });
    }
    if let Err(e) = progress {
        progress_bar::abandon(&bar);
        return Err(e).with_context(|| format!("Failed to read {program} progress"));
    }

    progress_bar::finish(&bar);
    Ok(())
}

fn track_progress(
    stdout: impl Read,
    bar: &ProgressBar,
    total_frames: u64,
) -> std::io::Result<()> {
    for line in BufReader::new(stdout).lines() {
        match parse_progress_line(&line?) {
            Some(ProgressEvent::Frame(frame)) => progress_bar::set_position(bar, frame),
            Some(ProgressEvent::End) => progress_bar::set_position(bar, total_frames),
            None => {},
        }
    }
    Ok(())
}

use std::{path::PathBuf, process::ExitStatus};

use strum::{Display as DisplayMacro, IntoStaticStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DisplayMacro, IntoStaticStr)]
pub enum InputKind {
    Image,
    Audio,
}

/// Failures detected by the composition itself, before or around the
/// delegated media calls.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("{kind} file not found: {}", .path.display())]
    MissingInput { kind: InputKind, path: PathBuf },
    #[error(
        "Audio duration is invalid or zero ({}). Ensure the input audio file has a valid audio \
         track and is not silent/empty.",
        describe_duration(.duration)
    )]
    InvalidAudio { duration: Option<f64> },
    #[error("Frame rate must be a positive integer, got {fps}")]
    InvalidFrameRate { fps: u32 },
}

/// Failures surfaced by the FFmpeg backend.
#[derive(Debug, Error)]
pub enum FfmpegError {
    #[error("{binary} not found. Is it installed in the system path?")]
    NotInstalled { binary: &'static str },
    #[error("{binary} exited with {status}: {}", .stderr.trim())]
    Failed {
        binary: &'static str,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Failed to parse ffprobe output for {}", .path.display())]
    InvalidProbe {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("No {kind} stream found in {}", .path.display())]
    MissingStream { kind: &'static str, path: PathBuf },
    #[error("{clip} clip was used after being closed")]
    ClipClosed { clip: &'static str },
    #[error("Temporary audio file {} would overwrite the output", .path.display())]
    TempAudioIsOutput { path: PathBuf },
    #[error(
        "Temporary audio file {} already exists. Remove it or choose another location.",
        .path.display()
    )]
    TempAudioExists { path: PathBuf },
}

fn describe_duration(duration: &Option<f64>) -> String {
    duration.map_or_else(|| "no duration".to_owned(), |secs| format!("{secs}s"))
}

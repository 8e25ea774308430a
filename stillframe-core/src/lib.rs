//! Compose a still image and an audio track into a single video file whose
//! length matches the audio.
//!
//! Media decoding and encoding are delegated to a [`MediaBackend`]. The
//! default backend, [`FfmpegBackend`], drives the `ffmpeg` and `ffprobe`
//! binaries.

pub use crate::{
    backend::{
        ffmpeg::{FfmpegAudio, FfmpegBackend, FfmpegComposite, FfmpegImage},
        MediaBackend,
        MediaHandle,
        WriteOptions,
    },
    compose::{compose_video, ComposeReport},
    error::{ComposeError, FfmpegError, InputKind},
    settings::{AudioCodec, ComposeSettings, VideoCodec},
};

pub mod backend;
mod compose;
mod error;
pub mod ffmpeg;
mod progress_bar;
mod settings;
pub mod util;

/// Frame rate used when the caller does not specify one.
pub const DEFAULT_FPS: u32 = 24;

/// File name of the intermediate audio file written next to the output.
pub const TEMP_AUDIO_FILE_NAME: &str = "temp_processing_audio.mp4";

//! The seam between the composition and whatever actually decodes and
//! encodes media.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::settings::{AudioCodec, VideoCodec};

pub mod ffmpeg;

/// An opened piece of media. Every handle a backend hands out is closed
/// exactly once by the composition.
pub trait MediaHandle {
    /// Length in seconds, when known.
    fn duration(&self) -> Option<f64>;

    fn close(&mut self) -> Result<()>;
}

pub trait MediaBackend {
    type Audio: MediaHandle;
    type Image: MediaHandle;
    type Composite: MediaHandle;

    /// Checks the backend can run at all. Called once the inputs are known to
    /// exist and before any media is opened.
    fn validate(&self) -> Result<()>;

    fn open_audio(&self, path: &Path) -> Result<Self::Audio>;

    /// A clip showing the still image at `path` for `duration` seconds.
    fn image_clip(&self, path: &Path, duration: f64) -> Result<Self::Image>;

    fn with_audio(&self, image: &Self::Image, audio: &Self::Audio) -> Result<Self::Composite>;

    fn write_video(&self, clip: &Self::Composite, options: &WriteOptions) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub output:         PathBuf,
    pub fps:            u32,
    pub video_codec:    VideoCodec,
    pub audio_codec:    AudioCodec,
    pub temp_audiofile: PathBuf,
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use strum::{Display as DisplayMacro, EnumString, IntoStaticStr};

use crate::{
    error::{ComposeError, InputKind},
    util::temp_audio_path,
    DEFAULT_FPS,
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    EnumString,
    IntoStaticStr,
    DisplayMacro,
)]
pub enum VideoCodec {
    #[default]
    #[strum(serialize = "libx264")]
    Libx264,
}

impl VideoCodec {
    /// Encoder tuning suited to a picture that never changes.
    #[inline]
    pub const fn still_image_tune(self) -> &'static str {
        match self {
            Self::Libx264 => "stillimage",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    EnumString,
    IntoStaticStr,
    DisplayMacro,
)]
pub enum AudioCodec {
    #[default]
    #[strum(serialize = "aac")]
    Aac,
}

#[derive(Debug, Clone)]
pub struct ComposeSettings {
    pub image:          PathBuf,
    pub audio:          PathBuf,
    pub output:         PathBuf,
    pub fps:            u32,
    pub video_codec:    VideoCodec,
    pub audio_codec:    AudioCodec,
    // `None` places the intermediate audio next to the output.
    pub temp_audiofile: Option<PathBuf>,
}

impl ComposeSettings {
    #[inline]
    pub fn new(
        image: impl Into<PathBuf>,
        audio: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            image:          image.into(),
            audio:          audio.into(),
            output:         output.into(),
            fps:            DEFAULT_FPS,
            video_codec:    VideoCodec::default(),
            audio_codec:    AudioCodec::default(),
            temp_audiofile: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_temp_audiofile(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_audiofile = Some(path.into());
        self
    }

    #[inline]
    pub fn temp_audio_path(&self) -> PathBuf {
        self.temp_audiofile.clone().unwrap_or_else(|| temp_audio_path(&self.output))
    }

    /// Checks everything that can be checked without touching the media
    /// backend. Inputs are checked image first, then audio.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        ensure_exists(InputKind::Image, &self.image)?;
        ensure_exists(InputKind::Audio, &self.audio)?;

        if self.fps == 0 {
            bail!(ComposeError::InvalidFrameRate {
                fps: self.fps
            });
        }

        Ok(())
    }
}

fn ensure_exists(kind: InputKind, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!(ComposeError::MissingInput {
            kind,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use super::{MediaBackend, MediaHandle, WriteOptions};
use crate::{
    error::FfmpegError,
    ffmpeg::{
        audio_stage_args,
        frame_count,
        locate,
        probe,
        run,
        run_with_progress,
        video_stage_args,
        MediaProbe,
        VideoStage,
        FFMPEG,
        FFPROBE,
    },
    util::{output_directory, to_absolute_path},
};

/// Backend driving the `ffmpeg` and `ffprobe` executables found on the
/// system path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

/// Audio source opened for probing. Holds the file open until closed.
#[derive(Debug)]
pub struct FfmpegAudio {
    path:   PathBuf,
    probe:  MediaProbe,
    source: Option<File>,
}

impl FfmpegAudio {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn probe(&self) -> &MediaProbe {
        &self.probe
    }

    fn ensure_open(&self) -> Result<(), FfmpegError> {
        if self.source.is_none() {
            return Err(FfmpegError::ClipClosed {
                clip: "audio",
            });
        }
        Ok(())
    }
}

impl MediaHandle for FfmpegAudio {
    #[inline]
    fn duration(&self) -> Option<f64> {
        self.probe.audio_duration()
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        self.source.take();
        Ok(())
    }
}

#[derive(Debug)]
pub struct FfmpegImage {
    path:     PathBuf,
    width:    u32,
    height:   u32,
    duration: f64,
    source:   Option<File>,
}

impl FfmpegImage {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn ensure_open(&self) -> Result<(), FfmpegError> {
        if self.source.is_none() {
            return Err(FfmpegError::ClipClosed {
                clip: "image",
            });
        }
        Ok(())
    }
}

impl MediaHandle for FfmpegImage {
    #[inline]
    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        self.source.take();
        Ok(())
    }
}

/// Still image plus audio track, ready to be written.
#[derive(Debug)]
pub struct FfmpegComposite {
    image:    PathBuf,
    audio:    PathBuf,
    duration: f64,
    open:     bool,
}

impl MediaHandle for FfmpegComposite {
    #[inline]
    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

/// Removes the intermediate audio file however the write ends. Only ever
/// holds a path that did not exist when the write started.
struct TempAudioFile<'a> {
    path: &'a Path,
}

impl<'a> TempAudioFile<'a> {
    fn claim(path: &'a Path, output: &Path) -> Result<Self> {
        if to_absolute_path(path)? == to_absolute_path(output)? {
            bail!(FfmpegError::TempAudioIsOutput {
                path: path.to_path_buf(),
            });
        }
        if path.exists() {
            bail!(FfmpegError::TempAudioExists {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path,
        })
    }
}

impl Drop for TempAudioFile<'_> {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_file(self.path) {
            Ok(()) => debug!("removed temporary audio file {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove temporary audio file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl MediaBackend for FfmpegBackend {
    type Audio = FfmpegAudio;
    type Image = FfmpegImage;
    type Composite = FfmpegComposite;

    #[inline]
    fn validate(&self) -> Result<()> {
        for binary in [FFMPEG, FFPROBE] {
            let path = locate(binary)?;
            debug!("using {} at {}", binary, path.display());
        }
        Ok(())
    }

    #[inline]
    fn open_audio(&self, path: &Path) -> Result<FfmpegAudio> {
        let source =
            File::open(path).with_context(|| format!("Failed to open audio {}", path.display()))?;
        let probe = probe(path).with_context(|| format!("Failed to load audio {}", path.display()))?;
        if probe.audio_stream().is_none() {
            bail!(FfmpegError::MissingStream {
                kind: "audio",
                path: path.to_path_buf(),
            });
        }

        Ok(FfmpegAudio {
            path: path.to_path_buf(),
            probe,
            source: Some(source),
        })
    }

    #[inline]
    fn image_clip(&self, path: &Path, duration: f64) -> Result<FfmpegImage> {
        let source =
            File::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
        let probe = probe(path).with_context(|| format!("Failed to load image {}", path.display()))?;

        let Some(stream) = probe.video_stream() else {
            bail!(FfmpegError::MissingStream {
                kind: "image",
                path: path.to_path_buf(),
            });
        };
        let (width, height) = (stream.width.unwrap_or(0), stream.height.unwrap_or(0));
        debug!("image {} is {}x{}", path.display(), width, height);

        Ok(FfmpegImage {
            path: path.to_path_buf(),
            width,
            height,
            duration,
            source: Some(source),
        })
    }

    #[inline]
    fn with_audio(&self, image: &FfmpegImage, audio: &FfmpegAudio) -> Result<FfmpegComposite> {
        image.ensure_open()?;
        audio.ensure_open()?;

        Ok(FfmpegComposite {
            image:    image.path.clone(),
            audio:    audio.path.clone(),
            duration: image.duration,
            open:     true,
        })
    }

    #[inline]
    fn write_video(&self, clip: &FfmpegComposite, options: &WriteOptions) -> Result<()> {
        if !clip.open {
            bail!(FfmpegError::ClipClosed {
                clip: "composite",
            });
        }

        let output_dir = output_directory(&options.output);
        if !output_dir.exists() {
            warn!("Output directory {} does not exist", output_dir.display());
        }

        let temp_audio = TempAudioFile::claim(&options.temp_audiofile, &options.output)?;

        debug!("encoding audio track into {}", temp_audio.path.display());
        run(&audio_stage_args(
            &clip.audio,
            options.audio_codec,
            clip.duration,
            temp_audio.path,
        ))
        .context("Failed to encode audio track")?;

        debug!("encoding video into {}", options.output.display());
        let args = video_stage_args(&VideoStage {
            image:          &clip.image,
            temp_audiofile: temp_audio.path,
            output:         &options.output,
            duration:       clip.duration,
            fps:            options.fps,
            codec:          options.video_codec,
        });
        run_with_progress(&args, frame_count(clip.duration, options.fps))
            .context("Failed to encode video")?;

        Ok(())
    }
}

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::{debug, error, info, warn};

use crate::{
    backend::{MediaBackend, MediaHandle, WriteOptions},
    error::ComposeError,
    ffmpeg::frame_count,
    settings::ComposeSettings,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ComposeReport {
    pub output:   PathBuf,
    /// Seconds, equal to the audio's length.
    pub duration: f64,
    pub fps:      u32,
    pub frames:   u64,
}

/// Handles acquired so far. Whatever was acquired is closed when this goes
/// out of scope, audio first, then the image clip, then the combined clip.
struct OpenClips<B: MediaBackend> {
    audio:     Option<B::Audio>,
    image:     Option<B::Image>,
    composite: Option<B::Composite>,
}

impl<B: MediaBackend> OpenClips<B> {
    const fn new() -> Self {
        Self {
            audio:     None,
            image:     None,
            composite: None,
        }
    }
}

impl<B: MediaBackend> Drop for OpenClips<B> {
    fn drop(&mut self) {
        release(&mut self.audio, "audio");
        release(&mut self.image, "image clip");
        release(&mut self.composite, "combined clip");
    }
}

fn release<H: MediaHandle>(slot: &mut Option<H>, what: &str) {
    if let Some(mut handle) = slot.take() {
        match handle.close() {
            Ok(()) => debug!("released {}", what),
            Err(e) => warn!("Failed to release {}: {:#}", what, e),
        }
    }
}

/// Shows the image for exactly as long as the audio plays and writes the
/// result to `settings.output`.
///
/// Failures are logged with their full cause chain and returned. Every media
/// handle opened along the way is closed before this returns, whatever the
/// outcome.
#[tracing::instrument(level = "debug", skip(backend))]
#[inline]
pub fn compose_video<B: MediaBackend>(
    backend: &B,
    settings: &ComposeSettings,
) -> Result<ComposeReport> {
    info!("Starting video creation...");
    info!("Image: {}", settings.image.display());
    info!("Audio: {}", settings.audio.display());
    info!("Output: {}", settings.output.display());
    info!("FPS: {}", settings.fps);

    let result = compose(backend, settings);
    match &result {
        Ok(report) => info!("Video '{}' created successfully!", report.output.display()),
        Err(e) => {
            error!("Error creating video: {:#}", e);
            error!("{:?}", e);
        },
    }
    result
}

fn compose<B: MediaBackend>(backend: &B, settings: &ComposeSettings) -> Result<ComposeReport> {
    settings.validate()?;
    backend.validate()?;

    let mut clips = OpenClips::<B>::new();

    info!("Loading audio...");
    let audio = clips.audio.insert(backend.open_audio(&settings.audio)?);
    let duration = match audio.duration() {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs,
        other => bail!(ComposeError::InvalidAudio {
            duration: other
        }),
    };
    info!("Audio duration: {:.2} seconds", duration);

    info!("Processing image...");
    let image = clips.image.insert(backend.image_clip(&settings.image, duration)?);

    info!("Combining image and audio...");
    let composite = clips.composite.insert(backend.with_audio(image, audio)?);
    if let Some(clip_duration) = composite.duration() {
        debug_assert!((clip_duration - duration).abs() < f64::EPSILON);
    }

    let temp_audiofile = settings.temp_audio_path();
    info!("Using temporary audio file location: {}", temp_audiofile.display());

    info!("Writing video to {}...", settings.output.display());
    backend.write_video(composite, &WriteOptions {
        output: settings.output.clone(),
        fps: settings.fps,
        video_codec: settings.video_codec,
        audio_codec: settings.audio_codec,
        temp_audiofile,
    })?;

    Ok(ComposeReport {
        output: settings.output.clone(),
        duration,
        fps: settings.fps,
        frames: frame_count(duration, settings.fps),
    })
}

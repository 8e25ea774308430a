use std::path::PathBuf;

use anyhow::Result;
use clap::{value_parser, Parser};
use stillframe_core::{util::to_absolute_path, ComposeSettings, DEFAULT_FPS};

#[derive(Debug, Parser)]
#[command(
    name = "stillframe",
    about = "Create a video from an image and an audio file.",
    version
)]
pub struct StillframeCli {
    /// Path to the input image file (e.g., .png, .jpg)
    pub image_path:  PathBuf,
    /// Path to the input audio file (e.g., .mp4 containing audio, .mp3, .wav)
    pub audio_path:  PathBuf,
    /// Path to the output video file (e.g., .mp4)
    pub output_path: PathBuf,
    /// Frames per second for the output video
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = value_parser!(u32).range(1..))]
    pub fps:         u32,
}

impl StillframeCli {
    pub fn into_settings(self) -> Result<ComposeSettings> {
        let output = to_absolute_path(&self.output_path)?.into_owned();
        Ok(ComposeSettings::new(self.image_path, self.audio_path, output).with_fps(self.fps))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn positional_paths_and_default_fps() {
        let cli =
            StillframeCli::try_parse_from(["stillframe", "cover.jpg", "song.mp3", "/videos/out.mp4"])
                .unwrap();
        assert_eq!(cli.fps, 24);

        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.image, Path::new("cover.jpg"));
        assert_eq!(settings.audio, Path::new("song.mp3"));
        assert_eq!(settings.output, Path::new("/videos/out.mp4"));
        assert_eq!(settings.fps, 24);
    }

    #[test]
    fn fps_flag() {
        let cli = StillframeCli::try_parse_from([
            "stillframe",
            "cover.jpg",
            "song.mp3",
            "out.mp4",
            "--fps",
            "1",
        ])
        .unwrap();
        assert_eq!(cli.fps, 1);

        let settings = cli.into_settings().unwrap();
        assert!(settings.output.is_absolute());
        assert!(settings.output.ends_with("out.mp4"));
    }

    #[test]
    fn rejects_non_positive_fps() {
        for fps in ["--fps=0", "--fps=-5"] {
            let err = StillframeCli::try_parse_from([
                "stillframe",
                "cover.jpg",
                "song.mp3",
                "out.mp4",
                fps,
            ])
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{fps}");
        }
    }

    #[test]
    fn all_paths_are_required() {
        let err = StillframeCli::try_parse_from(["stillframe", "cover.jpg", "song.mp3"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}

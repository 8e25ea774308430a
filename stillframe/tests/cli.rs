use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command as StdCommand, Output},
};

use assert_cmd::Command;
use serial_test::serial;
use stillframe_core::{
    ffmpeg::{self, MediaProbe, FFMPEG, FFPROBE},
    TEMP_AUDIO_FILE_NAME,
};
use tempfile::TempDir;

fn stillframe() -> Command {
    Command::cargo_bin("stillframe").unwrap()
}

fn ffmpeg_available() -> bool {
    ffmpeg::locate(FFMPEG).is_ok() && ffmpeg::locate(FFPROBE).is_ok()
}

fn combined_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn generate(args: &[&str]) {
    let status = StdCommand::new(FFMPEG)
        .args(["-y", "-hide_banner", "-loglevel", "error"])
        .args(args)
        .status()
        .unwrap();
    assert!(status.success(), "ffmpeg {args:?} failed");
}

/// A 321x241 JPEG and a 5 second stereo tone.
fn generate_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let image = dir.join("cover.jpg");
    let audio = dir.join("tone.wav");
    generate(&[
        "-f",
        "lavfi",
        "-i",
        "color=c=navy:s=321x241",
        "-frames:v",
        "1",
        image.to_str().unwrap(),
    ]);
    generate(&[
        "-f",
        "lavfi",
        "-i",
        "sine=frequency=440:duration=5",
        "-ac",
        "2",
        audio.to_str().unwrap(),
    ]);
    (image, audio)
}

fn probe_output(path: &Path) -> MediaProbe {
    ffmpeg::probe(path).unwrap()
}

#[test]
fn help_lists_the_fps_flag() {
    let output = stillframe().arg("--help").output().unwrap();
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--fps"));
    assert!(help.contains("[default: 24]"));
}

#[test]
fn missing_image_fails_without_writing_output() {
    let temp_dir = TempDir::new().unwrap();
    let audio = temp_dir.path().join("tone.wav");
    fs::write(&audio, b"RIFF").unwrap();
    let output_path = temp_dir.path().join("out.mp4");

    let output = stillframe()
        .arg(temp_dir.path().join("missing.jpg"))
        .arg(&audio)
        .arg(&output_path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("Image file not found"), "{text}");
    assert!(text.contains("missing.jpg"), "{text}");
    assert!(!output_path.exists());
}

#[test]
fn missing_audio_fails_without_writing_output() {
    let temp_dir = TempDir::new().unwrap();
    let image = temp_dir.path().join("cover.jpg");
    fs::write(&image, b"\xFF\xD8\xFF").unwrap();
    let output_path = temp_dir.path().join("out.mp4");

    let output = stillframe()
        .arg(&image)
        .arg(temp_dir.path().join("missing.wav"))
        .arg(&output_path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("Audio file not found"), "{text}");
    assert!(!output_path.exists());
}

#[test]
fn zero_fps_is_a_usage_error() {
    let output = stillframe()
        .args(["cover.jpg", "tone.wav", "out.mp4", "--fps=0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
#[serial]
fn default_fps_produces_h264_aac_of_audio_length() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (image, audio) = generate_inputs(temp_dir.path());
    let output_path = temp_dir.path().join("out.mp4");

    let output = stillframe().arg(&image).arg(&audio).arg(&output_path).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("created successfully"));

    let probe = probe_output(&output_path);
    let video = probe.video_stream().unwrap();
    assert_eq!(video.codec_name.as_deref(), Some("h264"));
    assert_eq!(video.frame_rate(), Some(24.0));
    assert_eq!((video.width, video.height), (Some(320), Some(240)));
    assert_eq!(probe.audio_stream().unwrap().codec_name.as_deref(), Some("aac"));

    let duration = probe.format.as_ref().and_then(|format| format.duration).unwrap();
    assert!((duration - 5.0).abs() < 0.1, "duration {duration}");

    assert!(!temp_dir.path().join(TEMP_AUDIO_FILE_NAME).exists());
}

#[test]
#[serial]
fn one_fps_keeps_the_audio_length() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (image, audio) = generate_inputs(temp_dir.path());
    let output_path = temp_dir.path().join("slow.mp4");

    let output = stillframe()
        .arg(&image)
        .arg(&audio)
        .arg(&output_path)
        .args(["--fps", "1"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let probe = probe_output(&output_path);
    let video = probe.video_stream().unwrap();
    assert_eq!(video.frame_rate(), Some(1.0));

    let duration = probe.format.as_ref().and_then(|format| format.duration).unwrap();
    assert!((duration - 5.0).abs() < 0.1, "duration {duration}");
    let video_duration = video.duration.unwrap();
    assert!((video_duration - 5.0).abs() <= 1.0, "video duration {video_duration}");
}

#[test]
#[serial]
fn text_file_as_audio_is_a_media_error() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (image, _) = generate_inputs(temp_dir.path());
    let notes = temp_dir.path().join("notes.txt");
    fs::write(&notes, "not audio at all\n").unwrap();
    let output_path = temp_dir.path().join("out.mp4");

    let output = stillframe().arg(&image).arg(&notes).arg(&output_path).output().unwrap();

    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("Error creating video"), "{text}");
    assert!(text.contains("notes.txt"), "{text}");
    assert!(!output_path.exists());
}

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::TEMP_AUDIO_FILE_NAME;

/// Directory the output file will be written into. A bare file name lives in
/// the current directory.
#[inline]
pub fn output_directory(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Location of the intermediate audio file for `output`, kept in the same
/// directory so no write access is needed anywhere else.
#[inline]
pub fn temp_audio_path(output: &Path) -> PathBuf {
    output_directory(output).join(TEMP_AUDIO_FILE_NAME)
}

#[inline]
pub fn to_absolute_path(path: &Path) -> Result<Cow<'_, Path>> {
    if path.is_absolute() {
        Ok(Cow::Borrowed(path))
    } else {
        Ok(Cow::Owned(path_abs::PathAbs::new(path)?.as_path().to_path_buf()))
    }
}

/// Seconds formatted the way FFmpeg's `-t` option expects, with enough
/// precision to keep sample-accurate lengths.
#[inline]
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.6}")
}

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} frames ({per_sec}, eta {eta})";

/// Frame progress for a running encode. Drawn on stdout, which indicatif
/// leaves blank when stdout is not a terminal.
pub fn init_progress_bar(total_frames: u64) -> Result<ProgressBar> {
    let bar = ProgressBar::with_draw_target(Some(total_frames), ProgressDrawTarget::stdout());
    bar.set_style(ProgressStyle::with_template(PROGRESS_TEMPLATE)?.progress_chars("#>-"));
    Ok(bar)
}

pub fn set_position(bar: &ProgressBar, frame: u64) {
    if frame > bar.position() {
        bar.set_position(frame.min(bar.length().unwrap_or(frame)));
    }
}

pub fn finish(bar: &ProgressBar) {
    bar.finish();
}

pub fn abandon(bar: &ProgressBar) {
    bar.abandon();
}

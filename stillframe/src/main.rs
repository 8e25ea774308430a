use std::{panic, process};

use anyhow::Result;
use clap::Parser;
use stillframe_core::{compose_video, FfmpegBackend};
use tracing::level_filters::LevelFilter;

use crate::{cli::StillframeCli, logging::init_logging};

mod cli;
mod logging;

fn main() -> Result<()> {
    let orig_hook = panic::take_hook();
    // Catch panics in child threads
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(1);
    }));
    run()
}

fn run() -> Result<()> {
    let cli = StillframeCli::parse();
    init_logging(LevelFilter::INFO)?;

    let settings = cli.into_settings()?;
    compose_video(&FfmpegBackend::new(), &settings)?;

    Ok(())
}

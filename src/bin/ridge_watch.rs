//! RIDGE radar loop watcher.
//!
//! Keeps a radar animation up to date. A timer ticks the poller, which lists, downloads, and
//! encodes a stage at a time and starts over after the refresh interval. Each finished loop
//! replaces the output file. Ctrl-C stops the poller and exits.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use anyhow::{Context, Error};
use log::{info, warn};

use ridge_loop::{format_time, CmdLineArgs, Pipeline, Poller};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(ref e) = run() {
        println!("error: {}", e);

        for cause in e.chain().skip(1) {
            println!("caused by: {}", cause);
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let app = CmdLineArgs::new_app(
        "ridge-watch",
        "Keep an animated GIF of recent radar images up to date.",
    );

    let (args, _matches) = CmdLineArgs::matches(app)?;
    let config = args.config().context("loading configuration")?;
    let output = config.output.clone();
    let tick = config.tick_interval();

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })?;
    }

    let mut poller = Poller::new(Pipeline::with_http(config)?);
    info!(
        "watching, refresh every {} s, writing {}",
        poller.refresh_interval().as_secs(),
        output.display()
    );

    while running.load(Ordering::Relaxed) {
        if let Some(radar_loop) = poller.tick(Instant::now()) {
            match radar_loop.artifact.write_to(&output) {
                Ok(()) => info!(
                    "updated {} with {} frames ending {}",
                    output.display(),
                    radar_loop.artifact.frames().len(),
                    format_time(&radar_loop.window.end())
                ),
                Err(err) => warn!("could not write {}: {}", output.display(), err),
            }
        }

        thread::sleep(tick);
    }

    poller.stop();
    info!("shutdown complete");

    Ok(())
}

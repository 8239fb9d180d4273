//! RIDGE radar GIF builder.
//!
//! Builds one looping animation of the latest radar images for a station and writes it to disk.
//! Run it from cron every 10 or 15 minutes to keep a current loop on hand.

use anyhow::{Context, Error};
use log::info;

use ridge_loop::{format_time, CmdLineArgs, Pipeline};

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
    let app = CmdLineArgs::new_app("ridge-gif", "Build an animated GIF of recent radar images.");

    let (args, _matches) = CmdLineArgs::matches(app)?;
    let config = args.config().context("loading configuration")?;
    let output = config.output.clone();

    let pipeline = Pipeline::with_http(config)?;
    let radar_loop = pipeline.run()?;

    radar_loop
        .artifact
        .write_to(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        "wrote {} frames ending {} to {}",
        radar_loop.artifact.frames().len(),
        format_time(&radar_loop.window.end()),
        output.display()
    );

    Ok(())
}

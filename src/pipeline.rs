//! List, parse, window, fetch and encode, in one straight line.

use std::sync::Arc;

use log::info;

use crate::{
    animation::{animate, AnimationArtifact},
    config::Config,
    errors::RadarLoopErr,
    fetch::{fetch_frames, FetchReport, FrameBytes},
    frame::{format_time, parse_all, FrameReference},
    listing::list_station_files,
    transport::{HttpTransport, Transport},
    window::{window_frames, TimeWindow},
};

/// The result of one complete run.
#[derive(Clone, Debug)]
pub struct RadarLoop {
    /// The window the frames were selected from.
    pub window: TimeWindow,
    /// The animation.
    pub artifact: AnimationArtifact,
    /// Frames inside the window that failed to download and were left out.
    pub skipped: Vec<FrameReference>,
}

/// A configured pipeline. Cheap to clone, clones share the transport.
#[derive(Clone)]
pub struct Pipeline {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline that talks to the server through `transport`.
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Pipeline { config, transport }
    }

    /// Create a pipeline using HTTP with the configured timeout.
    pub fn with_http(config: Config) -> Result<Self, RadarLoopErr> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the current listing for the station and parse every file name in it.
    pub fn list(&self) -> Result<Vec<FrameReference>, RadarLoopErr> {
        let dir_url = self.config.station_dir_url();
        info!(
            "fetch station={} product={} ({}) from {}",
            self.config.station,
            self.config.product,
            self.config.product.description(),
            dir_url
        );

        let names = list_station_files(&*self.transport, &dir_url, &self.config.station)?;
        parse_all(names.iter().map(String::as_str))
    }

    /// Keep the frames in the trailing window.
    pub fn select(
        &self,
        frames: Vec<FrameReference>,
    ) -> Result<(TimeWindow, Vec<FrameReference>), RadarLoopErr> {
        let (window, kept) = window_frames(frames, self.config.window()?)?;

        info!("{}", window);
        if let Some(end) = self.config.time_basis.to_utc(&window.end()) {
            info!(
                "newest frame {} UTC, {} frames in window",
                format_time(&end.naive_utc()),
                kept.len()
            );
        }

        Ok((window, kept))
    }

    /// List and window in one step.
    pub fn list_window(&self) -> Result<(TimeWindow, Vec<FrameReference>), RadarLoopErr> {
        let frames = self.list()?;
        self.select(frames)
    }

    /// Download the images for `frames`.
    pub fn fetch(&self, frames: &[FrameReference]) -> Result<FetchReport, RadarLoopErr> {
        fetch_frames(
            &*self.transport,
            &self.config.station_dir_url(),
            frames,
            self.config.fetch_workers,
            self.config.skip_failed_frames,
        )
    }

    /// Encode downloaded frames into an animation.
    pub fn encode(&self, frames: &[FrameBytes]) -> Result<AnimationArtifact, RadarLoopErr> {
        let artifact = animate(frames, &self.config.animation_settings())?;
        let settings = artifact.settings();
        info!(
            "encoded {} frames, {} bytes, {} ms per frame, loop count {}",
            artifact.frames().len(),
            artifact.as_bytes().len(),
            settings.frame_delay.as_millis(),
            settings.loop_count
        );

        Ok(artifact)
    }

    /// Run every stage in order. Any failure ends the run.
    pub fn run(&self) -> Result<RadarLoop, RadarLoopErr> {
        let (window, frames) = self.list_window()?;
        let report = self.fetch(&frames)?;
        let artifact = self.encode(&report.frames)?;

        Ok(RadarLoop {
            window,
            artifact,
            skipped: report.failures.into_iter().map(|(r, _)| r).collect(),
        })
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

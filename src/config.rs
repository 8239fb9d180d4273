//! Settings for a radar loop, read from a TOML file.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    animation::AnimationSettings, errors::RadarLoopErr, frame::TimeBasis, product::Product,
    station::Station, transport::join_url, window::DEFAULT_WINDOW_MINUTES,
};

/// Everything the pipeline needs to know, passed in at construction time.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Radar site to animate.
    pub station: Station,
    /// Image product to animate.
    pub product: Product,
    /// Directory holding one sub directory per product.
    pub index_root: String,
    /// Where the binaries write the animation.
    pub output: PathBuf,
    /// Length of the trailing window of frames to keep.
    pub window_minutes: i64,
    /// Display time for each frame.
    pub frame_delay_ms: u64,
    /// Number of times to play the loop, 0 for forever.
    pub loop_count: u16,
    /// Download threads. One downloads frames strictly in sequence.
    pub fetch_workers: usize,
    /// Leave failed frames out of the animation instead of failing the run.
    pub skip_failed_frames: bool,
    /// Per request timeout.
    pub request_timeout_secs: u64,
    /// Time between completed animations in watch mode.
    pub refresh_minutes: u64,
    /// Watch mode timer period.
    pub tick_millis: u64,
    /// How to read the times in the file names.
    pub time_basis: TimeBasis,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station: Station::default(),
            product: Product::default(),
            index_root: Self::DEFAULT_INDEX_ROOT.to_owned(),
            output: PathBuf::from(Self::DEFAULT_OUTPUT),
            window_minutes: DEFAULT_WINDOW_MINUTES,
            frame_delay_ms: 500,
            loop_count: 0,
            fetch_workers: 1,
            skip_failed_frames: false,
            request_timeout_secs: 30,
            refresh_minutes: 10,
            tick_millis: 1_000,
            time_basis: TimeBasis::Utc,
        }
    }
}

impl Config {
    /// NWS RIDGE image directories.
    pub const DEFAULT_INDEX_ROOT: &'static str = "https://radar.weather.gov/ridge/RadarImg/";
    /// Default animation file.
    pub const DEFAULT_OUTPUT: &'static str = "radar_anim.gif";
    /// Longest accepted window, one week.
    pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;
    /// Largest accepted magnitude of a fixed time basis offset, exclusive.
    pub const MAX_OFFSET_MINUTES: i32 = 24 * 60;
    const APP_DIR: &'static str = "ridge-loop";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, RadarLoopErr> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, RadarLoopErr> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// The per user configuration file, e.g. `~/.config/ridge-loop/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::CONFIG_FILE))
    }

    /// Load `path` if given, otherwise the per user file if it exists, otherwise the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, RadarLoopErr> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Check values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), RadarLoopErr> {
        if self.window_minutes <= 0 {
            return Err(RadarLoopErr::InvalidConfig("window_minutes must be positive"));
        }
        if self.window_minutes > Self::MAX_WINDOW_MINUTES {
            return Err(RadarLoopErr::InvalidConfig(
                "window_minutes must be at most one week",
            ));
        }
        if let TimeBasis::FixedOffsetMinutes(minutes) = self.time_basis {
            if minutes.checked_abs().map_or(true, |m| m >= Self::MAX_OFFSET_MINUTES) {
                return Err(RadarLoopErr::InvalidConfig(
                    "fixed_offset_minutes must be less than a day",
                ));
            }
        }
        if self.fetch_workers == 0 {
            return Err(RadarLoopErr::InvalidConfig("fetch_workers must be at least 1"));
        }
        if self.tick_millis == 0 {
            return Err(RadarLoopErr::InvalidConfig("tick_millis must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(RadarLoopErr::InvalidConfig(
                "request_timeout_secs must be positive",
            ));
        }
        if self.index_root.trim().is_empty() {
            return Err(RadarLoopErr::InvalidConfig("index_root is empty"));
        }

        Ok(())
    }

    /// The index page for the configured station and product,
    /// e.g. `https://radar.weather.gov/ridge/RadarImg/N0R/MUX/`.
    pub fn station_dir_url(&self) -> String {
        let product_dir = join_url(&self.index_root, self.product.as_ref());
        join_url(&product_dir, self.station.id()) + "/"
    }

    /// Trailing window length.
    pub fn window(&self) -> Result<chrono::Duration, RadarLoopErr> {
        chrono::Duration::try_minutes(self.window_minutes)
            .ok_or(RadarLoopErr::InvalidConfig("window_minutes out of range"))
    }

    /// Encoding parameters.
    pub fn animation_settings(&self) -> AnimationSettings {
        AnimationSettings {
            frame_delay: Duration::from_millis(self.frame_delay_ms),
            loop_count: self.loop_count,
        }
    }

    /// Per request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Time between completed cycles in watch mode.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_minutes.saturating_mul(60))
    }

    /// Watch mode timer period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

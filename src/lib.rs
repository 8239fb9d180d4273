#![deny(missing_docs)]
//! Package to build looping animations from NWS RIDGE radar station images.
//!
//! The pipeline lists the images available for a station, decodes the time stamps from their file
//! names, keeps those in a trailing window anchored on the newest image, downloads them, and
//! encodes them as a looping GIF. [`Pipeline`] runs those steps in one call, [`Poller`] runs them
//! a stage at a time from a timer.

//
// Public API
//
pub use animation::{animate, encode, AnimationArtifact, AnimationSettings};
pub use cmd_line::CmdLineArgs;
pub use config::Config;
pub use errors::RadarLoopErr;
pub use fetch::{fetch_frames, fetch_pooled, fetch_sequential, FetchReport, FrameBytes};
pub use frame::{format_time, parse_all, FrameReference, TimeBasis};
pub use listing::{anchor_hrefs, list_station_files, station_files};
pub use pipeline::{Pipeline, RadarLoop};
pub use poller::{PollState, Poller};
pub use product::Product;
pub use station::Station;
pub use transport::{join_url, HttpTransport, Transport};
pub use window::{window_frames, TimeWindow, DEFAULT_WINDOW_MINUTES};

//
// Implementation only
//
mod animation;
mod cmd_line;
mod config;
mod errors;
mod fetch;
mod frame;
mod listing;
mod pipeline;
mod poller;
mod product;
mod station;
mod transport;
mod window;

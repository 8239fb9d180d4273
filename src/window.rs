//! Trailing time windows anchored on the most recent frame.

use chrono::{Duration, NaiveDateTime};

use crate::{
    errors::RadarLoopErr,
    frame::{format_time, FrameReference},
};

/// The server only guarantees about an hour of history, 70 minutes catches all of it.
pub const DEFAULT_WINDOW_MINUTES: i64 = 70;

/// An inclusive time range, `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Anchor a window of length `duration` on the last frame of a listing.
    ///
    /// The frames are assumed to be sorted earliest to latest, as the server lists them.
    pub fn anchored(frames: &[FrameReference], duration: Duration) -> Result<Self, RadarLoopErr> {
        debug_assert!(
            frames
                .windows(2)
                .all(|pair| pair[0].timestamp() <= pair[1].timestamp()),
            "frames not sorted"
        );

        if duration < Duration::zero() {
            return Err(RadarLoopErr::InvalidConfig("negative window duration"));
        }

        let end = frames
            .last()
            .map(FrameReference::timestamp)
            .ok_or(RadarLoopErr::EmptyListing)?;

        let start = end
            .checked_sub_signed(duration)
            .ok_or(RadarLoopErr::InvalidConfig("window reaches past the earliest time"))?;

        Ok(TimeWindow { start, end })
    }

    /// The earliest time in the window.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// The latest time in the window, the time of the newest frame.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check if a time falls in the window, inclusive on both ends.
    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        self.start <= *time && *time <= self.end
    }

    /// Keep only the frames inside the window, preserving their order.
    pub fn filter(&self, frames: Vec<FrameReference>) -> Vec<FrameReference> {
        frames
            .into_iter()
            .filter(|frame| self.contains(&frame.timestamp()))
            .collect()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "end_time = {}, start = {}",
            format_time(&self.end),
            format_time(&self.start)
        )
    }
}

/// Anchor a window on the newest frame and drop everything older than its start.
pub fn window_frames(
    frames: Vec<FrameReference>,
    duration: Duration,
) -> Result<(TimeWindow, Vec<FrameReference>), RadarLoopErr> {
    let window = TimeWindow::anchored(&frames, duration)?;
    let kept = window.filter(frames);

    Ok((window, kept))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

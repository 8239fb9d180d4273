//! Radar frame references decoded from RIDGE image file names.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::RadarLoopErr, station::Station};

/// Format used when printing frame times.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a naive time stamp the way it is printed in log messages.
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// How to interpret the naive time stamps embedded in file names.
///
/// The image server does not say which clock the file names use, so this must be chosen
/// explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBasis {
    /// File name times are UTC.
    Utc,
    /// File name times are local to the station, at a fixed offset east of UTC in minutes.
    FixedOffsetMinutes(i32),
}

impl Default for TimeBasis {
    fn default() -> Self {
        TimeBasis::Utc
    }
}

impl TimeBasis {
    /// Convert a file name time into an absolute UTC time. Returns `None` for an offset chrono
    /// cannot represent.
    pub fn to_utc(self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            TimeBasis::Utc => Some(Utc.from_utc_datetime(naive)),
            TimeBasis::FixedOffsetMinutes(minutes) => {
                FixedOffset::east_opt(minutes.checked_mul(60)?)?
                    .from_local_datetime(naive)
                    .single()
                    .map(|local| local.with_timezone(&Utc))
            }
        }
    }
}

/// A reference to a single radar image on the server.
///
/// File names follow `STATION_YYYYMMDD_HHMM_PRODUCT.ext`, for example
/// `MUX_20201214_2339_N0R.gif`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameReference {
    station: Station,
    timestamp: NaiveDateTime,
    product: String,
    extension: String,
    raw_filename: String,
}

impl FrameReference {
    /// Parse a file name from a directory listing.
    pub fn parse(file_name: &str) -> Result<Self, RadarLoopErr> {
        let bad = |reason: &'static str| RadarLoopErr::InvalidFileName {
            name: file_name.to_owned(),
            reason,
        };

        let fields: Vec<&str> = file_name.split('_').collect();
        if fields.len() != 4 {
            return Err(bad("expected four underscore separated fields"));
        }

        let station = Station::new(fields[0]).map_err(|_| bad("invalid station"))?;

        let date = fields[1];
        let time = fields[2];
        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("date field is not YYYYMMDD"));
        }
        if time.len() != 4 || !time.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("time field is not HHMM"));
        }

        // All ASCII digits, so the slices and parses below cannot fail.
        let num = |s: &str| s.parse::<u32>().map_err(|_| bad("non-numeric field"));
        let year = num(&date[0..4])? as i32;
        let month = num(&date[4..6])?;
        let day = num(&date[6..8])?;
        let hour = num(&time[0..2])?;
        let minute = num(&time[2..4])?;

        let timestamp = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| bad("date or time out of range"))?;

        let (product, extension) = match fields[3].split_once('.') {
            Some((prod, ext)) => (prod, ext),
            None => (fields[3], ""),
        };
        if product.is_empty() {
            return Err(bad("missing product"));
        }

        Ok(FrameReference {
            station,
            timestamp,
            product: product.to_owned(),
            extension: extension.to_owned(),
            raw_filename: file_name.to_owned(),
        })
    }

    /// The station that produced this image.
    pub fn station(&self) -> &Station {
        &self.station
    }

    /// The naive time stamp encoded in the file name.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The time stamp as an absolute time, interpreted with `basis`.
    pub fn utc_timestamp(&self, basis: TimeBasis) -> Option<DateTime<Utc>> {
        basis.to_utc(&self.timestamp)
    }

    /// The product code, e.g. N0R.
    pub fn product(&self) -> &str {
        &self.product
    }

    /// The file extension, without the dot. May be empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The file name exactly as it appeared in the listing.
    pub fn raw_filename(&self) -> &str {
        &self.raw_filename
    }
}

impl Display for FrameReference {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{} {} {}",
            self.station,
            format_time(&self.timestamp),
            self.product
        )
    }
}

/// Parse every file name in a listing, failing on the first malformed one.
pub fn parse_all<'a, I>(file_names: I) -> Result<Vec<FrameReference>, RadarLoopErr>
where
    I: IntoIterator<Item = &'a str>,
{
    file_names.into_iter().map(FrameReference::parse).collect()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

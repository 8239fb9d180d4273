//! Radar station identifiers.

use std::{convert::TryFrom, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::RadarLoopErr;

/// New type wrapper for a radar station identifier, e.g. MUX or KMUX.
///
/// Identifiers are stored upper case because that is how they appear in the RIDGE directory
/// paths and file names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Station {
    id: String,
}

impl Station {
    /// Mt. Umunhum, Los Gatos, CA.
    pub const DEFAULT_ID: &'static str = "MUX";

    /// Create a new one, validating and normalizing the identifier.
    pub fn new(id: &str) -> Result<Self, RadarLoopErr> {
        let id = id.trim();

        if id.len() < 3 || id.len() > 4 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RadarLoopErr::InvalidStation(id.to_owned()));
        }

        Ok(Station {
            id: id.to_uppercase(),
        })
    }

    /// Get the identifier as it appears in file names.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Station {
    fn default() -> Self {
        Station {
            id: Self::DEFAULT_ID.to_owned(),
        }
    }
}

impl FromStr for Station {
    type Err = RadarLoopErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::new(s)
    }
}

impl TryFrom<String> for Station {
    type Error = RadarLoopErr;

    fn try_from(val: String) -> Result<Self, Self::Error> {
        Station::new(&val)
    }
}

impl From<Station> for String {
    fn from(station: Station) -> Self {
        station.id
    }
}

impl AsRef<str> for Station {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

impl Display for Station {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(formatter, "{}", self.id)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

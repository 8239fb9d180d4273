//! Radar image products published per station.

use std::{convert::TryFrom, str::FromStr};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::RadarLoopErr;

/// Products available in the RIDGE image directories.
///
/// The product code is both a directory under the index root and the last segment of every image
/// file name, e.g. `MUX_20201214_2339_N0R.gif`.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Hash,
    EnumString,
    AsRefStr,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Product {
    /// Base reflectivity, lowest tilt
    #[strum(to_string = "N0R", serialize = "n0r")]
    N0R,
    /// Long range base reflectivity
    #[strum(to_string = "N0Z", serialize = "n0z")]
    N0Z,
    /// Storm relative mean radial velocity
    #[strum(to_string = "N0S", serialize = "n0s")]
    N0S,
    /// Base radial velocity
    #[strum(to_string = "N0V", serialize = "n0v")]
    N0V,
    /// One hour precipitation total
    #[strum(to_string = "N1P", serialize = "n1p")]
    N1P,
    /// Composite reflectivity
    #[strum(to_string = "NCR", serialize = "ncr")]
    NCR,
    /// Storm total precipitation
    #[strum(to_string = "NTP", serialize = "ntp")]
    NTP,
}

impl Default for Product {
    fn default() -> Self {
        Product::N0R
    }
}

impl Product {
    /// Human readable description.
    pub fn description(self) -> &'static str {
        use Product::*;

        match self {
            N0R => "base reflectivity",
            N0Z => "long range base reflectivity",
            N0S => "storm relative motion",
            N0V => "base velocity",
            N1P => "one hour precipitation",
            NCR => "composite reflectivity",
            NTP => "storm total precipitation",
        }
    }
}

impl TryFrom<String> for Product {
    type Error = RadarLoopErr;

    fn try_from(val: String) -> Result<Self, Self::Error> {
        Product::from_str(val.trim()).map_err(|_| RadarLoopErr::InvalidProduct(val))
    }
}

impl From<Product> for String {
    fn from(prod: Product) -> Self {
        prod.to_string()
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

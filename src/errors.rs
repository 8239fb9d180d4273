//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the radar loop pipeline.
#[derive(Debug)]
pub enum RadarLoopErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Error forwarded from the HTTP client.
    Network(::reqwest::Error),
    /// Error forwarded from the image crate while decoding or encoding frames.
    Image(::image::ImageError),
    /// Error parsing a configuration file.
    Config(::toml::de::Error),
    /// General transport failure with any cause information erased and replaced by a string
    Transport(String),

    // My own errors from this crate
    /// The server answered, but not with a success code.
    HttpStatus {
        /// The requested URL.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },
    /// A file name did not follow the `STATION_YYYYMMDD_HHMM_PRODUCT.ext` convention.
    InvalidFileName {
        /// The offending file name.
        name: String,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// The directory listing had no frames to anchor a time window on.
    EmptyListing,
    /// Invalid station identifier.
    InvalidStation(String),
    /// Invalid product name.
    InvalidProduct(String),
    /// A downloaded body was not a recognizable image.
    NotAnImage {
        /// The file name of the frame.
        name: String,
    },
    /// Frames in one animation must share the dimensions of the first frame.
    FrameSizeMismatch {
        /// The file name of the offending frame.
        name: String,
        /// Dimensions of the first frame.
        expected: (u32, u32),
        /// Dimensions of the offending frame.
        found: (u32, u32),
    },
    /// There were no frames to put in an animation.
    NoFrames,
    /// A configuration value is out of range.
    InvalidConfig(&'static str),
    /// There was an internal logic error.
    LogicError(&'static str),
}

impl Display for RadarLoopErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::RadarLoopErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            Network(err) => write!(f, "network error: {}", err),
            Image(err) => write!(f, "image error: {}", err),
            Config(err) => write!(f, "configuration file error: {}", err),
            Transport(msg) => write!(f, "transport error: {}", msg),

            HttpStatus { url, status } => write!(f, "HTTP error ({}): {}", status, url),
            InvalidFileName { name, reason } => {
                write!(f, "invalid radar file name {}: {}", name, reason)
            }
            EmptyListing => write!(f, "directory listing contained no frames"),
            InvalidStation(id) => write!(f, "invalid station id: {}", id),
            InvalidProduct(prod) => write!(f, "invalid product name: {}", prod),
            NotAnImage { name } => write!(f, "response for {} is not an image", name),
            FrameSizeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "frame {} is {}x{}, expected {}x{}",
                name, found.0, found.1, expected.0, expected.1
            ),
            NoFrames => write!(f, "no frames to animate"),
            InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            LogicError(msg) => write!(f, "internal logic error: {}", msg),
        }
    }
}

impl Error for RadarLoopErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use crate::errors::RadarLoopErr::*;

        match self {
            IO(err) => Some(err),
            Network(err) => Some(err),
            Image(err) => Some(err),
            Config(err) => Some(err),
            _ => None,
        }
    }
}

impl RadarLoopErr {
    /// True for failures talking to the server, as opposed to bad data or bad frames.
    pub fn is_network(&self) -> bool {
        use crate::errors::RadarLoopErr::*;

        matches!(self, Network(_) | Transport(_) | HttpStatus { .. })
    }
}

impl From<::std::io::Error> for RadarLoopErr {
    fn from(err: ::std::io::Error) -> RadarLoopErr {
        RadarLoopErr::IO(err)
    }
}

impl From<::reqwest::Error> for RadarLoopErr {
    fn from(err: ::reqwest::Error) -> RadarLoopErr {
        RadarLoopErr::Network(err)
    }
}

impl From<::image::ImageError> for RadarLoopErr {
    fn from(err: ::image::ImageError) -> RadarLoopErr {
        RadarLoopErr::Image(err)
    }
}

impl From<::toml::de::Error> for RadarLoopErr {
    fn from(err: ::toml::de::Error) -> RadarLoopErr {
        RadarLoopErr::Config(err)
    }
}

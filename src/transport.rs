//! Getting bytes from the image server.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;

use crate::errors::RadarLoopErr;

/// Something that can GET a URL and hand back the body.
///
/// Shared across worker threads, so implementations must be `Send + Sync`.
pub trait Transport: Send + Sync {
    /// Fetch the body of `url`. Any non-success response is an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, RadarLoopErr>;

    /// Fetch the body of `url` as text, replacing invalid UTF-8.
    fn get_text(&self, url: &str) -> Result<String, RadarLoopErr> {
        let bytes = self.get(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Blocking HTTP(S) transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    const USER_AGENT: &'static str = concat!("ridge-loop/", env!("CARGO_PKG_VERSION"));

    /// Create a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, RadarLoopErr> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(Self::USER_AGENT)
            .build()?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, RadarLoopErr> {
        debug!("GET {}", url);

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RadarLoopErr::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Join a directory URL and a name with exactly one `/` between them.
pub fn join_url(base: &str, name: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}

/*--------------------------------------------------------------------------------------------------
                                      Test Support
--------------------------------------------------------------------------------------------------*/

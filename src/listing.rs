//! Scrape image file names out of a station's directory index page.

use log::{debug, info};
use scraper::{ElementRef, Html};

use crate::{errors::RadarLoopErr, station::Station, transport::Transport};

/// Request the index page at `dir_url` and return the image file names for `station`, in the
/// order the page lists them. The server lists them oldest first.
pub fn list_station_files(
    transport: &dyn Transport,
    dir_url: &str,
    station: &Station,
) -> Result<Vec<String>, RadarLoopErr> {
    let html = transport.get_text(dir_url)?;
    let names = station_files(&html, station);

    info!("Found images: {}", names.len());
    debug!("images: {:?}", names);

    Ok(names)
}

/// Pick the links on an index page that name an image from `station`.
///
/// A link qualifies when its last path segment starts with `STATION_`. Sort links, the parent
/// directory link, and images from other stations are skipped.
pub fn station_files(html: &str, station: &Station) -> Vec<String> {
    let prefix = format!("{}_", station.id());

    anchor_hrefs(html)
        .into_iter()
        .filter_map(|href| href.rsplit('/').next().map(str::to_owned))
        .filter(|name| name.starts_with(&prefix))
        .collect()
}

/// Every `href` value of every `<a>` tag, in document order.
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_owned)
        .collect()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/

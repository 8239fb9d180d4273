//! Download the image bytes for a set of frames.

use std::thread;

use crossbeam_channel::{bounded, unbounded};
use image::ImageFormat;
use log::{debug, warn};

use crate::{
    errors::RadarLoopErr,
    frame::FrameReference,
    transport::{join_url, Transport},
};

/// The encoded image for one frame, still compressed as the server sent it.
#[derive(Clone, Debug)]
pub struct FrameBytes {
    reference: FrameReference,
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl FrameBytes {
    /// Wrap a downloaded body, checking that it looks like an image.
    pub fn new(reference: FrameReference, bytes: Vec<u8>) -> Result<Self, RadarLoopErr> {
        let format = image::guess_format(&bytes).map_err(|_| RadarLoopErr::NotAnImage {
            name: reference.raw_filename().to_owned(),
        })?;

        Ok(FrameBytes {
            reference,
            bytes,
            format,
        })
    }

    /// Which frame these bytes belong to.
    pub fn reference(&self) -> &FrameReference {
        &self.reference
    }

    /// The raw, encoded image.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The detected image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Outcome of a batch download with per frame error isolation.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Frames that downloaded, in the order they were requested.
    pub frames: Vec<FrameBytes>,
    /// Frames that failed and why, in the order they were requested.
    pub failures: Vec<(FrameReference, RadarLoopErr)>,
}

impl FetchReport {
    /// True if every frame downloaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Download a single frame from the station directory at `dir_url`.
pub fn fetch_one(
    transport: &dyn Transport,
    dir_url: &str,
    reference: &FrameReference,
) -> Result<FrameBytes, RadarLoopErr> {
    let url = join_url(dir_url, reference.raw_filename());
    debug!("fetch: {}", url);

    let bytes = transport.get(&url)?;
    FrameBytes::new(reference.clone(), bytes)
}

/// Download frames one at a time, stopping at the first failure.
pub fn fetch_sequential(
    transport: &dyn Transport,
    dir_url: &str,
    references: &[FrameReference],
) -> Result<Vec<FrameBytes>, RadarLoopErr> {
    references
        .iter()
        .map(|reference| fetch_one(transport, dir_url, reference))
        .collect()
}

/// Download frames on a pool of `workers` threads.
///
/// A failed frame does not stop the others. Results come back in request order regardless of
/// which worker finished first.
pub fn fetch_pooled(
    transport: &dyn Transport,
    dir_url: &str,
    references: &[FrameReference],
    workers: usize,
) -> FetchReport {
    let workers = workers.max(1).min(references.len().max(1));

    let (job_tx, job_rx) = bounded::<(usize, &FrameReference)>(workers);
    let (res_tx, res_rx) = unbounded::<(usize, Result<FrameBytes, RadarLoopErr>)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let res_tx = res_tx.clone();

            scope.spawn(move || {
                for (idx, reference) in job_rx.iter() {
                    let res = fetch_one(transport, dir_url, reference);
                    if res_tx.send((idx, res)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(res_tx);

        for job in references.iter().enumerate() {
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);
    });

    let mut slots: Vec<Option<Result<FrameBytes, RadarLoopErr>>> =
        references.iter().map(|_| None).collect();
    for (idx, res) in res_rx.try_iter() {
        slots[idx] = Some(res);
    }

    let mut report = FetchReport::default();
    for (reference, slot) in references.iter().zip(slots) {
        match slot {
            Some(Ok(frame)) => report.frames.push(frame),
            Some(Err(err)) => report.failures.push((reference.clone(), err)),
            None => report.failures.push((
                reference.clone(),
                RadarLoopErr::LogicError("worker exited without a result"),
            )),
        }
    }

    report
}

/// Download frames according to the configured policy.
///
/// With `skip_failed` false any failure fails the whole batch, like the sequential download.
/// With it true the failures are logged and the frames that did arrive are returned.
pub fn fetch_frames(
    transport: &dyn Transport,
    dir_url: &str,
    references: &[FrameReference],
    workers: usize,
    skip_failed: bool,
) -> Result<FetchReport, RadarLoopErr> {
    if workers <= 1 && !skip_failed {
        let frames = fetch_sequential(transport, dir_url, references)?;
        return Ok(FetchReport {
            frames,
            failures: vec![],
        });
    }

    let mut report = fetch_pooled(transport, dir_url, references, workers);

    if !skip_failed && !report.failures.is_empty() {
        let (_, err) = report.failures.swap_remove(0);
        return Err(err);
    }

    for (reference, err) in &report.failures {
        warn!("skipping frame {}: {}", reference, err);
    }

    Ok(report)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::{
        frame::parse_all,
        transport::fake::{solid_gif, FakeTransport},
    };

    const DIR: &str = "https://example.test/N0R/MUX/";

    const NAMES: [&str; 4] = [
        "MUX_20201214_2200_N0R.gif",
        "MUX_20201214_2210_N0R.gif",
        "MUX_20201214_2220_N0R.gif",
        "MUX_20201214_2230_N0R.gif",
    ];

    fn serve_all_but(missing: Option<usize>) -> FakeTransport {
        NAMES
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != missing)
            .fold(FakeTransport::default(), |fake, (idx, name)| {
                fake.with(
                    &join_url(DIR, name),
                    solid_gif(4, 4, [idx as u8 * 60, 0, 0]),
                )
            })
    }

    fn references() -> Vec<FrameReference> {
        parse_all(NAMES.iter().copied()).unwrap()
    }

    fn names(frames: &[FrameBytes]) -> Vec<&str> {
        frames.iter().map(|f| f.reference().raw_filename()).collect()
    }

    #[test]
    fn test_sequential_preserves_order() {
        let fake = serve_all_but(None);
        let frames = fetch_sequential(&fake, DIR, &references()).unwrap();

        assert_eq!(names(&frames), NAMES.to_vec());
        assert!(frames.iter().all(|f| f.format() == ImageFormat::Gif));
    }

    #[test]
    fn test_sequential_aborts_on_first_failure() {
        let fake = serve_all_but(Some(1));

        let err = fetch_sequential(&fake, DIR, &references()).unwrap_err();
        assert!(err.is_network());
        // Nothing after the failed frame was requested.
        assert_eq!(fake.requests().len(), 2);
    }

    #[test]
    fn test_pooled_preserves_order() {
        let fake = serve_all_but(None);
        let report = fetch_pooled(&fake, DIR, &references(), 3);

        assert!(report.is_complete());
        assert_eq!(names(&report.frames), NAMES.to_vec());
    }

    #[test]
    fn test_pooled_isolates_failures() {
        let fake = serve_all_but(Some(2));
        let report = fetch_pooled(&fake, DIR, &references(), 2);

        assert_eq!(
            names(&report.frames),
            vec![NAMES[0], NAMES[1], NAMES[3]]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0.raw_filename(), NAMES[2]);
        assert_eq!(fake.requests().len(), 4);
    }

    #[test]
    fn test_fetch_frames_policy() {
        let fake = serve_all_but(Some(0));

        assert!(fetch_frames(&fake, DIR, &references(), 2, false).is_err());

        let report = fetch_frames(&fake, DIR, &references(), 2, true).unwrap();
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_html_body_is_not_an_image() {
        let refs = references();
        let fake = FakeTransport::default().with(
            &join_url(DIR, NAMES[0]),
            b"<html>Not Found</html>".to_vec(),
        );

        match fetch_one(&fake, DIR, &refs[0]) {
            Err(RadarLoopErr::NotAnImage { name }) => assert_eq!(name, NAMES[0]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch() {
        let fake = FakeTransport::default();
        let report = fetch_pooled(&fake, DIR, &[], 4);

        assert!(report.frames.is_empty());
        assert!(report.is_complete());
    }
}

//! Drive the pipeline from a periodic timer without ever blocking the caller.
//!
//! Each call to [`Poller::tick`] looks at the current state, collects any finished background
//! work, and starts the next stage if its input is ready. Listing and downloading run on
//! background threads and report back over a channel, encoding happens on the ticking thread.
//!
//! ```text
//! Idle -> ListingRequested -> ListingReady -> FetchRequested -> FetchReady -> Done
//!              |                                   |                           |
//!              +------------> Failed <-------------+             (refresh interval)
//!                               |                                              |
//!                               +-------------------> Idle <-------------------+
//! ```

use std::{
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

use crate::{
    errors::RadarLoopErr,
    fetch::FetchReport,
    frame::FrameReference,
    pipeline::{Pipeline, RadarLoop},
    window::TimeWindow,
};

/// Where the poller is in a cycle.
#[derive(Debug)]
pub enum PollState {
    /// Nothing in flight, waiting for the next cycle to be due.
    Idle,
    /// The directory listing has been requested.
    ListingRequested,
    /// The listing arrived and has been windowed.
    ListingReady {
        /// Bounds of the window.
        window: TimeWindow,
        /// Frames to download.
        frames: Vec<FrameReference>,
    },
    /// Frame downloads are in flight.
    FetchRequested {
        /// Bounds of the window.
        window: TimeWindow,
    },
    /// Frames downloaded, ready to encode.
    FetchReady {
        /// Bounds of the window.
        window: TimeWindow,
        /// The downloaded frames.
        report: FetchReport,
    },
    /// An animation was produced.
    Done {
        /// When the cycle finished.
        finished: Instant,
    },
    /// A stage failed.
    Failed {
        /// When the cycle finished.
        finished: Instant,
        /// Why.
        error: RadarLoopErr,
    },
}

impl PollState {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        use PollState::*;

        match self {
            Idle => "idle",
            ListingRequested => "listing requested",
            ListingReady { .. } => "listing ready",
            FetchRequested { .. } => "fetch requested",
            FetchReady { .. } => "fetch ready",
            Done { .. } => "done",
            Failed { .. } => "failed",
        }
    }
}

// Results sent back from background stages.
enum Completion {
    Listing(Result<(TimeWindow, Vec<FrameReference>), RadarLoopErr>),
    Fetch(Result<FetchReport, RadarLoopErr>),
}

/// Timer driven state machine around a [`Pipeline`].
pub struct Poller {
    pipeline: Pipeline,
    state: PollState,
    running: bool,
    // Completions tagged with an older generation belong to a stopped cycle.
    generation: u64,
    tx: Sender<(u64, Completion)>,
    rx: Receiver<(u64, Completion)>,
}

impl Poller {
    /// Create a poller. The first tick starts a cycle.
    pub fn new(pipeline: Pipeline) -> Self {
        let (tx, rx) = unbounded();

        Poller {
            pipeline,
            state: PollState::Idle,
            running: true,
            generation: 0,
            tx,
            rx,
        }
    }

    /// Current state.
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Whether ticks do anything.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time to wait after a finished cycle before starting the next one.
    pub fn refresh_interval(&self) -> Duration {
        self.pipeline.config().refresh_interval()
    }

    /// Collect finished background work, then advance. Returns the animation on the tick that
    /// finishes a cycle.
    pub fn tick(&mut self, now: Instant) -> Option<RadarLoop> {
        while let Ok((generation, completion)) = self.rx.try_recv() {
            if generation != self.generation || !self.running {
                debug!("discarding result from a stopped cycle");
                continue;
            }

            match completion {
                Completion::Listing(res) => self.on_listing_complete(res, now),
                Completion::Fetch(res) => self.on_fetch_complete(res, now),
            }
        }

        self.on_tick(now)
    }

    /// Timer event.
    pub fn on_tick(&mut self, now: Instant) -> Option<RadarLoop> {
        if !self.running {
            return None;
        }

        let state = std::mem::replace(&mut self.state, PollState::Idle);
        let before = state.name();
        let (next, produced) = match state {
            PollState::Idle => {
                self.spawn_listing();
                (PollState::ListingRequested, None)
            }

            PollState::ListingReady { window, frames } => {
                self.spawn_fetch(frames);
                (PollState::FetchRequested { window }, None)
            }

            PollState::FetchReady { window, report } => {
                match self.pipeline.encode(&report.frames) {
                    Ok(artifact) => {
                        let skipped = report.failures.into_iter().map(|(r, _)| r).collect();
                        (
                            PollState::Done { finished: now },
                            Some(RadarLoop {
                                window,
                                artifact,
                                skipped,
                            }),
                        )
                    }
                    Err(error) => (Self::failed(error, now), None),
                }
            }

            PollState::Done { finished } | PollState::Failed { finished, .. }
                if now.saturating_duration_since(finished) >= self.refresh_interval() =>
            {
                debug!("refresh interval elapsed, starting a new cycle");
                (PollState::Idle, None)
            }

            waiting => (waiting, None),
        };

        if next.name() != before {
            debug!("poller: {}", next.name());
        }
        self.state = next;

        produced
    }

    /// Listing completion event. Ignored unless a listing is outstanding.
    pub fn on_listing_complete(
        &mut self,
        res: Result<(TimeWindow, Vec<FrameReference>), RadarLoopErr>,
        now: Instant,
    ) {
        if !matches!(self.state, PollState::ListingRequested) {
            warn!("unexpected listing completion in state {}", self.state.name());
            return;
        }

        self.state = match res {
            Ok((window, frames)) => PollState::ListingReady { window, frames },
            Err(error) => Self::failed(error, now),
        };
    }

    /// Fetch completion event. Ignored unless downloads are outstanding.
    pub fn on_fetch_complete(&mut self, res: Result<FetchReport, RadarLoopErr>, now: Instant) {
        let state = std::mem::replace(&mut self.state, PollState::Idle);

        self.state = match (state, res) {
            (PollState::FetchRequested { window }, Ok(report)) => {
                PollState::FetchReady { window, report }
            }
            (PollState::FetchRequested { .. }, Err(error)) => Self::failed(error, now),
            (other, _) => {
                warn!("unexpected fetch completion in state {}", other.name());
                other
            }
        };
    }

    /// Abandon the current cycle and ignore ticks until [`Poller::start`].
    ///
    /// Requests already in flight still run to completion, their results are dropped.
    pub fn stop(&mut self) {
        info!("poller stopped in state {}", self.state.name());

        self.generation += 1;
        self.running = false;
        self.state = PollState::Idle;
    }

    /// Resume after [`Poller::stop`]. The next tick starts a fresh cycle.
    pub fn start(&mut self) {
        self.running = true;
    }

    fn failed(error: RadarLoopErr, now: Instant) -> PollState {
        error!("radar loop failed: {}", error);
        PollState::Failed {
            finished: now,
            error,
        }
    }

    fn spawn_listing(&self) {
        let pipeline = self.pipeline.clone();
        let tx = self.tx.clone();
        let generation = self.generation;

        thread::spawn(move || {
            let res = pipeline.list_window();
            // The poller may be gone, nobody is waiting then.
            let _ = tx.send((generation, Completion::Listing(res)));
        });
    }

    fn spawn_fetch(&self, frames: Vec<FrameReference>) {
        let pipeline = self.pipeline.clone();
        let tx = self.tx.clone();
        let generation = self.generation;

        thread::spawn(move || {
            let res = pipeline.fetch(&frames);
            let _ = tx.send((generation, Completion::Fetch(res)));
        });
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use std::sync::Arc;

    use crate::{
        config::Config,
        frame::parse_all,
        transport::{
            fake::{index_page, solid_gif, FakeTransport},
            join_url,
        },
        window::window_frames,
    };

    const NAMES: [&str; 3] = [
        "MUX_20201214_2200_N0R.gif",
        "MUX_20201214_2220_N0R.gif",
        "MUX_20201214_2239_N0R.gif",
    ];

    fn pipeline(refresh_minutes: u64, serve_frames: bool) -> Pipeline {
        let config = Config {
            index_root: "https://example.test/ridge/".to_owned(),
            refresh_minutes,
            ..Config::default()
        };
        let dir = config.station_dir_url();

        let mut fake = FakeTransport::default().with(&dir, index_page(&NAMES).into_bytes());
        if serve_frames {
            for name in NAMES.iter() {
                fake = fake.with(&join_url(&dir, name), solid_gif(5, 5, [0, 200, 0]));
            }
        }

        Pipeline::new(config, Arc::new(fake))
    }

    // Tick until a cycle ends, recording every state seen.
    fn run_cycle(poller: &mut Poller) -> (Option<RadarLoop>, Vec<&'static str>) {
        let mut seen = vec![];

        for _ in 0..2_000 {
            let produced = poller.tick(Instant::now());
            let name = poller.state().name();
            if seen.last() != Some(&name) {
                seen.push(name);
            }

            if produced.is_some() || matches!(poller.state(), PollState::Failed { .. }) {
                return (produced, seen);
            }
            thread::sleep(Duration::from_millis(5));
        }

        panic!("poller never finished, states: {:?}", seen);
    }

    fn window_of(names: &[&str]) -> (TimeWindow, Vec<FrameReference>) {
        window_frames(
            parse_all(names.iter().copied()).unwrap(),
            chrono::Duration::minutes(70),
        )
        .unwrap()
    }

    #[test]
    fn test_full_cycle() {
        let mut poller = Poller::new(pipeline(10, true));

        let (produced, seen) = run_cycle(&mut poller);
        let radar_loop = produced.expect("no animation");

        assert_eq!(radar_loop.artifact.frames().len(), 3);
        assert_eq!(seen.first(), Some(&"listing requested"));
        assert_eq!(seen.last(), Some(&"done"));
        assert!(seen.contains(&"fetch requested"));
    }

    #[test]
    fn test_done_waits_for_refresh() {
        let mut poller = Poller::new(pipeline(10, true));
        run_cycle(&mut poller);

        let finished = match poller.state() {
            PollState::Done { finished } => *finished,
            other => panic!("unexpected state {}", other.name()),
        };

        assert!(poller.tick(finished + Duration::from_secs(60)).is_none());
        assert_eq!(poller.state().name(), "done");

        poller.tick(finished + Duration::from_secs(600));
        assert_eq!(poller.state().name(), "idle");

        poller.tick(finished + Duration::from_secs(601));
        assert_eq!(poller.state().name(), "listing requested");
    }

    #[test]
    fn test_fetch_failure() {
        let mut poller = Poller::new(pipeline(10, false));

        let (produced, seen) = run_cycle(&mut poller);
        assert!(produced.is_none());
        assert_eq!(seen.last(), Some(&"failed"));

        match poller.state() {
            PollState::Failed { error, .. } => assert!(error.is_network()),
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[test]
    fn test_stop_discards_in_flight_work() {
        let mut poller = Poller::new(pipeline(10, true));

        poller.tick(Instant::now());
        assert_eq!(poller.state().name(), "listing requested");

        poller.stop();
        assert!(!poller.is_running());

        // Give the listing thread time to report back, then make sure nothing moves.
        thread::sleep(Duration::from_millis(100));
        for _ in 0..5 {
            assert!(poller.tick(Instant::now()).is_none());
            assert_eq!(poller.state().name(), "idle");
        }

        poller.start();
        let (produced, _) = run_cycle(&mut poller);
        assert!(produced.is_some());
    }

    #[test]
    fn test_completion_events_out_of_order_are_ignored() {
        let mut poller = Poller::new(pipeline(10, true));
        let now = Instant::now();

        poller.on_fetch_complete(Ok(FetchReport::default()), now);
        assert_eq!(poller.state().name(), "idle");

        poller.on_listing_complete(Ok(window_of(&NAMES)), now);
        assert_eq!(poller.state().name(), "idle");
    }

    #[test]
    fn test_listing_transitions() {
        let mut poller = Poller::new(pipeline(10, true));
        let now = Instant::now();

        poller.state = PollState::ListingRequested;
        poller.on_listing_complete(Ok(window_of(&NAMES)), now);
        match poller.state() {
            PollState::ListingReady { frames, .. } => assert_eq!(frames.len(), 3),
            other => panic!("unexpected state {}", other.name()),
        }

        poller.state = PollState::ListingRequested;
        poller.on_listing_complete(Err(RadarLoopErr::EmptyListing), now);
        assert_eq!(poller.state().name(), "failed");
    }

    #[test]
    fn test_encode_failure_is_reported() {
        let mut poller = Poller::new(pipeline(10, true));
        let (window, _) = window_of(&NAMES);

        poller.state = PollState::FetchReady {
            window,
            report: FetchReport::default(),
        };

        assert!(poller.on_tick(Instant::now()).is_none());
        match poller.state() {
            PollState::Failed {
                error: RadarLoopErr::NoFrames,
                ..
            } => {}
            other => panic!("unexpected state {}", other.name()),
        }
    }
}

//! Poll scheduler: drives the fetcher on a fixed period, keeps the rolling window,
//! and pushes snapshots to subscribers over a watch channel.
//!
//! One task owns the loop and awaits each fetch before the next tick is taken, so a
//! scheduler never has two requests in flight. Ticks missed during a slow fetch are
//! coalesced. Failed fetches are replaced by a synthetic sample so every completed
//! cycle appends exactly one point.

use std::sync::Arc;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::fetch::{FetchError, SampleSource};
use crate::history::Window;
use crate::normalize::to_chart_point;
use crate::synthetic::synthetic_sample;
use crate::types::{ChartPoint, ConnectionState, MemCheckResponse};

pub const DEFAULT_ENDPOINT: &str = "/mem-check";
pub const POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const STALE_AFTER: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub stale_after: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            stale_after: STALE_AFTER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// No cycle has run yet.
    Idle,
    Fetching,
    /// Last cycle got a real sample.
    Succeeded,
    /// Last cycle fell back to a synthetic sample.
    Failed,
}

/// Everything a consumer needs to render one frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub current: Option<Arc<MemCheckResponse>>,
    pub window: Window,
    pub connection: ConnectionState,
    pub phase: PollPhase,
    pub endpoint: String,
    pub fetched_at: Option<Instant>,
    pub stale_after: Duration,
    // completed cycles since the scheduler was created
    pub cycles: u64,
}

impl Snapshot {
    pub fn new(endpoint: String, stale_after: Duration) -> Self {
        Self {
            current: None,
            window: Window::new(),
            connection: ConnectionState::default(),
            phase: PollPhase::Idle,
            endpoint,
            fetched_at: None,
            stale_after,
            cycles: 0,
        }
    }

    /// True until the first sample arrives.
    pub fn is_loading(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == PollPhase::Fetching
    }

    pub fn is_stale_at(&self, now: Instant) -> bool {
        match self.fetched_at {
            Some(t) => now.saturating_duration_since(t) >= self.stale_after,
            None => true,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Instant::now())
    }
}

struct PollLoop {
    source: Arc<dyn SampleSource>,
    snapshots: Arc<watch::Sender<Snapshot>>,
    endpoint: watch::Receiver<String>,
    feeds: Vec<mpsc::UnboundedSender<ChartPoint>>,
    rng: StdRng,
    started: Instant,
}

impl PollLoop {
    async fn run(mut self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }

            let endpoint = self.endpoint.borrow_and_update().clone();
            let previous = self.snapshots.borrow().phase;
            self.snapshots.send_modify(|s| {
                s.phase = PollPhase::Fetching;
                s.endpoint = endpoint.clone();
            });

            // An in-flight result is dropped if we are stopped meanwhile.
            let result = tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    self.snapshots.send_modify(|s| s.phase = previous);
                    break;
                }
                r = self.source.fetch(&endpoint) => r,
            };
            self.complete(result, &endpoint);
        }
        debug!("poll loop stopped");
    }

    fn complete(&mut self, result: Result<MemCheckResponse, FetchError>, endpoint: &str) {
        let (sample, connection, phase) = match result {
            Ok(sample) => (
                sample,
                ConnectionState {
                    is_connected: true,
                    last_error: None,
                },
                PollPhase::Succeeded,
            ),
            Err(e) => {
                warn!(endpoint, error = %e, "fetch failed, using synthetic sample");
                let uptime = self.started.elapsed().as_secs_f64();
                (
                    synthetic_sample(&mut self.rng, Utc::now(), uptime),
                    ConnectionState {
                        is_connected: false,
                        last_error: Some(e.to_string()),
                    },
                    PollPhase::Failed,
                )
            }
        };

        let point = to_chart_point(&sample);
        let now = Instant::now();
        self.snapshots.send_modify(|s| {
            s.window = s.window.append(point.clone());
            s.current = Some(Arc::new(sample));
            s.connection = connection;
            s.phase = phase;
            s.fetched_at = Some(now);
            s.cycles += 1;
        });
        // Drop feeds whose receiver went away.
        self.feeds.retain(|tx| tx.send(point.clone()).is_ok());
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the poll loop's lifecycle. Must be started from within a tokio runtime.
pub struct Scheduler {
    source: Arc<dyn SampleSource>,
    settings: PollSettings,
    snapshots: Arc<watch::Sender<Snapshot>>,
    endpoint: watch::Sender<String>,
    feeds: Vec<mpsc::UnboundedSender<ChartPoint>>,
    seed: Option<u64>,
    running: Option<Running>,
}

impl Scheduler {
    pub fn new(source: Arc<dyn SampleSource>, endpoint: String, settings: PollSettings) -> Self {
        let (snapshots, _) = watch::channel(Snapshot::new(endpoint.clone(), settings.stale_after));
        let (endpoint, _) = watch::channel(endpoint);
        Self {
            source,
            settings,
            snapshots: Arc::new(snapshots),
            endpoint,
            feeds: Vec::new(),
            seed: None,
            running: None,
        }
    }

    /// Fix the RNG used for synthetic fallback samples.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Every completed point, in order. Unlike `subscribe`, nothing is coalesced.
    /// Only feeds taken before `start` are served.
    pub fn points(&mut self) -> mpsc::UnboundedReceiver<ChartPoint> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.push(tx);
        rx
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.borrow().clone()
    }

    /// Takes effect from the next cycle; the window is kept.
    pub fn set_endpoint(&self, url: impl Into<String>) {
        let url = url.into();
        info!(endpoint = %url, "endpoint changed");
        self.endpoint.send_replace(url);
    }

    pub fn reset_endpoint(&self) {
        self.set_endpoint(DEFAULT_ENDPOINT);
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Spawn the poll loop. The first cycle runs immediately. No-op if already running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        let rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let (shutdown, shutdown_rx) = watch::channel(false);
        let poll = PollLoop {
            source: Arc::clone(&self.source),
            snapshots: Arc::clone(&self.snapshots),
            endpoint: self.endpoint.subscribe(),
            feeds: self.feeds.clone(),
            rng,
            started: Instant::now(),
        };
        let task = tokio::spawn(poll.run(self.settings.interval, shutdown_rx));
        info!(interval_ms = self.settings.interval.as_millis() as u64, "poll scheduler started");
        self.running = Some(Running { shutdown, task });
    }

    /// Stop issuing cycles and wait for the loop to exit.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            warn!(error = %e, "poll loop ended abnormally");
        }
        info!("poll scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(true);
        }
    }
}

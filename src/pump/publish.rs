use super::sink::{ConnectionStatus, StreamSink};
use super::PumpError;
use crate::flv::{FlvSource, Tag};
use log::{info, trace, warn};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncSeek};
use tokio::time::{sleep, Instant};

// Poll interval while waiting for the sink to become ready.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

// Defaults
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_millis(1000);
pub const DEFAULT_SLACK: Duration = Duration::from_millis(100);

/// Pacing and termination knobs for a [`Publisher`].
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// How long to wait for the sink to report ready before giving up.
    pub ready_timeout: Duration,
    /// Total streaming time allowed once the sink is ready; the run
    /// completes cleanly when it is spent. Unbounded by default.
    pub duration_budget: Duration,
    /// Cap on any single pacing sleep, so closure and timeouts are
    /// observed promptly; larger gaps are paid across iterations.
    pub max_sleep: Duration,
    /// How far ahead of a tag's target instant it may be published.
    pub slack: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            ready_timeout: DEFAULT_READY_TIMEOUT,
            duration_budget: Duration::MAX,
            max_sleep: DEFAULT_MAX_SLEEP,
            slack: DEFAULT_SLACK,
        }
    }
}

impl PublishConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_duration_budget(mut self, budget: Duration) -> Self {
        self.duration_budget = budget;
        self
    }

    pub fn with_max_sleep(mut self, max_sleep: Duration) -> Self {
        self.max_sleep = max_sleep;
        self
    }

    pub fn with_slack(mut self, slack: Duration) -> Self {
        self.slack = slack;
        self
    }
}

/// Per-pass pacing state. Tags are paced by the difference between their
/// timestamps and the pass epoch (the first tag's timestamp), measured
/// against wall time since the pass origin, so a container whose clock does
/// not start at zero still begins streaming immediately.
#[derive(Debug)]
struct PaceState {
    epoch: Option<u32>,
    origin: Instant,
    pending: Duration,
}

impl PaceState {
    fn start(origin: Instant) -> Self {
        Self {
            epoch: None,
            origin,
            pending: Duration::ZERO,
        }
    }

    /// Folds a tag timestamp into the pass. After this, `pending` is the
    /// offset from the pass origin at which the tag should go out; a
    /// timestamp at or below the epoch never reduces it.
    fn observe(&mut self, timestamp: u32) {
        let epoch = *self.epoch.get_or_insert(timestamp);
        if timestamp > epoch {
            self.pending = Duration::from_millis(u64::from(timestamp - epoch));
        }
    }
}

/// Replays an FLV source onto a stream sink in real time.
///
/// The pump waits for the sink to become ready, then delivers tags in
/// source order, each no earlier than `slack` before its timestamp offset
/// from the pass epoch. When the source runs out it loops back and starts
/// a fresh pass with its own epoch and origin. The run ends when the
/// duration budget is spent (`Ok`), or with a [`PumpError`] on closure,
/// abnormal status, timeout, or an I/O failure on either side.
pub struct Publisher<R: AsyncRead + AsyncSeek + Unpin + Send, S: StreamSink> {
    source: FlvSource<R>,
    sink: S,
    config: PublishConfig,
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send, S: StreamSink> Publisher<R, S> {
    pub fn new(source: FlvSource<R>, sink: S) -> Self {
        Self {
            source,
            sink,
            config: PublishConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PublishConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(&self) -> &FlvSource<R> {
        &self.source
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Drives the pump to one terminal result.
    pub async fn run(&mut self) -> Result<(), PumpError> {
        info!("publish pump started");
        let ready_at = self.await_ready().await?;
        info!("sink is ready, streaming");

        let mut pace = PaceState::start(ready_at);
        let mut staged: Option<Tag> = None;
        let mut published_this_pass: u64 = 0;

        loop {
            if self.sink.is_closed() {
                info!("sink closed, publish pump exiting");
                return Err(PumpError::SinkClosed);
            }
            let status = self.sink.connection_status();
            if status != ConnectionStatus::StreamReady {
                warn!("sink status is abnormal: {:?}", status);
                return Err(PumpError::SinkAbnormal(status));
            }
            if ready_at.elapsed() > self.config.duration_budget {
                info!("publish duration budget spent");
                return Ok(());
            }

            match staged.take() {
                // A tag is waiting to go out: sleep toward its target in
                // bounded steps, then submit it.
                Some(tag) => {
                    let elapsed = pace.origin.elapsed();
                    if pace.pending > elapsed + self.config.slack {
                        let wait = (pace.pending - elapsed).min(self.config.max_sleep);
                        trace!(
                            "pacing: target {}ms, elapsed {}ms, sleeping {}ms",
                            pace.pending.as_millis(),
                            elapsed.as_millis(),
                            wait.as_millis()
                        );
                        staged = Some(tag);
                        sleep(wait).await;
                        continue;
                    }

                    let delta = pace.pending.as_millis() as u32;
                    trace!(
                        "publishing {:?} tag, {} bytes, delta {}ms",
                        tag.kind,
                        tag.data.len(),
                        delta
                    );
                    self.sink
                        .publish(tag.kind, tag.data, delta)
                        .await
                        .map_err(PumpError::Sink)?;
                    published_this_pass += 1;
                }
                // Nothing staged: loop the source back if it is spent,
                // otherwise read the next tag.
                None => {
                    if self.source.is_finished() {
                        if published_this_pass == 0 {
                            info!("source has no tags, nothing to publish");
                            return Ok(());
                        }
                        self.source.loop_back().await.map_err(PumpError::Source)?;
                        info!(
                            "source finished, looping back (pass {})",
                            self.source.passes()
                        );
                        pace = PaceState::start(Instant::now());
                        published_this_pass = 0;
                        continue;
                    }

                    if let Some(tag) = self.source.read_tag().await.map_err(PumpError::Source)? {
                        pace.observe(tag.timestamp);
                        staged = Some(tag);
                    }
                }
            }
        }
    }

    async fn await_ready(&mut self) -> Result<Instant, PumpError> {
        let started = Instant::now();
        loop {
            if self.sink.is_closed() {
                info!("sink closed while awaiting readiness");
                return Err(PumpError::SinkClosed);
            }
            if self.sink.connection_status() == ConnectionStatus::StreamReady {
                return Ok(Instant::now());
            }
            if started.elapsed() > self.config.ready_timeout {
                warn!(
                    "sink not ready after {}ms, giving up",
                    self.config.ready_timeout.as_millis()
                );
                return Err(PumpError::ReadyTimeout);
            }
            sleep(READY_POLL_INTERVAL).await;
        }
    }
}

//! Recurring fetch cycles against one telemetry source
//!
//! A poller issues a cycle immediately on start and then once per interval,
//! measured from cycle start. Cycles may overlap in flight. A completed cycle
//! is applied only if its generation is still live and no newer cycle has
//! been applied already; anything else is dropped on the floor.

use parking_lot::Mutex;
use planet_common::Feed;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::snapshot::{CycleId, Stamped, TelemetrySnapshot};
use super::source::TelemetrySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerStatus {
    Idle,
    Polling,
}

type UpdateFn<T> = Box<dyn Fn(TelemetrySnapshot<T>) + Send + Sync>;

struct PollerState<P, T> {
    status: PollerStatus,
    generation: u64,
    next_seq: u64,
    last_applied: Option<u64>,
    params: Option<P>,
    ticker: Option<JoinHandle<()>>,
    latest: TelemetrySnapshot<T>,
}

struct Shared<P, T> {
    feed: Feed,
    interval: Duration,
    source: Arc<dyn TelemetrySource<P, T>>,
    /// Called with the state lock held, so it must not call back into the handle
    on_update: UpdateFn<T>,
    state: Mutex<PollerState<P, T>>,
}

/// Owner of a running poller. Dropping it stops polling.
pub struct PollerHandle<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + Stamped + Send + Sync + 'static,
{
    shared: Arc<Shared<P, T>>,
}

/// Start polling `source` with `params` every `every`.
///
/// The first cycle is issued right away. Must be called from within a tokio
/// runtime.
pub fn start<P, T, F>(
    feed: Feed,
    params: P,
    every: Duration,
    source: Arc<dyn TelemetrySource<P, T>>,
    on_update: F,
) -> PollerHandle<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + Stamped + Send + Sync + 'static,
    F: Fn(TelemetrySnapshot<T>) + Send + Sync + 'static,
{
    let shared = Arc::new(Shared {
        feed,
        interval: every,
        source,
        on_update: Box::new(on_update),
        state: Mutex::new(PollerState {
            status: PollerStatus::Idle,
            generation: 0,
            next_seq: 0,
            last_applied: None,
            params: None,
            ticker: None,
            latest: TelemetrySnapshot::awaiting(),
        }),
    });

    Shared::begin(&shared, params);
    PollerHandle { shared }
}

impl<P, T> PollerHandle<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + Stamped + Send + Sync + 'static,
{
    /// Cancel the timer and invalidate every cycle still in flight. Idempotent.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        if state.status == PollerStatus::Idle {
            return;
        }

        state.status = PollerStatus::Idle;
        state.generation += 1;
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }

        tracing::debug!(
            "[{}] poller stopped (generation now {})",
            self.shared.feed,
            state.generation
        );
    }

    /// Stop, then start again with `params` under a fresh generation.
    /// Nothing issued before the restart can be applied afterwards.
    pub fn restart(&self, params: P) {
        self.stop();
        Shared::begin(&self.shared, params);
    }

    pub fn status(&self) -> PollerStatus {
        self.shared.state.lock().status
    }

    pub fn params(&self) -> Option<P> {
        self.shared.state.lock().params.clone()
    }

    /// Most recently applied snapshot; awaiting after a (re)start
    pub fn latest(&self) -> TelemetrySnapshot<T> {
        self.shared.state.lock().latest.clone()
    }

    pub fn feed(&self) -> Feed {
        self.shared.feed
    }
}

impl<P, T> Drop for PollerHandle<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + Stamped + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

impl<P, T> Shared<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + Stamped + Send + Sync + 'static,
{
    fn begin(this: &Arc<Self>, params: P) {
        let mut state = this.state.lock();

        state.status = PollerStatus::Polling;
        state.generation += 1;
        state.last_applied = None;
        state.latest = TelemetrySnapshot::awaiting();
        state.params = Some(params.clone());

        let generation = state.generation;
        tracing::info!(
            "[{}] polling every {:?} (generation {})",
            this.feed,
            this.interval,
            generation
        );

        let shared = Arc::clone(this);
        state.ticker = Some(tokio::spawn(async move {
            shared.tick_loop(generation, params).await;
        }));
    }

    async fn tick_loop(self: Arc<Self>, generation: u64, params: P) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // First tick completes immediately
            ticker.tick().await;

            let Some(cycle) = self.issue_cycle(generation) else {
                break;
            };

            let shared = Arc::clone(&self);
            let params = params.clone();
            tokio::spawn(async move {
                shared.run_cycle(cycle, params).await;
            });
        }
    }

    fn issue_cycle(&self, generation: u64) -> Option<CycleId> {
        let mut state = self.state.lock();
        if state.status != PollerStatus::Polling || state.generation != generation {
            return None;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        Some(CycleId { generation, seq })
    }

    async fn run_cycle(&self, cycle: CycleId, params: P) {
        tracing::debug!("[{}] cycle {} issued", self.feed, cycle);

        let snapshot = match self.source.fetch(params).await {
            Ok(payload) => TelemetrySnapshot::success(cycle, payload),
            Err(e) => {
                tracing::warn!("[{}] cycle {} failed: {}", self.feed, cycle, e);
                TelemetrySnapshot::failure(cycle, e.kind())
            }
        };

        self.apply(cycle, snapshot);
    }

    fn apply(&self, cycle: CycleId, snapshot: TelemetrySnapshot<T>) -> bool {
        let mut state = self.state.lock();

        let live = state.status == PollerStatus::Polling && state.generation == cycle.generation;
        let newest = state.last_applied.is_none_or(|seq| cycle.seq > seq);
        if !(live && newest) {
            tracing::trace!("[{}] discarding stale cycle {}", self.feed, cycle);
            return false;
        }

        state.last_applied = Some(cycle.seq);
        state.latest = snapshot.clone();
        (self.on_update)(snapshot);
        true
    }
}

//! Keeps the view state in step with both telemetry feeds
//!
//! The observer feed follows the selected location and is restarted on every
//! selection change. The solar-system feed does not depend on the observer
//! and runs untouched from mount to unmount.

use parking_lot::Mutex;
use planet_common::{Feed, ObserverLocation, PlanetsResponse, SolarSystemResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::state::ViewState;
use crate::config::DashboardConfig;
use crate::telemetry::{poller, PollerHandle, TelemetrySource};

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub observer_interval: Duration,
    pub solar_system_interval: Duration,
    pub max_screen_radius_px: f64,
}

impl From<&DashboardConfig> for SyncSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            observer_interval: config.polling.observer_interval(),
            solar_system_interval: config.polling.solar_system_interval(),
            max_screen_radius_px: config.display.max_screen_radius_px,
        }
    }
}

/// A mounted dashboard. Both pollers stop when this is dropped.
pub struct ViewSynchronizer {
    state_tx: watch::Sender<ViewState>,
    observer: PollerHandle<ObserverLocation, PlanetsResponse>,
    solar_system: PollerHandle<(), SolarSystemResponse>,
    /// Serializes selections so the view location and polled location agree
    selection: Mutex<()>,
}

impl ViewSynchronizer {
    /// Start both feeds. Must be called from within a tokio runtime.
    pub fn mount(
        initial: ObserverLocation,
        settings: SyncSettings,
        observer_source: Arc<dyn TelemetrySource<ObserverLocation, PlanetsResponse>>,
        solar_system_source: Arc<dyn TelemetrySource<(), SolarSystemResponse>>,
    ) -> Self {
        tracing::info!("Mounting dashboard for {}", initial);

        let (state_tx, _) = watch::channel(ViewState::new(
            initial.clone(),
            settings.max_screen_radius_px,
        ));

        let tx = state_tx.clone();
        let solar_system = poller::start(
            Feed::SolarSystem,
            (),
            settings.solar_system_interval,
            solar_system_source,
            move |snapshot| tx.send_modify(|view| view.apply_solar_system(snapshot)),
        );

        let tx = state_tx.clone();
        let observer = poller::start(
            Feed::Observer,
            initial,
            settings.observer_interval,
            observer_source,
            move |snapshot| tx.send_modify(|view| view.apply_observer(snapshot)),
        );

        Self {
            state_tx,
            observer,
            solar_system,
            selection: Mutex::new(()),
        }
    }

    /// Replace the selected location and restart observer telemetry for it.
    ///
    /// Results still in flight for the previous location are discarded.
    pub fn select_location(&self, location: ObserverLocation) {
        let _selection = self.selection.lock();
        tracing::info!("Observer location changed to {}", location);

        // Stop first so no late result lands after the reset below
        self.observer.stop();
        self.state_tx
            .send_modify(|view| view.select_location(location.clone()));
        self.observer.restart(location);
    }

    pub fn current(&self) -> ViewState {
        self.state_tx.borrow().clone()
    }

    pub fn location(&self) -> ObserverLocation {
        self.state_tx.borrow().location().clone()
    }

    /// Location the observer poller is currently fetching for
    pub fn polled_location(&self) -> Option<ObserverLocation> {
        self.observer.params()
    }

    /// Notified on every applied snapshot and selection change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    pub fn updates(&self) -> WatchStream<ViewState> {
        WatchStream::new(self.subscribe())
    }

    /// Explicit unmount; dropping does the same
    pub fn unmount(self) {}
}

impl Drop for ViewSynchronizer {
    fn drop(&mut self) {
        self.observer.stop();
        self.solar_system.stop();
        tracing::info!("Dashboard unmounted, telemetry stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TelemetryError};
    use crate::testing::{inner_solar_system, planets_response, settle, GatedSource, StaticSource};
    use crate::view::state::{AWAITING_TEXT, LINK_LOST_TEXT};
    use futures::StreamExt;
    use std::sync::Barrier;
    use tokio::time::sleep;

    fn settings() -> SyncSettings {
        SyncSettings {
            observer_interval: Duration::from_secs(60),
            solar_system_interval: Duration::from_secs(300),
            max_screen_radius_px: 140.0,
        }
    }

    fn paris() -> ObserverLocation {
        ObserverLocation::new("Paris", 48.8566, 2.3522).unwrap()
    }

    fn cairo() -> ObserverLocation {
        ObserverLocation::new("Cairo", 30.0444, 31.2357).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_paris_scenario() {
        let (observer, mut requests) = GatedSource::<ObserverLocation, PlanetsResponse>::new();
        let sync = ViewSynchronizer::mount(
            paris(),
            settings(),
            observer,
            StaticSource::new(inner_solar_system("2026-10-17T21:00:00.000")),
        );

        let (location, reply) = requests.recv().await.unwrap();
        assert_eq!(location, paris());
        reply
            .send(Ok(planets_response("2026-10-17T21:00:00.000", 48.8566, 2.3522)))
            .unwrap();
        settle().await;

        let view = sync.current();
        assert_eq!(view.visible_count(), 2);
        let text = view.display_text();
        assert!(text.contains("2026-10-17T21:00:00.000"));
        assert!(text.contains("48.8566"));
        assert!(text.contains("2.3522"));

        let radii: Vec<f64> = view.projected_bodies().iter().map(|b| b.screen_radius_px).collect();
        assert_eq!(radii.len(), 3);
        assert!((radii[0] - 35.0).abs() < 1e-9);
        assert!((radii[2] - 105.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_scenario() {
        let (observer, mut requests) = GatedSource::<ObserverLocation, PlanetsResponse>::new();
        let sync = ViewSynchronizer::mount(
            paris(),
            settings(),
            observer,
            StaticSource::new(inner_solar_system("T0")),
        );

        let (_, reply) = requests.recv().await.unwrap();
        reply.send(Ok(planets_response("T1", 48.8566, 2.3522))).unwrap();
        settle().await;
        assert_eq!(sync.current().visible_count(), 2);

        // Next tick fails
        let (_, reply) = requests.recv().await.unwrap();
        reply
            .send(Err(TelemetryError::Network("connection reset".to_string())))
            .unwrap();
        settle().await;

        let view = sync.current();
        assert_eq!(view.observer().last_error, Some(ErrorKind::Network));
        assert_eq!(view.display_text(), LINK_LOST_TEXT);
        assert!(view.planets().is_empty());

        // And polling carries on
        let (location, _reply) = requests.recv().await.unwrap();
        assert_eq!(location, paris());
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_change_discards_pending_fetch() {
        let (observer, mut requests) = GatedSource::<ObserverLocation, PlanetsResponse>::new();
        let sync = ViewSynchronizer::mount(
            paris(),
            settings(),
            observer,
            StaticSource::new(inner_solar_system("T0")),
        );

        let (_, paris_reply) = requests.recv().await.unwrap();
        sync.select_location(cairo());
        let (location, cairo_reply) = requests.recv().await.unwrap();
        assert_eq!(location, cairo());

        paris_reply
            .send(Ok(planets_response("T-paris", 48.8566, 2.3522)))
            .unwrap();
        settle().await;

        let view = sync.current();
        assert_eq!(view.location().name, "Cairo");
        assert_eq!(view.display_text(), AWAITING_TEXT);

        cairo_reply
            .send(Ok(planets_response("T-cairo", 30.0444, 31.2357)))
            .unwrap();
        settle().await;
        let text = sync.current().display_text();
        assert!(text.contains("T-cairo"));
        assert!(text.contains("30.0444"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_change_leaves_solar_system_alone() {
        let (observer, _requests) = GatedSource::<ObserverLocation, PlanetsResponse>::new();
        let (solar, mut solar_requests) = GatedSource::<(), SolarSystemResponse>::new();
        let sync = ViewSynchronizer::mount(paris(), settings(), observer, solar);

        let (_, reply) = solar_requests.recv().await.unwrap();
        sync.select_location(cairo());
        reply.send(Ok(inner_solar_system("T-solar"))).unwrap();
        settle().await;

        assert_eq!(sync.current().solar_time_text(), "Ephemeris time: T-solar");
        assert!(solar_requests.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_selections_agree_with_poller() {
        let sync = Arc::new(ViewSynchronizer::mount(
            paris(),
            settings(),
            StaticSource::new(planets_response("T1", 48.8566, 2.3522)),
            StaticSource::new(inner_solar_system("T1")),
        ));
        let london = ObserverLocation::new("London", 51.5074, -0.1278).unwrap();

        for _ in 0..500 {
            let barrier = Arc::new(Barrier::new(2));
            let tasks: Vec<_> = [cairo(), london.clone()]
                .into_iter()
                .map(|location| {
                    let sync = Arc::clone(&sync);
                    let barrier = Arc::clone(&barrier);
                    tokio::task::spawn_blocking(move || {
                        barrier.wait();
                        sync.select_location(location);
                    })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            let polled = sync.polled_location().unwrap();
            assert_eq!(sync.location().name, polled.name);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let sync = ViewSynchronizer::mount(
            paris(),
            settings(),
            StaticSource::new(planets_response("T1", 48.8566, 2.3522)),
            StaticSource::new(inner_solar_system("T1")),
        );
        let mut updates = sync.updates();

        // WatchStream yields the current value first
        let first = updates.next().await.unwrap();
        assert_eq!(first.location().name, "Paris");

        sync.select_location(cairo());
        settle().await;
        let latest = updates.next().await.unwrap();
        assert_eq!(latest.location().name, "Cairo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_polling() {
        let (observer, mut requests) = GatedSource::<ObserverLocation, PlanetsResponse>::new();
        let sync = ViewSynchronizer::mount(
            paris(),
            settings(),
            observer,
            StaticSource::new(inner_solar_system("T0")),
        );
        let mut rx = sync.subscribe();

        let (_, reply) = requests.recv().await.unwrap();
        sync.unmount();

        reply.send(Ok(planets_response("T1", 48.8566, 2.3522))).unwrap();
        sleep(Duration::from_secs(600)).await;

        assert!(requests.try_recv().is_err());
        assert_eq!(rx.borrow_and_update().display_text(), AWAITING_TEXT);
    }
}

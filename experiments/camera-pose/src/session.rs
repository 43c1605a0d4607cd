use crate::config::{ConfigError, SessionConfig};
use crate::display::Display;
use crate::render::OverlayRenderer;
use crate::surface::Surface;
use deli_base::{Epoch, Stamped};
use deli_camera::{Camera, CameraConfig, CameraError};
use deli_image::Frame;
use deli_infer::{CapabilityConfig, EstimateOptions, InferError, Pose, PoseEstimator};
use futures_util::future::LocalBoxFuture;
use std::fmt;
use std::future::{Future, pending};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Session lifecycle. `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    AcquiringCamera,
    InitializingCapability,
    Running,
    Terminated,
}

#[derive(Debug)]
pub enum SessionError {
    Camera(CameraError),
    Capability(InferError),
    Config(ConfigError),
    /// Stopped before it reached `Running`.
    Cancelled,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Camera(err) => write!(f, "camera: {err}"),
            SessionError::Capability(err) => write!(f, "pose capability: {err}"),
            SessionError::Config(err) => write!(f, "config: {err}"),
            SessionError::Cancelled => write!(f, "session stopped during startup"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CameraError> for SessionError {
    fn from(err: CameraError) -> Self {
        SessionError::Camera(err)
    }
}

impl From<InferError> for SessionError {
    fn from(err: InferError) -> Self {
        SessionError::Capability(err)
    }
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        SessionError::Config(err)
    }
}

/// Shared view of a session: observe its state, or stop it.
///
/// Stopping advances the session epoch, so results of work submitted
/// before the stop are recognised as stale.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    state: Arc<watch::Sender<SessionState>>,
    epoch: Epoch,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            state: Arc::new(state),
            epoch: Epoch::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    /// Tear the session down. Idempotent.
    pub fn stop(&self) {
        if self.state() != SessionState::Terminated {
            self.epoch.advance();
        }
        self.transition(SessionState::Terminated);
    }

    /// Move to `next` unless already terminated. Returns whether the state changed.
    fn transition(&self, next: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Terminated || *state == next {
                return false;
            }
            log::debug!("session {:?} -> {:?}", state, next);
            *state = next;
            true
        })
    }
}

/// Loop counters, reported when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub submitted: u64,
    pub rendered: u64,
    /// Results that arrived after the session moved on.
    pub discarded: u64,
    pub failed: u64,
}

struct InFlight {
    frame: Stamped<Frame>,
    result: LocalBoxFuture<'static, Result<Pose, InferError>>,
}

/// A running capture, inference and render loop.
///
/// Owns the camera, the estimator, the display and the surface it draws on.
pub struct PoseSession<C, E, D> {
    camera: C,
    estimator: E,
    display: D,
    renderer: OverlayRenderer,
    surface: Surface,
    handle: SessionHandle,
    options: EstimateOptions,
    refresh: Duration,
    camera_faulted: bool,
}

impl<C: Camera, E: PoseEstimator, D: Display> PoseSession<C, E, D> {
    /// Acquire the camera, then load the pose capability.
    ///
    /// On failure the handle ends in `Terminated` and nothing is retried.
    pub async fn launch<OC, LC, F>(
        config: &SessionConfig,
        handle: SessionHandle,
        open_camera: OC,
        load_capability: LC,
        display: D,
    ) -> Result<Self, SessionError>
    where
        OC: FnOnce(CameraConfig) -> Result<C, CameraError>,
        LC: FnOnce(CapabilityConfig) -> F,
        F: Future<Output = Result<E, InferError>>,
    {
        if !handle.transition(SessionState::AcquiringCamera) {
            return startup_failed(&handle, SessionError::Cancelled);
        }
        let mut camera = match open_camera(config.camera().clone()) {
            Ok(camera) => camera,
            Err(e) => return startup_failed(&handle, e.into()),
        };
        if let Err(e) = camera.start() {
            return startup_failed(&handle, e.into());
        }

        if !handle.transition(SessionState::InitializingCapability) {
            return startup_failed(&handle, SessionError::Cancelled);
        }
        let estimator = match load_capability(config.capability().clone()).await {
            Ok(estimator) => estimator,
            Err(e) => return startup_failed(&handle, e.into()),
        };

        if !handle.transition(SessionState::Running) {
            return startup_failed(&handle, SessionError::Cancelled);
        }
        log::info!("session running at {} Hz", config.refresh_hz());

        Ok(Self {
            camera,
            estimator,
            display,
            renderer: OverlayRenderer::new(config.render().clone()),
            surface: Surface::default(),
            handle,
            options: EstimateOptions {
                mirror_horizontally: config.mirror(),
            },
            refresh: config.refresh_interval(),
            camera_faulted: false,
        })
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Run until the handle is stopped or the display closes.
    ///
    /// Ticks follow the refresh interval and never wait for inference. At most
    /// one estimate is in flight. After a render the next estimate starts right
    /// away; after a failure the next tick starts it. A fatal camera error ends
    /// the session.
    pub async fn run(mut self) -> SessionStats {
        let mut stats = SessionStats::default();
        let mut state = self.handle.subscribe();
        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut inflight: Option<InFlight> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.handle.is_running() {
                        break;
                    }
                    stats.ticks += 1;

                    self.display.pump();
                    if !self.display.is_open() {
                        log::info!("display closed");
                        break;
                    }

                    if inflight.is_none() {
                        inflight = self.submit(&mut stats);
                    }
                }
                result = next_result(&mut inflight) => {
                    let rendered = match inflight.take() {
                        Some(job) => self.complete(job.frame, result, &mut stats),
                        None => false,
                    };
                    if rendered && self.handle.is_running() {
                        inflight = self.submit(&mut stats);
                    }
                }
                changed = state.changed() => {
                    if changed.is_err() || !self.handle.is_running() {
                        break;
                    }
                }
            }
        }

        // a pending estimate is dropped here; its result never reaches the display
        if inflight.take().is_some() {
            stats.discarded += 1;
        }
        self.handle.stop();
        log::info!(
            "session ended: {} ticks, {} submitted, {} rendered, {} discarded, {} failed",
            stats.ticks,
            stats.submitted,
            stats.rendered,
            stats.discarded,
            stats.failed
        );
        stats
    }

    fn submit(&mut self, stats: &mut SessionStats) -> Option<InFlight> {
        let frame = match self.camera.current() {
            Ok(frame) => {
                if self.camera_faulted {
                    log::info!("camera stream recovered");
                    self.camera_faulted = false;
                }
                frame
            }
            Err(e) if e.is_fatal() => {
                log::error!("camera lost: {}", e);
                self.handle.stop();
                return None;
            }
            Err(e) => {
                if !self.camera_faulted {
                    log::warn!("camera stream error: {}", e);
                    self.camera_faulted = true;
                }
                return None;
            }
        };

        if !frame.is_valid() {
            return None;
        }

        stats.submitted += 1;
        let stamped = self.handle.epoch().stamp(frame.clone());
        Some(InFlight {
            frame: stamped,
            result: self.estimator.estimate(frame, self.options),
        })
    }

    /// Render a finished estimate. Returns whether a frame was rendered.
    fn complete(
        &mut self,
        frame: Stamped<Frame>,
        result: Result<Pose, InferError>,
        stats: &mut SessionStats,
    ) -> bool {
        let Some(frame) = self.handle.epoch().accept(frame) else {
            log::debug!("discarding stale inference result");
            stats.discarded += 1;
            return false;
        };

        match result {
            Ok(pose) => {
                self.renderer.render(&mut self.surface, &frame, &pose);
                if let Err(e) = self.display.present(&self.surface) {
                    log::warn!("{}", e);
                }
                stats.rendered += 1;
                true
            }
            Err(e) => {
                log::warn!("inference failed: {}", e);
                stats.failed += 1;
                false
            }
        }
    }
}

fn startup_failed<T>(handle: &SessionHandle, err: SessionError) -> Result<T, SessionError> {
    log::error!("session startup failed: {}", err);
    handle.stop();
    Err(err)
}

async fn next_result(inflight: &mut Option<InFlight>) -> Result<Pose, InferError> {
    match inflight.as_mut() {
        Some(job) => (&mut job.result).await,
        None => pending().await,
    }
}

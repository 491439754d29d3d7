//! Streaming media preview session lifecycle.
//!
//! The actual playback machinery is a platform service: consumers inject it
//! by implementing [`MediaBackend`]. The core defines *what* happens around
//! it — asynchronous initialization, readiness detection, and guaranteed
//! teardown on every exit path (success, failure, or early close).

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::MediaError;

/// Fallback display aspect ratio when the stream does not report one.
pub const FALLBACK_ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Lifecycle state of a playback session.
///
/// `Ready` and `Failed` are terminal; both may still be torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Initializing,
    Ready,
    Failed,
}

/// Playback flags passed to the backend when opening a stream.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackOptions {
    pub autoplay: bool,
    pub looping: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            looping: false,
        }
    }
}

/// Platform playback service opening network media sources.
#[async_trait::async_trait]
pub trait MediaBackend: Send + Sync {
    /// Open the media source at `url` and prepare it for playback.
    async fn open(
        &self,
        url: &str,
        options: PlaybackOptions,
    ) -> Result<Box<dyn MediaHandle>, MediaError>;
}

/// Control surface of an opened stream.
///
/// `release` must not panic; the session guarantees it is called exactly
/// once, in whatever state the handle is in.
pub trait MediaHandle: Send {
    /// The stream's reported aspect ratio; zero or negative when unknown.
    fn aspect_ratio(&self) -> f64;

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position_secs: f64);

    /// Release the underlying media resources.
    fn release(&mut self);
}

enum HandleSlot {
    /// Initialization has not produced a handle yet.
    Pending,
    Open(Box<dyn MediaHandle>),
    /// The session was closed; any late-arriving handle is released on sight.
    Closed,
}

struct Shared {
    slot: Mutex<HandleSlot>,
    state_tx: watch::Sender<MediaState>,
}

impl Shared {
    // Teardown must never panic, so a poisoned lock is recovered rather
    // than propagated.
    fn lock_slot(&self) -> MutexGuard<'_, HandleSlot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One streaming playback session for one source URL.
///
/// Opening spawns initialization on the runtime; the state is observable
/// through [`state`](MediaSession::state) / [`subscribe`](MediaSession::subscribe).
/// Closing (or dropping) releases the underlying resources exactly once in
/// any state. A close racing with initialization wins: the session never
/// becomes `Ready` afterwards and the late handle is still released.
pub struct MediaSession {
    source_url: String,
    shared: Arc<Shared>,
    state_rx: watch::Receiver<MediaState>,
}

impl MediaSession {
    /// Open a session with default playback flags (autoplay, no loop).
    pub fn open(backend: Arc<dyn MediaBackend>, source_url: String) -> Self {
        Self::open_with(backend, source_url, PlaybackOptions::default())
    }

    /// Open a session with explicit playback flags.
    pub fn open_with(
        backend: Arc<dyn MediaBackend>,
        source_url: String,
        options: PlaybackOptions,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(MediaState::Initializing);
        let shared = Arc::new(Shared {
            slot: Mutex::new(HandleSlot::Pending),
            state_tx,
        });

        let task_shared = Arc::clone(&shared);
        let url = source_url.clone();
        tokio::spawn(async move {
            match backend.open(&url, options).await {
                Ok(mut handle) => {
                    let mut slot = task_shared.lock_slot();
                    if matches!(*slot, HandleSlot::Closed) {
                        debug!(%url, "session closed before stream became ready");
                        handle.release();
                    } else {
                        *slot = HandleSlot::Open(handle);
                        let _ = task_shared.state_tx.send(MediaState::Ready);
                    }
                }
                Err(e) => {
                    // Diagnostic only; the renderer shows a neutral error
                    // state without a message.
                    warn!(%url, error = %e, "media preview failed to open");
                    let _ = task_shared.state_tx.send(MediaState::Failed);
                }
            }
        });

        Self {
            source_url,
            shared,
            state_rx,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MediaState {
        *self.state_rx.borrow()
    }

    /// Watch receiver for readiness detection (`changed().await`).
    pub fn subscribe(&self) -> watch::Receiver<MediaState> {
        self.state_rx.clone()
    }

    /// Aspect ratio to display: the stream's reported ratio when positive,
    /// else 16:9.
    pub fn display_aspect_ratio(&self) -> f64 {
        let mut slot = self.shared.lock_slot();
        let reported = match &mut *slot {
            HandleSlot::Open(handle) => handle.aspect_ratio(),
            _ => 0.0,
        };
        if reported > 0.0 {
            reported
        } else {
            FALLBACK_ASPECT_RATIO
        }
    }

    /// Resume playback; no-op unless the stream is ready.
    pub fn play(&self) {
        if let HandleSlot::Open(handle) = &mut *self.shared.lock_slot() {
            handle.play();
        }
    }

    /// Pause playback; no-op unless the stream is ready.
    pub fn pause(&self) {
        if let HandleSlot::Open(handle) = &mut *self.shared.lock_slot() {
            handle.pause();
        }
    }

    /// Seek to a position in seconds; no-op unless the stream is ready.
    pub fn seek(&self, position_secs: f64) {
        if let HandleSlot::Open(handle) = &mut *self.shared.lock_slot() {
            handle.seek(position_secs);
        }
    }

    /// Tear the session down, releasing the stream exactly once.
    ///
    /// Safe in every state and idempotent; also runs on drop. If
    /// initialization is still in flight it finds the slot closed when it
    /// completes and releases its handle itself.
    pub fn close(&mut self) {
        let mut slot = self.shared.lock_slot();
        match std::mem::replace(&mut *slot, HandleSlot::Closed) {
            HandleSlot::Open(mut handle) => {
                debug!(url = %self.source_url, "releasing media session");
                handle.release();
            }
            HandleSlot::Pending | HandleSlot::Closed => {}
        }
    }
}

impl Drop for MediaSession {
    fn drop(&mut self) {
        self.close();
    }
}

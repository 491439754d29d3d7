//! Media backend for the terminal: probes the stream instead of playing it.
//!
//! The engine's media session expects a platform playback service. A
//! terminal has none, so this backend validates that the source URL is
//! reachable and serves bytes, and the "playback controls" only log.

use shelf_core::errors::MediaError;
use shelf_core::preview::media::{MediaBackend, MediaHandle, PlaybackOptions};
use tracing::debug;

pub struct ProbeMediaBackend {
    http: reqwest::Client,
}

impl ProbeMediaBackend {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl MediaBackend for ProbeMediaBackend {
    async fn open(
        &self,
        url: &str,
        options: PlaybackOptions,
    ) -> Result<Box<dyn MediaHandle>, MediaError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::InitFailed(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MediaError::InitFailed(format!("status {}", status)));
        }
        Ok(Box::new(ProbeHandle {
            url: url.to_string(),
            playing: options.autoplay,
        }))
    }
}

struct ProbeHandle {
    url: String,
    playing: bool,
}

impl MediaHandle for ProbeHandle {
    fn aspect_ratio(&self) -> f64 {
        // A probe cannot decode the stream, so the session falls back to 16:9.
        0.0
    }

    fn play(&mut self) {
        self.playing = true;
        debug!(url = %self.url, "play");
    }

    fn pause(&mut self) {
        self.playing = false;
        debug!(url = %self.url, "pause");
    }

    fn seek(&mut self, position_secs: f64) {
        debug!(url = %self.url, position_secs, "seek");
    }

    fn release(&mut self) {
        debug!(url = %self.url, "released media probe");
    }
}

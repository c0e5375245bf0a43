//! Load/error signal for third-party player embeds.
//!
//! A native window cannot host the iframe, so "did the embed render" is
//! answered by fetching the embed URL in the background. The result comes
//! back over a channel that the event loop polls once per frame, the same
//! way the embed's load/error callbacks would arrive in a browser.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::player::{EmbedKind, PlayerEvent};

/// Outcome of one load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub attempt: u64,
    pub embed: EmbedKind,
    pub outcome: Result<(), String>,
}

impl ProbeResult {
    /// The player event this result maps to.
    pub fn event(&self) -> PlayerEvent {
        match self.outcome {
            Ok(()) => PlayerEvent::EmbedLoaded { attempt: self.attempt },
            Err(_) => PlayerEvent::EmbedFailed { attempt: self.attempt },
        }
    }
}

/// Something that can tell whether an embed loaded.
pub trait EmbedProbe {
    /// Begin loading `url` for `attempt`. Must not block.
    fn start(&mut self, attempt: u64, embed: EmbedKind, url: &str);

    /// Next finished result, if any.
    fn poll(&mut self) -> Option<ProbeResult>;
}

// ---------------------------------------------------------------------------
// HTTP probe
// ---------------------------------------------------------------------------

/// Fetches the embed URL on a tokio runtime.
pub struct HttpProbe {
    client: reqwest::Client,
    rt_handle: tokio::runtime::Handle,
    result_tx: SyncSender<ProbeResult>,
    result_rx: Receiver<ProbeResult>,
}

impl HttpProbe {
    pub fn new(rt_handle: tokio::runtime::Handle, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("band-terminal/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (result_tx, result_rx) = mpsc::sync_channel(8);
        Ok(Self {
            client,
            rt_handle,
            result_tx,
            result_rx,
        })
    }
}

impl EmbedProbe for HttpProbe {
    fn start(&mut self, attempt: u64, embed: EmbedKind, url: &str) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let url = url.to_string();

        self.rt_handle.spawn(async move {
            debug!(target: "embed", attempt, %url, "Probing embed");
            let outcome = match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => Ok(()),
                Ok(resp) => Err(format!("HTTP {}", resp.status())),
                Err(e) if e.is_timeout() => Err("timed out".to_string()),
                Err(e) => Err(e.to_string()),
            };
            if let Err(reason) = &outcome {
                warn!(target: "embed", attempt, embed = embed.label(), "Embed probe failed: {}", reason);
            }
            let _ = tx.send(ProbeResult {
                attempt,
                embed,
                outcome,
            });
        });
    }

    fn poll(&mut self) -> Option<ProbeResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted probe
// ---------------------------------------------------------------------------

/// Probe driven by hand: records requests and releases whatever results
/// are pushed into it. Used by tests and `--offline`.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    /// Requests seen so far: (attempt, embed, url).
    pub started: Vec<(u64, EmbedKind, String)>,
    results: VecDeque<ProbeResult>,
    /// When set, every request immediately fails with this reason.
    fail_all: Option<String>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe that reports every embed as unreachable.
    pub fn offline() -> Self {
        Self {
            fail_all: Some("offline".to_string()),
            ..Self::default()
        }
    }

    /// Queue a result for the most recent request.
    pub fn resolve_latest(&mut self, outcome: Result<(), String>) {
        if let Some((attempt, embed, _)) = self.started.last() {
            self.results.push_back(ProbeResult {
                attempt: *attempt,
                embed: *embed,
                outcome,
            });
        }
    }
}

impl EmbedProbe for ScriptedProbe {
    fn start(&mut self, attempt: u64, embed: EmbedKind, url: &str) {
        self.started.push((attempt, embed, url.to_string()));
        if let Some(reason) = &self.fail_all {
            self.results.push_back(ProbeResult {
                attempt,
                embed,
                outcome: Err(reason.clone()),
            });
        }
    }

    fn poll(&mut self) -> Option<ProbeResult> {
        self.results.pop_front()
    }
}

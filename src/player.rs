//! Embedded-player state machine.
//!
//! ```text
//! Unloaded ──Load──▶ Loaded { embed } ◀──Retry── Failed { embed }
//!                        │  ▲                        ▲
//!                        │  └──────Load(other)───────┤
//!                        └──────EmbedFailed──────────┘
//! ```
//!
//! Every entry into `Loaded` starts a new load attempt. Load/failure signals
//! carry the attempt they belong to, and signals from superseded attempts are
//! dropped.

use statig::prelude::*;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Embeds
// ---------------------------------------------------------------------------

/// Which third-party player to embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedKind {
    SoundCloud,
    Bandcamp,
}

impl EmbedKind {
    pub fn label(self) -> &'static str {
        match self {
            EmbedKind::SoundCloud => "SoundCloud",
            EmbedKind::Bandcamp => "Bandcamp",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events dispatched to the player state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A "load player" command selected an embed.
    Load(EmbedKind),
    /// The embed for `attempt` rendered.
    EmbedLoaded { attempt: u64 },
    /// The embed for `attempt` failed to render.
    EmbedFailed { attempt: u64 },
    /// User asked to reload a failed embed.
    Retry,
}

// ---------------------------------------------------------------------------
// Shared storage
// ---------------------------------------------------------------------------

/// Shared storage for the player state machine.
#[derive(Debug, Default)]
pub struct PlayerMachine {
    /// Id of the current load attempt; bumped on every entry into `Loaded`.
    pub attempt: u64,
    /// The current attempt reported success.
    pub ready: bool,
}

impl PlayerMachine {
    fn begin_attempt(&mut self, embed: EmbedKind) {
        self.attempt += 1;
        self.ready = false;
        info!(target: "player", attempt = self.attempt, embed = embed.label(), "Loading embed");
    }

    fn is_current(&self, attempt: u64) -> bool {
        if attempt != self.attempt {
            debug!(target: "player", attempt, current = self.attempt, "Ignoring stale embed signal");
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// State machine implementation
// ---------------------------------------------------------------------------

#[state_machine(
    initial = "State::unloaded()",
    state(derive(Debug, Clone, PartialEq))
)]
impl PlayerMachine {
    /// Nothing selected yet.
    #[state]
    fn unloaded(&mut self, event: &PlayerEvent) -> Outcome<State> {
        match event {
            PlayerEvent::Load(embed) => {
                self.begin_attempt(*embed);
                Transition(State::loaded(*embed))
            }
            _ => Handled,
        }
    }

    /// Embed selected and rendering (or rendered, once `ready`).
    #[state]
    fn loaded(&mut self, event: &PlayerEvent, embed: &EmbedKind) -> Outcome<State> {
        match event {
            PlayerEvent::Load(next) => {
                self.begin_attempt(*next);
                Transition(State::loaded(*next))
            }
            PlayerEvent::EmbedLoaded { attempt } => {
                if self.is_current(*attempt) {
                    self.ready = true;
                    info!(target: "player", embed = embed.label(), "Embed ready");
                }
                Handled
            }
            PlayerEvent::EmbedFailed { attempt } => {
                if self.is_current(*attempt) {
                    warn!(target: "player", embed = embed.label(), "Embed failed to load");
                    Transition(State::failed(*embed))
                } else {
                    Handled
                }
            }
            PlayerEvent::Retry => Handled,
        }
    }

    /// Embed failed; the view shows a direct link and a retry control.
    #[state]
    fn failed(&mut self, event: &PlayerEvent, embed: &EmbedKind) -> Outcome<State> {
        match event {
            PlayerEvent::Retry => {
                self.begin_attempt(*embed);
                Transition(State::loaded(*embed))
            }
            PlayerEvent::Load(next) => {
                self.begin_attempt(*next);
                Transition(State::loaded(*next))
            }
            PlayerEvent::EmbedLoaded { .. } | PlayerEvent::EmbedFailed { .. } => Handled,
        }
    }
}

// ---------------------------------------------------------------------------
// UI snapshot
// ---------------------------------------------------------------------------

/// Render-facing view of the machine's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Unloaded,
    Loaded { embed: EmbedKind, ready: bool },
    Failed { embed: EmbedKind },
}

impl PlayerStatus {
    pub fn embed(self) -> Option<EmbedKind> {
        match self {
            PlayerStatus::Unloaded => None,
            PlayerStatus::Loaded { embed, .. } | PlayerStatus::Failed { embed } => Some(embed),
        }
    }

    pub fn is_failed(self) -> bool {
        matches!(self, PlayerStatus::Failed { .. })
    }
}

/// Owns the running statig machine.
pub struct Player {
    machine: StateMachine<PlayerMachine>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            machine: PlayerMachine::default().state_machine(),
        }
    }

    pub fn handle(&mut self, event: PlayerEvent) {
        self.machine.handle(&event);
    }

    /// Id of the current load attempt.
    pub fn attempt(&self) -> u64 {
        self.machine.inner().attempt
    }

    pub fn status(&self) -> PlayerStatus {
        match self.machine.state() {
            State::Unloaded {} => PlayerStatus::Unloaded,
            State::Loaded { embed } => PlayerStatus::Loaded {
                embed: *embed,
                ready: self.machine.inner().ready,
            },
            State::Failed { embed } => PlayerStatus::Failed { embed: *embed },
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

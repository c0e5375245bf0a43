//! Terminal view state: input line, history, scrollback, active view, player.
//!
//! All mutation happens on the UI thread through discrete events: key
//! presses, clicks, and the once-per-frame [`Terminal::poll`]. Time is passed
//! in explicitly so command latency stays deterministic under test.

use std::time::Instant;

use tracing::{debug, info, warn};
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::commands::{self, Action};
use crate::config::{LinkKind, SiteConfig};
use crate::embed::{EmbedProbe, ProbeResult};
use crate::history::{CommandHistory, Recall};
use crate::opener::Opener;
use crate::output::{OutputKind, OutputLine, OutputLog, Pending, PendingQueue};
use crate::player::{EmbedKind, Player, PlayerEvent, PlayerStatus};
use crate::shortcuts::Shortcut;
use crate::view::View;

/// Prefix of every echoed command, independent of the input line's prompt.
pub const ECHO_PREFIX: &str = "$ ";

pub struct Terminal {
    config: SiteConfig,
    view: View,
    input: String,
    history: CommandHistory,
    output: OutputLog,
    pending: PendingQueue,
    player: Player,
    opener: Box<dyn Opener>,
    probe: Box<dyn EmbedProbe>,
    focused: bool,
    /// Lines scrolled back from the bottom; 0 keeps the newest line visible.
    scroll_back: usize,
}

// ---------------------------------------------------------------------------
// Construction and accessors
// ---------------------------------------------------------------------------

impl Terminal {
    pub fn new(config: SiteConfig, opener: Box<dyn Opener>, probe: Box<dyn EmbedProbe>) -> Self {
        Self {
            config,
            view: View::default(),
            input: String::new(),
            history: CommandHistory::new(),
            output: OutputLog::new(),
            pending: PendingQueue::new(),
            player: Player::new(),
            opener,
            probe,
            focused: true,
            scroll_back: 0,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn output(&self) -> &[OutputLine] {
        self.output.lines()
    }

    pub fn player_status(&self) -> PlayerStatus {
        self.player.status()
    }

    /// Direct link to the failed embed's content, shown instead of the player.
    pub fn fallback_link(&self) -> Option<&str> {
        match self.player.status() {
            PlayerStatus::Failed { embed } => Some(self.config.link_url(LinkKind::from(embed))),
            _ => None,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    /// True while queued effects are still waiting for their due instant.
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Command interpreter
// ---------------------------------------------------------------------------

impl Terminal {
    /// Submit a raw command line.
    ///
    /// Empty or whitespace-only input does nothing. Otherwise the command is
    /// recorded, its echo is queued, and its execution is queued `latency`
    /// behind the echo. `clear` queues only the clear itself.
    pub fn submit(&mut self, raw: &str, now: Instant) {
        let command = raw.trim();
        if command.is_empty() {
            return;
        }
        self.history.push(command.to_string());

        let latency = self.config.latency();
        if matches!(commands::lookup(command), Some(spec) if spec.action == Action::Clear) {
            self.pending.schedule(Pending::Clear, now, std::time::Duration::ZERO);
            return;
        }
        self.pending
            .schedule(Pending::Echo(command.to_string()), now, std::time::Duration::ZERO);
        self.pending
            .schedule(Pending::Execute(command.to_string()), now, latency);
    }

    /// Submit the input buffer and empty it.
    pub fn submit_input(&mut self, now: Instant) {
        let line = std::mem::take(&mut self.input);
        self.submit(&line, now);
    }

    /// Apply every queued effect due at `now` and every finished embed probe.
    ///
    /// Call once per frame. Returns true if anything changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some(effect) = self.pending.pop_due(now) {
            self.apply(effect);
            changed = true;
        }
        while let Some(result) = self.probe.poll() {
            self.apply_probe_result(result);
            changed = true;
        }
        changed
    }

    /// Apply every queued effect immediately, in order.
    pub fn flush(&mut self) {
        while let Some(effect) = self.pending.pop_front() {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Pending) {
        match effect {
            Pending::Echo(command) => self.push(format!("{ECHO_PREFIX}{command}"), OutputKind::Echo),
            Pending::Execute(command) => self.execute(&command),
            Pending::Clear => self.clear_output(),
        }
    }

    fn execute(&mut self, command: &str) {
        let Some(spec) = commands::lookup(command) else {
            debug!(target: "terminal", "Unknown command: {}", command);
            self.push(commands::not_found_line(command), OutputKind::Error);
            return;
        };

        match spec.action {
            Action::Help => {
                let mut lines = commands::help_lines().into_iter();
                if let Some(title) = lines.next() {
                    self.push(title, OutputKind::Info);
                }
                for line in lines {
                    self.push(line, OutputKind::Value);
                }
            }
            Action::Clear => self.clear_output(),
            Action::Show(view) => self.show(view),
            Action::Open(link) => {
                let url = self.config.link_url(link).to_string();
                self.push(format!("opening {}...", link.label()), OutputKind::Info);
                self.open_url(&url);
            }
            Action::Email => {
                let uri = self.config.mailto();
                self.push(format!("writing to {}...", self.config.links.email), OutputKind::Info);
                if let Err(e) = self.opener.compose_mail(&uri) {
                    warn!(target: "terminal", "Mail client failed: {e:#}");
                    self.push(format!("could not open mail client: {e}"), OutputKind::Error);
                }
            }
            Action::Play(embed) => {
                self.push(format!("loading {} player...", embed.label()), OutputKind::Info);
                self.load_player(embed);
            }
            Action::Retry => {
                if !self.retry_player() {
                    self.push("nothing to retry", OutputKind::Info);
                }
            }
        }
    }

    fn push(&mut self, text: impl Into<String>, kind: OutputKind) {
        self.output.push(OutputLine::new(text, kind));
        self.scroll_back = 0;
    }

    fn show(&mut self, view: View) {
        if self.view != view {
            info!(target: "terminal", "View {} -> {}", self.view.label(), view.label());
        }
        self.view = view;
    }

    fn open_url(&mut self, url: &str) {
        if let Err(e) = self.opener.open_url(url) {
            warn!(target: "terminal", "Could not open {}: {e:#}", url);
            self.push(format!("could not open {url}: {e}"), OutputKind::Error);
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

impl Terminal {
    /// Select `embed`, show the player view and start loading it.
    pub fn load_player(&mut self, embed: EmbedKind) {
        self.drive_player(PlayerEvent::Load(embed));
        self.show(View::PLAYER);
    }

    /// Reload a failed embed. Returns false if the player was not failed.
    pub fn retry_player(&mut self) -> bool {
        match self.player.status() {
            PlayerStatus::Failed { embed } => {
                self.push(format!("retrying {} player...", embed.label()), OutputKind::Info);
                self.drive_player(PlayerEvent::Retry);
                true
            }
            _ => false,
        }
    }

    /// Open the failed embed's content directly.
    pub fn open_fallback(&mut self) {
        if let Some(url) = self.fallback_link().map(str::to_string) {
            self.open_url(&url);
        }
    }

    /// Feed an embed load/error signal into the player.
    pub fn apply_probe_result(&mut self, result: ProbeResult) {
        self.player.handle(result.event());
    }

    /// Send `event` and start a probe if it began a new load attempt.
    fn drive_player(&mut self, event: PlayerEvent) {
        let before = self.player.attempt();
        self.player.handle(event);
        let attempt = self.player.attempt();
        if attempt == before {
            return;
        }
        if let Some(embed) = self.player.status().embed() {
            let url = self.config.embed_url(embed).to_string();
            self.probe.start(attempt, embed, &url);
        }
    }
}

// ---------------------------------------------------------------------------
// History, shortcuts and line editing
// ---------------------------------------------------------------------------

impl Terminal {
    pub fn recall_previous(&mut self) {
        if let Some(entry) = self.history.recall_previous() {
            self.input = entry.to_string();
        }
    }

    pub fn recall_next(&mut self) {
        match self.history.recall_next() {
            Recall::Idle => {}
            Recall::Entry(entry) => self.input = entry.to_string(),
            Recall::Exited => self.input.clear(),
        }
    }

    /// Drop the uncommitted input and stop browsing history.
    pub fn cancel(&mut self) {
        self.input.clear();
        self.history.reset_cursor();
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
        self.scroll_back = 0;
    }

    pub fn advance_view(&mut self) {
        self.show(self.view.next());
    }

    pub fn apply_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::AdvanceView => self.advance_view(),
            Shortcut::Cancel => self.cancel(),
            Shortcut::ClearOutput => self.clear_output(),
        }
    }

    /// Insert pasted text at the end of the input line. Only the first line
    /// is kept.
    pub fn paste(&mut self, text: &str) {
        if let Some(line) = text.lines().next() {
            self.input.push_str(line);
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.output.len();
        self.scroll_back = (self.scroll_back + lines).min(max);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Handle a key press that no shortcut consumed. Ignored unless the input
    /// line has focus.
    pub fn handle_key(&mut self, key: &Key, modifiers: ModifiersState, now: Instant) {
        if !self.focused {
            return;
        }
        let ctrl = modifiers.control_key() || modifiers.super_key();
        match key {
            Key::Named(NamedKey::Enter) => self.submit_input(now),
            Key::Named(NamedKey::ArrowUp) => self.recall_previous(),
            Key::Named(NamedKey::ArrowDown) => self.recall_next(),
            Key::Named(NamedKey::PageUp) => self.scroll_up(10),
            Key::Named(NamedKey::PageDown) => self.scroll_down(10),
            Key::Named(NamedKey::Backspace) => {
                if ctrl || modifiers.alt_key() {
                    let trimmed = self.input.trim_end();
                    match trimmed.rfind(' ') {
                        Some(pos) => self.input.truncate(pos + 1),
                        None => self.input.clear(),
                    }
                } else {
                    self.input.pop();
                }
            }
            Key::Named(NamedKey::Space) if !ctrl => self.input.push(' '),
            Key::Character(c) if !ctrl => self.input.push_str(c.as_str()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::ScriptedProbe;
    use crate::opener::{Opened, RecordingOpener};

    fn terminal() -> (Terminal, RecordingOpener) {
        let mut config = SiteConfig::default();
        config.terminal.latency_ms = 0;
        let opener = RecordingOpener::new();
        let t = Terminal::new(config, Box::new(opener.clone()), Box::new(ScriptedProbe::new()));
        (t, opener)
    }

    fn texts(t: &Terminal) -> Vec<&str> {
        t.output().iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn whitespace_input_is_ignored() {
        let (mut t, _) = terminal();
        t.submit("   ", Instant::now());
        t.flush();
        assert!(t.history().is_empty());
        assert!(t.output().is_empty());
        assert!(!t.is_busy());
    }

    #[test]
    fn submit_trims_and_echoes() {
        let (mut t, _) = terminal();
        t.submit("  about  ", Instant::now());
        t.flush();
        assert_eq!(t.history().entries(), ["about"]);
        assert_eq!(texts(&t), ["$ about"]);
        assert_eq!(t.view(), View::About);
    }

    #[test]
    fn echo_ignores_custom_prompt() {
        let mut config = SiteConfig::default();
        config.terminal.latency_ms = 0;
        config.terminal.prompt = "> ".into();
        let mut t = Terminal::new(config, Box::new(RecordingOpener::new()), Box::new(ScriptedProbe::new()));
        t.submit("gigs", Instant::now());
        t.flush();
        assert_eq!(texts(&t), ["$ gigs"]);
    }

    #[test]
    fn clear_leaves_no_echo() {
        let (mut t, _) = terminal();
        t.submit("help", Instant::now());
        t.submit("clear", Instant::now());
        t.flush();
        assert!(t.output().is_empty());
        assert_eq!(t.history().entries(), ["help", "clear"]);
    }

    #[test]
    fn output_waits_for_latency() {
        let mut config = SiteConfig::default();
        config.terminal.latency_ms = 100;
        let mut t = Terminal::new(
            config,
            Box::new(RecordingOpener::new()),
            Box::new(ScriptedProbe::new()),
        );
        let t0 = Instant::now();
        t.submit("nope", t0);
        t.poll(t0);
        assert_eq!(texts(&t), ["$ nope"]);
        t.poll(t0 + std::time::Duration::from_millis(99));
        assert_eq!(t.output().len(), 1);
        t.poll(t0 + std::time::Duration::from_millis(100));
        assert_eq!(t.output().len(), 2);
        assert_eq!(t.output()[1].kind, OutputKind::Error);
    }

    #[test]
    fn open_link_goes_through_opener() {
        let (mut t, opener) = terminal();
        t.submit("i", Instant::now());
        t.submit("e", Instant::now());
        t.flush();
        assert_eq!(
            opener.opened(),
            vec![
                Opened::Url(SiteConfig::default().links.instagram),
                Opened::Mail("mailto:hello@lowlight.band".into()),
            ]
        );
        assert_eq!(t.view(), View::Main);
    }

    #[test]
    fn retry_without_failure_is_a_note() {
        let (mut t, _) = terminal();
        t.submit("retry", Instant::now());
        t.flush();
        assert_eq!(texts(&t), ["$ retry", "nothing to retry"]);
        assert_eq!(t.player_status(), PlayerStatus::Unloaded);
    }

    #[test]
    fn history_keys_fill_input() {
        let (mut t, _) = terminal();
        let now = Instant::now();
        t.submit("help", now);
        t.submit("gigs", now);
        t.handle_key(&Key::Named(NamedKey::ArrowUp), ModifiersState::empty(), now);
        assert_eq!(t.input(), "gigs");
        t.handle_key(&Key::Named(NamedKey::ArrowUp), ModifiersState::empty(), now);
        assert_eq!(t.input(), "help");
        t.cancel();
        assert_eq!(t.input(), "");
        assert_eq!(t.history().cursor(), None);
    }

    #[test]
    fn typing_and_enter_submit() {
        let (mut t, _) = terminal();
        let now = Instant::now();
        for c in ["g", "i", "g", "s"] {
            t.handle_key(&Key::Character(c.into()), ModifiersState::empty(), now);
        }
        t.handle_key(&Key::Named(NamedKey::Backspace), ModifiersState::empty(), now);
        t.handle_key(&Key::Character("s".into()), ModifiersState::empty(), now);
        t.handle_key(&Key::Named(NamedKey::Enter), ModifiersState::empty(), now);
        t.flush();
        assert_eq!(t.input(), "");
        assert_eq!(t.view(), View::Gigs);
    }

    #[test]
    fn keys_ignored_without_focus() {
        let (mut t, _) = terminal();
        t.set_focused(false);
        t.handle_key(&Key::Character("x".into()), ModifiersState::empty(), Instant::now());
        assert_eq!(t.input(), "");
    }

    #[test]
    fn ctrl_backspace_deletes_word() {
        let (mut t, _) = terminal();
        t.paste("open the door\nsecond line");
        assert_eq!(t.input(), "open the door");
        t.handle_key(&Key::Named(NamedKey::Backspace), ModifiersState::CONTROL, Instant::now());
        assert_eq!(t.input(), "open the ");
    }

    #[test]
    fn scroll_is_clamped() {
        let (mut t, _) = terminal();
        t.submit("help", Instant::now());
        t.flush();
        t.scroll_up(1000);
        assert_eq!(t.scroll_back(), t.output().len());
        t.scroll_down(1000);
        assert_eq!(t.scroll_back(), 0);
    }
}

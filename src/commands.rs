//! Command vocabulary: keyword → action lookup table.
//!
//! Matching is exact and case-sensitive on either the primary name or the
//! alias. There is no prefix matching.

use crate::config::LinkKind;
use crate::player::EmbedKind;
use crate::view::View;

/// What a recognized command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Help,
    /// Special-cased: leaves no echo line behind.
    Clear,
    Show(View),
    Open(LinkKind),
    Email,
    Play(EmbedKind),
    Retry,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub alias: &'static str,
    pub action: Action,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "help", alias: "h", action: Action::Help, summary: "Show this help" },
    CommandSpec { name: "clear", alias: "c", action: Action::Clear, summary: "Clear the screen" },
    CommandSpec { name: "main", alias: "m", action: Action::Show(View::Main), summary: "Back to the start" },
    CommandSpec { name: "links", alias: "l", action: Action::Show(View::Links), summary: "Links and player" },
    CommandSpec { name: "gigs", alias: "g", action: Action::Show(View::Gigs), summary: "Upcoming shows" },
    CommandSpec { name: "about", alias: "a", action: Action::Show(View::About), summary: "About the project" },
    CommandSpec {
        name: "soundcloud",
        alias: "sc",
        action: Action::Play(EmbedKind::SoundCloud),
        summary: "Play on SoundCloud",
    },
    CommandSpec {
        name: "bandcamp",
        alias: "bc",
        action: Action::Play(EmbedKind::Bandcamp),
        summary: "Play on Bandcamp",
    },
    CommandSpec { name: "retry", alias: "r", action: Action::Retry, summary: "Reload a failed player" },
    CommandSpec {
        name: "instagram",
        alias: "i",
        action: Action::Open(LinkKind::Instagram),
        summary: "Open Instagram",
    },
    CommandSpec {
        name: "youtube",
        alias: "y",
        action: Action::Open(LinkKind::Youtube),
        summary: "Open YouTube",
    },
    CommandSpec {
        name: "spotify",
        alias: "s",
        action: Action::Open(LinkKind::Spotify),
        summary: "Open Spotify",
    },
    CommandSpec { name: "email", alias: "e", action: Action::Email, summary: "Write us an email" },
];

/// Resolve a trimmed command line against [`COMMANDS`].
pub fn lookup(command: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name == command || spec.alias == command)
}

/// Lines printed by `help`, generated from the table.
pub fn help_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(COMMANDS.len() + 1);
    lines.push("Available commands:".to_string());
    for spec in COMMANDS {
        let keys = format!("{} ({})", spec.name, spec.alias);
        lines.push(format!("  {:<18} {}", keys, spec.summary));
    }
    lines
}

/// Line printed for input that matches nothing in the table.
pub fn not_found_line(command: &str) -> String {
    format!("command not found: {}. type 'help' for available commands", command)
}

//! Content of each view, as styled lines.
//!
//! Kept separate from drawing so the text of every view, including the
//! failed-player fallback, is checkable without a GPU.

use chrono::NaiveDate;

use crate::config::{LinkKind, SiteConfig};
use crate::player::PlayerStatus;
use crate::terminal::Terminal;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Body,
    Dim,
    Error,
    /// Clickable; opens the failed embed's content directly.
    FallbackLink,
    /// Clickable; retries the failed embed.
    RetryButton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLine {
    pub text: String,
    pub style: LineStyle,
}

fn line(text: impl Into<String>, style: LineStyle) -> PanelLine {
    PanelLine {
        text: text.into(),
        style,
    }
}

/// Lines for the terminal's active view.
pub fn panel_lines(terminal: &Terminal, today: NaiveDate) -> Vec<PanelLine> {
    let config = terminal.config();
    match terminal.view() {
        View::Main => main_lines(config),
        // Player block above the link list.
        View::Links => {
            let mut lines = vec![line("links", LineStyle::Title)];
            lines.extend(player_lines(config, terminal.player_status()));
            lines.push(line("", LineStyle::Body));
            lines.extend(link_lines(config));
            lines
        }
        View::Gigs => gig_lines(config, today),
        View::About => config
            .about
            .lines
            .iter()
            .map(|l| line(l.clone(), LineStyle::Body))
            .collect(),
    }
}

fn main_lines(config: &SiteConfig) -> Vec<PanelLine> {
    vec![
        line(config.site.name.clone(), LineStyle::Title),
        line(config.site.tagline.clone(), LineStyle::Body),
        line("", LineStyle::Body),
        line("type 'help' to get started, or press tab to look around", LineStyle::Dim),
    ]
}

fn link_lines(config: &SiteConfig) -> Vec<PanelLine> {
    let rows = [
        ("instagram (i)", config.link_url(LinkKind::Instagram)),
        ("youtube (y)", config.link_url(LinkKind::Youtube)),
        ("spotify (s)", config.link_url(LinkKind::Spotify)),
        ("soundcloud (sc)", config.link_url(LinkKind::SoundCloud)),
        ("bandcamp (bc)", config.link_url(LinkKind::Bandcamp)),
        ("email (e)", config.links.email.as_str()),
    ];
    rows.iter()
        .map(|(label, target)| line(format!("  {label:<16} {target}"), LineStyle::Body))
        .collect()
}

fn player_lines(config: &SiteConfig, status: PlayerStatus) -> Vec<PanelLine> {
    match status {
        PlayerStatus::Unloaded => vec![line(
            "player: type 'sc' or 'bc' to load a player",
            LineStyle::Dim,
        )],
        PlayerStatus::Loaded { embed, ready: false } => vec![
            line(format!("player: loading {}...", embed.label()), LineStyle::Body),
            line(format!("  {}", config.embed_url(embed)), LineStyle::Dim),
        ],
        PlayerStatus::Loaded { embed, ready: true } => vec![
            line(format!("player: {} ready", embed.label()), LineStyle::Body),
            line(format!("  {}", config.link_url(LinkKind::from(embed))), LineStyle::Dim),
        ],
        PlayerStatus::Failed { embed } => vec![
            line(
                format!("player: {} failed to load", embed.label()),
                LineStyle::Error,
            ),
            line(
                format!("  listen directly: {}", config.link_url(LinkKind::from(embed))),
                LineStyle::FallbackLink,
            ),
            line("  [ retry ]  (or type 'retry')", LineStyle::RetryButton),
        ],
    }
}

fn gig_lines(config: &SiteConfig, today: NaiveDate) -> Vec<PanelLine> {
    let mut lines = vec![line("upcoming", LineStyle::Title)];
    let upcoming = config.upcoming_gigs(today);
    if upcoming.is_empty() {
        lines.push(line("  no shows announced yet", LineStyle::Dim));
    }
    for gig in upcoming {
        let mut text = format!("  {}  {:<24} {}", gig.date.format("%a %d %b %Y"), gig.venue, gig.city);
        if let Some(tickets) = &gig.ticket_url {
            text.push_str(&format!("  tickets: {tickets}"));
        }
        lines.push(line(text, LineStyle::Body));
    }

    let past = config.past_gigs(today);
    if !past.is_empty() {
        lines.push(line("", LineStyle::Body));
        lines.push(line("past", LineStyle::Title));
        for gig in past {
            lines.push(line(
                format!("  {}  {:<24} {}", gig.date.format("%d %b %Y"), gig.venue, gig.city),
                LineStyle::Dim,
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Gig;
    use crate::embed::{ProbeResult, ScriptedProbe};
    use crate::opener::RecordingOpener;
    use crate::player::EmbedKind;
    use std::time::Instant;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
    }

    fn terminal(config: SiteConfig) -> Terminal {
        Terminal::new(config, Box::new(RecordingOpener::new()), Box::new(ScriptedProbe::new()))
    }

    #[test]
    fn main_view_shows_name() {
        let t = terminal(SiteConfig::default());
        let lines = panel_lines(&t, today());
        assert_eq!(lines[0], line("LOWLIGHT", LineStyle::Title));
    }

    #[test]
    fn failed_player_offers_link_and_retry() {
        let mut t = terminal(SiteConfig::default());
        t.load_player(EmbedKind::SoundCloud);
        assert!(!t.player_status().is_failed());
        t.apply_probe_result(ProbeResult {
            attempt: 1,
            embed: EmbedKind::SoundCloud,
            outcome: Err("HTTP 404".into()),
        });

        let lines = panel_lines(&t, today());
        let link = lines
            .iter()
            .find(|l| l.style == LineStyle::FallbackLink)
            .expect("fallback link present");
        assert!(link.text.contains("https://soundcloud.com/lowlight"));
        assert!(lines.iter().any(|l| l.style == LineStyle::RetryButton));
    }

    #[test]
    fn failure_controls_come_before_link_list() {
        let mut t = terminal(SiteConfig::default());
        t.load_player(EmbedKind::Bandcamp);
        t.apply_probe_result(ProbeResult {
            attempt: 1,
            embed: EmbedKind::Bandcamp,
            outcome: Err("timed out".into()),
        });
        let lines = panel_lines(&t, today());
        let styles: Vec<_> = lines.iter().take(4).map(|l| l.style.clone()).collect();
        assert_eq!(
            styles,
            [LineStyle::Title, LineStyle::Error, LineStyle::FallbackLink, LineStyle::RetryButton]
        );
        assert!(lines.iter().skip(4).any(|l| l.text.contains("instagram (i)")));
    }

    #[test]
    fn gigs_without_upcoming_say_so() {
        let mut config = SiteConfig::default();
        config.gigs.push(Gig {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"),
            venue: "Old Barn".into(),
            city: "Hull".into(),
            ticket_url: None,
        });
        let mut t = terminal(config);
        t.submit("gigs", Instant::now());
        t.flush();
        let lines = panel_lines(&t, today());
        assert!(lines.iter().any(|l| l.text.contains("no shows announced")));
        assert!(lines.iter().any(|l| l.text.contains("Old Barn")));
    }
}

//! End-to-end behaviour of the terminal view, driven through the library API
//! with a recording opener and a scripted embed probe.
//!
//! Tested in this file:
//! - empty and unknown input
//! - echo ordering under overlapping latency
//! - history round trips
//! - clear (command and shortcut)
//! - view cycling
//! - player load, failure, fallback and retry

use std::time::{Duration, Instant};

use band_terminal::commands::{self, COMMANDS};
use band_terminal::config::SiteConfig;
use band_terminal::embed::{ProbeResult, ScriptedProbe};
use band_terminal::mount::MountedTerminal;
use band_terminal::opener::{Opened, RecordingOpener};
use band_terminal::output::OutputKind;
use band_terminal::player::{EmbedKind, PlayerStatus};
use band_terminal::shortcuts::{KeyPress, KeyboardHub, Propagation, Shortcut};
use band_terminal::terminal::Terminal;
use band_terminal::view::{CYCLE, View};
use winit::keyboard::{Key, ModifiersState, NamedKey};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config(latency_ms: u64) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.terminal.latency_ms = latency_ms;
    config
}

fn terminal() -> (Terminal, RecordingOpener) {
    let opener = RecordingOpener::new();
    let t = Terminal::new(config(0), Box::new(opener.clone()), Box::new(ScriptedProbe::new()));
    (t, opener)
}

fn run(t: &mut Terminal, commands: &[&str]) {
    let now = Instant::now();
    for c in commands {
        t.submit(c, now);
    }
    t.flush();
}

fn echoes(t: &Terminal) -> Vec<String> {
    t.output()
        .iter()
        .filter(|l| l.kind == OutputKind::Echo)
        .map(|l| l.text.clone())
        .collect()
}

fn fail_current_embed(t: &mut Terminal) {
    let (attempt, embed) = match t.player_status() {
        PlayerStatus::Loaded { embed, .. } => (1, embed),
        other => panic!("expected a loaded player, got {other:?}"),
    };
    t.apply_probe_result(ProbeResult {
        attempt,
        embed,
        outcome: Err("HTTP 503 Service Unavailable".into()),
    });
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

#[test]
fn empty_and_blank_input_change_nothing() {
    let (mut t, _) = terminal();
    run(&mut t, &["", "   ", "\t \n"]);
    assert!(t.history().is_empty());
    assert!(t.output().is_empty());
    assert_eq!(t.view(), View::Main);
}

#[test]
fn unknown_input_appends_exactly_one_not_found_line() {
    for input in ["foo", "HELP", "hel", "sc2", "links please", "ls -la"] {
        let (mut t, _) = terminal();
        run(&mut t, &["gigs"]);
        let before = t.output().len();
        run(&mut t, &[input]);

        let added = &t.output()[before..];
        assert_eq!(added.len(), 2, "echo + one line for {input:?}");
        assert_eq!(added[0].text, format!("$ {input}"));
        assert_eq!(added[1].text, commands::not_found_line(input));
        assert_eq!(added[1].kind, OutputKind::Error);
        assert_eq!(t.view(), View::Gigs, "view unchanged by {input:?}");
    }
}

#[test]
fn every_table_keyword_is_recognized() {
    for spec in COMMANDS {
        for keyword in [spec.name, spec.alias] {
            let (mut t, _) = terminal();
            run(&mut t, &[keyword]);
            let not_found = commands::not_found_line(keyword);
            assert!(
                t.output().iter().all(|l| l.text != not_found),
                "{keyword} should resolve"
            );
        }
    }
}

#[test]
fn help_prints_block_and_keeps_view() {
    let (mut t, _) = terminal();
    run(&mut t, &["about", "help"]);
    let texts: Vec<_> = t.output().iter().map(|l| l.text.clone()).collect();
    let help = commands::help_lines();
    assert!(texts.ends_with(&help));
    assert_eq!(t.view(), View::About);
}

#[test]
fn echoes_follow_submission_order_under_latency() {
    let opener = RecordingOpener::new();
    let mut t = Terminal::new(config(200), Box::new(opener), Box::new(ScriptedProbe::new()));
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    t.submit("about", t0);
    t.submit("nope", t0 + ms(10));
    t.submit("gigs", t0 + ms(20));

    // Drive the clock in small steps, well past every latency.
    let mut now = t0;
    while now < t0 + ms(2000) {
        t.poll(now);
        now += ms(5);
    }

    assert_eq!(echoes(&t), ["$ about", "$ nope", "$ gigs"]);
    // `nope`'s error line lands between its echo and the `gigs` echo.
    let texts: Vec<_> = t.output().iter().map(|l| l.text.as_str()).collect();
    let nope_err = texts.iter().position(|l| l.starts_with("command not found: nope"));
    let gigs_echo = texts.iter().position(|l| *l == "$ gigs");
    assert!(nope_err.is_some() && nope_err < gigs_echo);
    assert_eq!(t.view(), View::Gigs);
    assert!(!t.is_busy());
}

#[test]
fn input_stays_accepted_while_output_is_pending() {
    let mut t = Terminal::new(config(500), Box::new(RecordingOpener::new()), Box::new(ScriptedProbe::new()));
    let t0 = Instant::now();
    t.submit("help", t0);
    t.poll(t0);
    assert!(t.is_busy());
    t.handle_key(&Key::Character("g".into()), ModifiersState::empty(), t0);
    assert_eq!(t.input(), "g");
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn recall_round_trip_returns_to_empty() {
    let (mut t, _) = terminal();
    run(&mut t, &["help", "gigs", "sc", "about"]);
    let n = t.history().len();

    for _ in 0..n {
        t.recall_previous();
    }
    assert_eq!(t.input(), "help");
    assert_eq!(t.history().cursor(), Some(0));

    for _ in 0..n {
        t.recall_next();
    }
    assert_eq!(t.input(), "");
    assert_eq!(t.history().cursor(), None);
}

#[test]
fn recall_previous_clamps_at_oldest() {
    let (mut t, _) = terminal();
    run(&mut t, &["help", "gigs"]);
    for _ in 0..10 {
        t.recall_previous();
    }
    assert_eq!(t.input(), "help");
    assert_eq!(t.history().cursor(), Some(0));
}

#[test]
fn escape_cancels_browsing() {
    let hub = KeyboardHub::new();
    let (t, _) = terminal();
    let mounted = MountedTerminal::mount(&hub, t);
    {
        let mut t = mounted.terminal_mut();
        run(&mut t, &["help"]);
        t.recall_previous();
        assert_eq!(t.input(), "help");
    }

    let esc = Key::Named(NamedKey::Escape);
    let press = KeyPress { key: &esc, modifiers: ModifiersState::empty() };
    assert_eq!(hub.dispatch(&press), Propagation::Consumed);
    assert_eq!(mounted.terminal().input(), "");
    assert_eq!(mounted.terminal().history().cursor(), None);
}

// ---------------------------------------------------------------------------
// Clear
// ---------------------------------------------------------------------------

#[test]
fn clear_command_always_empties_output() {
    for prior in [0, 1, 5, 40] {
        let (mut t, _) = terminal();
        for _ in 0..prior {
            run(&mut t, &["help"]);
        }
        run(&mut t, &["clear"]);
        assert_eq!(t.output().len(), 0, "after {prior} prior commands");

        let (mut t, _) = terminal();
        for _ in 0..prior {
            run(&mut t, &["nope"]);
        }
        run(&mut t, &["c"]);
        assert!(t.output().is_empty());
    }
}

#[test]
fn clear_waits_for_earlier_output() {
    let mut t = Terminal::new(config(300), Box::new(RecordingOpener::new()), Box::new(ScriptedProbe::new()));
    let t0 = Instant::now();
    t.submit("help", t0);
    t.submit("clear", t0);
    t.poll(t0 + Duration::from_millis(10));
    assert_eq!(echoes(&t), ["$ help"]);
    // help's block and the clear both land; the clear comes last.
    t.poll(t0 + Duration::from_millis(300));
    assert!(t.output().is_empty());
    assert!(!t.is_busy());
}

#[test]
fn clear_shortcut_empties_output_regardless_of_focus() {
    let hub = KeyboardHub::new();
    let (t, _) = terminal();
    let mounted = MountedTerminal::mount(&hub, t);
    run(&mut mounted.terminal_mut(), &["help", "nope"]);
    mounted.terminal_mut().set_focused(false);

    let l = Key::Character("l".into());
    let press = KeyPress { key: &l, modifiers: ModifiersState::CONTROL };
    assert_eq!(hub.dispatch(&press), Propagation::Consumed);
    assert!(mounted.terminal().output().is_empty());
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn advancing_view_count_times_returns_to_start() {
    for start in ["main", "links", "gigs", "about"] {
        let (mut t, _) = terminal();
        run(&mut t, &[start]);
        let original = t.view();
        for _ in 0..CYCLE.len() {
            t.apply_shortcut(Shortcut::AdvanceView);
        }
        assert_eq!(t.view(), original);
    }
}

#[test]
fn tab_only_advances_with_focus() {
    let hub = KeyboardHub::new();
    let (t, _) = terminal();
    let mounted = MountedTerminal::mount(&hub, t);
    let tab = Key::Named(NamedKey::Tab);

    mounted.terminal_mut().set_focused(false);
    let press = KeyPress { key: &tab, modifiers: ModifiersState::empty() };
    assert_eq!(hub.dispatch(&press), Propagation::Continue);
    assert_eq!(mounted.terminal().view(), View::Main);

    mounted.terminal_mut().set_focused(true);
    assert_eq!(hub.dispatch(&press), Propagation::Consumed);
    assert_eq!(mounted.terminal().view(), View::Links);

    let shift_tab = KeyPress { key: &tab, modifiers: ModifiersState::SHIFT };
    assert_eq!(hub.dispatch(&shift_tab), Propagation::Continue);
    assert_eq!(mounted.terminal().view(), View::Links);
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[test]
fn sc_loads_soundcloud_in_player_view() {
    let (mut t, _) = terminal();
    run(&mut t, &["sc"]);
    assert_eq!(t.view(), View::PLAYER);
    assert_eq!(
        t.player_status(),
        PlayerStatus::Loaded { embed: EmbedKind::SoundCloud, ready: false }
    );
    assert!(!t.player_status().is_failed());
    assert_eq!(t.fallback_link(), None);
}

#[test]
fn failure_offers_link_and_retry_recovers() {
    let (mut t, opener) = terminal();
    run(&mut t, &["sc"]);
    fail_current_embed(&mut t);

    assert_eq!(t.player_status(), PlayerStatus::Failed { embed: EmbedKind::SoundCloud });
    let link = t.fallback_link().map(str::to_string);
    assert_eq!(link.as_deref(), Some("https://soundcloud.com/lowlight"));

    t.open_fallback();
    assert_eq!(opener.opened(), vec![Opened::Url("https://soundcloud.com/lowlight".into())]);

    run(&mut t, &["retry"]);
    assert_eq!(
        t.player_status(),
        PlayerStatus::Loaded { embed: EmbedKind::SoundCloud, ready: false }
    );
    assert_eq!(t.fallback_link(), None);
}

#[test]
fn probe_results_arrive_through_poll() {
    let mut t = Terminal::new(config(0), Box::new(RecordingOpener::new()), Box::new(ScriptedProbe::offline()));
    run(&mut t, &["bc"]);
    assert_eq!(t.player_status(), PlayerStatus::Loaded { embed: EmbedKind::Bandcamp, ready: false });
    assert!(t.poll(Instant::now()));
    assert_eq!(t.player_status(), PlayerStatus::Failed { embed: EmbedKind::Bandcamp });
    assert_eq!(t.fallback_link(), Some("https://lowlight.bandcamp.com"));
}

#[test]
fn switching_embed_after_failure_clears_it() {
    let (mut t, _) = terminal();
    run(&mut t, &["sc"]);
    fail_current_embed(&mut t);
    run(&mut t, &["main", "bandcamp"]);
    assert_eq!(t.view(), View::PLAYER);
    assert_eq!(t.player_status().embed(), Some(EmbedKind::Bandcamp));
    assert!(!t.player_status().is_failed());
}

//! Site configuration.
//!
//! Everything the terminal shows that is not behaviour (links, embed URLs,
//! gigs, about text, latency) lives in a single `SiteConfig` that is read
//! from `site.toml`. Every section is `#[serde(default)]`, so a partial file
//! only overrides what it names.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::player::EmbedKind;

// ---------------------------------------------------------------------------
// SiteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub terminal: TerminalSection,
    pub links: LinksSection,
    pub embeds: EmbedsSection,
    pub gigs: Vec<Gig>,
    pub about: AboutSection,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub tagline: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TerminalSection {
    /// Artificial delay before a command's result is printed.
    pub latency_ms: u64,
    pub prompt: String,
    pub font_size: f32,
    pub cursor_blink_ms: u64,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LinksSection {
    pub instagram: String,
    pub youtube: String,
    pub spotify: String,
    pub soundcloud: String,
    pub bandcamp: String,
    /// Bare address; the `mailto:` scheme is added when composing.
    pub email: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct EmbedsSection {
    pub soundcloud_url: String,
    pub bandcamp_url: String,
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Gig {
    pub date: NaiveDate,
    pub venue: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AboutSection {
    pub lines: Vec<String>,
}

/// External destinations reachable from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Instagram,
    Youtube,
    Spotify,
    SoundCloud,
    Bandcamp,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Instagram => "instagram",
            LinkKind::Youtube => "youtube",
            LinkKind::Spotify => "spotify",
            LinkKind::SoundCloud => "soundcloud",
            LinkKind::Bandcamp => "bandcamp",
        }
    }
}

impl From<EmbedKind> for LinkKind {
    fn from(embed: EmbedKind) -> Self {
        match embed {
            EmbedKind::SoundCloud => LinkKind::SoundCloud,
            EmbedKind::Bandcamp => LinkKind::Bandcamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "LOWLIGHT".into(),
            tagline: "synths, tape hiss and late trains".into(),
        }
    }
}

impl Default for TerminalSection {
    fn default() -> Self {
        Self {
            latency_ms: 120,
            prompt: "$ ".into(),
            font_size: 20.0,
            cursor_blink_ms: 500,
        }
    }
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            instagram: "https://www.instagram.com/lowlight.music".into(),
            youtube: "https://www.youtube.com/@lowlightmusic".into(),
            spotify: "https://open.spotify.com/artist/lowlight".into(),
            soundcloud: "https://soundcloud.com/lowlight".into(),
            bandcamp: "https://lowlight.bandcamp.com".into(),
            email: "hello@lowlight.band".into(),
        }
    }
}

impl Default for EmbedsSection {
    fn default() -> Self {
        Self {
            soundcloud_url: "https://w.soundcloud.com/player/?url=https%3A//soundcloud.com/lowlight&auto_play=false".into(),
            bandcamp_url: "https://bandcamp.com/EmbeddedPlayer/album=1/size=large/tracklist=false/".into(),
            probe_timeout_ms: 8000,
        }
    }
}

impl Default for AboutSection {
    fn default() -> Self {
        Self {
            lines: vec![
                "LOWLIGHT is a two-piece from the north.".into(),
                "Analog synths, drum machines, too much reverb.".into(),
                "Booking and press: type 'email'.".into(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl SiteConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.terminal.latency_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.embeds.probe_timeout_ms)
    }

    pub fn link_url(&self, kind: LinkKind) -> &str {
        match kind {
            LinkKind::Instagram => &self.links.instagram,
            LinkKind::Youtube => &self.links.youtube,
            LinkKind::Spotify => &self.links.spotify,
            LinkKind::SoundCloud => &self.links.soundcloud,
            LinkKind::Bandcamp => &self.links.bandcamp,
        }
    }

    pub fn embed_url(&self, embed: EmbedKind) -> &str {
        match embed {
            EmbedKind::SoundCloud => &self.embeds.soundcloud_url,
            EmbedKind::Bandcamp => &self.embeds.bandcamp_url,
        }
    }

    /// `mailto:` URI for the configured address.
    pub fn mailto(&self) -> String {
        format!("mailto:{}", self.links.email)
    }

    /// Gigs on or after `today`, soonest first.
    pub fn upcoming_gigs(&self, today: NaiveDate) -> Vec<&Gig> {
        let mut gigs: Vec<&Gig> = self.gigs.iter().filter(|g| g.date >= today).collect();
        gigs.sort_by_key(|g| g.date);
        gigs
    }

    /// Gigs before `today`, most recent first.
    pub fn past_gigs(&self, today: NaiveDate) -> Vec<&Gig> {
        let mut gigs: Vec<&Gig> = self.gigs.iter().filter(|g| g.date < today).collect();
        gigs.sort_by(|a, b| b.date.cmp(&a.date));
        gigs
    }

    /// Human-readable problems with the configured URLs. Empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut check = |field: &str, value: &str| {
            if let Err(e) = url::Url::parse(value) {
                problems.push(format!("{field}: `{value}` is not a valid URL ({e})"));
            }
        };

        check("links.instagram", &self.links.instagram);
        check("links.youtube", &self.links.youtube);
        check("links.spotify", &self.links.spotify);
        check("links.soundcloud", &self.links.soundcloud);
        check("links.bandcamp", &self.links.bandcamp);
        check("embeds.soundcloud_url", &self.embeds.soundcloud_url);
        check("embeds.bandcamp_url", &self.embeds.bandcamp_url);
        for gig in &self.gigs {
            if let Some(ticket) = &gig.ticket_url {
                check("gigs.ticket_url", ticket);
            }
        }
        if !self.links.email.contains('@') {
            problems.push(format!("links.email: `{}` is not an address", self.links.email));
        }
        problems
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialize from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load `path` if it exists, falling back to defaults on any problem.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(target: "config", "No config at {}, using defaults", path.display());
            return Self::default();
        }
        let config = match Self::load(path) {
            Ok(config) => {
                info!(target: "config", "Loaded {}", path.display());
                config
            }
            Err(e) => {
                warn!(target: "config", "{e:#}. Using defaults.");
                return Self::default();
            }
        };
        for problem in config.validate() {
            warn!(target: "config", "{problem}");
        }
        config
    }

    /// Startup config: `explicit` (from `--config`) if given, else the
    /// default location. Missing or malformed files fall back to defaults.
    pub fn load_startup(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) if !path.exists() => {
                warn!(target: "config", "{} does not exist. Using defaults.", path.display());
                Self::default()
            }
            Some(path) => Self::load_or_default(path),
            None => Self::load_or_default(&crate::paths::config_path()),
        }
    }
}

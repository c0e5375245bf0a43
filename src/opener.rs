//! Outbound side effects: opening links and composing mail.
//!
//! Both are fire-and-forget. The launcher process is spawned and never
//! waited on; only a failure to spawn is reported.

use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::info;

/// Where the terminal sends URLs it wants opened.
pub trait Opener {
    /// Open `url` in a new browsing context.
    fn open_url(&self, url: &str) -> Result<()>;

    /// Hand a `mailto:` URI to the mail client.
    fn compose_mail(&self, uri: &str) -> Result<()>;
}

/// Launches the platform's URL handler (`open`, `xdg-open`, `cmd /C start`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl SystemOpener {
    fn launch(&self, target: &str) -> Result<()> {
        let mut cmd = launcher_command(target);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        cmd.spawn()
            .with_context(|| format!("launching {:?} for {}", cmd.get_program(), target))?;
        info!(target: "opener", "Opened {}", target);
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn launcher_command(target: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(target);
    cmd
}

#[cfg(target_os = "windows")]
fn launcher_command(target: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", target]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher_command(target: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(target);
    cmd
}

impl Opener for SystemOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        self.launch(url)
    }

    fn compose_mail(&self, uri: &str) -> Result<()> {
        self.launch(uri)
    }
}

/// An outbound request captured by [`RecordingOpener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    Url(String),
    Mail(String),
}

/// Records requests instead of launching anything (`--no-launch`).
///
/// Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<Opened>>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<Opened> {
        match self.opened.lock() {
            Ok(opened) => opened.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, entry: Opened) {
        info!(target: "opener", "Not launching {:?}", entry);
        match self.opened.lock() {
            Ok(mut opened) => opened.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

impl Opener for RecordingOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        self.record(Opened::Url(url.to_string()));
        Ok(())
    }

    fn compose_mail(&self, uri: &str) -> Result<()> {
        self.record(Opened::Mail(uri.to_string()));
        Ok(())
    }
}

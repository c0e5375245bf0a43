//! The closed set of views the terminal can show.
//!
//! `View` is the set of valid views; `CYCLE` is only the order used by the
//! advance-view shortcut. Adding a view means adding a variant, and putting
//! it in `CYCLE` is a separate decision.

/// A named view of the site. Exactly one is active at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Landing banner.
    #[default]
    Main,
    /// Social links and the embedded player.
    Links,
    /// Upcoming and past shows.
    Gigs,
    /// About the project.
    About,
}

/// Order followed by the advance-view shortcut.
pub const CYCLE: [View; 4] = [View::Main, View::Links, View::Gigs, View::About];

impl View {
    /// The view that hosts the embedded player.
    pub const PLAYER: View = View::Links;

    /// Label shown in the header bar.
    pub fn label(self) -> &'static str {
        match self {
            View::Main => "main",
            View::Links => "links",
            View::Gigs => "gigs",
            View::About => "about",
        }
    }

    /// Next view in `CYCLE`, wrapping from last to first.
    ///
    /// A view missing from `CYCLE` advances to the first entry.
    pub fn next(self) -> View {
        match CYCLE.iter().position(|v| *v == self) {
            Some(i) => CYCLE[(i + 1) % CYCLE.len()],
            None => CYCLE[0],
        }
    }
}

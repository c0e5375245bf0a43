//! Command history with an up/down recall cursor.

/// Submitted commands plus the up/down browsing cursor.
///
/// The cursor is `None` while not browsing, otherwise a valid index into
/// `entries`.
#[derive(Debug, Default, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted command and stop browsing.
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        self.cursor = None;
    }

    /// Stop browsing without touching the entries.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Step toward older entries. Jumps to the newest entry when not
    /// browsing, and stays put at the oldest.
    ///
    /// Returns the entry to place in the input buffer, or `None` when the
    /// history is empty.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = match self.cursor {
            Some(i) if i > 0 => i - 1,
            Some(i) => i,
            None => self.entries.len() - 1,
        };
        self.cursor = Some(idx);
        Some(self.entries[idx].as_str())
    }

    /// Step toward newer entries. Moving past the newest entry ends
    /// browsing.
    pub fn recall_next(&mut self) -> Recall<'_> {
        match self.cursor {
            None => Recall::Idle,
            Some(idx) if idx + 1 < self.entries.len() => {
                self.cursor = Some(idx + 1);
                Recall::Entry(self.entries[idx + 1].as_str())
            }
            Some(_) => {
                self.cursor = None;
                Recall::Exited
            }
        }
    }
}

/// Outcome of [`CommandHistory::recall_next`].
#[derive(Debug, PartialEq, Eq)]
pub enum Recall<'a> {
    /// Not browsing; nothing changes.
    Idle,
    /// Replace the input buffer with this entry.
    Entry(&'a str),
    /// Browsing ended; the input buffer should be cleared.
    Exited,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> CommandHistory {
        let mut h = CommandHistory::new();
        for e in entries {
            h.push(e.to_string());
        }
        h
    }

    #[test]
    fn previous_on_empty_is_noop() {
        let mut h = CommandHistory::new();
        assert_eq!(h.recall_previous(), None);
        assert_eq!(h.cursor(), None);
    }

    #[test]
    fn previous_starts_at_newest_and_clamps_at_oldest() {
        let mut h = history(&["help", "sc", "gigs"]);
        assert_eq!(h.recall_previous(), Some("gigs"));
        assert_eq!(h.recall_previous(), Some("sc"));
        assert_eq!(h.recall_previous(), Some("help"));
        assert_eq!(h.recall_previous(), Some("help"));
        assert_eq!(h.cursor(), Some(0));
    }

    #[test]
    fn next_without_browsing_is_idle() {
        let mut h = history(&["help"]);
        assert_eq!(h.recall_next(), Recall::Idle);
        assert!(!h.is_browsing());
    }

    #[test]
    fn next_past_newest_exits() {
        let mut h = history(&["help", "sc"]);
        h.recall_previous();
        h.recall_previous();
        assert_eq!(h.recall_next(), Recall::Entry("sc"));
        assert_eq!(h.recall_next(), Recall::Exited);
        assert_eq!(h.cursor(), None);
    }

    #[test]
    fn push_resets_cursor() {
        let mut h = history(&["help"]);
        h.recall_previous();
        h.push("about".into());
        assert_eq!(h.cursor(), None);
        assert_eq!(h.entries(), ["help", "about"]);
    }
}

//! Linear snapshot history with a cursor.

use serde::{Deserialize, Serialize};

/// Ordered snapshots of a state, with a cursor selecting the one on display.
///
/// Recording after moving the cursor back discards every snapshot past the
/// cursor first, so the history never branches.
///
/// # Example
///
/// ```rust
/// use harvest::time_travel::History;
///
/// let mut history = History::new("s0");
/// history.record("s1");
/// history.record("s2");
///
/// history.seek(0);
/// history.record("s1'");
///
/// assert_eq!(history.entries(), &["s0", "s1'"]);
/// assert_eq!(history.cursor(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct History<S> {
    entries: Vec<S>,
    cursor: usize,
}

impl<S> History<S> {
    /// History holding only `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn entries(&self) -> &[S] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.entries.get(index)
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&S> {
        self.entries.get(self.cursor)
    }

    /// Append `state` after the cursor, dropping the discarded future.
    pub fn record(&mut self, state: S) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(state);
        self.cursor = self.entries.len() - 1;
    }

    /// Move the cursor. Out-of-range indices leave the history untouched.
    pub fn seek(&mut self, index: usize) -> Option<&S> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = index;
        self.entries.get(index)
    }

    /// Forget everything and start over from `state`.
    pub fn reset(&mut self, state: S) {
        self.entries.clear();
        self.entries.push(state);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_moves_cursor_to_end() {
        let mut history = History::new(0);
        history.record(1);
        history.record(2);

        assert_eq!(history.entries(), &[0, 1, 2]);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current(), Some(&2));
    }

    #[test]
    fn record_after_seek_truncates_future() {
        let mut history = History::new(0);
        history.record(1);
        history.record(2);
        history.seek(1);
        history.record(10);

        assert_eq!(history.entries(), &[0, 1, 10]);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn seek_out_of_range_is_ignored() {
        let mut history = History::new(0);
        history.record(1);

        assert_eq!(history.seek(5), None);
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.seek(0), Some(&0));
    }

    #[test]
    fn reset_keeps_single_entry() {
        let mut history = History::new(0);
        history.record(1);
        history.reset(7);

        assert_eq!(history.entries(), &[7]);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn history_serializes_to_json() {
        let mut history = History::new("a".to_string());
        history.record("b".to_string());

        let json = serde_json::to_string(&history).unwrap();
        let restored: History<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);
    }
}

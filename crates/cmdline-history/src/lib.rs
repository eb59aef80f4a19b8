//! Persistent command-line and search history.
//!
//! A `HistoryFile` is an ordered log of past command/search strings,
//! most-recent-last, persisted as a JSON array. One instance exists per
//! command-line kind (`:` commands and `/`,`?` searches); they are owned by
//! the top-level command-line context rather than being process globals.
//!
//! Invariants:
//! * no duplicate entries — re-adding an existing string moves it to the end
//!   (so adding the current last entry is observably a no-op);
//! * bounded at a configured maximum, oldest entries evicted first.
//!
//! Persistence is best-effort: the in-memory sequence is updated
//! synchronously on `add` and the file write happens afterwards; a failed
//! write is logged and never propagated to the editing session.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

const EX_HISTORY_FILE: &str = ".cmdline_history";
const SEARCH_HISTORY_FILE: &str = ".search_history";

#[derive(Debug)]
pub struct HistoryFile {
    entries: Vec<String>,
    max: usize,
    path: Option<PathBuf>,
}

impl HistoryFile {
    /// History of `:` commands, persisted under `dir`.
    pub fn ex_commands(dir: &Path, max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max,
            path: Some(dir.join(EX_HISTORY_FILE)),
        }
    }

    /// History of `/` and `?` searches, persisted under `dir`.
    pub fn searches(dir: &Path, max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max,
            path: Some(dir.join(SEARCH_HISTORY_FILE)),
        }
    }

    /// Unpersisted store; used by tests and hosts without a state directory.
    pub fn in_memory(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max,
            path: None,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load persisted entries, replacing the in-memory state. A missing file
    /// is normal (first run); a corrupt file is deleted so it cannot poison
    /// every subsequent session.
    pub fn load(&mut self) {
        let Some(path) = self.path.clone() else {
            return;
        };
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "history", path = %path.display(), "history_file_missing");
                return;
            }
            Err(e) => {
                warn!(target: "history", path = %path.display(), error = %e, "history_load_failed");
                return;
            }
        };
        if data.is_empty() {
            return;
        }
        match serde_json::from_str::<Vec<String>>(&data) {
            Ok(parsed) => {
                self.entries = parsed;
                self.trim();
            }
            Err(e) => {
                warn!(target: "history", path = %path.display(), error = %e, "history_file_corrupt_deleting");
                self.clear();
            }
        }
    }

    /// Append `value`, deduplicating and enforcing the size bound, then
    /// persist. Empty strings are ignored.
    pub fn add(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(index) = self.entries.iter().position(|e| e == value) {
            self.entries.remove(index);
        }
        self.entries.push(value.to_string());
        self.trim();
        self.save();
    }

    /// Drop all entries, in memory and on disk.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(path) = &self.path
            && let Err(e) = fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(target: "history", path = %path.display(), error = %e, "history_delete_failed");
        }
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max {
            let excess = self.entries.len() - self.max;
            self.entries.drain(..excess);
        }
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            error!(target: "history", path = %path.display(), error = %e, "history_dir_create_failed");
            return;
        }
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                error!(target: "history", error = %e, "history_serialize_failed");
                return;
            }
        };
        if let Err(e) = fs::write(path, json) {
            error!(target: "history", path = %path.display(), error = %e, "history_save_failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_in_order() {
        let mut h = HistoryFile::in_memory(10);
        h.add("w");
        h.add("q");
        assert_eq!(h.entries(), ["w", "q"]);
    }

    #[test]
    fn empty_string_ignored() {
        let mut h = HistoryFile::in_memory(10);
        h.add("");
        assert!(h.is_empty());
    }

    #[test]
    fn duplicate_moves_to_end() {
        let mut h = HistoryFile::in_memory(10);
        h.add("a");
        h.add("b");
        h.add("a");
        assert_eq!(h.entries(), ["b", "a"]);
    }

    #[test]
    fn adding_last_entry_is_noop() {
        let mut h = HistoryFile::in_memory(10);
        h.add("a");
        h.add("b");
        h.add("b");
        assert_eq!(h.entries(), ["a", "b"]);
    }

    #[test]
    fn bound_evicts_oldest_first() {
        let mut h = HistoryFile::in_memory(3);
        for s in ["1", "2", "3", "4"] {
            h.add(s);
        }
        assert_eq!(h.entries(), ["2", "3", "4"]);
    }

    #[test]
    fn no_adjacent_duplicates_ever() {
        let mut h = HistoryFile::in_memory(5);
        for s in ["x", "x", "y", "x", "y", "y"] {
            h.add(s);
        }
        for pair in h.entries().windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = HistoryFile::ex_commands(dir.path(), 10);
        h.add("s/a/b/");
        h.add("wq");

        let mut reloaded = HistoryFile::ex_commands(dir.path(), 10);
        reloaded.load();
        assert_eq!(reloaded.entries(), ["s/a/b/", "wq"]);
    }

    #[test]
    fn load_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = HistoryFile::searches(dir.path(), 10);
        h.load();
        assert!(h.is_empty());
    }

    #[test]
    fn corrupt_file_deleted_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EX_HISTORY_FILE);
        fs::write(&path, "{not json array").unwrap();

        let mut h = HistoryFile::ex_commands(dir.path(), 10);
        h.load();
        assert!(h.is_empty());
        assert!(!path.exists(), "corrupt file should be removed");
    }

    #[test]
    fn load_trims_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SEARCH_HISTORY_FILE);
        fs::write(&path, r#"["a","b","c","d","e"]"#).unwrap();

        let mut h = HistoryFile::searches(dir.path(), 3);
        h.load();
        assert_eq!(h.entries(), ["c", "d", "e"]);
    }

    #[test]
    fn ex_and_search_files_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let mut ex = HistoryFile::ex_commands(dir.path(), 10);
        let mut search = HistoryFile::searches(dir.path(), 10);
        ex.add("w");
        search.add("foo");

        let mut ex2 = HistoryFile::ex_commands(dir.path(), 10);
        ex2.load();
        assert_eq!(ex2.entries(), ["w"]);
        let mut search2 = HistoryFile::searches(dir.path(), 10);
        search2.load();
        assert_eq!(search2.entries(), ["foo"]);
    }
}

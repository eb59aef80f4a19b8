//! Shared state that outlives individual command-line sessions.
//!
//! One `CommandLineContext` exists per editor instance and owns the two
//! persistent histories, the rolling list of previous searches, the last
//! search state, and the match-highlight flag. Nothing here is a process
//! global; embedding two editors in one process gives two independent
//! contexts.

use std::path::Path;

use cmdline_config::Config;
use cmdline_history::HistoryFile;
use cmdline_search::{SearchOptions, SearchState};

use crate::host::PickerHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandLineKind {
    Ex,
    Search,
}

pub struct CommandLineContext {
    config: Config,
    ex_history: HistoryFile,
    search_history: HistoryFile,
    /// Past search states, most recent last, deduplicated against the tail
    /// and bounded like the histories. Unlike `search_history` this keeps
    /// full states (direction, offset), not just pattern strings.
    previous_searches: Vec<SearchState>,
    last_search: Option<SearchState>,
    highlight_matches: bool,
}

impl CommandLineContext {
    /// Build a context, loading persisted histories from `state_dir` when
    /// one is given.
    pub fn new(config: Config, state_dir: Option<&Path>) -> Self {
        let max = config.history.max;
        let (mut ex_history, mut search_history) = match state_dir {
            Some(dir) => (
                HistoryFile::ex_commands(dir, max),
                HistoryFile::searches(dir, max),
            ),
            None => (HistoryFile::in_memory(max), HistoryFile::in_memory(max)),
        };
        ex_history.load();
        search_history.load();
        Self {
            config,
            ex_history,
            search_history,
            previous_searches: Vec::new(),
            last_search: None,
            highlight_matches: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            ignorecase: self.config.search.ignorecase,
            smartcase: self.config.search.smartcase,
            wrapscan: self.config.search.wrapscan,
        }
    }

    pub fn history_entries(&self, kind: CommandLineKind) -> &[String] {
        match kind {
            CommandLineKind::Ex => self.ex_history.entries(),
            CommandLineKind::Search => self.search_history.entries(),
        }
    }

    pub fn add_history(&mut self, kind: CommandLineKind, value: &str) {
        match kind {
            CommandLineKind::Ex => self.ex_history.add(value),
            CommandLineKind::Search => self.search_history.add(value),
        }
    }

    pub fn previous_searches(&self) -> &[SearchState] {
        &self.previous_searches
    }

    pub fn last_search(&self) -> Option<&SearchState> {
        self.last_search.as_ref()
    }

    pub fn set_last_search(&mut self, state: SearchState) {
        self.last_search = Some(state);
    }

    /// Re-point the last search at the most recent rolling entry (used when
    /// an in-progress search is abandoned).
    pub fn sync_last_search(&mut self) {
        self.last_search = self.previous_searches.last().cloned();
    }

    /// Record a completed (or abandoned but non-empty) search in the rolling
    /// list and the persistent search history. Repeating the newest pattern
    /// is a no-op on the rolling list.
    pub fn push_previous_search(&mut self, state: &SearchState) {
        if state.pattern().is_empty() {
            return;
        }
        if self
            .previous_searches
            .last()
            .is_none_or(|s| s.pattern() != state.pattern())
        {
            self.previous_searches.push(state.clone());
            let max = self.config.history.max;
            if self.previous_searches.len() > max {
                let excess = self.previous_searches.len() - max;
                self.previous_searches.drain(..excess);
            }
        }
        self.search_history.add(state.pattern());
    }

    pub fn highlight_matches(&self) -> bool {
        self.highlight_matches
    }

    pub fn set_highlight_matches(&mut self, on: bool) {
        self.highlight_matches = on;
    }

    /// Offer past searches (most recent first) through the host's picker.
    pub fn pick_previous_search(&self, picker: &mut dyn PickerHost) -> Option<&SearchState> {
        let items: Vec<String> = self
            .previous_searches
            .iter()
            .rev()
            .map(|s| s.pattern().to_string())
            .collect();
        let choice = picker.pick(&items)?;
        self.previous_searches.iter().rev().nth(choice)
    }

    /// Offer past ex commands (most recent first) through the host's picker.
    pub fn pick_ex_command(&self, picker: &mut dyn PickerHost) -> Option<&str> {
        let items: Vec<String> = self
            .ex_history
            .entries()
            .iter()
            .rev()
            .cloned()
            .collect();
        let choice = picker.pick(&items)?;
        self.ex_history
            .entries()
            .iter()
            .rev()
            .nth(choice)
            .map(String::as_str)
    }
}

//! Bounded, cursor-addressed command history.
//!
//! A single linear sequence of commands with a cursor marking the last
//! applied entry (`-1` when nothing is applied). Executing a new command
//! discards everything beyond the cursor — the standard undo-branch
//! semantics — and the bound evicts from the front, shifting the cursor so
//! undo/redo availability stays correct.

use log::debug;

use crate::commands::Command;
use crate::constants::HISTORY_LIMIT;
use crate::store::TrackStore;

pub struct CommandHistory {
    entries: Vec<Command>,
    cursor: isize,
    max_entries: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl CommandHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
            max_entries: max_entries.max(1),
        }
    }

    /// Apply `command` to the store and record it. Entries past the cursor
    /// (undone, redoable work) are discarded first; the oldest entry is
    /// evicted once the bound is exceeded.
    pub fn execute(&mut self, command: Command, store: &mut TrackStore) {
        self.entries.truncate((self.cursor + 1) as usize);
        debug!("execute: {}", command.description);
        command.apply(store);
        self.entries.push(command);
        self.cursor += 1;

        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
            self.cursor -= excess as isize;
        }
    }

    /// Revert the entry under the cursor and step back. False when there is
    /// nothing to undo.
    pub fn undo(&mut self, store: &mut TrackStore) -> bool {
        if self.cursor < 0 {
            return false;
        }
        let command = &self.entries[self.cursor as usize];
        debug!("undo: {}", command.description);
        command.revert(store);
        self.cursor -= 1;
        true
    }

    /// Step forward and re-apply the entry under the cursor. False when
    /// there is nothing to redo.
    pub fn redo(&mut self, store: &mut TrackStore) -> bool {
        if self.cursor >= self.entries.len() as isize - 1 {
            return false;
        }
        self.cursor += 1;
        let command = &self.entries[self.cursor as usize];
        debug!("redo: {}", command.description);
        command.apply(store);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > -1
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() as isize - 1
    }

    /// Label of the action the next `undo` would reverse.
    pub fn undo_description(&self) -> Option<&str> {
        if self.cursor < 0 {
            return None;
        }
        self.entries
            .get(self.cursor as usize)
            .map(|c| c.description.as_str())
    }

    /// Label of the action the next `redo` would re-apply.
    pub fn redo_description(&self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.entries
            .get((self.cursor + 1) as usize)
            .map(|c| c.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}

//! Linear undo/redo history.

use crate::commands::Command;
use crate::error::GraphError;
use crate::graph::DialogueGraph;
use tracing::debug;

/// Lifecycle of a command inside the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Fresh,
    Applied,
    Undone,
}

#[derive(Debug)]
struct Entry {
    command: Box<dyn Command>,
    state: CommandState,
}

/// Ordered list of commands with a cursor.
///
/// Everything below the cursor is applied, everything at or above it is
/// undone. Pushing after an undo drops the undone tail.
#[derive(Debug, Default)]
pub struct UndoStack {
    entries: Vec<Entry>,
    index: usize,
    limit: usize,
}

impl UndoStack {
    /// A `limit` of 0 keeps every command.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            limit,
        }
    }

    /// Execute `command` and record it as the newest undo step.
    ///
    /// A command whose first execution fails is not recorded, and the redo
    /// steps it would have replaced are kept.
    pub fn push(&mut self, command: Box<dyn Command>, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        let mut entry = Entry {
            command,
            state: CommandState::Fresh,
        };
        entry.command.redo(graph)?;
        entry.state = CommandState::Applied;

        for dropped in self.entries.drain(self.index..).rev() {
            debug!(command = dropped.command.label(), "redo step dropped");
            dropped.command.discard(graph);
        }
        debug!(command = entry.command.label(), "command pushed");
        self.entries.push(entry);
        self.index = self.entries.len();

        if self.limit > 0 && self.entries.len() > self.limit {
            let evicted = self.entries.remove(0);
            self.index -= 1;
            debug!(command = evicted.command.label(), "oldest command evicted");
            evicted.command.discard(graph);
        }
        Ok(())
    }

    /// Revert the newest applied command. Returns false when there is none.
    pub fn undo(&mut self, graph: &mut DialogueGraph) -> Result<bool, GraphError> {
        if self.index == 0 {
            return Ok(false);
        }
        let entry = &mut self.entries[self.index - 1];
        entry.command.undo(graph)?;
        entry.state = CommandState::Undone;
        self.index -= 1;
        debug!(command = entry.command.label(), index = self.index, "undo");
        Ok(true)
    }

    /// Re-apply the oldest undone command. Returns false when there is none.
    pub fn redo(&mut self, graph: &mut DialogueGraph) -> Result<bool, GraphError> {
        let Some(entry) = self.entries.get_mut(self.index) else {
            return Ok(false);
        };
        entry.command.redo(graph)?;
        entry.state = CommandState::Applied;
        self.index += 1;
        debug!(command = entry.command.label(), index = self.index, "redo");
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.entries.len()
    }

    /// Label of the command `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.command.label())
    }

    /// Label of the command `redo` would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.entries.get(self.index).map(|e| e.command.label())
    }

    pub fn state(&self, index: usize) -> Option<CommandState> {
        self.entries.get(index).map(|e| e.state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the cursor: the number of applied commands.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Forget every command, leaving the graph as it is now.
    pub fn clear(&mut self, graph: &mut DialogueGraph) {
        for entry in self.entries.drain(..).rev() {
            entry.command.discard(graph);
        }
        self.index = 0;
        debug!("history cleared");
    }
}

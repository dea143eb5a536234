// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ActivityStack`: an ordered stack of activity tokens sharing a task
//! affinity tag — the unit of navigation the task managers in
//! [`crate::task_manager`] operate on.
//!
//! The stack is a non-owning back-reference: it stores [`ActivityToken`]s
//! only. The sole strong owner of an [`ActivityRecord`](crate::activity::ActivityRecord)
//! is the registry's `activity_map` (token -> record); the stack's order is
//! the navigation truth, looked up through that map.

use crate::activity::ActivityToken;
use serde::{Deserialize, Serialize};

/// An ordered stack of activity tokens, bottom to top.
///
/// Created on first new-task push; the owning task manager drops it once
/// empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityStack {
    pub task_tag: String,
    /// Bottom-to-top order; `tokens.last()` is the top of the stack.
    tokens: Vec<ActivityToken>,
    /// Whether this task is currently foreground (shown to the user) as
    /// opposed to backgrounded.
    pub foreground: bool,
}

impl ActivityStack {
    pub fn new(task_tag: impl Into<String>) -> Self {
        ActivityStack { task_tag: task_tag.into(), tokens: Vec::new(), foreground: false }
    }

    pub fn push(&mut self, token: ActivityToken) {
        self.tokens.push(token);
    }

    /// Removes and returns the top token, or `None` if the stack is empty.
    pub fn pop_top(&mut self) -> Option<ActivityToken> {
        self.tokens.pop()
    }

    pub fn top(&self) -> Option<ActivityToken> {
        self.tokens.last().copied()
    }

    pub fn root(&self) -> Option<ActivityToken> {
        self.tokens.first().copied()
    }

    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: ActivityToken) -> bool {
        self.tokens.contains(&token)
    }

    /// Position of `token` from the bottom.
    pub fn position(&self, token: ActivityToken) -> Option<usize> {
        self.tokens.iter().position(|t| *t == token)
    }

    /// Removes and returns every token above `token` (exclusive), in
    /// top-to-bottom (pop) order. Used by `CLEAR_TOP`.
    pub fn split_off_above(&mut self, token: ActivityToken) -> Vec<ActivityToken> {
        match self.position(token) {
            Some(idx) => {
                let mut above = self.tokens.split_off(idx + 1);
                above.reverse();
                above
            }
            None => Vec::new(),
        }
    }

    /// Drains every token in top-to-bottom (pop) order, emptying the stack.
    pub fn drain_all(&mut self) -> Vec<ActivityToken> {
        let mut all = std::mem::take(&mut self.tokens);
        all.reverse();
        all
    }

    /// Removes a specific token by value regardless of position. Used by
    /// `finish_activity`/`delete_activity` once the record itself has
    /// already been popped from above and is ready to leave the stack.
    pub fn remove(&mut self, token: ActivityToken) -> bool {
        match self.position(token) {
            Some(idx) => {
                self.tokens.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ActivityToken> + '_ {
        self.tokens.iter().copied()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

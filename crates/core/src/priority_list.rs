// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutable, ordered process priority list: a doubly-linked arena of
//! [`PidPriorityInfo`] nodes with a `background_pos` pivot marking the
//! home-task boundary. Foreground pids live at the head; background pids
//! live between `background_pos` and the tail.
//!
//! Indices rather than pointers back every link, avoiding shared-mutable-
//! pointer hazards for a structure that's mutated every foreground switch.

use crate::priority::{analyse_pinned, level_adj, PidPriorityInfo, PriorityLevel};
use std::collections::HashMap;

type NodeIdx = usize;

#[derive(Debug, Clone)]
struct Node {
    info: PidPriorityInfo,
    is_foreground: bool,
    is_home: bool,
    prev: Option<NodeIdx>,
    next: Option<NodeIdx>,
}

/// Doubly-linked ordered list of tracked pids: `[foreground head] ...
/// [background_pos pivot] ... [background tail]`.
#[derive(Debug, Default)]
pub struct PriorityList {
    arena: Vec<Option<Node>>,
    free: Vec<NodeIdx>,
    by_pid: HashMap<i32, NodeIdx>,
    head: Option<NodeIdx>,
    tail: Option<NodeIdx>,
    /// First background node; `None` means no background node exists yet
    /// (inserts fall through to the tail).
    background_pos: Option<NodeIdx>,
}

impl PriorityList {
    pub fn new() -> Self {
        PriorityList::default()
    }

    pub fn contains(&self, pid: i32) -> bool {
        self.by_pid.contains_key(&pid)
    }

    pub fn get(&self, pid: i32) -> Option<&PidPriorityInfo> {
        let idx = *self.by_pid.get(&pid)?;
        self.node_ref(idx).map(|n| &n.info)
    }

    /// Arena lookup by index. Every index reachable from `by_pid` or a
    /// live `prev`/`next` link is always `Some` as long as `unlink`/`remove`
    /// keep the list's own bookkeeping in sync; callers treat a `None` here
    /// as "nothing more to do" rather than asserting it can't happen.
    fn node_ref(&self, idx: NodeIdx) -> Option<&Node> {
        self.arena.get(idx).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut Node> {
        self.arena.get_mut(idx).and_then(|slot| slot.as_mut())
    }

    /// `add(pid, is_foreground, level)`: insert at head if foreground, else
    /// just before `background_pos` (or at tail if none).
    pub fn add(&mut self, pid: i32, is_foreground: bool, level: PriorityLevel) {
        if self.contains(pid) {
            return;
        }
        let info = PidPriorityInfo::new(pid, level);
        let idx = self.alloc(Node { info, is_foreground, is_home: false, prev: None, next: None });
        self.by_pid.insert(pid, idx);
        if is_foreground {
            self.link_at_head(idx);
        } else {
            self.link_before_background_pos(idx);
        }
    }

    /// Marks `pid`'s node as the home task anchor (used once, at boot).
    pub fn mark_home(&mut self, pid: i32) {
        if let Some(&idx) = self.by_pid.get(&pid) {
            if let Some(node) = self.arena[idx].as_mut() {
                node.is_home = true;
            }
            if self.background_pos.is_none() {
                self.background_pos = Some(idx);
            }
        }
    }

    /// `push_foreground(pid)`: unlink and move to head; update
    /// `background_pos` if the node crossed it; update `last_wake_clock`.
    pub fn push_foreground(&mut self, pid: i32, now_ms: u64) {
        let Some(&idx) = self.by_pid.get(&pid) else { return };
        if self.background_pos == Some(idx) {
            self.background_pos = self.arena[idx].as_ref().and_then(|n| n.next);
        }
        self.unlink(idx);
        if let Some(node) = self.arena[idx].as_mut() {
            node.is_foreground = true;
            node.info.last_wake_clock_ms = now_ms;
        }
        self.link_at_head(idx);
    }

    /// `into_background(pid)`: unlink and move to just-before
    /// `background_pos` (or to tail if none).
    pub fn into_background(&mut self, pid: i32) {
        let Some(&idx) = self.by_pid.get(&pid) else { return };
        self.unlink(idx);
        if let Some(node) = self.arena[idx].as_mut() {
            node.is_foreground = false;
        }
        self.link_before_background_pos(idx);
    }

    /// `remove(pid)`: unlink, free the node. Returns `true` if it existed.
    pub fn remove(&mut self, pid: i32) -> bool {
        let Some(idx) = self.by_pid.remove(&pid) else { return false };
        if self.background_pos == Some(idx) {
            self.background_pos = self.arena[idx].as_ref().and_then(|n| n.next);
        }
        self.unlink(idx);
        self.arena[idx] = None;
        self.free.push(idx);
        true
    }

    /// `analyse()`: recompute the oom score for every node in list order.
    /// Foreground/home/persistent nodes are scored directly; background
    /// nodes are grouped by declared level with a per-level counter.
    pub fn analyse(&mut self) {
        let mut counters: HashMap<PriorityLevel, u32> = HashMap::new();
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some((is_foreground, is_home, is_persistent, level)) = self
                .node_ref(idx)
                .map(|node| (node.is_foreground, node.is_home, node.info.is_persistent, node.info.level))
            else {
                break;
            };
            let score = if is_foreground || is_home || is_persistent {
                analyse_pinned(is_persistent, is_foreground, is_home)
            } else {
                let counter = counters.entry(level).or_insert(0);
                let score = level_adj(level, *counter);
                *counter += 1;
                score
            };
            let Some(node) = self.node_mut(idx) else { break };
            node.info.oom_score = score;
            cursor = node.next;
        }
    }

    /// Pids in head-to-tail order whose oom score is `>= threshold`.
    pub fn pids_at_or_above(&self, threshold: i32) -> Vec<i32> {
        let mut result = Vec::new();
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(node) = self.node_ref(idx) else { break };
            if node.info.oom_score >= threshold {
                result.push(node.info.pid);
            }
            cursor = node.next;
        }
        result
    }

    pub fn len(&self) -> usize {
        self.by_pid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pid.is_empty()
    }

    /// Head-to-tail snapshot, for `dump` diagnostics and tests.
    pub fn ordered(&self) -> Vec<PidPriorityInfo> {
        let mut result = Vec::new();
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(node) = self.node_ref(idx) else { break };
            result.push(node.info);
            cursor = node.next;
        }
        result
    }

    fn alloc(&mut self, node: Node) -> NodeIdx {
        if let Some(idx) = self.free.pop() {
            self.arena[idx] = Some(node);
            idx
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    fn unlink(&mut self, idx: NodeIdx) {
        let Some((prev, next)) = self.node_ref(idx).map(|node| (node.prev, node.next)) else { return };
        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn link_at_head(&mut self, idx: NodeIdx) {
        match self.head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(idx);
                }
                if let Some(node) = self.node_mut(idx) {
                    node.next = Some(h);
                }
            }
            None => {
                self.tail = Some(idx);
            }
        }
        self.head = Some(idx);
    }

    fn link_before_background_pos(&mut self, idx: NodeIdx) {
        match self.background_pos {
            Some(pos) => {
                let prev = self.node_ref(pos).and_then(|node| node.prev);
                if let Some(node) = self.node_mut(idx) {
                    node.prev = prev;
                    node.next = Some(pos);
                }
                if let Some(node) = self.node_mut(pos) {
                    node.prev = Some(idx);
                }
                match prev {
                    Some(p) => {
                        if let Some(node) = self.node_mut(p) {
                            node.next = Some(idx);
                        }
                    }
                    None => self.head = Some(idx),
                }
            }
            None => self.link_at_tail(idx),
        }
    }

    fn link_at_tail(&mut self, idx: NodeIdx) {
        match self.tail {
            Some(t) => {
                if let Some(node) = self.node_mut(t) {
                    node.next = Some(idx);
                }
                if let Some(node) = self.node_mut(idx) {
                    node.prev = Some(t);
                }
            }
            None => {
                self.head = Some(idx);
            }
        }
        self.tail = Some(idx);
    }
}

#[cfg(test)]
#[path = "priority_list_tests.rs"]
mod tests;

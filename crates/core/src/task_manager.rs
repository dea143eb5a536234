// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TaskManager`: the common contract implemented by the Standard back-stack
//! manager (with its home-task pivot) and the SystemUI overlay manager.
//!
//! Both managers own an ordered list of [`ActivityStack`]s and drive their
//! member activities through [`crate::driver`]; neither owns the primary
//! activity records, which stay in the [`Registry`].

use crate::activity::{ActivityRecord, ActivityStatus, ActivityToken, StableState};
use crate::app::EndpointToken;
use crate::driver;
use crate::effect::Effect;
use crate::intent::{Intent, IntentFlags};
use crate::lifecycle::next_step;
use crate::pending::{PendingTaskBoard, TaskLabel};
use crate::registry::Registry;
use crate::task::ActivityStack;
use std::collections::HashMap;

/// Cross-manager notifications that aren't client status reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskManagerEvent {
    /// The Standard manager just resumed an activity in front — overlays
    /// sitting over the foreground app are taken down.
    StandardActivityStarted,
}

/// Common contract for the Standard and SystemUI task managers.
pub trait TaskManager {
    fn switch_task_to_active(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        intent: Intent,
        now_ms: u64,
    ) -> Vec<Effect>;

    fn move_task_to_background(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        now_ms: u64,
    ) -> Vec<Effect>;

    fn push_new_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        new_activity: ActivityRecord,
        flags: IntentFlags,
        now_ms: u64,
    ) -> Vec<Effect>;

    fn turn_to_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        act: ActivityToken,
        intent: Intent,
        flags: IntentFlags,
        now_ms: u64,
    ) -> Vec<Effect>;

    fn finish_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        act: ActivityToken,
        now_ms: u64,
    ) -> Vec<Effect>;

    fn delete_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        act: ActivityToken,
        now_ms: u64,
    ) -> Vec<Effect>;

    fn get_active_task(&self) -> Option<&str>;

    fn find_task(&self, task_tag: &str) -> Option<&ActivityStack>;

    fn on_event(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        event: TaskManagerEvent,
        now_ms: u64,
    ) -> Vec<Effect>;

    /// Called once the activity this manager was waiting on to resume has
    /// settled into `RESUMED`; completes any deferred task reordering.
    fn on_activity_resumed(&mut self, token: ActivityToken) -> Vec<Effect>;
}

fn endpoint_of(registry: &Registry, pid: i32) -> Option<EndpointToken> {
    registry.app(pid).map(|a| a.endpoint)
}

/// Drives `token` one step toward `target`, reading its current status from
/// the registry.
fn drive(
    registry: &mut Registry,
    board: &mut PendingTaskBoard,
    token: ActivityToken,
    target: StableState,
    now_ms: u64,
) -> Vec<Effect> {
    let Some(activity) = registry.activity(token) else { return Vec::new() };
    let Some(endpoint) = endpoint_of(registry, activity.pid) else { return Vec::new() };
    let current = activity.status.stable();
    driver::advance(registry, board, endpoint, token, current, target, now_ms)
}

/// Launches a brand-new activity and drives it toward `target`.
fn launch(
    registry: &mut Registry,
    board: &mut PendingTaskBoard,
    token: ActivityToken,
    target: StableState,
    now_ms: u64,
) -> Vec<Effect> {
    let Some(activity) = registry.activity(token) else { return Vec::new() };
    let Some(endpoint) = endpoint_of(registry, activity.pid) else { return Vec::new() };
    driver::begin(registry, board, endpoint, token, target, now_ms)
}

/// Destroys a live activity without a client round-trip — used for
/// `CLEAR_TASK`/`CLEAR_TOP` housekeeping where the removed activities are
/// not expected to be interacted with again.
fn force_destroy(registry: &mut Registry, board: &mut PendingTaskBoard, token: ActivityToken) {
    registry.remove_activity(token);
    let event = crate::pending::TaskEvent::activity_status_report(token, ActivityStatus::Destroyed);
    board.trigger(&event);
}

/// Commits a bookkeeping/timeout marker for an activity resume; the real
/// continuation is driven by the owning manager's `on_activity_resumed`.
fn commit_wait_resume(board: &mut PendingTaskBoard, token: ActivityToken, now_ms: u64) {
    board.commit(TaskLabel::activity_wait_resume(token), Box::new(driver::StatusWaitMarker), None, now_ms);
}

/// The standard back-stack manager: an ordered task list with the home task
/// fixed as a pivot — `[active] .. [foreground tasks] .. [home] .. [background tasks]`.
#[derive(Default)]
pub struct StandardTaskManager {
    all_tasks: Vec<ActivityStack>,
    home_tag: Option<String>,
    /// Activities `switch_task_to_active` is waiting on to resume before it
    /// moves their task to the front.
    pending_resume: HashMap<ActivityToken, String>,
}

impl StandardTaskManager {
    pub fn new() -> Self {
        StandardTaskManager::default()
    }

    /// Seeds the home task: creates and resumes its root activity, marks it
    /// foreground, and installs it as the sole initial task.
    pub fn init_home_task(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        activity: ActivityRecord,
        now_ms: u64,
    ) -> Vec<Effect> {
        let task_tag = activity.task_tag.clone();
        let token = activity.token;
        registry.insert_activity(activity);

        let mut stack = ActivityStack::new(task_tag.clone());
        stack.push(token);
        stack.foreground = true;
        self.all_tasks.insert(0, stack);
        self.home_tag = Some(task_tag);

        launch(registry, board, token, StableState::Resume, now_ms)
    }

    fn index_of(&self, task_tag: &str) -> Option<usize> {
        self.all_tasks.iter().position(|t| t.task_tag == task_tag)
    }

    fn index_of_activity(&self, token: ActivityToken) -> Option<usize> {
        self.all_tasks.iter().position(|t| t.contains(token))
    }

    /// Moves `task_tag` to the front of `all_tasks`, marking it foreground
    /// and backgrounding every task other than the home pivot.
    fn move_task_to_front(&mut self, task_tag: &str) {
        let Some(idx) = self.index_of(task_tag) else { return };
        let task = self.all_tasks.remove(idx);
        let home_tag = self.home_tag.clone();
        for other in self.all_tasks.iter_mut() {
            if Some(other.task_tag.as_str()) != home_tag.as_deref() {
                other.foreground = false;
            }
        }
        let mut task = task;
        task.foreground = true;
        self.all_tasks.insert(0, task);
    }

    fn ensure_task(&mut self, task_tag: &str) -> usize {
        if let Some(idx) = self.index_of(task_tag) {
            return idx;
        }
        self.all_tasks.insert(0, ActivityStack::new(task_tag.to_string()));
        0
    }

    /// Pid that owns the front (active) task's top activity, for the
    /// process-priority list's foreground head — §4.6.
    pub fn foreground_pid(&self, registry: &Registry) -> Option<i32> {
        let token = self.all_tasks.first()?.top()?;
        registry.activity(token).map(|a| a.pid)
    }

    /// Pids owning every non-active, non-home task's top activity, for the
    /// priority list's background band.
    pub fn background_pids(&self, registry: &Registry) -> Vec<i32> {
        self.all_tasks
            .iter()
            .skip(1)
            .filter(|t| Some(t.task_tag.as_str()) != self.home_tag.as_deref())
            .filter_map(|t| t.top())
            .filter_map(|token| registry.activity(token).map(|a| a.pid))
            .collect()
    }
}

impl TaskManager for StandardTaskManager {
    fn switch_task_to_active(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        intent: Intent,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of(task_tag) else { return Vec::new() };
        if idx == 0 {
            return Vec::new();
        }
        let mut effects = Vec::new();

        if let Some(old_top) = self.all_tasks[0].top() {
            effects.extend(drive(registry, board, old_top, StableState::Pause, now_ms));
        }

        let Some(new_top) = self.all_tasks[idx].top() else { return effects };
        let endpoint = registry.activity(new_top).and_then(|a| endpoint_of(registry, a.pid));
        if let Some(activity) = registry.activity_mut(new_top) {
            activity.intent = intent.clone();
        }
        let current = registry.activity(new_top).map(|a| a.status.stable());
        match current.and_then(|c| next_step(c, StableState::Resume)) {
            Some(_) => {
                effects.extend(drive(registry, board, new_top, StableState::Resume, now_ms));
                commit_wait_resume(board, new_top, now_ms);
                self.pending_resume.insert(new_top, task_tag.to_string());
            }
            None => {
                if let Some(endpoint) = endpoint {
                    effects.push(Effect::DeliverNewIntent { endpoint, token: new_top, intent });
                }
                self.move_task_to_front(task_tag);
            }
        }
        effects
    }

    fn move_task_to_background(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        now_ms: u64,
    ) -> Vec<Effect> {
        if self.index_of(task_tag) != Some(0) {
            return Vec::new();
        }
        let replacement = self
            .home_tag
            .clone()
            .filter(|h| h != task_tag)
            .or_else(|| self.all_tasks.iter().find(|t| t.task_tag != task_tag).map(|t| t.task_tag.clone()));

        let mut effects = Vec::new();
        if let Some(replacement) = replacement {
            self.move_task_to_front(&replacement);
            if let Some(top) = self.all_tasks[0].top() {
                effects.extend(drive(registry, board, top, StableState::Resume, now_ms));
            }
        }
        if let Some(task) = self.all_tasks.iter_mut().find(|t| t.task_tag == task_tag) {
            task.foreground = false;
        }
        effects
    }

    fn push_new_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        new_activity: ActivityRecord,
        flags: IntentFlags,
        now_ms: u64,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(old_top) = self.all_tasks.first().and_then(|t| t.top()) {
            effects.extend(drive(registry, board, old_top, StableState::Pause, now_ms));
        }

        let idx = self.ensure_task(task_tag);
        if flags.contains(IntentFlags::CLEAR_TASK) {
            let drained = self.all_tasks[idx].drain_all();
            for token in drained {
                force_destroy(registry, board, token);
            }
        }

        let token = new_activity.token;
        registry.insert_activity(new_activity);
        self.all_tasks[idx].push(token);

        effects.extend(launch(registry, board, token, StableState::Resume, now_ms));
        commit_wait_resume(board, token, now_ms);
        self.move_task_to_front(task_tag);
        effects
    }

    fn turn_to_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        act: ActivityToken,
        intent: Intent,
        flags: IntentFlags,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of(task_tag) else { return Vec::new() };
        let mut effects = Vec::new();
        let is_top = self.all_tasks[idx].top() == Some(act);

        if !is_top {
            if flags.contains(IntentFlags::CLEAR_TOP) {
                let above = self.all_tasks[idx].split_off_above(act);
                for token in above {
                    force_destroy(registry, board, token);
                }
            }
            if let Some(old_top) = self.all_tasks.first().and_then(|t| t.top()).filter(|t| *t != act) {
                effects.extend(drive(registry, board, old_top, StableState::Pause, now_ms));
            }
        }

        let endpoint = registry.activity(act).and_then(|a| endpoint_of(registry, a.pid));
        if let Some(activity) = registry.activity_mut(act) {
            activity.intent = intent.clone();
        }
        let current = registry.activity(act).map(|a| a.status.stable());
        match current.and_then(|c| next_step(c, StableState::Resume)) {
            Some(_) => effects.extend(drive(registry, board, act, StableState::Resume, now_ms)),
            None => {
                if let Some(endpoint) = endpoint {
                    effects.push(Effect::DeliverNewIntent { endpoint, token: act, intent });
                }
            }
        }
        commit_wait_resume(board, act, now_ms);
        self.move_task_to_front(task_tag);
        effects
    }

    fn finish_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        act: ActivityToken,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of_activity(act) else { return Vec::new() };
        let mut effects = Vec::new();

        let above = self.all_tasks[idx].split_off_above(act);
        for token in above {
            effects.extend(drive(registry, board, token, StableState::Destroy, now_ms));
        }
        self.all_tasks[idx].remove(act);
        effects.extend(drive(registry, board, act, StableState::Destroy, now_ms));

        if idx == 0 {
            match self.all_tasks[0].top() {
                Some(new_top) => effects.extend(drive(registry, board, new_top, StableState::Resume, now_ms)),
                None => {
                    if self.home_tag.as_deref() != Some(self.all_tasks[0].task_tag.as_str()) {
                        self.all_tasks.remove(0);
                    }
                    if let Some(new_top) = self.all_tasks.first().and_then(|t| t.top()) {
                        effects.extend(drive(registry, board, new_top, StableState::Resume, now_ms));
                    }
                }
            }
        }
        effects
    }

    fn delete_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        act: ActivityToken,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of_activity(act) else { return Vec::new() };
        let mut effects = Vec::new();

        let above = self.all_tasks[idx].split_off_above(act);
        for token in above {
            force_destroy(registry, board, token);
        }
        self.all_tasks[idx].remove(act);
        force_destroy(registry, board, act);

        if idx == 0 {
            match self.all_tasks[0].top() {
                Some(new_top) => effects.extend(drive(registry, board, new_top, StableState::Resume, now_ms)),
                None => {
                    if self.home_tag.as_deref() != Some(self.all_tasks[0].task_tag.as_str()) {
                        self.all_tasks.remove(0);
                    }
                    if let Some(new_top) = self.all_tasks.first().and_then(|t| t.top()) {
                        effects.extend(drive(registry, board, new_top, StableState::Resume, now_ms));
                    }
                }
            }
        }
        effects
    }

    fn get_active_task(&self) -> Option<&str> {
        self.all_tasks.first().map(|t| t.task_tag.as_str())
    }

    fn find_task(&self, task_tag: &str) -> Option<&ActivityStack> {
        self.all_tasks.iter().find(|t| t.task_tag == task_tag)
    }

    fn on_event(
        &mut self,
        _registry: &mut Registry,
        _board: &mut PendingTaskBoard,
        _event: TaskManagerEvent,
        _now_ms: u64,
    ) -> Vec<Effect> {
        Vec::new()
    }

    fn on_activity_resumed(&mut self, token: ActivityToken) -> Vec<Effect> {
        if let Some(tag) = self.pending_resume.remove(&token) {
            self.move_task_to_front(&tag);
        }
        Vec::new()
    }
}

/// The SystemUI overlay manager: a flat list of overlay tasks whose
/// activities resume and stop together and do not pause each other. Always
/// sits above the foreground app, torn down when the app in front changes.
#[derive(Default)]
pub struct SystemUiTaskManager {
    tasks: Vec<ActivityStack>,
}

impl SystemUiTaskManager {
    pub fn new() -> Self {
        SystemUiTaskManager::default()
    }

    fn index_of(&self, task_tag: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.task_tag == task_tag)
    }

    fn index_of_activity(&self, token: ActivityToken) -> Option<usize> {
        self.tasks.iter().position(|t| t.contains(token))
    }
}

impl TaskManager for SystemUiTaskManager {
    fn switch_task_to_active(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        intent: Intent,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of(task_tag) else { return Vec::new() };
        let mut effects = Vec::new();
        for token in self.tasks[idx].iter().collect::<Vec<_>>() {
            if let Some(activity) = registry.activity_mut(token) {
                activity.intent = intent.clone();
            }
            effects.extend(drive(registry, board, token, StableState::Resume, now_ms));
        }
        effects
    }

    fn move_task_to_background(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of(task_tag) else { return Vec::new() };
        let mut effects = Vec::new();
        for token in self.tasks[idx].iter().collect::<Vec<_>>() {
            effects.extend(drive(registry, board, token, StableState::Stop, now_ms));
        }
        self.tasks[idx].foreground = false;
        effects
    }

    fn push_new_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        task_tag: &str,
        new_activity: ActivityRecord,
        _flags: IntentFlags,
        now_ms: u64,
    ) -> Vec<Effect> {
        let idx = match self.index_of(task_tag) {
            Some(idx) => idx,
            None => {
                self.tasks.push(ActivityStack::new(task_tag.to_string()));
                self.tasks.len() - 1
            }
        };
        let token = new_activity.token;
        registry.insert_activity(new_activity);
        self.tasks[idx].push(token);
        self.tasks[idx].foreground = true;
        launch(registry, board, token, StableState::Resume, now_ms)
    }

    fn turn_to_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        _task_tag: &str,
        act: ActivityToken,
        intent: Intent,
        _flags: IntentFlags,
        now_ms: u64,
    ) -> Vec<Effect> {
        if let Some(activity) = registry.activity_mut(act) {
            activity.intent = intent;
        }
        drive(registry, board, act, StableState::Resume, now_ms)
    }

    fn finish_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        act: ActivityToken,
        now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of_activity(act) else { return Vec::new() };
        self.tasks[idx].remove(act);
        let effects = drive(registry, board, act, StableState::Destroy, now_ms);
        if self.tasks[idx].is_empty() {
            self.tasks.remove(idx);
        }
        effects
    }

    fn delete_activity(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        act: ActivityToken,
        _now_ms: u64,
    ) -> Vec<Effect> {
        let Some(idx) = self.index_of_activity(act) else { return Vec::new() };
        self.tasks[idx].remove(act);
        force_destroy(registry, board, act);
        if self.tasks[idx].is_empty() {
            self.tasks.remove(idx);
        }
        Vec::new()
    }

    fn get_active_task(&self) -> Option<&str> {
        // `get_active_task` only has `&self`, so the resumed-root check the
        // spec describes is tracked via the `foreground` flag set at push
        // time rather than re-querying activity status from the registry.
        self.tasks.iter().find(|t| t.foreground).map(|t| t.task_tag.as_str())
    }

    fn find_task(&self, task_tag: &str) -> Option<&ActivityStack> {
        self.tasks.iter().find(|t| t.task_tag == task_tag)
    }

    fn on_event(
        &mut self,
        registry: &mut Registry,
        board: &mut PendingTaskBoard,
        event: TaskManagerEvent,
        now_ms: u64,
    ) -> Vec<Effect> {
        match event {
            TaskManagerEvent::StandardActivityStarted => {
                let mut effects = Vec::new();
                for task in self.tasks.iter() {
                    for token in task.iter() {
                        effects.extend(drive(registry, board, token, StableState::Stop, now_ms));
                    }
                }
                effects
            }
        }
    }

    fn on_activity_resumed(&mut self, _token: ActivityToken) -> Vec<Effect> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "task_manager_tests.rs"]
mod tests;

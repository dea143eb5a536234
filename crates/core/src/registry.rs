// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The primary ownership index: live [`AppRecord`]s by pid, the
//! package-name-to-pid "attaching" mapping used while a process is being
//! spawned but hasn't yet called `attachApplication`, and the strong
//! `activity_map`/`service_map` that every other structure (task stacks,
//! `CallerRef`s, pending-task labels) only ever references by token.
//!
//! This is an `Rc`-free ownership design: a back-reference is a
//! `Token`/`pid` value, never a second copy of the record.

use crate::activity::{ActivityRecord, ActivityToken};
use crate::app::AppRecord;
use crate::caller::CallerRef;
use crate::intent::IntentFlags;
use crate::service::{ServiceRecord, ServiceToken};
use std::collections::{HashMap, HashSet, VecDeque};

/// A launch request queued against a package while its process is being
/// spawned, replayed once `attach_application` confirms the real pid.
///
/// Plain data rather than a closure: nothing here can call back into the
/// registry or task managers on its own (see `driver`'s doc comment for why),
/// so the manager that owns those replays the launch itself once it drains
/// this queue.
#[derive(Debug, Clone)]
pub enum PendingLaunch {
    Activity { record: ActivityRecord, task_tag: String, flags: IntentFlags },
    StartService { record: ServiceRecord },
    BindService { record: ServiceRecord, caller: CallerRef },
}

/// The application record set, task-record primary index, and the
/// attaching-process bookkeeping for in-flight spawns.
#[derive(Default)]
pub struct Registry {
    apps: HashMap<i32, AppRecord>,
    app_activities: HashMap<i32, HashSet<ActivityToken>>,
    app_services: HashMap<i32, HashSet<ServiceToken>>,

    activities: HashMap<ActivityToken, ActivityRecord>,
    services: HashMap<ServiceToken, ServiceRecord>,

    /// `package_name -> pid` once the spawner has reported a pid but the
    /// client hasn't yet called `attachApplication`.
    attaching_pid_by_package: HashMap<String, i32>,
    attaching_package_by_pid: HashMap<i32, String>,
    /// Launch requests queued against a package while its process is being
    /// spawned (pid not yet known). Drained in full once `attach_application`
    /// confirms the pid — the spec's "runs every queued closure".
    pending_launches: HashMap<String, VecDeque<PendingLaunch>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    // === Apps ===

    pub fn app(&self, pid: i32) -> Option<&AppRecord> {
        self.apps.get(&pid)
    }

    pub fn app_mut(&mut self, pid: i32) -> Option<&mut AppRecord> {
        self.apps.get_mut(&pid)
    }

    pub fn app_by_package(&self, package_name: &str) -> Option<&AppRecord> {
        self.apps.values().find(|a| a.package_name == package_name)
    }

    pub fn insert_app(&mut self, app: AppRecord) {
        let pid = app.pid;
        self.apps.insert(pid, app);
        self.app_activities.entry(pid).or_default();
        self.app_services.entry(pid).or_default();
    }

    /// Removes the app and returns its still-owned activity/service tokens
    /// for the caller to drive through `abnormal_exit`.
    pub fn remove_app(&mut self, pid: i32) -> Option<(AppRecord, Vec<ActivityToken>, Vec<ServiceToken>)> {
        let app = self.apps.remove(&pid)?;
        let activities = self.app_activities.remove(&pid).unwrap_or_default().into_iter().collect();
        let services = self.app_services.remove(&pid).unwrap_or_default().into_iter().collect();
        Some((app, activities, services))
    }

    pub fn is_app_live(&self, pid: i32) -> bool {
        self.apps.contains_key(&pid)
    }

    // === Attaching bookkeeping ===

    /// Whether `package_name` has an outstanding spawn (pid pending) or a
    /// spawned-but-not-yet-attached process.
    pub fn is_attaching(&self, package_name: &str) -> bool {
        self.attaching_pid_by_package.contains_key(package_name)
            || self.pending_launches.get(package_name).is_some_and(|q| !q.is_empty())
    }

    /// Queues a launch request for `package_name`, to replay once a spawned
    /// process for it calls `attachApplication`.
    pub fn queue_launch(&mut self, package_name: impl Into<String>, launch: PendingLaunch) {
        self.pending_launches.entry(package_name.into()).or_default().push_back(launch);
    }

    /// The spawner reported a pid for `package_name`.
    pub fn claim_spawned_pid(&mut self, package_name: &str, pid: i32) {
        self.attaching_pid_by_package.insert(package_name.to_string(), pid);
        self.attaching_package_by_pid.insert(pid, package_name.to_string());
    }

    /// Drains every queued launch request for `package_name`, in FIFO order
    /// — used when only one process is ever spawning for this package at a
    /// time, so every queued request belongs to the pid that just attached.
    pub fn drain_launches(&mut self, package_name: &str) -> Vec<PendingLaunch> {
        self.pending_launches.remove(package_name).map(Vec::from).unwrap_or_default()
    }

    /// Pops the single oldest queued launch request — used for
    /// multi-task packages, where each concurrent spawn pairs with the
    /// oldest unclaimed request rather than replaying the whole queue.
    pub fn take_next_launch(&mut self, package_name: &str) -> Option<PendingLaunch> {
        self.pending_launches.get_mut(package_name)?.pop_front()
    }

    /// Resolves and clears the attaching mapping for `pid`, once
    /// `attachApplication` arrives.
    pub fn take_attaching_package(&mut self, pid: i32) -> Option<String> {
        let package_name = self.attaching_package_by_pid.remove(&pid)?;
        self.attaching_pid_by_package.remove(&package_name);
        Some(package_name)
    }

    // === Activities ===

    pub fn insert_activity(&mut self, activity: ActivityRecord) {
        let pid = activity.pid;
        let token = activity.token;
        self.app_activities.entry(pid).or_default().insert(token);
        self.activities.insert(token, activity);
    }

    pub fn activity(&self, token: ActivityToken) -> Option<&ActivityRecord> {
        self.activities.get(&token)
    }

    pub fn activity_mut(&mut self, token: ActivityToken) -> Option<&mut ActivityRecord> {
        self.activities.get_mut(&token)
    }

    pub fn find_activity_by_unique_name(&self, unique_name: &str) -> Option<&ActivityRecord> {
        self.activities.values().find(|a| a.unique_name == unique_name)
    }

    /// Drops the activity from the primary index once it's DESTROYED and
    /// popped from its task stack — the last owning reference.
    pub fn remove_activity(&mut self, token: ActivityToken) -> Option<ActivityRecord> {
        let activity = self.activities.remove(&token)?;
        if let Some(set) = self.app_activities.get_mut(&activity.pid) {
            set.remove(&token);
        }
        Some(activity)
    }

    pub fn activities_of_app(&self, pid: i32) -> impl Iterator<Item = ActivityToken> + '_ {
        self.app_activities.get(&pid).into_iter().flatten().copied()
    }

    pub fn activities(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.activities.values()
    }

    // === Services ===

    pub fn insert_service(&mut self, service: ServiceRecord) {
        let pid = service.pid;
        let token = service.token;
        self.app_services.entry(pid).or_default().insert(token);
        self.services.insert(token, service);
    }

    pub fn service(&self, token: ServiceToken) -> Option<&ServiceRecord> {
        self.services.get(&token)
    }

    pub fn service_mut(&mut self, token: ServiceToken) -> Option<&mut ServiceRecord> {
        self.services.get_mut(&token)
    }

    pub fn find_service_by_unique_name(&self, unique_name: &str) -> Option<&ServiceRecord> {
        self.services.values().find(|s| s.unique_name == unique_name)
    }

    pub fn remove_service(&mut self, token: ServiceToken) -> Option<ServiceRecord> {
        let service = self.services.remove(&token)?;
        if let Some(set) = self.app_services.get_mut(&service.pid) {
            set.remove(&token);
        }
        Some(service)
    }

    pub fn services_of_app(&self, pid: i32) -> impl Iterator<Item = ServiceToken> + '_ {
        self.app_services.get(&pid).into_iter().flatten().copied()
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.services.values()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

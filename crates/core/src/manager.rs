// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ActivityManager`: the top-level aggregate wiring the registry, the two
//! task managers, the intent router, the broadcast registry, the process
//! priority list, and the pending-task board into the external interface
//! the transport calls into.
//!
//! Every method here is pure orchestration: it mutates the aggregate's own
//! state and returns the `Effect`s the daemon's executor must perform. No
//! I/O happens in this crate.

use crate::activity::{ActivityRecord, ActivityStatus, ActivityToken, LaunchMode, StableState};
use crate::app::{AppRecord, AppStatus, EndpointToken};
use crate::broadcast::ReceiverRegistry;
use crate::caller::CallerRef;
use crate::driver;
use crate::effect::{ActivityOrServiceRef, Effect};
use crate::errors::{ServiceError, ServiceResult};
use crate::intent::{ComponentType, Intent, IntentFlags};
use crate::lmk;
use crate::package::{IntentActionTable, PackageDirectory, PackageInfo};
use crate::pending::TaskEvent;
use crate::priority::{LmkThreshold, PriorityLevel};
use crate::priority_list::PriorityList;
use crate::registry::{PendingLaunch, Registry};
use crate::router::{self, LaunchPlan, Resolved};
use crate::runmode::RunMode;
use crate::service::{ServiceConnection, ServiceRecord, ServiceStatus, ServiceToken};
use crate::task_manager::{StandardTaskManager, SystemUiTaskManager, TaskManager, TaskManagerEvent};
use crate::timer::TimerId;

/// Static boot/package configuration the manager needs but that never
/// changes after startup — read from `DaemonConfig` by the caller.
#[derive(Debug, Clone, Default)]
pub struct BootConfig {
    pub home_package: String,
    pub boot_guide_package: Option<String>,
    pub usersetup_complete: bool,
}

/// The aggregate root: everything the external interface's methods need to
/// read or mutate to answer one inbound call.
pub struct ActivityManager {
    pub registry: Registry,
    pub board: crate::pending::PendingTaskBoard,
    pub standard: StandardTaskManager,
    pub system_ui: SystemUiTaskManager,
    pub receivers: ReceiverRegistry,
    pub packages: PackageDirectory,
    pub actions: IntentActionTable,
    pub priority: PriorityList,
    pub run_mode: RunMode,
    pub lmk_thresholds: Vec<LmkThreshold>,
    boot: BootConfig,
}

impl ActivityManager {
    pub fn new(run_mode: RunMode, boot: BootConfig, lmk_thresholds: Vec<LmkThreshold>) -> Self {
        ActivityManager {
            registry: Registry::new(),
            board: crate::pending::PendingTaskBoard::new(),
            standard: StandardTaskManager::new(),
            system_ui: SystemUiTaskManager::new(),
            receivers: ReceiverRegistry::new(),
            packages: PackageDirectory::new(),
            actions: IntentActionTable::new(),
            priority: PriorityList::new(),
            run_mode,
            lmk_thresholds,
            boot,
        }
    }

    // === Package directory maintenance (ambient — fed by the package manager) ===

    pub fn install_package(&mut self, info: PackageInfo) {
        for component in &info.components {
            for action in &component.actions {
                self.actions.register(action, component.component_type, component.class_name.clone());
            }
        }
        self.packages.insert(info);
    }

    pub fn uninstall_package(&mut self, package_name: &str) {
        self.packages.remove(package_name);
        self.actions.unregister_package(package_name);
    }

    fn task_manager_for(&mut self, is_system_ui: bool) -> &mut dyn TaskManager {
        if is_system_ui {
            &mut self.system_ui
        } else {
            &mut self.standard
        }
    }

    /// Same selection as `task_manager_for`, but also hands back disjoint
    /// borrows of the registry and pending-task board so the manager's
    /// methods that need all three don't fight the borrow checker over a
    /// single `&mut self`.
    fn task_manager_ctx(&mut self, is_system_ui: bool) -> (&mut dyn TaskManager, &mut Registry, &mut crate::pending::PendingTaskBoard) {
        let manager: &mut dyn TaskManager = if is_system_ui { &mut self.system_ui } else { &mut self.standard };
        (manager, &mut self.registry, &mut self.board)
    }

    fn is_system_ui_activity(&self, token: ActivityToken) -> bool {
        self.registry
            .activity(token)
            .and_then(|a| self.registry.app(a.pid))
            .is_some_and(|app| app.is_system_ui)
    }

    /// Pushes a freshly-resolved activity onto its task, seeding the
    /// Standard manager's home pivot the first time the home package's
    /// task comes into existence rather than treating it as an ordinary
    /// foreground task.
    fn push_activity(&mut self, is_system_ui: bool, task_tag: &str, record: ActivityRecord, flags: IntentFlags, now_ms: u64) -> Vec<Effect> {
        if !is_system_ui && task_tag == self.boot.home_package && self.standard.find_task(task_tag).is_none() {
            self.priority.mark_home(record.pid);
            return self.standard.init_home_task(&mut self.registry, &mut self.board, record, now_ms);
        }
        let (manager, registry, board) = self.task_manager_ctx(is_system_ui);
        manager.push_new_activity(registry, board, task_tag, record, flags, now_ms)
    }

    /// Reconciles the process-priority list's foreground/background split
    /// with the Standard manager's current task order — §4.6's
    /// `push_foreground`/`into_background` calls, driven by whichever task
    /// sits at the front after an operation that can change it.
    fn sync_priority(&mut self, now_ms: u64) {
        if let Some(pid) = self.standard.foreground_pid(&self.registry) {
            self.priority.push_foreground(pid, now_ms);
        }
        for pid in self.standard.background_pids(&self.registry) {
            self.priority.into_background(pid);
        }
    }

    // === Application lifecycle (4.5) ===

    /// The client's process just reported a pid for `package_name`
    /// (spawner confirmation) — pairs it with the attaching bookkeeping.
    pub fn process_spawned(&mut self, package_name: &str, pid: i32) {
        self.registry.claim_spawned_pid(package_name, pid);
    }

    pub fn attach_application(&mut self, pid: i32, uid: u32, endpoint: EndpointToken, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let package_name = self
            .registry
            .take_attaching_package(pid)
            .ok_or_else(|| ServiceError::InvalidOperation(format!("no attaching spawn for pid {pid}")))?;
        let is_system_ui = self.packages.get(&package_name).is_some_and(|p| p.is_system_ui);
        self.registry.insert_app(AppRecord::new(pid, uid, package_name.clone(), endpoint).system_ui(is_system_ui));
        self.priority.add(pid, false, PriorityLevel::Middle);

        let multi_task = self.packages.get(&package_name).is_some_and(|p| p.is_support_multi_task);
        let launches = if multi_task {
            self.registry.take_next_launch(&package_name).into_iter().collect::<Vec<_>>()
        } else {
            self.registry.drain_launches(&package_name)
        };

        let mut effects = Vec::new();
        for launch in launches {
            effects.extend(self.replay_launch(launch, pid, is_system_ui, now_ms));
        }

        let mut event = TaskEvent::app_attach(pid);
        event.multi_trigger = true;
        effects.extend(self.board.trigger(&event));
        Ok(effects)
    }

    fn replay_launch(&mut self, launch: PendingLaunch, pid: i32, is_system_ui: bool, now_ms: u64) -> Vec<Effect> {
        match launch {
            PendingLaunch::Activity { mut record, task_tag, flags } => {
                record.pid = pid;
                self.push_activity(is_system_ui, &task_tag, record, flags, now_ms)
            }
            PendingLaunch::StartService { mut record } => {
                record.pid = pid;
                record.started = true;
                self.begin_service(record, now_ms)
            }
            PendingLaunch::BindService { mut record, caller } => {
                record.pid = pid;
                record.connections.push(ServiceConnection { caller });
                self.begin_service(record, now_ms)
            }
        }
    }

    /// `proc_app_terminated`: the spawner/signal handler reported `pid` has
    /// exited. Drains its activities/services without a client round-trip,
    /// broadcasts the exit, and relaunches home if the foreground task list
    /// emptied out from under the user.
    pub fn proc_app_terminated(&mut self, pid: i32, now_ms: u64) -> Vec<Effect> {
        let Some((mut app, activities, services)) = self.registry.remove_app(pid) else { return Vec::new() };
        app.status = AppStatus::Stopped;
        self.priority.remove(pid);

        let mut effects = Vec::new();
        for token in activities {
            let (manager, registry, board) = self.task_manager_ctx(app.is_system_ui);
            effects.extend(manager.delete_activity(registry, board, token, now_ms));
        }
        for token in services {
            self.registry.remove_service(token);
            let mut event = TaskEvent::service_status_report(token, ServiceStatus::Destroyed);
            event.multi_trigger = true;
            effects.extend(self.board.trigger(&event));
        }

        let app_exit = Intent::with_action(crate::intent::BROADCAST_APP_EXIT).set_flags(IntentFlags::empty()).with_data(app.package_name.clone());
        effects.extend(self.broadcast_to_receivers(app_exit.clone()));
        effects.extend(self.deliver_to_declared_targets(&app_exit));

        if self.run_mode == RunMode::Normal && self.standard.get_active_task().is_none() {
            effects.extend(self.launch_home(now_ms));
        }
        effects
    }

    // === Activities (4.4, 6) ===

    pub fn start_activity(&mut self, caller: CallerRef, intent: Intent, request_code: i32, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        if intent.is_system_target() {
            return self.start_activity_at_system_sink(&intent, now_ms);
        }

        let resolved = router::resolve_component(&intent, ComponentType::Activity, &self.packages, &self.actions)?;
        let (caller_mode, caller_task_tag) = self.caller_activity_context(&caller);
        let plan = router::plan_launch(&resolved, intent.flags(), caller, caller_mode, caller_task_tag.as_deref());

        let target_is_system_ui = resolved.component.component_type == ComponentType::Activity && self.packages.get(&resolved.package_name).is_some_and(|p| p.is_system_ui);

        // SINGLE_TOP only reuses when the existing instance is already the
        // top of the *caller's* task; SINGLE_TASK/SINGLE_INSTANCE reuse an
        // instance anywhere, clearing everything above it first.
        let single_top_requested = plan.launch_mode == LaunchMode::SingleTop || intent.flags().contains(IntentFlags::SINGLE_TOP);
        if single_top_requested {
            if let Some(existing) = self.registry.find_activity_by_unique_name(&resolved.component.class_name) {
                let token = existing.token;
                let task_tag = existing.task_tag.clone();
                let is_top = self.task_manager_for(target_is_system_ui).find_task(&task_tag).and_then(|t| t.top()) == Some(token);
                let is_callers_task = caller_task_tag.as_deref() == Some(task_tag.as_str());
                if is_top && is_callers_task {
                    let (manager, registry, board) = self.task_manager_ctx(target_is_system_ui);
                    return Ok(manager.turn_to_activity(registry, board, &task_tag, token, intent, plan.flags, now_ms));
                }
            }
        } else if matches!(plan.launch_mode, LaunchMode::SingleTask | LaunchMode::SingleInstance) {
            if let Some(existing) = self.registry.find_activity_by_unique_name(&resolved.component.class_name) {
                let token = existing.token;
                let task_tag = existing.task_tag.clone();
                let (manager, registry, board) = self.task_manager_ctx(target_is_system_ui);
                return Ok(manager.turn_to_activity(registry, board, &task_tag, token, intent, plan.flags | IntentFlags::CLEAR_TOP, now_ms));
            }
        }

        let mut new_intent = intent.clone();
        new_intent.add_flag(plan.flags);
        let mut record = ActivityRecord::new(resolved.component.class_name.clone(), 0, plan.task_tag.clone(), new_intent, plan.launch_mode);
        record.caller = Some(caller);
        record.request_code = request_code;

        match self.registry.app_by_package(&resolved.package_name) {
            Some(app) => {
                record.pid = app.pid;
                Ok(self.push_activity(target_is_system_ui, &plan.task_tag, record, plan.flags, now_ms))
            }
            None => self.spawn_and_queue_activity(resolved, record, plan, now_ms),
        }
    }

    fn start_activity_at_system_sink(&mut self, intent: &Intent, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let current_top = self.standard.get_active_task().and_then(|tag| self.standard.find_task(tag)).and_then(|t| t.top());
        let home_root = self.standard.find_task(&self.boot.home_package).and_then(|t| t.root());
        let token = router::resolve_system_sink(&intent.target, current_top, current_top, home_root)
            .ok_or_else(|| ServiceError::BadValue(format!("unresolvable system target: {}", intent.target)))?;
        let task_tag = self
            .registry
            .activity(token)
            .map(|a| a.task_tag.clone())
            .ok_or_else(|| ServiceError::DeadObject(token.to_string()))?;
        Ok(self.standard.turn_to_activity(&mut self.registry, &mut self.board, &task_tag, token, intent.clone(), intent.flags(), now_ms))
    }

    fn caller_activity_context(&self, caller: &CallerRef) -> (Option<LaunchMode>, Option<String>) {
        match caller.as_activity().and_then(|t| self.registry.activity(*t)) {
            Some(activity) => (Some(activity.launch_mode), Some(activity.task_tag.clone())),
            None => (None, None),
        }
    }

    fn spawn_and_queue_activity(&mut self, resolved: Resolved, record: ActivityRecord, plan: LaunchPlan, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        if self.registry.is_attaching(&resolved.package_name)
            && !self.packages.get(&resolved.package_name).is_some_and(|p| p.is_support_multi_task)
        {
            return Err(ServiceError::InvalidOperation("wait a moment".into()));
        }
        let exec_path = self.packages.get(&resolved.package_name).map(|p| p.exec_path.clone()).unwrap_or_default();
        let args = vec![resolved.package_name.clone()];
        self.registry.queue_launch(
            resolved.package_name.clone(),
            PendingLaunch::Activity { record, task_tag: plan.task_tag, flags: plan.flags },
        );
        let _ = now_ms;
        Ok(vec![Effect::SpawnProcess { package_name: resolved.package_name, exec_path, args }])
    }

    pub fn stop_activity(&mut self, intent: Intent, result_code: i32, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let token = if intent.is_system_target() {
            let current_top = self.standard.get_active_task().and_then(|tag| self.standard.find_task(tag)).and_then(|t| t.top());
            router::resolve_system_sink(&intent.target, current_top, current_top, None)
                .ok_or_else(|| ServiceError::BadValue(format!("unresolvable system target: {}", intent.target)))?
        } else {
            self.registry
                .find_activity_by_unique_name(&intent.target)
                .map(|a| a.token)
                .ok_or_else(|| ServiceError::BadValue(format!("no live activity for target: {}", intent.target)))?
        };
        self.finish_activity(token, result_code, None, now_ms)
    }

    pub fn finish_activity(&mut self, token: ActivityToken, result_code: i32, result_data: Option<Intent>, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let activity = self.registry.activity(token).ok_or_else(|| ServiceError::DeadObject(token.to_string()))?;
        let caller = activity.caller;
        let request_code = activity.request_code;
        let is_system_ui = self.is_system_ui_activity(token);

        let mut effects = Vec::new();
        if let Some(CallerRef::Activity(caller_token)) = caller {
            if let Some(endpoint) = self.registry.activity(caller_token).and_then(|a| self.registry.app(a.pid)).map(|a| a.endpoint) {
                effects.push(Effect::DeliverActivityResult { endpoint, token: caller_token, request_code, result_code, result_data });
            }
        }
        let (manager, registry, board) = self.task_manager_ctx(is_system_ui);
        effects.extend(manager.finish_activity(registry, board, token, now_ms));
        Ok(effects)
    }

    pub fn move_activity_task_to_background(&mut self, token: ActivityToken, non_root: bool, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let activity = self.registry.activity(token).ok_or_else(|| ServiceError::DeadObject(token.to_string()))?;
        let task_tag = activity.task_tag.clone();
        let is_system_ui = self.is_system_ui_activity(token);
        let (manager, registry, board) = self.task_manager_ctx(is_system_ui);
        let is_root = manager.find_task(&task_tag).and_then(|t| t.root()) == Some(token);
        if !non_root && !is_root {
            return Ok(Vec::new());
        }
        let effects = manager.move_task_to_background(registry, board, &task_tag, now_ms);
        if !is_system_ui {
            self.sync_priority(now_ms);
        }
        Ok(effects)
    }

    pub fn report_activity_status(&mut self, token: ActivityToken, status: ActivityStatus, now_ms: u64) -> Vec<Effect> {
        if self.registry.activity_mut(token).map(|a| { a.status = status; }).is_none() {
            return Vec::new();
        }

        let mut event = TaskEvent::activity_status_report(token, status);
        event.multi_trigger = false;
        let mut effects = self.board.trigger(&event);
        effects.extend(driver::continue_drive(&mut self.registry, &mut self.board, token, now_ms));

        if status == ActivityStatus::Resumed {
            let is_system_ui = self.is_system_ui_activity(token);
            effects.extend(self.task_manager_for(is_system_ui).on_activity_resumed(token));
            if !is_system_ui {
                effects.extend(self.system_ui.on_event(&mut self.registry, &mut self.board, TaskManagerEvent::StandardActivityStarted, now_ms));
                self.sync_priority(now_ms);
            }
        }
        if status == ActivityStatus::Destroyed {
            let pid = self.registry.activity(token).map(|a| a.pid);
            self.registry.remove_activity(token);
            if let Some(pid) = pid {
                effects.extend(self.terminate_if_idle(pid));
            }
        }
        effects
    }

    /// Mirrors `AppRecord::checkActiveStatus`: once an app has no remaining
    /// activities and no remaining services, it is told to exit. The
    /// `AppRecord` itself is left in place — it is dropped the normal way,
    /// on the spawner's exit notification via `proc_app_terminated`.
    fn terminate_if_idle(&self, pid: i32) -> Vec<Effect> {
        if self.registry.activities_of_app(pid).next().is_some() || self.registry.services_of_app(pid).next().is_some() {
            return Vec::new();
        }
        match self.registry.app(pid) {
            Some(app) => vec![Effect::TerminateApplication { endpoint: app.endpoint }],
            None => Vec::new(),
        }
    }

    // === Services (4.5, 6) ===

    fn begin_service(&mut self, mut record: ServiceRecord, now_ms: u64) -> Vec<Effect> {
        let endpoint = match self.registry.app(record.pid) {
            Some(app) => app.endpoint,
            None => return Vec::new(),
        };
        let token = record.token;
        let started = record.started;
        let bound = !record.connections.is_empty();
        let intent = record.last_intent.clone();
        record.status = ServiceStatus::Creating;
        self.registry.insert_service(record);

        self.board.commit(
            crate::pending::TaskLabel::service_status_report(token, ServiceStatus::Created),
            Box::new(NoopPendingTask),
            None,
            now_ms,
        );
        let mut effects = Vec::new();
        if started {
            effects.push(Effect::ScheduleStartService { endpoint, token, intent: intent.clone() });
        }
        if bound {
            effects.push(Effect::ScheduleBindService { endpoint, token, intent });
        }
        effects
    }

    pub fn start_service(&mut self, intent: Intent, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let resolved = router::resolve_component(&intent, ComponentType::Service, &self.packages, &self.actions)?;
        if let Some(existing) = self.registry.find_service_by_unique_name(&resolved.component.class_name) {
            let token = existing.token;
            let endpoint = self.registry.app(existing.pid).map(|a| a.endpoint);
            if let Some(service) = self.registry.service_mut(token) {
                service.started = true;
            }
            return Ok(match endpoint {
                Some(endpoint) => vec![Effect::ScheduleStartService { endpoint, token, intent }],
                None => Vec::new(),
            });
        }

        let mut record = ServiceRecord::new(resolved.component.class_name.clone(), 0, intent);
        record.started = true;
        match self.registry.app_by_package(&resolved.package_name) {
            Some(app) => {
                record.pid = app.pid;
                Ok(self.begin_service(record, now_ms))
            }
            None => self.spawn_and_queue_service(resolved, PendingLaunch::StartService { record }),
        }
    }

    fn spawn_and_queue_service(&mut self, resolved: Resolved, launch: PendingLaunch) -> ServiceResult<Vec<Effect>> {
        if self.registry.is_attaching(&resolved.package_name)
            && !self.packages.get(&resolved.package_name).is_some_and(|p| p.is_support_multi_task)
        {
            return Err(ServiceError::InvalidOperation("wait a moment".into()));
        }
        let exec_path = self.packages.get(&resolved.package_name).map(|p| p.exec_path.clone()).unwrap_or_default();
        let args = vec![resolved.package_name.clone()];
        self.registry.queue_launch(resolved.package_name.clone(), launch);
        Ok(vec![Effect::SpawnProcess { package_name: resolved.package_name, exec_path, args }])
    }

    pub fn stop_service(&mut self, intent: Intent) -> ServiceResult<Vec<Effect>> {
        let resolved = router::resolve_component(&intent, ComponentType::Service, &self.packages, &self.actions)?;
        let token = self
            .registry
            .find_service_by_unique_name(&resolved.component.class_name)
            .map(|s| s.token)
            .ok_or_else(|| ServiceError::BadValue(format!("no live service for: {}", resolved.component.class_name)))?;
        self.stop_service_by_token(token)
    }

    pub fn stop_service_by_token(&mut self, token: ServiceToken) -> ServiceResult<Vec<Effect>> {
        let service = self.registry.service_mut(token).ok_or_else(|| ServiceError::DeadObject(token.to_string()))?;
        service.started = false;
        if !service.is_idle() {
            return Ok(Vec::new());
        }
        let pid = service.pid;
        service.status = ServiceStatus::Destroying;
        let Some(endpoint) = self.registry.app(pid).map(|a| a.endpoint) else { return Ok(Vec::new()) };
        Ok(vec![Effect::ScheduleStopService { endpoint, token }])
    }

    pub fn bind_service(&mut self, caller: CallerRef, intent: Intent, now_ms: u64) -> ServiceResult<Vec<Effect>> {
        let resolved = router::resolve_component(&intent, ComponentType::Service, &self.packages, &self.actions)?;
        if let Some(existing) = self.registry.find_service_by_unique_name(&resolved.component.class_name) {
            let token = existing.token;
            let was_bound = existing.status == ServiceStatus::Bound;
            let endpoint = self.registry.app(existing.pid).map(|a| a.endpoint);
            if let Some(service) = self.registry.service_mut(token) {
                service.connections.push(ServiceConnection { caller });
            }
            return Ok(match (was_bound, endpoint) {
                (false, Some(endpoint)) => vec![Effect::ScheduleBindService { endpoint, token, intent }],
                _ => Vec::new(),
            });
        }

        let mut record = ServiceRecord::new(resolved.component.class_name.clone(), 0, intent);
        record.connections.push(ServiceConnection { caller });
        match self.registry.app_by_package(&resolved.package_name) {
            Some(app) => {
                record.pid = app.pid;
                Ok(self.begin_service(record, now_ms))
            }
            None => self.spawn_and_queue_service(resolved, PendingLaunch::BindService { record, caller }),
        }
    }

    pub fn unbind_service(&mut self, conn: &ServiceConnection) -> Vec<Effect> {
        let Some(token) = self.registry.services().find(|s| s.connections.contains(conn)).map(|s| s.token) else {
            return Vec::new();
        };
        let Some(service) = self.registry.service_mut(token) else { return Vec::new() };
        service.connections.retain(|c| c != conn);
        if !service.is_idle() {
            return Vec::new();
        }
        let pid = service.pid;
        service.status = ServiceStatus::Destroying;
        let Some(endpoint) = self.registry.app(pid).map(|a| a.endpoint) else { return Vec::new() };
        vec![Effect::ScheduleUnbindService { endpoint, token }]
    }

    pub fn publish_service(&mut self, token: ServiceToken) -> ServiceResult<()> {
        let service = self.registry.service_mut(token).ok_or_else(|| ServiceError::DeadObject(token.to_string()))?;
        service.status = if service.connections.is_empty() { ServiceStatus::Started } else { ServiceStatus::Bound };
        Ok(())
    }

    pub fn report_service_status(&mut self, token: ServiceToken, status: ServiceStatus) -> Vec<Effect> {
        let Some(service) = self.registry.service_mut(token) else { return Vec::new() };
        service.status = status;
        let pid = service.pid;
        let mut event = TaskEvent::service_status_report(token, status);
        event.multi_trigger = true;
        let mut effects = self.board.trigger(&event);
        if status == ServiceStatus::Destroyed {
            self.registry.remove_service(token);
            effects.extend(self.terminate_if_idle(pid));
        }
        effects
    }

    // === Broadcast & post-intent (4.7) ===

    pub fn register_receiver(&mut self, action: &str, receiver: EndpointToken) {
        self.receivers.register(action, receiver);
    }

    pub fn unregister_receiver(&mut self, receiver: EndpointToken) {
        self.receivers.unregister(receiver);
    }

    pub fn send_broadcast(&mut self, intent: Intent) -> Vec<Effect> {
        let mut effects = self.broadcast_to_receivers(intent.clone());
        effects.extend(self.deliver_to_declared_targets(&intent));
        effects
    }

    fn broadcast_to_receivers(&self, intent: Intent) -> Vec<Effect> {
        self.receivers
            .receivers_for(&intent.action)
            .iter()
            .map(|&endpoint| Effect::DeliverBroadcast { endpoint, intent: intent.clone() })
            .collect()
    }

    /// The `IntentActionTable`'s multi-target resolver (4.4 point 2): every
    /// activity/service across all packages that declared `intent.action`,
    /// delivered to its live instance if the component happens to be
    /// running. Declaring an action in the manifest never spawns the app —
    /// only `register_receiver`'s dynamic receivers get a guaranteed
    /// delivery via `broadcast_to_receivers`.
    fn deliver_to_declared_targets(&self, intent: &Intent) -> Vec<Effect> {
        let mut effects = Vec::new();
        for component_type in [ComponentType::Activity, ComponentType::Service] {
            for unique_name in self.actions.all_targets(&intent.action, component_type) {
                let found = match component_type {
                    ComponentType::Activity => self
                        .registry
                        .find_activity_by_unique_name(unique_name)
                        .map(|a| (a.pid, ActivityOrServiceRef::Activity(a.token))),
                    ComponentType::Service => self
                        .registry
                        .find_service_by_unique_name(unique_name)
                        .map(|s| (s.pid, ActivityOrServiceRef::Service(s.token))),
                };
                let Some((pid, target)) = found else { continue };
                let Some(app) = self.registry.app(pid) else { continue };
                effects.push(Effect::ScheduleReceiveIntent { endpoint: app.endpoint, target: Some(target), intent: intent.clone() });
            }
        }
        effects
    }

    pub fn post_intent(&mut self, intent: Intent) -> ServiceResult<Vec<Effect>> {
        if intent.is_system_target() {
            let current_top = self.standard.get_active_task().and_then(|tag| self.standard.find_task(tag)).and_then(|t| t.top());
            let home_root = self.standard.find_task(&self.boot.home_package).and_then(|t| t.root());
            let token = router::resolve_system_sink(&intent.target, current_top, current_top, home_root)
                .ok_or_else(|| ServiceError::BadValue(format!("unresolvable system target: {}", intent.target)))?;
            let endpoint = self.registry.activity(token).and_then(|a| self.registry.app(a.pid)).map(|a| a.endpoint);
            return Ok(match endpoint {
                Some(endpoint) => vec![Effect::ScheduleReceiveIntent { endpoint, target: Some(ActivityOrServiceRef::Activity(token)), intent }],
                None => Vec::new(),
            });
        }

        let (package_name, class_name) = intent.split_target();
        let app = self
            .registry
            .app_by_package(package_name)
            .ok_or_else(|| ServiceError::DeadObject(format!("package not running: {package_name}")))?;
        let endpoint = app.endpoint;
        let target = if class_name.is_empty() {
            None
        } else if let Some(activity) = self.registry.find_activity_by_unique_name(&intent.target) {
            Some(ActivityOrServiceRef::Activity(activity.token))
        } else if let Some(service) = self.registry.find_service_by_unique_name(&intent.target) {
            Some(ActivityOrServiceRef::Service(service.token))
        } else {
            return Err(ServiceError::BadValue(format!("unknown component: {}", intent.target)));
        };
        Ok(vec![Effect::ScheduleReceiveIntent { endpoint, target, intent }])
    }

    // === Boot sequence (4.8) ===

    /// `system_ready`: registers nothing here (the signal handler is wired
    /// by the daemon), broadcasts the boot-ready/boot-completed pair around
    /// launching either the boot-guide or home activity, unless the
    /// configured run mode skips the whole sequence.
    pub fn system_ready(&mut self, now_ms: u64) -> Vec<Effect> {
        if self.run_mode.skips_boot_broadcast() {
            return Vec::new();
        }

        let boot_ready = Intent::with_action(crate::intent::ACTION_BOOT_READY);
        let mut effects = self.broadcast_to_receivers(boot_ready.clone());
        effects.extend(self.deliver_to_declared_targets(&boot_ready));

        let guide = self.boot.boot_guide_package.clone();
        effects.extend(match (self.boot.usersetup_complete, guide) {
            (false, Some(guide)) => self.launch_package_entry(&guide, now_ms),
            _ => self.launch_home(now_ms),
        });

        let boot_completed = Intent::with_action(crate::intent::ACTION_BOOT_COMPLETED);
        effects.extend(self.broadcast_to_receivers(boot_completed.clone()));
        effects.extend(self.deliver_to_declared_targets(&boot_completed));
        effects
    }

    fn launch_home(&mut self, now_ms: u64) -> Vec<Effect> {
        let home = self.boot.home_package.clone();
        self.launch_package_entry(&home, now_ms)
    }

    fn launch_package_entry(&mut self, package_name: &str, now_ms: u64) -> Vec<Effect> {
        let intent = Intent::with_target(package_name);
        self.start_activity(CallerRef::System, intent, -1, now_ms).unwrap_or_default()
    }

    // === Low-memory killer (4.6) ===

    pub fn lmk_sweep(&mut self, free_mem_bytes: u64, now_ms: u64) -> Vec<Effect> {
        let targets = lmk::collect_targets(&mut self.priority, &self.lmk_thresholds, free_mem_bytes);
        let mut effects = Vec::with_capacity(targets.len() * 2);
        for pid in targets {
            effects.push(Effect::RequestStop { pid });
            effects.push(Effect::SetTimer { id: TimerId::lmk_delayed_kill(pid), duration: std::time::Duration::from_millis(crate::priority::LMK_DELAYED_KILL_MS) });
        }
        let _ = now_ms;
        effects
    }

    pub fn lmk_delayed_kill_fired(&mut self, pid: i32) -> Vec<Effect> {
        if self.registry.is_app_live(pid) {
            vec![Effect::KillProcess { pid }]
        } else {
            Vec::new()
        }
    }

    // === Diagnostics ===

    pub fn dump(&self) -> String {
        let mut out = String::new();
        out.push_str("tasks:\n");
        if let Some(tag) = self.standard.get_active_task() {
            out.push_str(&format!("  active: {tag}\n"));
        }
        out.push_str("services:\n");
        for service in self.registry.services() {
            out.push_str(&format!("  {} [{}] pid={}\n", service.unique_name, service.status, service.pid));
        }
        out.push_str("priority:\n");
        for info in self.priority.ordered() {
            out.push_str(&format!("  pid={} score={}\n", info.pid, info.oom_score));
        }
        out
    }
}

/// No-op board entry for service status waits — matches
/// `driver::StatusWaitMarker`'s shape; service continuations are re-driven
/// directly by the manager rather than through `execute()`.
#[derive(Debug)]
struct NoopPendingTask;

impl crate::pending::PendingTask for NoopPendingTask {
    fn execute(&mut self, _event: &TaskEvent) -> Vec<Effect> {
        Vec::new()
    }

    fn timeout(&mut self) -> Vec<Effect> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

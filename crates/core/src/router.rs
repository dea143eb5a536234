// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intent resolution and launch-mode policy.
//!
//! [`resolve_component`] turns an [`Intent`] into the package/component it
//! names — by explicit `target`, by `action` lookup, or by the `@target.`
//! system-prefix sinks that name a live activity directly rather than a
//! package. [`plan_launch`] then applies the launch-mode and caller-context
//! rules that decide the effective [`LaunchMode`], [`IntentFlags`], and task
//! affinity tag for the resolved component.

use crate::activity::{ActivityToken, LaunchMode};
use crate::caller::CallerRef;
use crate::errors::{ServiceError, ServiceResult};
use crate::intent::{
    ComponentType, Intent, IntentFlags, TARGET_ACTIVITY_TOP_RESUME, TARGET_APPLICATION_FOREGROUND,
    TARGET_APPLICATION_HOME,
};
use crate::package::{ComponentDecl, PackageDirectory, IntentActionTable};

/// A component resolved from an intent, ready to hand to a task manager.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub package_name: String,
    pub component: ComponentDecl,
}

/// Resolves one of the built-in `@target.` sinks to a live activity token
/// using whatever context the caller (the manager) has on hand. Returns
/// `None` if the sink names something not currently available (e.g.
/// `FOREGROUND` with no active task).
pub fn resolve_system_sink(
    target: &str,
    current_top: Option<ActivityToken>,
    active_task_root: Option<ActivityToken>,
    home_task_root: Option<ActivityToken>,
) -> Option<ActivityToken> {
    match target {
        TARGET_ACTIVITY_TOP_RESUME => current_top,
        TARGET_APPLICATION_FOREGROUND => active_task_root,
        TARGET_APPLICATION_HOME => home_task_root,
        _ => None,
    }
}

/// Resolves an intent's `target`/`action` to a package component. Does not
/// handle `@target.` sinks — callers check [`Intent::is_system_target`]
/// first and route those through [`resolve_system_sink`] instead.
pub fn resolve_component(
    intent: &Intent,
    wanted: ComponentType,
    packages: &PackageDirectory,
    actions: &IntentActionTable,
) -> ServiceResult<Resolved> {
    let unique_name = if !intent.target.is_empty() {
        let (package_name, class_name) = intent.split_target();
        if class_name.is_empty() {
            let info = packages
                .get(package_name)
                .ok_or_else(|| ServiceError::BadValue(format!("unknown package: {package_name}")))?;
            let entry = info
                .entry_activity()
                .ok_or_else(|| ServiceError::BadValue(format!("package has no entry activity: {package_name}")))?;
            entry.class_name.clone()
        } else {
            intent.target.clone()
        }
    } else {
        actions
            .first_target(&intent.action, wanted)
            .ok_or_else(|| ServiceError::BadValue(format!("no component answers action: {}", intent.action)))?
            .to_string()
    };

    let (package_name, _) = split_unique_name(&unique_name);
    let info = packages
        .get(package_name)
        .ok_or_else(|| ServiceError::BadValue(format!("unknown package: {package_name}")))?;
    let component = info
        .component(&unique_name)
        .ok_or_else(|| ServiceError::BadValue(format!("unknown component: {unique_name}")))?
        .clone();

    if component.component_type != wanted {
        return Err(ServiceError::BadValue(format!("{unique_name} is not a {wanted:?}")));
    }

    Ok(Resolved { package_name: package_name.to_string(), component })
}

fn split_unique_name(unique_name: &str) -> (&str, &str) {
    match unique_name.split_once('/') {
        Some((pkg, cls)) => (pkg, cls),
        None => (unique_name, ""),
    }
}

/// The effective launch parameters for a resolved component, after
/// launch-mode, entry-activity, and caller-context rules are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub launch_mode: LaunchMode,
    pub flags: IntentFlags,
    pub task_tag: String,
}

/// Applies launch-mode policy:
/// - An entry activity is forced to `NEW_TASK` with task affinity equal to
///   its package name, downgraded to `SINGLE_INSTANCE`.
/// - A caller with no activity context, or either side `SINGLE_INSTANCE`,
///   forces `NEW_TASK`.
/// - Absent `NEW_TASK`, the task affinity is the caller's own task tag.
pub fn plan_launch(
    resolved: &Resolved,
    requested_flags: IntentFlags,
    caller: CallerRef,
    caller_launch_mode: Option<LaunchMode>,
    caller_task_tag: Option<&str>,
) -> LaunchPlan {
    let mut flags = requested_flags;
    let mut launch_mode = resolved.component.launch_mode;

    if resolved.component.is_entry {
        launch_mode = LaunchMode::SingleInstance;
        flags.insert(IntentFlags::NEW_TASK);
    }

    let caller_is_single_instance = caller_launch_mode == Some(LaunchMode::SingleInstance);
    if caller.has_no_activity_context() || caller_is_single_instance || launch_mode == LaunchMode::SingleInstance {
        flags.insert(IntentFlags::NEW_TASK);
    }

    let task_tag = if flags.contains(IntentFlags::NEW_TASK) {
        resolved.component.task_affinity_or(&resolved.package_name).to_string()
    } else {
        caller_task_tag.unwrap_or(&resolved.package_name).to_string()
    };

    LaunchPlan { launch_mode, flags, task_tag }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;

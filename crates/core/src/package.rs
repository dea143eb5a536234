// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package metadata as queried from the (external, read-only) package
//! manager, and the intent-action table built from it at boot.

use crate::activity::LaunchMode;
use crate::intent::ComponentType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A declared activity or service within a package manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDecl {
    pub class_name: String,
    pub component_type: ComponentType,
    /// Declared launch mode; only meaningful for activities.
    #[serde(default)]
    pub launch_mode: LaunchMode,
    /// Actions this component answers to in the intent-action table.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Whether this is the package's entry activity (forced `NEW_TASK` +
    /// downgraded to `SINGLE_INSTANCE`, task affinity = package name).
    #[serde(default)]
    pub is_entry: bool,
    /// Declared task affinity from the package manifest. `None` defaults to
    /// the owning package name — the common case; set this when a
    /// `SINGLE_TASK`/`SINGLE_INSTANCE` activity roots its own named task
    /// (§8 S2: `Settings`, `taskAffinity="settings"`, package `com.demo`).
    #[serde(default)]
    pub task_affinity: Option<String>,
}

impl ComponentDecl {
    /// The task affinity to use when this component needs a `NEW_TASK`:
    /// its declared affinity, or the owning package name if none was set.
    pub fn task_affinity_or<'a>(&'a self, package_name: &'a str) -> &'a str {
        self.task_affinity.as_deref().unwrap_or(package_name)
    }
}

/// Package metadata as returned by the package manager query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub package_name: String,
    pub exec_path: String,
    pub is_system_ui: bool,
    /// Whether a race to launch this package spawns one process per caller
    /// rather than rejecting the second request outright.
    #[serde(default)]
    pub is_support_multi_task: bool,
    pub components: Vec<ComponentDecl>,
}

impl PackageInfo {
    pub fn entry_activity(&self) -> Option<&ComponentDecl> {
        self.components.iter().find(|c| c.is_entry)
    }

    pub fn component(&self, class_name: &str) -> Option<&ComponentDecl> {
        self.components.iter().find(|c| c.class_name == class_name)
    }
}

/// `action -> [(pkg/cls, component_type)]`, populated at boot from package
/// metadata; used by the intent router when a request carries an `action`
/// instead of a `target`.
#[derive(Debug, Clone, Default)]
pub struct IntentActionTable {
    entries: HashMap<(String, ComponentType), Vec<String>>,
}

impl IntentActionTable {
    pub fn new() -> Self {
        IntentActionTable::default()
    }

    pub fn register(&mut self, action: &str, component_type: ComponentType, unique_name: impl Into<String>) {
        self.entries
            .entry((action.to_string(), component_type))
            .or_default()
            .push(unique_name.into());
    }

    pub fn unregister_package(&mut self, package_name: &str) {
        for targets in self.entries.values_mut() {
            targets.retain(|t| !t.starts_with(&format!("{package_name}/")));
        }
    }

    /// First matching target, for single-target resolution.
    pub fn first_target(&self, action: &str, component_type: ComponentType) -> Option<&str> {
        self.entries
            .get(&(action.to_string(), component_type))
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    /// All matching targets, for multi-target resolution (broadcasts).
    pub fn all_targets(&self, action: &str, component_type: ComponentType) -> &[String] {
        self.entries
            .get(&(action.to_string(), component_type))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// The live set of installed packages, as returned by the (external)
/// package manager query at boot and updated on install/uninstall.
#[derive(Debug, Clone, Default)]
pub struct PackageDirectory {
    packages: HashMap<String, PackageInfo>,
}

impl PackageDirectory {
    pub fn new() -> Self {
        PackageDirectory::default()
    }

    pub fn insert(&mut self, info: PackageInfo) {
        self.packages.insert(info.package_name.clone(), info);
    }

    pub fn get(&self, package_name: &str) -> Option<&PackageInfo> {
        self.packages.get(package_name)
    }

    pub fn remove(&mut self, package_name: &str) -> Option<PackageInfo> {
        self.packages.remove(package_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.values()
    }
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;

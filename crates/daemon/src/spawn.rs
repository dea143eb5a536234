// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process spawner: forks/execs a package's binary, tracks it through
//! to exit, and carries out the low-memory killer's two-stage stop
//! request. Everything here is a thin wrapper around `tokio::process` and
//! `nix`'s signal sending — the orchestration logic that decides *when* to
//! spawn or kill lives entirely in `amcore`.

use std::process::Stdio;

use amcore::Event;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::reactor::LoopMsg;

/// Forks/execs `exec_path` with `args`, reporting the outcome back onto
/// the main loop as a [`Event::ProcessSpawned`] or
/// [`Event::ProcessSpawnFailed`], and later its exit as
/// [`Event::ProcessExited`] once `child.wait()` resolves.
pub fn spawn(package_name: String, exec_path: String, args: Vec<String>, loop_tx: mpsc::UnboundedSender<LoopMsg>) {
    tokio::spawn(async move {
        let mut command = Command::new(&exec_path);
        command.args(&args).stdin(Stdio::null()).stdout(Stdio::inherit()).stderr(Stdio::inherit()).kill_on_drop(false);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(package = %package_name, exec = %exec_path, error = %e, "failed to spawn process");
                let _ = loop_tx.send(LoopMsg::Event(Event::ProcessSpawnFailed { package_name, reason: e.to_string() }));
                return;
            }
        };

        let Some(pid) = child.id() else {
            let _ = loop_tx.send(LoopMsg::Event(Event::ProcessSpawnFailed {
                package_name,
                reason: "process exited before its pid could be read".into(),
            }));
            return;
        };
        let pid = pid as i32;
        info!(package = %package_name, pid, "process spawned");
        let _ = loop_tx.send(LoopMsg::Event(Event::ProcessSpawned { package_name: package_name.clone(), pid }));

        match child.wait().await {
            Ok(status) => info!(package = %package_name, pid, %status, "process exited"),
            Err(e) => error!(package = %package_name, pid, error = %e, "failed to wait on child"),
        }
        let _ = loop_tx.send(LoopMsg::Event(Event::ProcessExited { pid }));
    });
}

/// `Effect::RequestStop`: asks the process to exit gracefully. Sent first;
/// the low-memory killer follows up with [`kill`] after its grace period
/// if the pid is still alive.
pub fn request_stop(pid: i32) {
    send_signal(pid, Signal::SIGTERM, "SIGTERM");
}

/// `Effect::KillProcess`: the fallback hard kill.
pub fn kill(pid: i32) {
    send_signal(pid, Signal::SIGKILL, "SIGKILL");
}

fn send_signal(pid: i32, sig: Signal, name: &'static str) {
    match signal::kill(Pid::from_raw(pid), sig) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => warn!(pid, signal = name, error = %e, "failed to signal process"),
    }
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;

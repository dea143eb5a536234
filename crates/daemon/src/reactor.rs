// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-threaded event loop: owns the [`ActivityManager`], receives
//! every inbound request, spawner notification, and timer fire on one
//! channel, and is the only place that executes the `Effect`s those calls
//! return. Nothing outside this module mutates the manager.

use std::collections::HashMap;
use std::time::Duration;

use amcore::{ActivityManager, Clock, Effect, EndpointToken, Event, ServiceConnection, ServiceError, SystemClock, TimerId};
use amwire::{Request, Response};
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::spawn;

/// Everything that can arrive on the reactor's single inbound channel.
#[derive(Debug)]
pub enum LoopMsg {
    /// A client connection was accepted; `response_tx` feeds its writer task.
    Connected { endpoint: EndpointToken, response_tx: mpsc::UnboundedSender<Response> },
    /// A client connection's reader hit EOF or errored.
    Disconnected { endpoint: EndpointToken },
    /// A framed request arrived on an already-connected endpoint.
    Request { endpoint: EndpointToken, request: Request },
    /// A pure [`Event`] fed back onto the loop by the spawner, a timer, or
    /// the periodic memory monitor.
    Event(Event),
}

/// How often the periodic memory monitor samples free memory and invokes
/// the low-memory killer.
const LMK_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// How often the pending-task board is swept for expired deadlines.
const PENDING_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the reactor until the transport's accept loop exits (process
/// shutdown). Binds the boot sequence (`systemReady`) before entering the
/// steady-state select loop.
pub async fn run(config: Config, manager: ActivityManager, listener: UnixListener) {
    let (loop_tx, mut loop_rx) = mpsc::unbounded_channel();

    tokio::spawn(crate::transport::run(listener, loop_tx.clone()));

    let mut reactor = Reactor::new(manager, config, loop_tx.clone());

    let now = reactor.now_ms();
    let effects = reactor.manager.system_ready(now);
    reactor.execute(effects);

    let mut lmk_interval = tokio::time::interval(LMK_POLL_INTERVAL);
    let mut sweep_interval = tokio::time::interval(PENDING_SWEEP_INTERVAL);

    loop {
        tokio::select! {
            msg = loop_rx.recv() => {
                match msg {
                    Some(msg) => reactor.handle(msg),
                    None => break,
                }
            }
            _ = lmk_interval.tick() => reactor.poll_memory(),
            _ = sweep_interval.tick() => reactor.sweep_pending(),
        }
    }

    info!("reactor channel closed, shutting down");
}

struct Reactor {
    manager: ActivityManager,
    config: Config,
    loop_tx: mpsc::UnboundedSender<LoopMsg>,
    connections: HashMap<EndpointToken, mpsc::UnboundedSender<Response>>,
    timers: HashMap<TimerId, JoinHandle<()>>,
    clock: SystemClock,
}

impl Reactor {
    fn new(manager: ActivityManager, config: Config, loop_tx: mpsc::UnboundedSender<LoopMsg>) -> Self {
        Reactor { manager, config, loop_tx, connections: HashMap::new(), timers: HashMap::new(), clock: SystemClock }
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    fn handle(&mut self, msg: LoopMsg) {
        match msg {
            LoopMsg::Connected { endpoint, response_tx } => {
                self.connections.insert(endpoint, response_tx);
            }
            LoopMsg::Disconnected { endpoint } => {
                self.connections.remove(&endpoint);
            }
            LoopMsg::Request { endpoint, request } => self.handle_request(endpoint, request),
            LoopMsg::Event(event) => self.handle_event(event),
        }
    }

    fn handle_event(&mut self, event: Event) {
        debug!(event = %event.log_summary(), "handling event");
        let now = self.now_ms();
        let effects = match event {
            Event::AppAttached { pid, uid, endpoint } => match self.manager.attach_application(pid, uid, endpoint, now) {
                Ok(effects) => effects,
                Err(e) => {
                    warn!(pid, error = %e, "attach_application failed");
                    Vec::new()
                }
            },
            Event::ProcessSpawned { package_name, pid } => {
                self.manager.process_spawned(&package_name, pid);
                Vec::new()
            }
            Event::ProcessSpawnFailed { package_name, reason } => {
                warn!(package = %package_name, reason, "process spawn failed");
                Vec::new()
            }
            Event::ProcessExited { pid } => self.manager.proc_app_terminated(pid, now),
            Event::ActivityStatusReported { token, status } => self.manager.report_activity_status(token, status, now),
            Event::ServiceStatusReported { token, status } => self.manager.report_service_status(token, status),
            Event::ServicePublished { token } => {
                if let Err(e) = self.manager.publish_service(token) {
                    warn!(service = %token, error = %e, "publish_service failed");
                }
                Vec::new()
            }
            Event::TimerFired { id } => self.handle_timer_fired(id),
            Event::MemoryPressure { free_bytes } => self.manager.lmk_sweep(free_bytes, now),
            Event::SystemReady => self.manager.system_ready(now),
            Event::IntentPosted { intent } => self.manager.post_intent(intent).unwrap_or_default(),
        };
        self.execute(effects);
    }

    fn handle_timer_fired(&mut self, id: TimerId) -> Vec<amcore::Effect> {
        self.timers.remove(&id);
        match id.kind() {
            Some(amcore::TimerKind::LmkDelayedKill { pid }) => self.manager.lmk_delayed_kill_fired(pid),
            _ => Vec::new(),
        }
    }

    fn handle_request(&mut self, endpoint: EndpointToken, request: Request) {
        let now = self.now_ms();
        let response = match request {
            Request::Hello { .. } => Response::Hello { version: crate::env::PROTOCOL_VERSION },

            Request::AttachApplication { pid, uid } => {
                let result = self.manager.attach_application(pid, uid, endpoint, now);
                self.run_ack(result)
            }

            Request::StartActivity { caller, intent, request_code } => {
                let result = self.manager.start_activity(caller, intent, request_code, now);
                self.run_ack(result)
            }
            Request::StopActivity { intent, result_code } => {
                let result = self.manager.stop_activity(intent, result_code, now);
                self.run_ack(result)
            }
            Request::FinishActivity { token, result_code, result_data } => {
                let result = self.manager.finish_activity(token, result_code, result_data, now);
                self.run_bool(result)
            }
            Request::MoveActivityTaskToBackground { token, non_root } => {
                let result = self.manager.move_activity_task_to_background(token, non_root, now);
                self.run_bool(result)
            }
            Request::ReportActivityStatus { token, status } => {
                let effects = self.manager.report_activity_status(token, status, now);
                self.execute(effects);
                Response::Ok
            }

            Request::StartService { caller: _, intent } => {
                let result = self.manager.start_service(intent, now);
                self.run_ack(result)
            }
            Request::StopService { intent } => {
                let result = self.manager.stop_service(intent);
                self.run_ack(result)
            }
            Request::StopServiceByToken { token } => {
                let result = self.manager.stop_service_by_token(token);
                self.run_ack(result)
            }
            Request::BindService { caller, intent } => {
                let result = self.manager.bind_service(caller, intent, now);
                self.run_ack(result)
            }
            Request::UnbindService { caller, service: _ } => {
                let effects = self.manager.unbind_service(&ServiceConnection { caller });
                self.execute(effects);
                Response::Ok
            }
            Request::PublishService { token, binder_handle: _ } => match self.manager.publish_service(token) {
                Ok(()) => Response::Ok,
                Err(e) => Response::from(&e),
            },
            Request::ReportServiceStatus { token, status } => {
                let effects = self.manager.report_service_status(token, status);
                self.execute(effects);
                Response::Ok
            }

            Request::PostIntent { intent } => {
                let result = self.manager.post_intent(intent);
                self.run_ack(result)
            }
            Request::SendBroadcast { intent } => {
                let effects = self.manager.send_broadcast(intent);
                self.execute(effects);
                Response::Ok
            }
            Request::RegisterReceiver { action, endpoint: receiver } => {
                self.manager.register_receiver(&action, receiver);
                Response::Ok
            }
            Request::UnregisterReceiver { action: _, endpoint: receiver } => {
                self.manager.unregister_receiver(receiver);
                Response::Ok
            }

            Request::Dump => Response::Dump { text: self.manager.dump() },
        };
        self.send(endpoint, response);
    }

    fn run_ack(&mut self, result: Result<Vec<Effect>, ServiceError>) -> Response {
        match result {
            Ok(effects) => {
                self.execute(effects);
                Response::Ok
            }
            Err(e) => Response::from(&e),
        }
    }

    fn run_bool(&mut self, result: Result<Vec<Effect>, ServiceError>) -> Response {
        match result {
            Ok(effects) => {
                self.execute(effects);
                Response::Bool { value: true }
            }
            Err(e) => {
                debug!(error = %e, "operation returned false");
                Response::Bool { value: false }
            }
        }
    }

    fn send(&mut self, endpoint: EndpointToken, response: Response) {
        if let Some(tx) = self.connections.get(&endpoint) {
            if tx.send(response).is_err() {
                self.connections.remove(&endpoint);
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute_one(effect);
        }
    }

    fn execute_one(&mut self, effect: Effect) {
        match effect {
            Effect::Emit { event } => self.handle_event(event),

            Effect::SpawnProcess { package_name, exec_path, args } => {
                spawn::spawn(package_name, exec_path, args, self.loop_tx.clone());
            }
            Effect::RequestStop { pid } => spawn::request_stop(pid),
            Effect::KillProcess { pid } => spawn::kill(pid),

            Effect::ScheduleLaunchActivity { endpoint, token, intent } => self.send(endpoint, Response::ScheduleLaunchActivity { token, intent }),
            Effect::ScheduleTransition { endpoint, token, step } => self.send(endpoint, Response::ScheduleTransition { token, step }),
            Effect::DeliverActivityResult { endpoint, token, request_code, result_code, result_data } => {
                self.send(endpoint, Response::OnActivityResult { token, request_code, result_code, result_data })
            }
            Effect::DeliverNewIntent { endpoint, token, intent } => self.send(endpoint, Response::ScheduleReceiveNewIntent { token, intent }),

            Effect::ScheduleStartService { endpoint, token, intent } => self.send(endpoint, Response::ScheduleStartService { token, intent }),
            Effect::ScheduleStopService { endpoint, token } => self.send(endpoint, Response::ScheduleStopService { token }),
            Effect::ScheduleBindService { endpoint, token, intent } => self.send(endpoint, Response::ScheduleBindService { token, intent }),
            Effect::ScheduleUnbindService { endpoint, token } => self.send(endpoint, Response::ScheduleUnbindService { token }),

            Effect::SetForegroundApplication { endpoint, foreground } => self.send(endpoint, Response::SetForegroundApplication { foreground }),
            Effect::TerminateApplication { endpoint } => self.send(endpoint, Response::TerminateApplication),
            Effect::ScheduleReceiveIntent { endpoint, target, intent } => self.send(endpoint, Response::ScheduleReceiveIntent { target, intent }),

            Effect::DeliverBroadcast { endpoint, intent } => self.send(endpoint, Response::DeliverBroadcast { intent }),

            Effect::SetTimer { id, duration } => self.arm_timer(id, duration),
            Effect::CancelTimer { id } => {
                if let Some(handle) = self.timers.remove(&id) {
                    handle.abort();
                }
            }
        }
    }

    fn arm_timer(&mut self, id: TimerId, duration: Duration) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
        let loop_tx = self.loop_tx.clone();
        let fired_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = loop_tx.send(LoopMsg::Event(Event::TimerFired { id: fired_id }));
        });
        self.timers.insert(id, handle);
    }

    /// Periodic sweep of the pending-task board's commit deadlines;
    /// independent of [`arm_timer`], which only backs the LMK's
    /// delayed-kill and any future precise one-shots.
    fn sweep_pending(&mut self) {
        let now = self.now_ms();
        let effects = self.manager.board.sweep_timeouts(now);
        self.execute(effects);
    }

    /// Samples `/proc/meminfo`'s `MemAvailable` (falling back to the
    /// configured total heap size, i.e. "nothing is under pressure", on
    /// non-Linux or a missing file) and feeds it to the LMK as a
    /// `memory_pressure` event.
    fn poll_memory(&mut self) {
        let free_bytes = crate::config::read_meminfo_field("MemAvailable:").unwrap_or(self.config.total_heap_bytes);
        self.handle_event(Event::MemoryPressure { free_bytes });
    }
}

#[cfg(test)]
#[path = "reactor_tests.rs"]
mod tests;

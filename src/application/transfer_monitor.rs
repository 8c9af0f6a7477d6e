//! Transfer monitor service
//!
//! Runs a [`TransferMonitor`] on its own task. Host calls, call-status
//! notifications and the dismissal deadline are all handled by that task, one
//! at a time. Host-visible effects are posted to a [`HostInstruction`]
//! channel which the host drains on its UI context.

use crate::config::MonitorConfig;
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::transfer::{
    DismissTarget, FieldChange, MonitorAction, MonitorSnapshot, TransferCall, TransferDisplay,
    TransferMonitor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// What triggered a dismissal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissOrigin {
    /// Delay after a terminal transfer status elapsed
    Automatic,
    /// User pressed back
    Manual,
}

/// Instruction for the UI host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostInstruction {
    Render(TransferDisplay),
    Dismiss {
        target: DismissTarget,
        origin: DismissOrigin,
    },
    /// A call broke an invariant while a notification was handled
    Failed { reason: String },
}

enum Command {
    SetPrimaryCall {
        call: Option<Arc<dyn TransferCall>>,
        reply: oneshot::Sender<Result<()>>,
    },
    SetSecondaryCall {
        call: Option<Arc<dyn TransferCall>>,
        reply: oneshot::Sender<Result<()>>,
    },
    Activate {
        reply: oneshot::Sender<Result<()>>,
    },
    Deactivate {
        reply: oneshot::Sender<()>,
    },
    BackPressed {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<MonitorSnapshot>,
    },
}

/// Handle to a running transfer monitor.
///
/// Dropping the handle stops the monitor task, releases its subscription and
/// cancels a pending dismissal.
pub struct TransferMonitorService {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl TransferMonitorService {
    /// Start a monitor on the current tokio runtime.
    ///
    /// Returns the handle and the receiver of host instructions.
    pub fn spawn(config: &MonitorConfig) -> (Self, mpsc::UnboundedReceiver<HostInstruction>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let (host_tx, host_rx) = mpsc::unbounded_channel();

        let worker = MonitorWorker {
            monitor: TransferMonitor::new(config.dismiss_delay(), change_tx),
            commands: command_rx,
            changes: change_rx,
            host: host_tx,
            dismiss_deadline: None,
        };

        let task = tokio::spawn(worker.run());

        (
            Self {
                commands: command_tx,
                task,
            },
            host_rx,
        )
    }

    /// Replace the primary call. The render instruction is queued before this returns.
    ///
    /// A call without a caller number is rejected and the previous call kept.
    pub async fn set_primary_call(&self, call: Option<Arc<dyn TransferCall>>) -> Result<()> {
        self.request(|reply| Command::SetPrimaryCall { call, reply })
            .await?
    }

    /// Replace the secondary call. The render instruction is queued before this returns.
    pub async fn set_secondary_call(&self, call: Option<Arc<dyn TransferCall>>) -> Result<()> {
        self.request(|reply| Command::SetSecondaryCall { call, reply })
            .await?
    }

    pub async fn activate(&self) -> Result<()> {
        self.request(|reply| Command::Activate { reply }).await?
    }

    pub async fn deactivate(&self) -> Result<()> {
        self.request(|reply| Command::Deactivate { reply }).await
    }

    /// Dismiss to the primary call screen right away
    pub async fn back_pressed(&self) -> Result<()> {
        self.request(|reply| Command::BackPressed { reply }).await
    }

    pub async fn snapshot(&self) -> Result<MonitorSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the monitor task and wait for it to release its subscription
    pub async fn shutdown(self) {
        let Self { commands, task } = self;
        drop(commands);

        if let Err(e) = task.await {
            warn!("Transfer monitor task ended abnormally: {}", e);
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .map_err(|_| DomainError::MonitorStopped)?;
        reply_rx.await.map_err(|_| DomainError::MonitorStopped)
    }
}

struct MonitorWorker {
    monitor: TransferMonitor,
    commands: mpsc::UnboundedReceiver<Command>,
    changes: mpsc::UnboundedReceiver<FieldChange>,
    host: mpsc::UnboundedSender<HostInstruction>,
    dismiss_deadline: Option<Instant>,
}

impl MonitorWorker {
    /// Serve until every service handle is dropped.
    ///
    /// The select is unbiased: a command and a notification that are ready
    /// together carry no ordering between them, and the latch makes either
    /// order yield the same dismissal.
    async fn run(mut self) {
        info!("Transfer monitor started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(change) = self.changes.recv() => self.handle_change(change),
                _ = wait_for(self.dismiss_deadline) => self.handle_dismiss_timer(),
            }
        }

        self.monitor.deactivate();
        if self.dismiss_deadline.is_some() {
            debug!("Dropping pending dismissal with the monitor");
        }
        info!("Transfer monitor stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetPrimaryCall { call, reply } => {
                let step = self.monitor.set_primary_call(call);
                let _ = reply.send(self.settle(step));
            }
            Command::SetSecondaryCall { call, reply } => {
                let step = self.monitor.set_secondary_call(call);
                let _ = reply.send(self.settle(step));
            }
            Command::Activate { reply } => {
                let step = self.monitor.activate();
                let _ = reply.send(self.settle(step));
            }
            Command::Deactivate { reply } => {
                self.monitor.deactivate();
                let _ = reply.send(());
            }
            Command::BackPressed { reply } => {
                let target = self.monitor.back_pressed();
                self.emit(HostInstruction::Dismiss {
                    target,
                    origin: DismissOrigin::Manual,
                });
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.monitor.snapshot());
            }
        }
    }

    fn handle_change(&mut self, change: FieldChange) {
        match self.monitor.on_status_changed(&change) {
            Ok(actions) => self.apply(actions),
            Err(e) => {
                error!("Failed to handle {} change on call {}: {}", change.field, change.call_id, e);
                self.emit(HostInstruction::Failed {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn handle_dismiss_timer(&mut self) {
        self.dismiss_deadline = None;

        if let Some(action) = self.monitor.on_dismiss_timer() {
            self.apply(vec![action]);
        }
    }

    /// Apply the actions of a host-driven step and hand back its outcome
    fn settle(&mut self, step: Result<Vec<MonitorAction>>) -> Result<()> {
        match step {
            Ok(actions) => {
                self.apply(actions);
                Ok(())
            }
            Err(e) => {
                error!("Transfer monitor rejected host request: {}", e);
                Err(e)
            }
        }
    }

    fn apply(&mut self, actions: Vec<MonitorAction>) {
        for action in actions {
            match action {
                MonitorAction::Render(display) => self.emit(HostInstruction::Render(display)),
                MonitorAction::ScheduleDismiss(delay) => {
                    debug!("Dismissal armed for {:?}", delay);
                    self.dismiss_deadline = Some(Instant::now() + delay);
                }
                MonitorAction::Dismiss(target) => self.emit(HostInstruction::Dismiss {
                    target,
                    origin: DismissOrigin::Automatic,
                }),
            }
        }
    }

    fn emit(&self, instruction: HostInstruction) {
        if self.host.send(instruction).is_err() {
            debug!("Host channel closed, dropping instruction");
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

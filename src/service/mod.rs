pub mod command;
pub mod config;

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::device::ElevatorIo;
use crate::elevator::{config::ElevatorConfig, Elevator};
use crate::setpoint::Setpoint;
use command::Command;
use config::ServiceConfig;

/// The one in-flight Move or Home. Dispatching a new operation (or an
/// explicit Cancel) cancels the token and awaits the task, so homing cleanup
/// always runs before the next command touches the device.
struct ActiveOp {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the elevator and its two loops: a fixed-period poll loop standing in
/// for the scheduler's periodic hook, and a command loop that sequences the
/// operations an upstream scheduler dispatches.
pub struct ElevatorService {
    elevator: Arc<Elevator>,
    cmd_tx: mpsc::Sender<Command>,
    shutdown_token: CancellationToken,
    config: ServiceConfig,
}

impl ElevatorService {
    pub fn new(
        io: Arc<dyn ElevatorIo>,
        elevator_config: ElevatorConfig,
        config: ServiceConfig,
    ) -> Self {
        let elevator = Arc::new(Elevator::new(io, elevator_config));
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(config.command_queue_depth);
        let shutdown_token = CancellationToken::new();

        let poll_elevator = elevator.clone();
        let poll_shutdown = shutdown_token.clone();
        let period = config.poll_period;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => poll_elevator.poll().await,
                    _ = poll_shutdown.cancelled() => break,
                }
            }
        });

        tokio::spawn(Self::command_loop(elevator.clone(), cmd_rx));

        Self {
            elevator,
            cmd_tx,
            shutdown_token,
            config,
        }
    }

    pub fn elevator(&self) -> &Arc<Elevator> {
        &self.elevator
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub async fn send_command(&self, cmd: Command) -> Result<()> {
        self.cmd_tx.send(cmd).await?;
        Ok(())
    }

    /// Convenience wrapper for a command with an immediate or held reply.
    pub async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<serde_json::Value>>) -> Command,
    ) -> Result<serde_json::Value> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx)).await?;
        rx.await?
    }

    /// Stops the poll loop. The command loop ends once all senders drop.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    async fn command_loop(elevator: Arc<Elevator>, mut rx: mpsc::Receiver<Command>) {
        let mut active: Option<ActiveOp> = None;

        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Move { setpoint, resp } => {
                    info!(?setpoint, "dispatching move");
                    Self::supersede(&mut active).await;
                    active = Some(Self::spawn_move(&elevator, setpoint, resp));
                }
                Command::Home { resp } => {
                    info!("dispatching homing");
                    Self::supersede(&mut active).await;
                    active = Some(Self::spawn_home(&elevator, resp));
                }
                Command::Cancel { resp } => {
                    let had_active = active.is_some();
                    Self::supersede(&mut active).await;
                    debug!(had_active, "cancel");
                    let _ = resp.send(Ok(json!({
                        "action": "cancel",
                        "cancelled": had_active,
                    })));
                }
                Command::Status { resp } => {
                    let result = serde_json::to_value(elevator.status()).map_err(Into::into);
                    let _ = resp.send(result);
                }
            }
        }

        // Channel closed: wind down whatever is still running.
        Self::supersede(&mut active).await;
    }

    /// Cancels the active operation and waits for it to finish its cleanup.
    async fn supersede(active: &mut Option<ActiveOp>) {
        if let Some(op) = active.take() {
            op.token.cancel();
            let _ = op.handle.await;
        }
    }

    fn spawn_move(
        elevator: &Arc<Elevator>,
        setpoint: Setpoint,
        resp: oneshot::Sender<Result<serde_json::Value>>,
    ) -> ActiveOp {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let el = elevator.clone();
        let handle = tokio::spawn(async move {
            el.move_to(setpoint).await;
            let outcome = tokio::select! {
                _ = task_token.cancelled() => "cancelled",
                _ = el.await_setpoint() => "completed",
            };
            let _ = resp.send(Ok(json!({
                "operation": "move",
                "setpoint": setpoint,
                "outcome": outcome,
            })));
        });
        ActiveOp { token, handle }
    }

    fn spawn_home(
        elevator: &Arc<Elevator>,
        resp: oneshot::Sender<Result<serde_json::Value>>,
    ) -> ActiveOp {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let el = elevator.clone();
        let handle = tokio::spawn(async move {
            let outcome = el.auto_zero(&task_token).await;
            let _ = resp.send(Ok(json!({
                "operation": "home",
                "outcome": outcome,
            })));
        });
        ActiveOp { token, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::sim::SimIo;
    use std::time::Duration;

    fn sim_service() -> ElevatorService {
        ElevatorService::new(
            Arc::new(SimIo::new()),
            ElevatorConfig::default(),
            ServiceConfig {
                poll_period: Duration::from_millis(5),
                command_queue_depth: 16,
            },
        )
    }

    #[tokio::test]
    async fn move_completes_once_the_sim_arrives() {
        let service = sim_service();

        let reply = service
            .request(|resp| Command::Move {
                setpoint: Setpoint::Stow,
                resp,
            })
            .await
            .unwrap();

        assert_eq!(reply["outcome"], "completed");
        assert_eq!(reply["setpoint"], "stow");
        assert!(service.elevator().ready(Setpoint::Stow));
        service.shutdown();
    }

    #[tokio::test]
    async fn new_move_supersedes_the_pending_one() {
        let service = sim_service();

        let (first_tx, first_rx) = oneshot::channel();
        service
            .send_command(Command::Move {
                setpoint: Setpoint::L4,
                resp: first_tx,
            })
            .await
            .unwrap();

        let reply = service
            .request(|resp| Command::Move {
                setpoint: Setpoint::Stow,
                resp,
            })
            .await
            .unwrap();
        assert_eq!(reply["outcome"], "completed");

        let first = first_rx.await.unwrap().unwrap();
        assert_eq!(first["outcome"], "cancelled");
        service.shutdown();
    }

    #[tokio::test]
    async fn cancel_reports_whether_anything_was_running() {
        let service = sim_service();

        let idle = service
            .request(|resp| Command::Cancel { resp })
            .await
            .unwrap();
        assert_eq!(idle["cancelled"], false);

        let (tx, rx) = oneshot::channel();
        service
            .send_command(Command::Move {
                setpoint: Setpoint::Net,
                resp: tx,
            })
            .await
            .unwrap();

        let busy = service
            .request(|resp| Command::Cancel { resp })
            .await
            .unwrap();
        assert_eq!(busy["cancelled"], true);
        assert_eq!(rx.await.unwrap().unwrap()["outcome"], "cancelled");
        service.shutdown();
    }

    #[tokio::test]
    async fn status_serializes_the_telemetry_surface() {
        let service = sim_service();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let status = service
            .request(|resp| Command::Status { resp })
            .await
            .unwrap();

        assert_eq!(status["reference"], "stow");
        assert!(status["snapshot"]["position"].is_number());
        assert!(status["unsafe"].is_boolean());
        assert!(status["at_zero"].is_boolean());
        service.shutdown();
    }

    #[tokio::test]
    async fn homing_in_sim_calibrates() {
        let service = sim_service();

        let reply = service
            .request(|resp| Command::Home { resp })
            .await
            .unwrap();

        assert_eq!(reply["operation"], "home");
        assert_eq!(reply["outcome"], "calibrated");
        service.shutdown();
    }
}

pub mod config;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::protocol::{
    client_command::ClientCommand, parse_command, serialize_response,
    server_response::ServerResponse,
};
use crate::service::{command::Command, ElevatorService};
use config::SocketServerConfig;

/// JSON-lines command endpoint for the upstream scheduler, served over a
/// unix socket. Each connection gets its own task; commands on one
/// connection are handled in order, so a scheduler that wants concurrent
/// queries holds a second connection.
pub struct SocketServer {
    config: SocketServerConfig,
    service: Arc<ElevatorService>,
    shutdown_tx: Option<tokio::sync::broadcast::Sender<()>>,
}

impl SocketServer {
    pub fn new(config: SocketServerConfig, service: Arc<ElevatorService>) -> Self {
        Self {
            config,
            service,
            shutdown_tx: None,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }
        let listener = UnixListener::bind(&self.config.socket_path)?;
        info!(path = %self.config.socket_path, "listening");

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let service = self.service.clone();
        let max_connections = self.config.max_connections;

        tokio::spawn(async move {
            let clients = Arc::new(AtomicUsize::new(0));
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        let stream = match accepted {
                            Ok((stream, _)) => stream,
                            Err(e) => {
                                error!("accept failed: {e}");
                                continue;
                            }
                        };
                        if clients.load(Ordering::Relaxed) >= max_connections {
                            warn!("connection cap reached, dropping client");
                            continue;
                        }
                        clients.fetch_add(1, Ordering::Relaxed);
                        debug!(active = clients.load(Ordering::Relaxed), "client connected");

                        let service = service.clone();
                        let clients = clients.clone();
                        let mut shutdown = shutdown_rx.resubscribe();
                        tokio::spawn(async move {
                            if let Err(e) = Self::serve_client(stream, &service, &mut shutdown).await {
                                error!("client handler error: {e}");
                            }
                            clients.fetch_sub(1, Ordering::Relaxed);
                            debug!("client disconnected");
                        });
                    }
                    _ = shutdown_rx.recv() => {
                        info!("socket server shutting down");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(tx) = &self.shutdown_tx {
            let _ = tx.send(());
        }
        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }
        Ok(())
    }

    async fn serve_client(
        stream: UnixStream,
        service: &ElevatorService,
        shutdown: &mut tokio::sync::broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut framed = Framed::new(stream, LinesCodec::new());

        loop {
            tokio::select! {
                line = framed.next() => {
                    match line {
                        Some(Ok(line)) => {
                            debug!(%line, "received");
                            let response = Self::handle_line(&line, service).await;
                            framed.send(serialize_response(&response)?).await?;
                        }
                        Some(Err(e)) => {
                            error!("read error: {e}");
                            break;
                        }
                        None => break,
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
        Ok(())
    }

    async fn handle_line(line: &str, service: &ElevatorService) -> ServerResponse {
        let command = match parse_command(line) {
            Ok(cmd) => cmd,
            Err(e) => return ServerResponse::error(None, e.to_string()),
        };
        let id = command.id().cloned();
        match Self::dispatch(command, service).await {
            Ok(data) => ServerResponse::success(id, data),
            Err(e) => ServerResponse::error(id, e.to_string()),
        }
    }

    async fn dispatch(
        command: ClientCommand,
        service: &ElevatorService,
    ) -> Result<serde_json::Value> {
        match command {
            ClientCommand::Move { setpoint, .. } => {
                service
                    .request(|resp| Command::Move { setpoint, resp })
                    .await
            }
            ClientCommand::Home { .. } => service.request(|resp| Command::Home { resp }).await,
            ClientCommand::Cancel { .. } => service.request(|resp| Command::Cancel { resp }).await,
            ClientCommand::Status { .. } => service.request(|resp| Command::Status { resp }).await,
            ClientCommand::Ping { .. } => Ok(json!({
                "message": "pong",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        }
    }
}

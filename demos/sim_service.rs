use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use elevon::{
    device::sim::SimIo,
    elevator::config::ElevatorConfig,
    service::{command::Command, config::ServiceConfig, ElevatorService},
    setpoint::Setpoint,
    socket_server::{config::SocketServerConfig, SocketServer},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("starting elevon with the simulated backend");

    let service = Arc::new(ElevatorService::new(
        Arc::new(SimIo::new()),
        ElevatorConfig::default(),
        ServiceConfig::default(),
    ));

    let socket_config = SocketServerConfig::default();
    let socket_path = socket_config.socket_path.clone();
    let mut server = SocketServer::new(socket_config, service.clone());
    server.start().await?;

    info!("scheduler endpoint at {socket_path}");
    info!(r#"try: echo '{{"type": "status"}}' | socat - UNIX-CONNECT:{socket_path}"#);

    // Exercise the subsystem once so the log shows a full cycle.
    match service
        .request(|resp| Command::Move {
            setpoint: Setpoint::Stow,
            resp,
        })
        .await
    {
        Ok(reply) => info!("move reply: {reply}"),
        Err(e) => error!("move failed: {e}"),
    }

    match service.request(|resp| Command::Home { resp }).await {
        Ok(reply) => info!("homing reply: {reply}"),
        Err(e) => error!("homing failed: {e}"),
    }

    match service.request(|resp| Command::Status { resp }).await {
        Ok(status) => info!("status: {status}"),
        Err(e) => error!("status failed: {e}"),
    }

    info!("serving for 600 seconds, ctrl-c to stop earlier");
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(600)) => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    server.shutdown().await?;
    service.shutdown();
    info!("elevon shutdown complete");
    Ok(())
}

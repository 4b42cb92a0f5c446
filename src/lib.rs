pub mod device;
pub mod elevator;
pub mod protocol;
pub mod service;
pub mod setpoint;
pub mod socket_server;

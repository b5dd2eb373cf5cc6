//! TCP command channel to the ESP32 motor controller.
//!
//! One connection per command: connect, write `command + "\n"`, close.
//! No acknowledgment is read and nothing is retried; the routine's
//! physical timing is authoritative.  The stream is dropped on every exit
//! path, so a failed send never leaks a socket.

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info};

use crate::actuation::Command;
use crate::app::ports::CommandChannel;
use crate::config::ActuatorConfig;
use crate::error::ChannelError;

/// Line terminator expected by the actuator firmware.
const TERMINATOR: &str = "\n";

pub struct TcpCommandChannel {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpCommandChannel {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &ActuatorConfig) -> Self {
        Self::new(
            config.host.clone(),
            config.port,
            Duration::from_millis(config.connect_timeout_ms),
        )
    }

    fn resolve(&self) -> Result<SocketAddr, ChannelError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| ChannelError::Resolve)?
            .next()
            .ok_or(ChannelError::Resolve)
    }
}

impl CommandChannel for TcpCommandChannel {
    fn send(&mut self, command: &Command) -> Result<(), ChannelError> {
        if !command.is_single_line() {
            return Err(ChannelError::MultiLine);
        }
        let addr = self.resolve()?;
        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_write_timeout(Some(self.timeout))?;

        let mut line = String::with_capacity(command.as_str().len() + TERMINATOR.len());
        line.push_str(command.as_str());
        line.push_str(TERMINATOR);
        stream.write_all(line.as_bytes())?;
        stream.flush()?;

        debug!("Sent '{}' to {}", command, addr);
        Ok(())
    }
}

/// A channel that logs commands and never touches the network.
/// Useful for bench runs without the dispenser attached.
pub struct DryRunChannel {
    sent: u64,
}

impl Default for DryRunChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunChannel {
    pub fn new() -> Self {
        Self { sent: 0 }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl CommandChannel for DryRunChannel {
    fn send(&mut self, command: &Command) -> Result<(), ChannelError> {
        if !command.is_single_line() {
            return Err(ChannelError::MultiLine);
        }
        self.sent += 1;
        info!("DRY-RUN | {}", command);
        Ok(())
    }
}

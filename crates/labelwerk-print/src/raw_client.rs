// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP channel (JetDirect, port 9100).
//
// The simplest raw transport: open a socket on the printer and write the
// markup. There are no job or page markers on the wire; ending the job
// flushes and half-closes the socket so the printer sees end-of-data.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use labelwerk_bridge::{RawPort, RawSession};
use labelwerk_core::config::{PrintTarget, RawChannel};
use labelwerk_core::error::{LabelwerkError, Result};
use tracing::{debug, info};

/// Default raw TCP port (HP JetDirect).
pub const RAW_PORT: u16 = 9100;

/// Timeout for connect and write.
const RAW_TIMEOUT_SECS: u64 = 60;

/// Write granularity, for progress logging.
const CHUNK_SIZE: usize = 8192;

/// Raw channel to a network printer's port 9100.
#[derive(Debug, Clone)]
pub struct TcpRawPort {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpRawPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(RAW_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                LabelwerkError::Device(format!("cannot resolve {}:{}: {e}", self.host, self.port))
            })?
            .next()
            .ok_or_else(|| {
                LabelwerkError::Device(format!("{}:{} resolved to no address", self.host, self.port))
            })
    }
}

/// The raw port for `target`: the socket transport when configured, otherwise
/// the platform spooler.
pub fn raw_port_for(target: &PrintTarget, spooler: Arc<dyn RawPort>) -> Arc<dyn RawPort> {
    match &target.raw_channel {
        RawChannel::Spooler => spooler,
        RawChannel::Tcp { host, port } => Arc::new(TcpRawPort::new(host.clone(), *port)),
    }
}

impl RawPort for TcpRawPort {
    fn open(&self, device: &str) -> Result<Box<dyn RawSession>> {
        let addr = self.resolve()?;
        info!(device, %addr, "connecting via raw TCP");

        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| {
            LabelwerkError::Device(format!("raw TCP connect to {addr}: {e}"))
        })?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| LabelwerkError::Device(format!("raw TCP setup for {addr}: {e}")))?;

        Ok(Box::new(TcpRawSession {
            stream: Some(stream),
            addr,
        }))
    }
}

struct TcpRawSession {
    stream: Option<TcpStream>,
    addr: SocketAddr,
}

impl TcpRawSession {
    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| LabelwerkError::Device("raw TCP channel already closed".into()))
    }
}

impl RawSession for TcpRawSession {
    fn start_job(&mut self, job_name: &str) -> Result<()> {
        debug!(addr = %self.addr, job_name, "raw TCP job started");
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let addr = self.addr;
        let stream = self.stream()?;
        let mut sent = 0;
        for chunk in bytes.chunks(CHUNK_SIZE) {
            stream.write_all(chunk).map_err(|e| {
                LabelwerkError::Device(format!("raw TCP send to {addr} failed at byte {sent}: {e}"))
            })?;
            sent += chunk.len();
            debug!(sent, total = bytes.len(), "raw TCP progress");
        }
        Ok(sent)
    }

    fn end_page(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_job(&mut self) -> Result<()> {
        let addr = self.addr;
        let stream = self.stream()?;
        stream
            .flush()
            .map_err(|e| LabelwerkError::Device(format!("raw TCP flush to {addr}: {e}")))?;
        stream
            .shutdown(Shutdown::Write)
            .map_err(|e| LabelwerkError::Device(format!("raw TCP shutdown to {addr}: {e}")))?;
        Ok(())
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

//! Connection Handler
//!
//! Owns the TCP stream to one buffer server and runs the request/response
//! transactions over it.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{BufferError, Result};
use crate::protocol::{read_envelope, ByteOrder, Command, PROTOCOL_VERSION};

/// A live connection to a buffer server
///
/// At most one request is in flight at any time: every operation writes its
/// request, flushes, and reads the complete response before returning.
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed once per request)
    writer: BufWriter<TcpStream>,

    /// Byte order used for the whole session
    order: ByteOrder,

    /// Largest response payload accepted
    max_payload_size: u32,

    /// Set once a transaction has failed mid-stream
    broken: bool,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect to a buffer server at `addr` with default settings.
    ///
    /// An empty address connects to `localhost:1972`.
    pub fn connect(addr: &str) -> Result<Self> {
        Self::connect_with(Config::builder().addr(addr).build())
    }

    /// Connect using an explicit configuration
    pub fn connect_with(config: Config) -> Result<Self> {
        let addr = config.resolved_addr();
        tracing::debug!("Connecting to buffer server at {}", addr);

        let addrs: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| BufferError::Config(format!("cannot resolve {}: {}", addr, e)))?
            .collect();
        if addrs.is_empty() {
            return Err(BufferError::Config(format!("{} resolved to no address", addr)));
        }

        let stream = if config.connect_timeout_ms > 0 {
            connect_timeout(&addrs, Duration::from_millis(config.connect_timeout_ms))?
        } else {
            TcpStream::connect(&addrs[..])?
        };

        let connection = Self::from_stream(stream, &config)?;
        tracing::debug!("Connected to buffer server at {}", connection.peer_addr);
        Ok(connection)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.nodelay)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut connection = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            order: config.byte_order,
            max_payload_size: config.max_payload_size,
            broken: false,
            peer_addr,
        };
        connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;

        Ok(connection)
    }

    /// Configure socket timeouts (0 = block forever)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_timeout = (read_ms > 0).then(|| Duration::from_millis(read_ms));
        let write_timeout = (write_ms > 0).then(|| Duration::from_millis(write_ms));

        self.reader.get_ref().set_read_timeout(read_timeout)?;
        self.writer.get_ref().set_write_timeout(write_timeout)?;

        Ok(())
    }

    /// Byte order of this session
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Whether an earlier failure left the stream unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub(crate) fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Close the connection
    pub fn close(mut self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.peer_addr);
        let flushed = self.writer.flush();
        let shutdown = self.writer.get_ref().shutdown(Shutdown::Both);
        flushed?;
        match shutdown {
            // The peer may already have gone away
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            other => Ok(other?),
        }
    }

    /// Run one request/response transaction.
    ///
    /// `request` is a complete encoded message. The response payload is read
    /// in full before its command is checked, so the stream stays aligned on
    /// message boundaries. Any transport or protocol failure marks the
    /// connection broken.
    pub(crate) fn transact(&mut self, request: &[u8], expected: Command) -> Result<Vec<u8>> {
        if self.broken {
            return Err(BufferError::Protocol(format!(
                "connection to {} is unusable after an earlier failure",
                self.peer_addr
            )));
        }

        let result = self.exchange(request, expected);
        if let Err(ref e) = result {
            if e.breaks_connection() {
                tracing::warn!("Transaction with {} failed: {}", self.peer_addr, e);
                self.broken = true;
            }
        }
        result
    }

    fn exchange(&mut self, request: &[u8], expected: Command) -> Result<Vec<u8>> {
        self.writer.write_all(request)?;
        self.writer.flush()?;

        let envelope = read_envelope(&mut self.reader, self.order)?;
        tracing::trace!("Received {:?} from {}", envelope, self.peer_addr);

        if envelope.version != PROTOCOL_VERSION {
            return Err(BufferError::Protocol(format!(
                "unsupported protocol version {} (check the byte order)",
                envelope.version
            )));
        }
        if envelope.payload_size > self.max_payload_size {
            return Err(BufferError::Protocol(format!(
                "Response payload too large: {} bytes (max {})",
                envelope.payload_size, self.max_payload_size
            )));
        }

        let mut payload = vec![0u8; envelope.payload_size as usize];
        if !payload.is_empty() {
            self.reader.read_exact(&mut payload)?;
        }

        if envelope.command != expected.code() {
            return Err(BufferError::UnexpectedCommand {
                expected,
                received: envelope.command,
            });
        }

        Ok(payload)
    }
}

/// Try each resolved address in turn with a connect timeout
fn connect_timeout(addrs: &[SocketAddr], timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }
    // addrs is never empty here
    Err(last_err
        .map(BufferError::Transport)
        .unwrap_or_else(|| BufferError::Config("no address to connect to".to_string())))
}

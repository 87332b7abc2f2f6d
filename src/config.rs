//! Configuration for bufferbci
//!
//! Centralized connection configuration with sensible defaults.

use crate::protocol::ByteOrder;

/// Default buffer server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default buffer server port
pub const DEFAULT_PORT: u16 = 1972;

/// Main configuration for a buffer connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// Buffer server address (host:port)
    pub addr: String,

    /// Byte order of every multi-byte field on the wire.
    /// Must match what the server expects for the whole session.
    pub byte_order: ByteOrder,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest response payload accepted before the response is rejected
    pub max_payload_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            byte_order: ByteOrder::Big,
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            nodelay: true,
            max_payload_size: 256 * 1024 * 1024, // 256 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Server address with the default host/port filled in where missing
    pub fn resolved_addr(&self) -> String {
        normalize_addr(&self.addr)
    }
}

/// Fill in the default host or port of a `host:port` string.
///
/// An empty string maps to `localhost:1972` and a bare host gets port 1972.
/// Bracketed IPv6 literals are honoured (`[::1]` -> `[::1]:1972`).
pub fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.is_empty() {
        return format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT);
    }

    let has_port = if let Some(rest) = addr.strip_prefix('[') {
        rest.split_once(']')
            .map(|(_, tail)| tail.starts_with(':'))
            .unwrap_or(false)
    } else {
        // A bare IPv6 literal has several colons and no port
        addr.matches(':').count() == 1
    };

    if has_port {
        addr.to_string()
    } else if addr.matches(':').count() > 1 && !addr.starts_with('[') {
        format!("[{}]:{}", addr, DEFAULT_PORT)
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the wire byte order
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.config.byte_order = order;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the largest accepted response payload (in bytes)
    pub fn max_payload_size(mut self, size: u32) -> Self {
        self.config.max_payload_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

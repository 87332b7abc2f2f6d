//! # bufferbci
//!
//! A blocking client for FieldTrip-style real-time data acquisition buffers:
//! - Fetch stream headers (channels, samples, events, sampling rate)
//! - Pull ranges of multichannel samples, widened to `f64`
//! - Push key/value events attached to the latest sample
//! - Flush buffered data and wait for new samples
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Connection                           │
//! │     get_header / get_data / put_event / flush / wait        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one request in flight
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Transaction                             │
//! │     write → flush → read envelope → validate → payload      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────┬─────────────┐
//!          ▼            ▼             ▼             ▼
//!   ┌────────────┐ ┌──────────┐ ┌───────────┐ ┌──────────┐
//!   │  Envelope  │ │  Header  │ │   Data    │ │  Event   │
//!   │  (8 bytes) │ │  Codec   │ │  Codec    │ │  Codec   │
//!   └────────────┘ └──────────┘ └───────────┘ └──────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use bufferbci::Connection;
//!
//! # fn main() -> bufferbci::Result<()> {
//! let mut conn = Connection::connect("localhost:1972")?;
//! let header = conn.get_header()?;
//! let samples = conn.get_latest_data(header.sample_count.min(100))?;
//! conn.put_event("marker", "onset")?;
//! conn.close()?;
//! # let _ = samples;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BufferError, Result};
pub use config::{Config, DEFAULT_PORT};
pub use network::Connection;
pub use protocol::{BufferCounts, ByteOrder, DataType, Event, Header, SampleMatrix, WaitRequest};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bufferbci
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

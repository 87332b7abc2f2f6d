//! Network Module
//!
//! TCP connection to a buffer server.
//!
//! ## Architecture
//! - One blocking `TcpStream` per `Connection`
//! - One request in flight at a time, flushed as a single write
//! - Operations (`get_header`, `get_data`, `put_event`, ...) are methods on `Connection`

mod connection;
mod operations;

pub use connection::Connection;

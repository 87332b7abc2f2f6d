//! Message envelope
//!
//! Every request and response starts with the same fixed 8-byte envelope.
//!
//! ```text
//! ┌─────────────┬─────────────┬───────────────────┐
//! │ Version (2) │ Command (2) │ Payload size (4)  │
//! └─────────────┴─────────────┴───────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use super::{ByteOrder, Command};
use crate::error::Result;

/// Envelope size in bytes
pub const ENVELOPE_SIZE: usize = 8;

/// The only protocol version in use
pub const PROTOCOL_VERSION: u16 = 1;

/// Fixed header preceding every message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageEnvelope {
    pub version: u16,

    /// Raw command code, kept unparsed so unknown codes can be reported
    pub command: u16,

    /// Exact byte length of the payload following the envelope
    pub payload_size: u32,
}

impl MessageEnvelope {
    /// Envelope for a request of the current protocol version
    pub fn new(command: Command, payload_size: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            command: command.code(),
            payload_size,
        }
    }

    /// The parsed command, if the code is a known one
    pub fn command(&self) -> Option<Command> {
        Command::try_from(self.command).ok()
    }
}

/// Append the 8 envelope bytes to `buf`
pub fn encode_envelope(order: ByteOrder, envelope: &MessageEnvelope, buf: &mut BytesMut) {
    buf.reserve(ENVELOPE_SIZE);
    order.put_u16(buf, envelope.version);
    order.put_u16(buf, envelope.command);
    order.put_u32(buf, envelope.payload_size);
}

/// Parse an envelope from exactly 8 bytes
pub fn decode_envelope(order: ByteOrder, bytes: [u8; ENVELOPE_SIZE]) -> MessageEnvelope {
    let mut buf = &bytes[..];
    MessageEnvelope {
        version: order.get_u16(&mut buf),
        command: order.get_u16(&mut buf),
        payload_size: order.get_u32(&mut buf),
    }
}

/// Build a complete message: envelope followed by `payload`
pub fn encode_message(order: ByteOrder, command: Command, payload: &[u8]) -> BytesMut {
    let mut message = BytesMut::with_capacity(ENVELOPE_SIZE + payload.len());
    let envelope = MessageEnvelope::new(command, payload.len() as u32);
    encode_envelope(order, &envelope, &mut message);
    message.put_slice(payload);
    message
}

/// Write an envelope to a stream (not flushed)
pub fn write_envelope<W: Write>(
    writer: &mut W,
    order: ByteOrder,
    envelope: &MessageEnvelope,
) -> Result<()> {
    let mut buf = BytesMut::with_capacity(ENVELOPE_SIZE);
    encode_envelope(order, envelope, &mut buf);
    writer.write_all(&buf)?;
    Ok(())
}

/// Read an envelope from a stream
///
/// Blocks until all 8 bytes have arrived. A short read surfaces as a
/// transport error.
pub fn read_envelope<R: Read>(reader: &mut R, order: ByteOrder) -> Result<MessageEnvelope> {
    let mut bytes = [0u8; ENVELOPE_SIZE];
    reader.read_exact(&mut bytes)?;
    Ok(decode_envelope(order, bytes))
}

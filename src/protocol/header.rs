//! Header codec
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬────────────┬───────────┬────────┬───────────┬─────────────┬────────────┐
//! │ nchans(4)│ nsamples(4)│ nevents(4)│ fsamp(4)│ dtype(4) │ chunk_len(4)│ chunks ... │
//! └──────────┴────────────┴───────────┴────────┴───────────┴─────────────┴────────────┘
//! ```
//!
//! `nsamples` and `nevents` are zero in a PUT_HDR request; the server fills
//! them in when the header is read back. The chunk tail is an extension point
//! the client never interprets.

use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};

use super::{encode_message, ByteOrder, Command, DataType};
use crate::error::{BufferError, Result};

/// Size of the fixed header fields
pub const HEADER_FIXED_SIZE: usize = 24;

/// Stream metadata held by the buffer server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub channel_count: u32,
    pub sample_count: u32,
    pub event_count: u32,
    pub sampling_frequency_hz: f32,
    pub data_type: DataType,

    /// Opaque chunk extension bytes, stored as received
    pub chunks: Vec<u8>,
}

/// Encode a complete PUT_HDR message.
///
/// Chunks cannot be attached, so the payload is always the 24 fixed bytes.
pub fn encode_header_request(
    order: ByteOrder,
    channel_count: u32,
    sampling_frequency_hz: f32,
) -> BytesMut {
    let mut payload = BytesMut::with_capacity(HEADER_FIXED_SIZE);
    order.put_u32(&mut payload, channel_count);
    order.put_u32(&mut payload, 0); // nsamples
    order.put_u32(&mut payload, 0); // nevents
    order.put_f32(&mut payload, sampling_frequency_hz);
    order.put_u32(&mut payload, DataType::Char.tag());
    order.put_u32(&mut payload, 0); // chunk_len

    encode_message(order, Command::PutHdr, &payload)
}

/// Encode a complete GET_HDR message
pub fn encode_get_header_request(order: ByteOrder) -> BytesMut {
    encode_message(order, Command::GetHdr, &[])
}

/// Decode the payload of a GET_OK response to GET_HDR.
///
/// `payload` must be the full response payload; everything past the fixed
/// fields is taken as the chunk tail.
pub fn decode_header(order: ByteOrder, payload: &[u8]) -> Result<Header> {
    if payload.is_empty() {
        return Err(BufferError::Protocol(
            "GET_HDR: server holds no header".to_string(),
        ));
    }
    if payload.len() < HEADER_FIXED_SIZE {
        return Err(BufferError::Protocol(format!(
            "GET_HDR: header too short (expected at least {} bytes, got {})",
            HEADER_FIXED_SIZE,
            payload.len()
        )));
    }

    let mut buf = payload;
    let channel_count = order.get_u32(&mut buf);
    let sample_count = order.get_u32(&mut buf);
    let event_count = order.get_u32(&mut buf);
    let sampling_frequency_hz = order.get_f32(&mut buf);
    let data_type = DataType::try_from(order.get_u32(&mut buf))?;
    let chunk_len = order.get_u32(&mut buf) as usize;

    if chunk_len != buf.remaining() {
        return Err(BufferError::Protocol(format!(
            "GET_HDR: chunk size mismatch (declared {}, carried {})",
            chunk_len,
            buf.remaining()
        )));
    }

    Ok(Header {
        channel_count,
        sample_count,
        event_count,
        sampling_frequency_hz,
        data_type,
        chunks: buf.to_vec(),
    })
}

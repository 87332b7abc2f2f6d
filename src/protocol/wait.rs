//! Wait codec
//!
//! WAIT_DAT blocks server-side until the buffer holds more than the given
//! number of samples or events, or the timeout expires. A zero timeout
//! returns the current counts immediately.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use super::{encode_message, ByteOrder, Command};
use crate::error::{BufferError, Result};

/// Size of the WAIT_DAT request payload
pub const WAIT_REQUEST_SIZE: usize = 12;

/// Size of the WAIT_OK response payload
pub const WAIT_RESPONSE_SIZE: usize = 8;

/// Thresholds for a WAIT_DAT request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitRequest {
    pub sample_threshold: u32,
    pub event_threshold: u32,
    pub timeout_ms: u32,
}

impl WaitRequest {
    /// Request that returns the current counts without waiting
    pub fn poll() -> Self {
        Self::default()
    }
}

/// Sample and event totals reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferCounts {
    pub samples: u32,
    pub events: u32,
}

/// Encode a complete WAIT_DAT message
pub fn encode_wait_request(order: ByteOrder, request: &WaitRequest) -> BytesMut {
    let mut payload = BytesMut::with_capacity(WAIT_REQUEST_SIZE);
    order.put_u32(&mut payload, request.sample_threshold);
    order.put_u32(&mut payload, request.event_threshold);
    order.put_u32(&mut payload, request.timeout_ms);
    encode_message(order, Command::WaitDat, &payload)
}

/// Decode the payload of a WAIT_OK response
pub fn decode_wait_response(order: ByteOrder, payload: &[u8]) -> Result<BufferCounts> {
    if payload.len() < WAIT_RESPONSE_SIZE {
        return Err(BufferError::Protocol(format!(
            "WAIT_DAT: response too short (expected {} bytes, got {})",
            WAIT_RESPONSE_SIZE,
            payload.len()
        )));
    }

    let mut buf = payload;
    Ok(BufferCounts {
        samples: order.get_u32(&mut buf),
        events: order.get_u32(&mut buf),
    })
}

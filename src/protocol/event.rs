//! Event codec
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬─────────┬───────────┬──────────┬───────────┬───────────┬─────────────┬────────────┐
//! │ ktype(4) │ klen(4) │ vtype(4)  │ vlen(4)  │ sample(4) │ offset(4) │ duration(4) │ bufsize(4) │
//! └──────────┴─────────┴───────────┴──────────┴───────────┴───────────┴─────────────┴────────────┘
//! followed by the raw key bytes, then the raw value bytes
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::{encode_message, ByteOrder, Command, DataType};
use crate::error::{BufferError, Result};

/// Size of the fixed event fields
pub const EVENT_FIXED_SIZE: usize = 32;

/// A key/value annotation attached to a sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub key: String,
    pub value: String,

    /// Index of the sample the event belongs to
    pub sample: i32,

    /// Offset from `sample`, in samples
    pub offset: i32,

    /// Duration in samples
    pub duration: i32,
}

impl Event {
    /// Create an instantaneous event at `sample`
    pub fn new(key: impl Into<String>, value: impl Into<String>, sample: i32) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            sample,
            offset: 0,
            duration: 0,
        }
    }
}

/// Encode a complete PUT_EVT message.
///
/// Key and value are both sent as `char` arrays of their UTF-8 bytes.
pub fn encode_event_request(order: ByteOrder, event: &Event) -> Result<BytesMut> {
    let key = event.key.as_bytes();
    let value = event.value.as_bytes();

    let key_len = u32::try_from(key.len())
        .map_err(|_| BufferError::Validation("event key too long".to_string()))?;
    let value_len = u32::try_from(value.len())
        .map_err(|_| BufferError::Validation("event value too long".to_string()))?;
    let variable_len = key_len
        .checked_add(value_len)
        .filter(|len| len.checked_add(EVENT_FIXED_SIZE as u32).is_some())
        .ok_or_else(|| BufferError::Validation("event too large".to_string()))?;

    let mut payload = BytesMut::with_capacity(EVENT_FIXED_SIZE + key.len() + value.len());
    order.put_u32(&mut payload, DataType::Char.tag());
    order.put_u32(&mut payload, key_len);
    order.put_u32(&mut payload, DataType::Char.tag());
    order.put_u32(&mut payload, value_len);
    order.put_i32(&mut payload, event.sample);
    order.put_i32(&mut payload, event.offset);
    order.put_i32(&mut payload, event.duration);
    order.put_u32(&mut payload, variable_len);
    payload.put_slice(key);
    payload.put_slice(value);

    Ok(encode_message(order, Command::PutEvt, &payload))
}

//! Data codec
//!
//! ## Wire Format
//!
//! ### GET_DAT request payload (bounded fetch only)
//! ```text
//! ┌───────────┬─────────┐
//! │ begin (4) │ end (4) │
//! └───────────┴─────────┘
//! ```
//! An empty payload asks for every sample currently held.
//!
//! ### GET_OK response payload
//! ```text
//! ┌──────────┬────────────┬──────────┬────────────┬──────────────────────┐
//! │ nchans(4)│ nsamples(4)│ dtype(4) │ bufsize(4) │ samples (row major)  │
//! └──────────┴────────────┴──────────┴────────────┴──────────────────────┘
//! ```

use bytes::BytesMut;

use super::{encode_message, ByteOrder, Command, DataType};
use crate::error::{BufferError, Result};

/// Size of the sample block descriptor
pub const DESCRIPTOR_SIZE: usize = 16;

/// Samples indexed `[sample][channel]`
pub type SampleMatrix = Vec<Vec<f64>>;

/// Descriptor preceding the raw samples of a GET_DAT response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleBlockDescriptor {
    pub channel_count: u32,
    pub sample_count: u32,
    pub data_type: u32,
    pub payload_size: u32,
}

/// Encode a complete GET_DAT message.
///
/// `Some((begin, end))` requests the inclusive sample range, `None` requests
/// everything available.
pub fn encode_data_request(order: ByteOrder, range: Option<(u32, u32)>) -> BytesMut {
    match range {
        Some((begin, end)) => {
            let mut payload = BytesMut::with_capacity(8);
            order.put_u32(&mut payload, begin);
            order.put_u32(&mut payload, end);
            encode_message(order, Command::GetDat, &payload)
        }
        None => encode_message(order, Command::GetDat, &[]),
    }
}

/// Decode the payload of a GET_OK response to GET_DAT
pub fn decode_data(order: ByteOrder, payload: &[u8]) -> Result<SampleMatrix> {
    if payload.len() < DESCRIPTOR_SIZE {
        return Err(BufferError::Protocol(format!(
            "GET_DAT: response too short (expected at least {} bytes, got {})",
            DESCRIPTOR_SIZE,
            payload.len()
        )));
    }

    let mut buf = payload;
    let descriptor = SampleBlockDescriptor {
        channel_count: order.get_u32(&mut buf),
        sample_count: order.get_u32(&mut buf),
        data_type: order.get_u32(&mut buf),
        payload_size: order.get_u32(&mut buf),
    };

    if descriptor.sample_count > 0 && descriptor.payload_size == 0 {
        return Err(BufferError::Protocol(format!(
            "GET_DAT: {} samples announced with an empty sample buffer",
            descriptor.sample_count
        )));
    }

    if descriptor.payload_size as usize != buf.len() {
        return Err(BufferError::Protocol(format!(
            "GET_DAT: sample buffer size mismatch (declared {}, carried {})",
            descriptor.payload_size,
            buf.len()
        )));
    }

    let data_type = DataType::try_from(descriptor.data_type)?;
    decode_samples(
        order,
        data_type,
        descriptor.channel_count,
        descriptor.sample_count,
        buf,
    )
}

/// Decode `sample_count × channel_count` scalars, sample-major
pub fn decode_samples(
    order: ByteOrder,
    data_type: DataType,
    channel_count: u32,
    sample_count: u32,
    bytes: &[u8],
) -> Result<SampleMatrix> {
    let channels = channel_count as usize;
    let samples = sample_count as usize;

    if channels == 0 && samples > 0 {
        return Err(BufferError::Protocol(format!(
            "GET_DAT: {} samples announced without any channel",
            samples
        )));
    }

    let needed = channels
        .checked_mul(samples)
        .and_then(|n| n.checked_mul(data_type.width()))
        .ok_or_else(|| {
            BufferError::Protocol(format!(
                "GET_DAT: sample block of {} x {} overflows",
                samples, channels
            ))
        })?;

    if bytes.len() < needed {
        return Err(BufferError::Protocol(format!(
            "GET_DAT: incomplete samples (expected {} bytes, got {})",
            needed,
            bytes.len()
        )));
    }

    let mut buf = &bytes[..needed];
    let mut matrix = Vec::with_capacity(samples);
    for _ in 0..samples {
        let row: Vec<f64> = (0..channels)
            .map(|_| data_type.read_widened(order, &mut buf))
            .collect();
        matrix.push(row);
    }

    Ok(matrix)
}

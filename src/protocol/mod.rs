//! Protocol Module
//!
//! Defines the buffer wire protocol: the message envelope and the payload
//! codecs for headers, sample data, events and wait requests.
//!
//! ## Message Format
//! ```text
//! ┌─────────────┬─────────────┬───────────────────┬─────────────────────┐
//! │ Version (2) │ Command (2) │ Payload size (4)  │       Payload       │
//! └─────────────┴─────────────┴───────────────────┴─────────────────────┘
//! ```
//!
//! All multi-byte fields use the byte order configured for the connection.
//!
//! ### Commands
//! - 0x101 PUT_HDR, 0x102 PUT_DAT, 0x103 PUT_EVT, 0x104 PUT_OK, 0x105 PUT_ERR
//! - 0x201 GET_HDR, 0x202 GET_DAT, 0x203 GET_EVT, 0x204 GET_OK, 0x205 GET_ERR
//! - 0x301 FLUSH_HDR, 0x302 FLUSH_DAT, 0x303 FLUSH_EVT, 0x304 FLUSH_OK, 0x305 FLUSH_ERR
//! - 0x402 WAIT_DAT, 0x404 WAIT_OK, 0x405 WAIT_ERR

mod byte_order;
mod command;
mod data;
mod data_type;
mod envelope;
mod event;
mod header;
mod wait;

pub use byte_order::ByteOrder;
pub use command::Command;
pub use data::{
    decode_data, decode_samples, encode_data_request, SampleBlockDescriptor, SampleMatrix,
    DESCRIPTOR_SIZE,
};
pub use data_type::DataType;
pub use envelope::{
    decode_envelope, encode_envelope, encode_message, read_envelope, write_envelope,
    MessageEnvelope, ENVELOPE_SIZE, PROTOCOL_VERSION,
};
pub use event::{encode_event_request, Event, EVENT_FIXED_SIZE};
pub use header::{
    decode_header, encode_get_header_request, encode_header_request, Header, HEADER_FIXED_SIZE,
};
pub use wait::{
    decode_wait_response, encode_wait_request, BufferCounts, WaitRequest, WAIT_REQUEST_SIZE,
    WAIT_RESPONSE_SIZE,
};

//! Sample data types
//!
//! The wire tag selects the width and encoding of every scalar in a sample
//! block. Decoded values are always widened to `f64`; 64-bit integers above
//! 2^53 in magnitude lose precision in the process.

use bytes::Buf;
use serde::{Deserialize, Serialize};

use super::ByteOrder;
use crate::error::BufferError;

/// Scalar encoding of sample data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DataType {
    Char = 0,
    Uint8 = 1,
    Uint16 = 2,
    Uint32 = 3,
    Uint64 = 4,
    Int8 = 5,
    Int16 = 6,
    Int32 = 7,
    Int64 = 8,
    Float32 = 9,
    Float64 = 10,
}

impl DataType {
    /// All tags in wire order
    pub const ALL: [DataType; 11] = [
        DataType::Char,
        DataType::Uint8,
        DataType::Uint16,
        DataType::Uint32,
        DataType::Uint64,
        DataType::Int8,
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::Float32,
        DataType::Float64,
    ];

    /// Wire tag of this type
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Width of one scalar in bytes
    pub fn width(self) -> usize {
        match self {
            DataType::Char | DataType::Uint8 | DataType::Int8 => 1,
            DataType::Uint16 | DataType::Int16 => 2,
            DataType::Uint32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::Uint64 | DataType::Int64 | DataType::Float64 => 8,
        }
    }

    /// Read one scalar of this type and widen it to `f64`.
    ///
    /// The caller guarantees `buf` holds at least `self.width()` bytes.
    #[inline]
    pub fn read_widened<B: Buf>(self, order: ByteOrder, buf: &mut B) -> f64 {
        match self {
            // A char is its single-byte code point
            DataType::Char | DataType::Uint8 => f64::from(buf.get_u8()),
            DataType::Uint16 => f64::from(order.get_u16(buf)),
            DataType::Uint32 => f64::from(order.get_u32(buf)),
            DataType::Uint64 => order.get_u64(buf) as f64,
            DataType::Int8 => f64::from(buf.get_i8()),
            DataType::Int16 => f64::from(order.get_i16(buf)),
            DataType::Int32 => f64::from(order.get_i32(buf)),
            DataType::Int64 => order.get_i64(buf) as f64,
            DataType::Float32 => f64::from(order.get_f32(buf)),
            DataType::Float64 => order.get_f64(buf),
        }
    }
}

impl TryFrom<u32> for DataType {
    type Error = BufferError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        DataType::ALL
            .get(tag as usize)
            .copied()
            .ok_or(BufferError::UnknownDataType(tag))
    }
}

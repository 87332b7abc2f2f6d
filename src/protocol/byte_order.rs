//! Wire byte order
//!
//! The buffer protocol has no fixed endianness: the server accepts either
//! order and answers in the same one. The order is therefore a per-connection
//! setting threaded through every encode/decode call.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Byte order used for every multi-byte field of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Network order (most significant byte first)
    #[default]
    Big,

    /// Least significant byte first
    Little,
}

macro_rules! order_accessors {
    ($($get:ident, $get_le:ident, $put:ident, $put_le:ident => $ty:ty;)*) => {
        impl ByteOrder {
            $(
                #[inline]
                pub fn $get<B: Buf>(self, buf: &mut B) -> $ty {
                    match self {
                        ByteOrder::Big => buf.$get(),
                        ByteOrder::Little => buf.$get_le(),
                    }
                }

                #[inline]
                pub fn $put<B: BufMut>(self, buf: &mut B, value: $ty) {
                    match self {
                        ByteOrder::Big => buf.$put(value),
                        ByteOrder::Little => buf.$put_le(value),
                    }
                }
            )*
        }
    };
}

order_accessors! {
    get_u16, get_u16_le, put_u16, put_u16_le => u16;
    get_i16, get_i16_le, put_i16, put_i16_le => i16;
    get_u32, get_u32_le, put_u32, put_u32_le => u32;
    get_i32, get_i32_le, put_i32, put_i32_le => i32;
    get_u64, get_u64_le, put_u64, put_u64_le => u64;
    get_i64, get_i64_le, put_i64, put_i64_le => i64;
    get_f32, get_f32_le, put_f32, put_f32_le => f32;
    get_f64, get_f64_le, put_f64, put_f64_le => f64;
}

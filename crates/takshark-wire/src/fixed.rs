//! Little-endian fixed-width values.

use crate::error::WireError;

/// Copy exactly `N` bytes starting at `offset`.
pub fn read_array<const N: usize>(
    buf: &[u8],
    offset: usize,
    op: &'static str,
) -> Result<[u8; N], WireError> {
    buf.get(offset..)
        .and_then(|rest| rest.get(..N))
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or(WireError::truncated(op, offset))
}

pub fn decode_fixed32(buf: &[u8], offset: usize) -> Result<(u32, usize), WireError> {
    read_array::<4>(buf, offset, "fixed32").map(|b| (u32::from_le_bytes(b), 4))
}

pub fn decode_fixed64(buf: &[u8], offset: usize) -> Result<(u64, usize), WireError> {
    read_array::<8>(buf, offset, "fixed64").map(|b| (u64::from_le_bytes(b), 8))
}

pub fn decode_float(buf: &[u8], offset: usize) -> Result<(f32, usize), WireError> {
    read_array::<4>(buf, offset, "float").map(|b| (f32::from_le_bytes(b), 4))
}

pub fn decode_double(buf: &[u8], offset: usize) -> Result<(f64, usize), WireError> {
    read_array::<8>(buf, offset, "double").map(|b| (f64::from_le_bytes(b), 8))
}

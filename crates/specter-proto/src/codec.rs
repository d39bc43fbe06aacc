//! Encoding/decoding traits shared by every packet codec.

use bytes::{Buf, BufMut, Bytes};

use crate::error::ProtoError;
use crate::varint::VarUInt32;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

/// Fail unless at least `needed` bytes remain.
pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a Bedrock string (VarUInt32 length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarUInt32(s.len() as u32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a Bedrock string (VarUInt32 length + UTF-8).
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    let data = read_byte_array(buf)?;
    String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)
}

/// Read a VarUInt32-length-prefixed byte array.
pub fn read_byte_array(buf: &mut impl Buf) -> Result<Bytes, ProtoError> {
    let len = VarUInt32::proto_decode(buf)?.0 as usize;
    ensure_remaining(buf, len)?;
    Ok(buf.copy_to_bytes(len))
}

/// Write a VarUInt32-length-prefixed byte array.
pub fn write_byte_array(buf: &mut impl BufMut, data: &[u8]) {
    VarUInt32(data.len() as u32).proto_encode(buf);
    buf.put_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn string_roundtrip() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "specter relay");
        assert_eq!(read_string(&mut buf.freeze()).unwrap(), "specter relay");
    }

    #[test]
    fn string_empty() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "");
        assert_eq!(read_string(&mut buf.freeze()).unwrap(), "");
    }

    #[test]
    fn string_unicode() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "日本語テスト");
        assert_eq!(read_string(&mut buf.freeze()).unwrap(), "日本語テスト");
    }

    #[test]
    fn string_truncated() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "hello");
        let truncated = buf.freeze().slice(..3);
        assert!(read_string(&mut truncated.clone()).is_err());
    }

    #[test]
    fn byte_array_roundtrip() {
        let mut buf = BytesMut::new();
        write_byte_array(&mut buf, &[1, 2, 3, 4]);
        let data = read_byte_array(&mut buf.freeze()).unwrap();
        assert_eq!(&data[..], &[1, 2, 3, 4]);
    }
}

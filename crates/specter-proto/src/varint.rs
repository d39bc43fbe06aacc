//! Variable-length integer codecs (LEB128, ZigZag for the signed forms).

use std::fmt;

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

macro_rules! unsigned_varint {
    ($name:ident, $prim:ty, $max_bytes:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub $prim);

        impl $name {
            /// Maximum bytes this varint can occupy on the wire.
            pub const MAX_BYTES: usize = $max_bytes;
        }

        impl ProtoEncode for $name {
            fn proto_encode(&self, buf: &mut impl BufMut) {
                let mut value = self.0;
                loop {
                    if value & !0x7F == 0 {
                        buf.put_u8(value as u8);
                        return;
                    }
                    buf.put_u8((value & 0x7F | 0x80) as u8);
                    value >>= 7;
                }
            }
        }

        impl ProtoDecode for $name {
            fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
                let mut result: $prim = 0;
                let mut shift: u32 = 0;
                for i in 0..Self::MAX_BYTES {
                    if !buf.has_remaining() {
                        return Err(ProtoError::VarIntTruncated);
                    }
                    let byte = buf.get_u8();
                    result |= ((byte & 0x7F) as $prim) << shift;
                    if byte & 0x80 == 0 {
                        return Ok($name(result));
                    }
                    shift += 7;
                    if i == Self::MAX_BYTES - 1 {
                        return Err(ProtoError::VarIntTooLong {
                            max_bytes: Self::MAX_BYTES,
                        });
                    }
                }
                Err(ProtoError::VarIntTruncated)
            }
        }

        impl From<$prim> for $name {
            fn from(v: $prim) -> Self {
                $name(v)
            }
        }

        impl From<$name> for $prim {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! signed_varint {
    ($name:ident, $prim:ty, $unsigned:ident, $uprim:ty, $sign_shift:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub $prim);

        impl $name {
            /// Maximum bytes this varint can occupy on the wire.
            pub const MAX_BYTES: usize = $unsigned::MAX_BYTES;

            fn zigzag(self) -> $uprim {
                ((self.0 << 1) ^ (self.0 >> $sign_shift)) as $uprim
            }

            fn unzigzag(v: $uprim) -> $prim {
                (v >> 1) as $prim ^ -((v & 1) as $prim)
            }
        }

        impl ProtoEncode for $name {
            fn proto_encode(&self, buf: &mut impl BufMut) {
                $unsigned(self.zigzag()).proto_encode(buf);
            }
        }

        impl ProtoDecode for $name {
            fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
                let raw = $unsigned::proto_decode(buf)?.0;
                Ok($name(Self::unzigzag(raw)))
            }
        }

        impl From<$prim> for $name {
            fn from(v: $prim) -> Self {
                $name(v)
            }
        }

        impl From<$name> for $prim {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

unsigned_varint!(VarUInt32, u32, 5);
unsigned_varint!(VarUInt64, u64, 10);
signed_varint!(VarInt, i32, VarUInt32, u32, 31);
signed_varint!(VarLong, i64, VarUInt64, u64, 63);

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn roundtrip_varint(value: i32) {
        let mut buf = BytesMut::new();
        VarInt(value).proto_encode(&mut buf);
        let decoded = VarInt::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.0, value, "VarInt roundtrip failed for {value}");
    }

    fn roundtrip_varlong(value: i64) {
        let mut buf = BytesMut::new();
        VarLong(value).proto_encode(&mut buf);
        let decoded = VarLong::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.0, value, "VarLong roundtrip failed for {value}");
    }

    fn roundtrip_varuint32(value: u32) {
        let mut buf = BytesMut::new();
        VarUInt32(value).proto_encode(&mut buf);
        let decoded = VarUInt32::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.0, value);
    }

    fn roundtrip_varuint64(value: u64) {
        let mut buf = BytesMut::new();
        VarUInt64(value).proto_encode(&mut buf);
        let decoded = VarUInt64::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.0, value);
    }

    #[test]
    fn varint_values() {
        for v in [0, 1, -1, 127, -128, 255, 1000, -100_000, i32::MAX, i32::MIN] {
            roundtrip_varint(v);
        }
    }

    #[test]
    fn varlong_values() {
        for v in [0, 1, -1, 1_000_000_000, -1_000_000_000, i64::MAX, i64::MIN] {
            roundtrip_varlong(v);
        }
    }

    #[test]
    fn varuint32_values() {
        for v in [0, 1, 127, 128, 255, 300, 100_000, u32::MAX] {
            roundtrip_varuint32(v);
        }
    }

    #[test]
    fn varuint64_values() {
        for v in [0, 1, 127, 128, u32::MAX as u64, u64::MAX] {
            roundtrip_varuint64(v);
        }
    }

    #[test]
    fn signed_forms_use_zigzag() {
        // VarInt(1) zigzags to 2; VarUInt32(1) stays 1.
        let mut signed = BytesMut::new();
        VarInt(1).proto_encode(&mut signed);
        assert_eq!(&signed[..], &[0x02]);

        let mut unsigned = BytesMut::new();
        VarUInt32(1).proto_encode(&mut unsigned);
        assert_eq!(&unsigned[..], &[0x01]);

        // -1 zigzags to 1, the most compact negative.
        let mut neg = BytesMut::new();
        VarInt(-1).proto_encode(&mut neg);
        assert_eq!(&neg[..], &[0x01]);
    }

    #[test]
    fn truncated_input_errors() {
        assert!(VarInt::proto_decode(&mut &[][..]).is_err());
        assert!(VarInt::proto_decode(&mut &[0x80u8][..]).is_err());
        assert!(VarUInt64::proto_decode(&mut &[0x80u8, 0x80][..]).is_err());
    }

    #[test]
    fn overlong_input_errors() {
        // Six continuation bytes exceed the 5-byte limit of a 32-bit varint.
        let overlong = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(VarUInt32::proto_decode(&mut &overlong[..]).is_err());
    }
}

//! Batch payload compression, negotiated per connection.

use crate::error::ProtoError;

/// Compression algorithms Bedrock negotiates in NetworkSettings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Zlib,
    Snappy,
    None,
}

impl Compression {
    /// Algorithm marker byte at the head of a compressed batch.
    pub fn from_byte(v: u8) -> Result<Self, ProtoError> {
        match v {
            0x00 => Ok(Self::Zlib),
            0x01 => Ok(Self::Snappy),
            0xFF => Ok(Self::None),
            other => Err(ProtoError::UnknownCompression(other)),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Zlib => 0x00,
            Self::Snappy => 0x01,
            Self::None => 0xFF,
        }
    }

    /// Compress a raw batch body. `level` applies to zlib only.
    pub fn compress(self, data: &[u8], level: u32) -> Result<Vec<u8>, ProtoError> {
        match self {
            Self::Zlib => {
                use flate2::write::DeflateEncoder;
                use std::io::Write;

                let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::new(level));
                encoder
                    .write_all(data)
                    .map_err(|e| ProtoError::CompressError(e.to_string()))?;
                encoder
                    .finish()
                    .map_err(|e| ProtoError::CompressError(e.to_string()))
            }
            Self::Snappy => snap::raw::Encoder::new()
                .compress_vec(data)
                .map_err(|e| ProtoError::CompressError(e.to_string())),
            Self::None => Ok(data.to_vec()),
        }
    }

    /// Decompress a batch body.
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, ProtoError> {
        match self {
            Self::Zlib => {
                use flate2::read::DeflateDecoder;
                use std::io::Read;

                let mut output = Vec::new();
                DeflateDecoder::new(data)
                    .read_to_end(&mut output)
                    .map_err(|e| ProtoError::DecompressError(e.to_string()))?;
                Ok(output)
            }
            Self::Snappy => snap::raw::Decoder::new()
                .decompress_vec(data)
                .map_err(|e| ProtoError::DecompressError(e.to_string())),
            Self::None => Ok(data.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_roundtrip() {
        let data = b"a relay sees the same bytes twice, once per direction";
        let compressed = Compression::Zlib.compress(data, 6).unwrap();
        assert_eq!(Compression::Zlib.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn snappy_roundtrip() {
        let data = b"snappy path for servers that negotiate it";
        let compressed = Compression::Snappy.compress(data, 0).unwrap();
        assert_eq!(Compression::Snappy.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn none_is_identity() {
        let data = b"untouched";
        assert_eq!(Compression::None.compress(data, 0).unwrap(), data);
        assert_eq!(Compression::None.decompress(data).unwrap(), data);
    }

    #[test]
    fn zlib_empty() {
        let compressed = Compression::Zlib.compress(b"", 6).unwrap();
        assert!(Compression::Zlib.decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn marker_byte_roundtrip() {
        for algo in [Compression::Zlib, Compression::Snappy, Compression::None] {
            assert_eq!(Compression::from_byte(algo.to_byte()).unwrap(), algo);
        }
        assert!(Compression::from_byte(0x42).is_err());
    }
}

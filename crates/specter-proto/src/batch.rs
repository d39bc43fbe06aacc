//! Game packet batch layer (the 0xFE payload RakNet carries).
//!
//! A batch is an optionally compressed sequence of sub-packets, each
//! prefixed with a VarUInt32 length. The relay decodes batches from both
//! directions and re-encodes whatever survives the pipeline.

use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::compression::Compression;
use crate::error::ProtoError;
use crate::varint::VarUInt32;

/// Marker byte RakNet uses for game packet payloads.
pub const GAME_PACKET_MARKER: u8 = 0xFE;

/// Per-connection batch codec settings.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Algorithm for outgoing batches.
    pub compression: Compression,
    /// Zlib level (ignored for snappy/none).
    pub compression_level: u32,
    /// Batches smaller than this stay uncompressed.
    pub compression_threshold: usize,
    /// False until the NetworkSettings exchange has been observed.
    pub compression_enabled: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Zlib,
            compression_level: 7,
            compression_threshold: 256,
            compression_enabled: false,
        }
    }
}

/// Decode a batch payload (marker already stripped) into sub-packets.
///
/// Each returned `Bytes` is one sub-packet: VarUInt32 packet id + body.
pub fn decode_batch(data: Bytes, config: &BatchConfig) -> Result<Vec<Bytes>, ProtoError> {
    let decompressed = if config.compression_enabled {
        if data.is_empty() {
            return Err(ProtoError::EmptyBatch);
        }
        let algorithm = Compression::from_byte(data[0])?;
        Bytes::from(algorithm.decompress(&data[1..])?)
    } else {
        data
    };

    let mut cursor = Cursor::new(&decompressed[..]);
    let mut packets = Vec::new();
    while cursor.has_remaining() {
        let len = VarUInt32::proto_decode(&mut cursor)?.0 as usize;
        if cursor.remaining() < len {
            return Err(ProtoError::BufferTooShort {
                needed: len,
                remaining: cursor.remaining(),
            });
        }
        let start = cursor.position() as usize;
        packets.push(decompressed.slice(start..start + len));
        cursor.set_position((start + len) as u64);
    }
    Ok(packets)
}

/// Encode sub-packets into one batch payload (marker not included).
pub fn encode_batch(packets: &[Bytes], config: &BatchConfig) -> Result<Bytes, ProtoError> {
    let mut batch = BytesMut::new();
    for packet in packets {
        VarUInt32(packet.len() as u32).proto_encode(&mut batch);
        batch.put_slice(packet);
    }

    if !config.compression_enabled {
        return Ok(batch.freeze());
    }

    let algorithm = if batch.len() < config.compression_threshold {
        Compression::None
    } else {
        config.compression
    };
    let compressed = algorithm.compress(&batch, config.compression_level)?;

    let mut output = BytesMut::with_capacity(1 + compressed.len());
    output.put_u8(algorithm.to_byte());
    output.put_slice(&compressed);
    Ok(output.freeze())
}

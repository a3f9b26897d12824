use std::sync::Arc;

use super::{Codec, CodecError, CodecFlags, ColumnValue};

/// Opaque binary encoding: MessagePack, then LZ4 block compression.
///
/// Full-fidelity for any serde value (including non-finite floats), but only
/// readable by something that speaks the same pipeline. Flags are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl BinaryCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for BinaryCodec {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn encode<V: ColumnValue>(&self, value: &V, _flags: &CodecFlags) -> Result<Vec<u8>, CodecError> {
        let msgpack_bytes = rmp_serde::to_vec(value)?;
        lz4::block::compress(&msgpack_bytes, None, true).map_err(|e| CodecError::Compression {
            op: "compression",
            source: Arc::new(e),
        })
    }

    fn decode<V: ColumnValue>(&self, bytes: &[u8], _flags: &CodecFlags) -> Result<V, CodecError> {
        let decompressed = lz4::block::decompress(bytes, None).map_err(|e| CodecError::Compression {
            op: "decompression",
            source: Arc::new(e),
        })?;
        Ok(rmp_serde::from_slice(&decompressed)?)
    }
}

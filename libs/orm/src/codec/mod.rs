//! Pluggable value codecs.
//!
//! ```text
//!                          Codec
//!        (encode / decode / can_deserialize, flags-aware)
//!                            │
//!        ┌───────────────────┼───────────────────┐
//!        ▼                   ▼                   ▼
//!   BestFitCodec         JsonCodec          BinaryCodec
//!  (native set or      (serde_json)     (MessagePack + LZ4)
//!   text, else JSON)
//! ```
//!
//! Codecs are stateless and shared across threads. The engine calls the
//! provided `serialize` / `deserialize` methods so that an absent value maps
//! to an absent cell and back; `encode` / `decode` only ever see present
//! values.

mod best_fit;
mod binary;
mod finite;
mod flags;
mod json;
mod native;
mod value;

use std::sync::Arc;

use thiserror::Error;

pub use best_fit::BestFitCodec;
pub use binary::BinaryCodec;
pub use flags::{CodecFlag, CodecFlags, SERIALIZE_AS_STRING};
pub use json::JsonCodec;
pub use native::{NativeKind, NativeValue};
pub use value::{ColumnValue, ValueShape};

/// Conversion between a typed value and its cell bytes.
///
/// Implementations must satisfy the round-trip law: for every `V` with
/// `can_deserialize::<V>()`, `decode(encode(v, f), f) == v`.
pub trait Codec: Send + Sync + 'static {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Encode a present value.
    fn encode<V: ColumnValue>(&self, value: &V, flags: &CodecFlags) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes of a present cell.
    fn decode<V: ColumnValue>(&self, bytes: &[u8], flags: &CodecFlags) -> Result<V, CodecError>;

    /// Whether values of type `V` survive `encode` then `decode` unchanged.
    fn can_deserialize<V: ColumnValue>(&self) -> bool {
        true
    }

    /// Encode an optional value; `None` produces no bytes (and so no cell).
    fn serialize<V: ColumnValue>(
        &self,
        value: Option<&V>,
        flags: &CodecFlags,
    ) -> Result<Option<Vec<u8>>, CodecError> {
        value.map(|v| self.encode(v, flags)).transpose()
    }

    /// Decode optional cell bytes; a missing cell decodes to `None`.
    fn deserialize<V: ColumnValue>(
        &self,
        bytes: Option<&[u8]>,
        flags: &CodecFlags,
    ) -> Result<Option<V>, CodecError> {
        bytes.map(|b| self.decode(b, flags)).transpose()
    }
}

/// Failure inside a codec.
///
/// Library errors are held in `Arc` so the error stays `Clone`.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    #[error("MessagePack encode error: {0}")]
    MsgpackEncode(#[source] Arc<rmp_serde::encode::Error>),

    #[error("MessagePack decode error: {0}")]
    MsgpackDecode(#[source] Arc<rmp_serde::decode::Error>),

    #[error("LZ4 {op} failed: {source}")]
    Compression {
        op: &'static str,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("{kind} needs {expected} bytes, found {found}")]
    Width {
        kind: NativeKind,
        expected: usize,
        found: usize,
    },

    #[error("{kind} bytes are not valid UTF-8: {source}")]
    Utf8 {
        kind: NativeKind,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("cannot parse {text:?} as {kind}")]
    Text { kind: NativeKind, text: String },

    #[error("{kind} value cannot be converted into `{type_name}`")]
    NativeMismatch {
        kind: NativeKind,
        type_name: &'static str,
    },

    #[error("JSON cannot represent non-finite float {value}")]
    NonFiniteFloat { value: f64 },
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(Arc::new(err))
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        CodecError::MsgpackEncode(Arc::new(err))
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        CodecError::MsgpackDecode(Arc::new(err))
    }
}

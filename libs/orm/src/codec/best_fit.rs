use super::finite::ensure_finite;
use super::{Codec, CodecError, CodecFlags, ColumnValue, NativeValue, SERIALIZE_AS_STRING};

/// Compact native encodings for the native set, JSON for everything else.
///
/// With the [`SERIALIZE_AS_STRING`] flag set on a column, native values are
/// written in their canonical text form instead (`560034` becomes the six
/// bytes `"560034"` rather than a 4-byte integer). Types outside the native
/// set ignore the flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFitCodec;

impl BestFitCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for BestFitCodec {
    fn name(&self) -> &'static str {
        "best-fit"
    }

    fn encode<V: ColumnValue>(&self, value: &V, flags: &CodecFlags) -> Result<Vec<u8>, CodecError> {
        match value.to_native() {
            Some(native) if flags.is_set(SERIALIZE_AS_STRING) => Ok(native.to_text().into_bytes()),
            Some(native) => Ok(native.to_bytes()),
            None => {
                ensure_finite(value)?;
                Ok(serde_json::to_vec(value)?)
            }
        }
    }

    fn decode<V: ColumnValue>(&self, bytes: &[u8], flags: &CodecFlags) -> Result<V, CodecError> {
        let Some(kind) = V::native_kind() else {
            return Ok(serde_json::from_slice(bytes)?);
        };
        let native = if flags.is_set(SERIALIZE_AS_STRING) {
            let text = std::str::from_utf8(bytes).map_err(|source| CodecError::Utf8 { kind, source })?;
            NativeValue::parse(kind, text)?
        } else {
            NativeValue::from_bytes(kind, bytes)?
        };
        V::from_native(native).ok_or(CodecError::NativeMismatch {
            kind,
            type_name: std::any::type_name::<V>(),
        })
    }
}

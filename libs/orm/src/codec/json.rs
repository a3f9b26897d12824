use super::finite::ensure_finite;
use super::{Codec, CodecError, CodecFlags, ColumnValue};

/// Every value as JSON text. No native special cases, flags are ignored.
///
/// Human-inspectable and portable. NaN and the infinities have no JSON form,
/// so encoding them fails with [`CodecError::NonFiniteFloat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<V: ColumnValue>(&self, value: &V, _flags: &CodecFlags) -> Result<Vec<u8>, CodecError> {
        ensure_finite(value)?;
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<V: ColumnValue>(&self, bytes: &[u8], _flags: &CodecFlags) -> Result<V, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_integers_are_json_text() {
        let bytes = JsonCodec.encode(&560034i32, &CodecFlags::new()).unwrap();
        assert_eq!(bytes, b"560034".to_vec());
    }

    #[test]
    fn test_string_is_quoted() {
        let bytes = JsonCodec.encode(&"IND".to_string(), &CodecFlags::new()).unwrap();
        assert_eq!(bytes, b"\"IND\"".to_vec());
        let back: String = JsonCodec.decode(&bytes, &CodecFlags::new()).unwrap();
        assert_eq!(back, "IND");
    }

    #[test]
    fn test_integer_keyed_map_round_trips() {
        let mut map = BTreeMap::new();
        map.insert(-3i64, "a".to_string());
        map.insert(9i64, "b".to_string());
        let bytes = JsonCodec.encode(&map, &CodecFlags::new()).unwrap();
        let back: BTreeMap<i64, String> = JsonCodec.decode(&bytes, &CodecFlags::new()).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        let flags = CodecFlags::new();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = JsonCodec.encode(&value, &flags).unwrap_err();
            assert!(matches!(err, CodecError::NonFiniteFloat { .. }));
        }
        assert!(JsonCodec.encode(&f32::INFINITY, &flags).is_err());
        assert!(JsonCodec.encode(&vec![1.0f64, f64::NAN], &flags).is_err());
        assert!(JsonCodec.serialize(Some(&f64::INFINITY), &flags).is_err());

        let bytes = JsonCodec.encode(&f64::MAX, &flags).unwrap();
        assert_eq!(JsonCodec.decode::<f64>(&bytes, &flags).unwrap(), f64::MAX);
    }

    #[test]
    fn test_malformed_input() {
        let err = JsonCodec.decode::<i32>(b"{", &CodecFlags::new()).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}

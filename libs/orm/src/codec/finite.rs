//! Non-finite float detection for the JSON encodings.
//!
//! `serde_json` writes NaN and the infinities as `null`, which no float
//! field can read back. [`ensure_finite`] walks a value with a serializer
//! that only inspects floats, so the write fails instead.

use std::fmt;

use serde::ser::{self, Serialize};

use super::CodecError;

/// Fail with [`CodecError::NonFiniteFloat`] if `value` holds NaN or an
/// infinity anywhere, however deeply nested.
pub(super) fn ensure_finite<V: Serialize + ?Sized>(value: &V) -> Result<(), CodecError> {
    match value.serialize(FloatCheck) {
        Err(Found::NonFinite(value)) => Err(CodecError::NonFiniteFloat { value }),
        // Any other failure is the encoder's to report.
        Err(Found::Other(_)) | Ok(()) => Ok(()),
    }
}

#[derive(Debug)]
enum Found {
    NonFinite(f64),
    Other(String),
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::NonFinite(value) => write!(f, "non-finite float {value}"),
            Found::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Found {}

impl ser::Error for Found {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Found::Other(msg.to_string())
    }
}

fn check(value: f64) -> Result<(), Found> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Found::NonFinite(value))
    }
}

struct FloatCheck;

impl ser::Serializer for FloatCheck {
    type Ok = ();
    type Error = Found;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Result<(), Found> {
        check(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Found> {
        check(v)
    }

    fn serialize_bool(self, _v: bool) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), Found> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), Found> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Found> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Found> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, Found> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, Found> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, Found> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, Found> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self, Found> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, Found> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, Found> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

impl ser::SerializeTuple for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

impl ser::SerializeMap for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Found> {
        key.serialize(FloatCheck)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

impl ser::SerializeStruct for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FloatCheck {
    type Ok = ();
    type Error = Found;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Found> {
        value.serialize(FloatCheck)
    }

    fn end(self) -> Result<(), Found> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(serde::Serialize)]
    struct Reading {
        label: String,
        values: Vec<Option<f32>>,
    }

    #[test]
    fn test_finite_values_pass() {
        ensure_finite(&1.5f64).unwrap();
        ensure_finite(&vec![0.0f32, -2.5]).unwrap();
        ensure_finite(&"text").unwrap();
        ensure_finite(&BTreeMap::from([(1i64, f64::MAX)])).unwrap();
    }

    #[test]
    fn test_non_finite_values_are_found_at_any_depth() {
        assert!(matches!(
            ensure_finite(&f64::INFINITY),
            Err(CodecError::NonFiniteFloat { value }) if value == f64::INFINITY
        ));
        assert!(ensure_finite(&f32::NEG_INFINITY).is_err());
        assert!(ensure_finite(&BTreeMap::from([(1i64, f64::NAN)])).is_err());

        let reading = Reading {
            label: "boiler".to_string(),
            values: vec![Some(1.0), None, Some(f32::NAN)],
        };
        let err = ensure_finite(&reading).unwrap_err();
        assert!(err.to_string().contains("NaN"));
    }
}

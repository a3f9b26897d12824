//! The closed set of natively encoded value types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::CodecError;

/// Kinds the best-fit codec encodes without a structured format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Bool,
    Short,
    Int,
    Long,
    Float,
    Double,
    Text,
    Decimal,
}

impl NativeKind {
    /// Fixed byte width, or `None` for UTF-8 encoded kinds.
    pub fn width(self) -> Option<usize> {
        match self {
            NativeKind::Bool => Some(1),
            NativeKind::Short => Some(2),
            NativeKind::Int | NativeKind::Float => Some(4),
            NativeKind::Long | NativeKind::Double => Some(8),
            NativeKind::Text | NativeKind::Decimal => None,
        }
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeKind::Bool => "bool",
            NativeKind::Short => "i16",
            NativeKind::Int => "i32",
            NativeKind::Long => "i64",
            NativeKind::Float => "f32",
            NativeKind::Double => "f64",
            NativeKind::Text => "string",
            NativeKind::Decimal => "decimal",
        };
        f.write_str(name)
    }
}

/// A value of one of the native kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Bool(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Decimal(Decimal),
}

impl NativeValue {
    pub fn kind(&self) -> NativeKind {
        match self {
            NativeValue::Bool(_) => NativeKind::Bool,
            NativeValue::Short(_) => NativeKind::Short,
            NativeValue::Int(_) => NativeKind::Int,
            NativeValue::Long(_) => NativeKind::Long,
            NativeValue::Float(_) => NativeKind::Float,
            NativeValue::Double(_) => NativeKind::Double,
            NativeValue::Text(_) => NativeKind::Text,
            NativeValue::Decimal(_) => NativeKind::Decimal,
        }
    }

    /// Compact encoding: big-endian fixed width for numbers, `0xFF`/`0x00`
    /// for booleans, UTF-8 for text and decimals.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            NativeValue::Bool(v) => vec![if *v { 0xFF } else { 0x00 }],
            NativeValue::Short(v) => v.to_be_bytes().to_vec(),
            NativeValue::Int(v) => v.to_be_bytes().to_vec(),
            NativeValue::Long(v) => v.to_be_bytes().to_vec(),
            NativeValue::Float(v) => v.to_bits().to_be_bytes().to_vec(),
            NativeValue::Double(v) => v.to_bits().to_be_bytes().to_vec(),
            NativeValue::Text(v) => v.as_bytes().to_vec(),
            NativeValue::Decimal(v) => v.to_string().into_bytes(),
        }
    }

    pub fn from_bytes(kind: NativeKind, bytes: &[u8]) -> Result<Self, CodecError> {
        if let Some(expected) = kind.width() {
            if bytes.len() != expected {
                return Err(CodecError::Width {
                    kind,
                    expected,
                    found: bytes.len(),
                });
            }
        }
        let value = match kind {
            NativeKind::Bool => NativeValue::Bool(bytes[0] != 0),
            NativeKind::Short => NativeValue::Short(i16::from_be_bytes([bytes[0], bytes[1]])),
            NativeKind::Int => NativeValue::Int(i32::from_be_bytes(fixed(bytes))),
            NativeKind::Long => NativeValue::Long(i64::from_be_bytes(fixed(bytes))),
            NativeKind::Float => NativeValue::Float(f32::from_bits(u32::from_be_bytes(fixed(bytes)))),
            NativeKind::Double => NativeValue::Double(f64::from_bits(u64::from_be_bytes(fixed(bytes)))),
            NativeKind::Text => NativeValue::Text(utf8(kind, bytes)?.to_owned()),
            NativeKind::Decimal => Self::parse(kind, utf8(kind, bytes)?)?,
        };
        Ok(value)
    }

    /// Canonical text form, the inverse of [`NativeValue::parse`].
    pub fn to_text(&self) -> String {
        match self {
            NativeValue::Bool(v) => v.to_string(),
            NativeValue::Short(v) => v.to_string(),
            NativeValue::Int(v) => v.to_string(),
            NativeValue::Long(v) => v.to_string(),
            NativeValue::Float(v) => v.to_string(),
            NativeValue::Double(v) => v.to_string(),
            NativeValue::Text(v) => v.clone(),
            NativeValue::Decimal(v) => v.to_string(),
        }
    }

    pub fn parse(kind: NativeKind, text: &str) -> Result<Self, CodecError> {
        let bad = || CodecError::Text {
            kind,
            text: text.to_owned(),
        };
        let value = match kind {
            NativeKind::Bool => NativeValue::Bool(text.parse().map_err(|_| bad())?),
            NativeKind::Short => NativeValue::Short(text.parse().map_err(|_| bad())?),
            NativeKind::Int => NativeValue::Int(text.parse().map_err(|_| bad())?),
            NativeKind::Long => NativeValue::Long(text.parse().map_err(|_| bad())?),
            NativeKind::Float => NativeValue::Float(text.parse().map_err(|_| bad())?),
            NativeKind::Double => NativeValue::Double(text.parse().map_err(|_| bad())?),
            NativeKind::Text => NativeValue::Text(text.to_owned()),
            NativeKind::Decimal => NativeValue::Decimal(Decimal::from_str(text).map_err(|_| bad())?),
        };
        Ok(value)
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn utf8(kind: NativeKind, bytes: &[u8]) -> Result<&str, CodecError> {
    std::str::from_utf8(bytes).map_err(|source| CodecError::Utf8 { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_layout() {
        assert_eq!(NativeValue::Int(30000).to_bytes(), vec![0, 0, 0x75, 0x30]);
        assert_eq!(NativeValue::Short(-1).to_bytes(), vec![0xFF, 0xFF]);
        assert_eq!(NativeValue::Bool(true).to_bytes(), vec![0xFF]);
        assert_eq!(NativeValue::Long(1).to_bytes(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_any_nonzero_byte_is_true() {
        assert_eq!(
            NativeValue::from_bytes(NativeKind::Bool, &[0x01]).unwrap(),
            NativeValue::Bool(true)
        );
        assert_eq!(
            NativeValue::from_bytes(NativeKind::Bool, &[0x00]).unwrap(),
            NativeValue::Bool(false)
        );
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let err = NativeValue::from_bytes(NativeKind::Long, &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Width {
                kind: NativeKind::Long,
                expected: 8,
                found: 3
            }
        ));
    }

    #[test]
    fn test_decimal_is_text() {
        let value = NativeValue::Decimal(Decimal::new(12345, 2));
        assert_eq!(value.to_bytes(), b"123.45".to_vec());
        assert_eq!(NativeValue::from_bytes(NativeKind::Decimal, b"123.45").unwrap(), value);
    }

    #[test]
    fn test_text_parse_failure_names_kind() {
        let err = NativeValue::parse(NativeKind::Int, "12x").unwrap_err();
        assert_eq!(err.to_string(), "cannot parse \"12x\" as i32");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = NativeValue::from_bytes(NativeKind::Text, &[0xC3, 0x28]).unwrap_err();
        assert!(matches!(err, CodecError::Utf8 { kind: NativeKind::Text, .. }));
    }
}

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{NativeKind, NativeValue};

/// How a value type is laid out, as far as column validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A single value.
    Scalar,
    /// `BTreeMap<i64, V>`: the only container a multi-version column accepts.
    TimestampMap,
    /// Any other map or sequence.
    Container(&'static str),
}

/// A value that can be stored in a cell.
///
/// Types in the native set override the `native` hooks; everything else gets
/// the structured fallback of whichever codec is in use. User types opt in
/// with an empty impl:
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Address { city: String, pin: u32 }
///
/// impl ColumnValue for Address {}
/// ```
pub trait ColumnValue: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn native_kind() -> Option<NativeKind> {
        None
    }

    fn to_native(&self) -> Option<NativeValue> {
        None
    }

    fn from_native(_value: NativeValue) -> Option<Self> {
        None
    }

    fn shape() -> ValueShape {
        ValueShape::Scalar
    }

    /// Whether this value, used as a row key, identifies nothing. Checked on
    /// the composed key, before any codec sees it.
    fn is_empty_key(&self) -> bool {
        matches!(self.to_native(), Some(NativeValue::Text(text)) if text.is_empty())
    }
}

macro_rules! native_column_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ColumnValue for $ty {
                fn native_kind() -> Option<NativeKind> {
                    Some(NativeKind::$variant)
                }

                fn to_native(&self) -> Option<NativeValue> {
                    Some(NativeValue::$variant(self.clone()))
                }

                fn from_native(value: NativeValue) -> Option<Self> {
                    match value {
                        NativeValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

native_column_value! {
    bool => Bool,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => Text,
    Decimal => Decimal,
}

impl ColumnValue for i8 {}
impl ColumnValue for u8 {}
impl ColumnValue for u16 {}
impl ColumnValue for u32 {}
impl ColumnValue for u64 {}
impl ColumnValue for char {}

impl<V: ColumnValue> ColumnValue for Vec<V> {
    fn shape() -> ValueShape {
        ValueShape::Container("Vec")
    }

    fn is_empty_key(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> ColumnValue for HashMap<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash + Send + Sync + 'static,
    V: ColumnValue,
{
    fn shape() -> ValueShape {
        ValueShape::Container("HashMap")
    }

    fn is_empty_key(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> ColumnValue for BTreeMap<K, V>
where
    K: Serialize + DeserializeOwned + Ord + Send + Sync + 'static,
    V: ColumnValue,
{
    fn shape() -> ValueShape {
        if TypeId::of::<K>() == TypeId::of::<i64>() {
            ValueShape::TimestampMap
        } else {
            ValueShape::Container("BTreeMap")
        }
    }

    fn is_empty_key(&self) -> bool {
        self.is_empty()
    }
}

//! Declarative metadata a record type attaches to itself.
//!
//! These are plain data mirroring table-level and field-level attributes.
//! Nothing here checks consistency: a declaration may be contradictory, and
//! it is the validator's job to say so.

use std::any::TypeId;
use std::fmt;

use crate::codec::{CodecFlag, ColumnValue, ValueShape};

pub const DEFAULT_NAMESPACE: &str = "default";

// ============================================================================
// Table-level declarations
// ============================================================================

/// A column family and how many versions the table retains for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyDecl {
    pub name: String,
    pub max_versions: u32,
}

/// Table-level declaration: where the record lives and what it may use.
///
/// # Example
///
/// ```rust,ignore
/// let table = TableDecl::new("employees")
///     .namespace("hr")
///     .family("main", 1)
///     .family("optional", 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    pub namespace: String,
    pub name: String,
    pub families: Vec<FamilyDecl>,
    pub row_key_flags: Vec<CodecFlag>,
}

impl TableDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            name: name.into(),
            families: Vec::new(),
            row_key_flags: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn family(mut self, name: impl Into<String>, max_versions: u32) -> Self {
        self.families.push(FamilyDecl {
            name: name.into(),
            max_versions,
        });
        self
    }

    pub fn row_key_flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.row_key_flags.push(CodecFlag::new(name, value));
        self
    }
}

/// Fully qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace == DEFAULT_NAMESPACE {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

// ============================================================================
// Field-level declarations
// ============================================================================

/// Storage shape of a field's Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `Option<V>`: absence is representable.
    Nullable(ValueShape),
    /// A bare primitive that always holds a value.
    Primitive(&'static str),
    /// Declared without a type (row-key markers).
    Untyped,
}

/// The value type a visitor must hand over for a field: `V` for
/// `Option<V>`, the type itself for a bare primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    pub fn of<V: 'static>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: std::any::type_name::<V>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Maps a field's Rust type to its [`FieldShape`] and [`ValueType`].
///
/// Implemented for `Option<V>` and for the bare primitives; any other bare
/// type has no impl and cannot be declared at all.
pub trait FieldType {
    fn shape() -> FieldShape;

    fn value_type() -> ValueType;
}

impl<V: ColumnValue> FieldType for Option<V> {
    fn shape() -> FieldShape {
        FieldShape::Nullable(V::shape())
    }

    fn value_type() -> ValueType {
        ValueType::of::<V>()
    }
}

macro_rules! primitive_field_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn shape() -> FieldShape {
                    FieldShape::Primitive(stringify!($ty))
                }

                fn value_type() -> ValueType {
                    ValueType::of::<$ty>()
                }
            }
        )*
    };
}

primitive_field_type!(bool, char, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

/// One column mapping: family, qualifier and codec flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDecl {
    pub family: String,
    pub qualifier: String,
    pub serialize_as_string: bool,
    pub flags: Vec<CodecFlag>,
}

impl ColumnDecl {
    pub fn new(family: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            serialize_as_string: false,
            flags: Vec::new(),
        }
    }

    pub fn serialize_as_string(mut self) -> Self {
        self.serialize_as_string = true;
        self
    }

    pub fn flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.push(CodecFlag::new(name, value));
        self
    }
}

/// Everything declared about one field.
///
/// # Example
///
/// ```rust,ignore
/// FieldDecl::new::<Option<i32>>("sal").column(ColumnDecl::new("optional", "salary"));
/// FieldDecl::new::<Option<BTreeMap<i64, String>>>("city")
///     .multi_version(ColumnDecl::new("tracked", "city"));
/// FieldDecl::row_key("emp_id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub shape: FieldShape,
    pub value_type: Option<ValueType>,
    pub row_key: bool,
    pub is_static: bool,
    pub transient: bool,
    pub column: Option<ColumnDecl>,
    pub multi_version: Option<ColumnDecl>,
}

impl FieldDecl {
    /// A field whose Rust type is `F`.
    pub fn new<F: FieldType>(name: impl Into<String>) -> Self {
        Self::with_shape(name, F::shape(), Some(F::value_type()))
    }

    /// A row-key contributing field; its type is the record's own business,
    /// so it cannot also be mapped to a column.
    pub fn row_key(name: impl Into<String>) -> Self {
        let mut decl = Self::with_shape(name, FieldShape::Untyped, None);
        decl.row_key = true;
        decl
    }

    fn with_shape(name: impl Into<String>, shape: FieldShape, value_type: Option<ValueType>) -> Self {
        Self {
            name: name.into(),
            shape,
            value_type,
            row_key: false,
            is_static: false,
            transient: false,
            column: None,
            multi_version: None,
        }
    }

    /// Map to a single-version column.
    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.column = Some(column);
        self
    }

    /// Map to a multi-version column; the field must be `Option<BTreeMap<i64, V>>`.
    pub fn multi_version(mut self, column: ColumnDecl) -> Self {
        self.multi_version = Some(column);
        self
    }

    /// Also contributes to the row key.
    pub fn as_row_key(mut self) -> Self {
        self.row_key = true;
        self
    }

    /// Type-level state shared by all instances.
    pub fn mark_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Never persisted.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Whether any column declaration is present.
    pub fn is_present(&self) -> bool {
        self.column.is_some() || self.multi_version.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_table_name_display() {
        let table = TableDecl::new("employees");
        let name = TableName {
            namespace: table.namespace.clone(),
            name: table.name.clone(),
        };
        assert_eq!(name.to_string(), "employees");

        let name = TableName {
            namespace: "hr".to_string(),
            name: "employees".to_string(),
        };
        assert_eq!(name.to_string(), "hr:employees");
    }

    #[test]
    fn test_field_shapes() {
        assert_eq!(
            FieldDecl::new::<Option<i32>>("sal").shape,
            FieldShape::Nullable(ValueShape::Scalar)
        );
        assert_eq!(
            FieldDecl::new::<Option<BTreeMap<i64, i32>>>("hist").shape,
            FieldShape::Nullable(ValueShape::TimestampMap)
        );
        assert_eq!(FieldDecl::new::<i32>("age").shape, FieldShape::Primitive("i32"));
        assert_eq!(FieldDecl::row_key("id").shape, FieldShape::Untyped);
    }

    #[test]
    fn test_value_types() {
        let sal = FieldDecl::new::<Option<i32>>("sal");
        assert_eq!(sal.value_type, Some(ValueType::of::<i32>()));
        assert_ne!(sal.value_type, Some(ValueType::of::<i64>()));

        let hist = FieldDecl::new::<Option<BTreeMap<i64, i32>>>("hist");
        assert_eq!(hist.value_type, Some(ValueType::of::<BTreeMap<i64, i32>>()));

        assert_eq!(FieldDecl::new::<u8>("b").value_type.map(|t| t.name()), Some("u8"));
        assert_eq!(FieldDecl::row_key("id").value_type, None);
    }

    #[test]
    fn test_is_present() {
        let plain = FieldDecl::new::<Option<i32>>("x");
        assert!(!plain.is_present());
        assert!(plain.clone().column(ColumnDecl::new("f", "q")).is_present());
        assert!(plain.multi_version(ColumnDecl::new("f", "q")).is_present());
        assert!(FieldDecl::row_key("id").row_key);
    }
}

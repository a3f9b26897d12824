//! Validated per-type metadata.
//!
//! - [`ColumnDescriptor`]: resolved mapping of one field to one column
//! - [`RecordSchema`]: table, families, row-key flags and every descriptor
//! - [`SchemaRegistry`]: validates each record type once and caches the result

mod binding;
mod registry;
mod validate;

use std::collections::BTreeMap;

pub use registry::SchemaRegistry;
pub(crate) use binding::FieldBinder;
pub(crate) use registry::Resolved;

use crate::codec::{CodecFlags, SERIALIZE_AS_STRING};
use crate::decl::{ColumnDecl, FieldDecl, TableName, ValueType};
use crate::error::SchemaError;

// ============================================================================
// ColumnDescriptor
// ============================================================================

/// Where one field is stored and how its values are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    field: String,
    family: String,
    qualifier: String,
    versioned: bool,
    value_type: Option<ValueType>,
    flags: CodecFlags,
}

impl ColumnDescriptor {
    /// Resolve a field's column declarations.
    ///
    /// Returns `Ok(None)` for fields without any column declaration.
    pub fn resolve(record: &'static str, decl: &FieldDecl) -> Result<Option<Self>, SchemaError> {
        let (column, versioned) = match (&decl.column, &decl.multi_version) {
            (None, None) => return Ok(None),
            (Some(column), None) => (column, false),
            (None, Some(column)) => (column, true),
            (Some(_), Some(_)) => {
                return Err(SchemaError::ConflictingColumnDeclarations {
                    record,
                    field: decl.name.clone(),
                })
            }
        };
        let flags = resolve_flags(column).map_err(|flag| SchemaError::DuplicateCodecFlag {
            record,
            scope: decl.name.clone(),
            flag,
        })?;
        Ok(Some(Self {
            field: decl.name.clone(),
            family: column.family.clone(),
            qualifier: column.qualifier.clone(),
            versioned,
            value_type: decl.value_type,
            flags,
        }))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    /// The type the field's visitor must hand over; `None` for untyped
    /// declarations, which validation never lets through.
    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    pub fn flags(&self) -> &CodecFlags {
        &self.flags
    }
}

/// Fold `serialize_as_string` into the declared flags. Returns the repeated
/// name if a flag appears twice.
fn resolve_flags(column: &ColumnDecl) -> Result<CodecFlags, String> {
    let mut flags = CodecFlags::from_declared(&column.flags)?;
    if column.serialize_as_string {
        if flags.get(SERIALIZE_AS_STRING).is_some() {
            return Err(SERIALIZE_AS_STRING.to_string());
        }
        flags = flags.with(SERIALIZE_AS_STRING, "true");
    }
    Ok(flags)
}

// ============================================================================
// RecordSchema
// ============================================================================

/// Validated metadata of one record type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    record: &'static str,
    table: TableName,
    families: BTreeMap<String, u32>,
    row_key_flags: CodecFlags,
    row_key_fields: Vec<String>,
    columns: BTreeMap<String, ColumnDescriptor>,
    by_column: BTreeMap<(String, String), String>,
}

impl RecordSchema {
    /// Type name of the record this schema describes.
    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn table_name(&self) -> &TableName {
        &self.table
    }

    /// Declared column families and their max-version counts.
    pub fn column_families(&self) -> &BTreeMap<String, u32> {
        &self.families
    }

    pub fn max_versions(&self, family: &str) -> Option<u32> {
        self.families.get(family).copied()
    }

    pub fn row_key_flags(&self) -> &CodecFlags {
        &self.row_key_flags
    }

    pub fn row_key_fields(&self) -> &[String] {
        &self.row_key_fields
    }

    pub fn descriptor(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(field)
    }

    /// The field mapped to `family:qualifier`, if any.
    pub fn field_for(&self, family: &str, qualifier: &str) -> Option<&str> {
        self.by_column
            .get(&(family.to_string(), qualifier.to_string()))
            .map(String::as_str)
    }

    /// Column-mapped fields, ordered by field name.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.values()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

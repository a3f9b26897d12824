//! Structural validation of a record definition.

use std::collections::{BTreeMap, BTreeSet};

use crate::codec::{CodecFlags, ValueShape};
use crate::decl::{FieldDecl, FieldShape, TableDecl, TableName};
use crate::error::{share, InstantiationError, MapperError, SchemaError};
use crate::record::{Constructor, Record, RecordDefinition};

use super::{ColumnDescriptor, RecordSchema};

/// Validate `T`'s definition and run its constructor once.
///
/// Returns the instance the constructor produced alongside the schema.
pub(crate) fn validate<T: Record>(
    definition: RecordDefinition<T>,
) -> Result<(RecordSchema, Constructor<T>, T), MapperError> {
    let record = std::any::type_name::<T>();

    let table = definition
        .table
        .as_ref()
        .ok_or(SchemaError::MissingTable { record })?;
    let (table_name, families, row_key_flags) = validate_table(record, table)?;

    let mut seen = BTreeSet::new();
    let mut row_key_fields = Vec::new();
    let mut columns = BTreeMap::new();
    let mut by_column: BTreeMap<(String, String), String> = BTreeMap::new();

    for field in &definition.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                record,
                field: field.name.clone(),
            }
            .into());
        }
        if field.row_key {
            row_key_fields.push(field.name.clone());
        }
        let Some(descriptor) = validate_field(record, field)? else {
            continue;
        };
        if !families.contains_key(descriptor.family()) {
            return Err(SchemaError::UndeclaredFamily {
                record,
                field: field.name.clone(),
                family: descriptor.family().to_string(),
            }
            .into());
        }
        let column = (
            descriptor.family().to_string(),
            descriptor.qualifier().to_string(),
        );
        if let Some(first) = by_column.get(&column) {
            return Err(SchemaError::DuplicateColumn {
                record,
                first: first.clone(),
                second: field.name.clone(),
                family: column.0,
                qualifier: column.1,
            }
            .into());
        }
        by_column.insert(column, field.name.clone());
        columns.insert(field.name.clone(), descriptor);
    }

    if row_key_fields.is_empty() {
        return Err(SchemaError::NoRowKeyFields { record }.into());
    }
    if columns.is_empty() {
        return Err(SchemaError::NoColumnFields { record }.into());
    }

    let constructor = definition
        .constructor
        .ok_or(InstantiationError::MissingConstructor { record })?;
    let sample = constructor().map_err(|e| InstantiationError::ConstructorFailed {
        record,
        source: share(e),
    })?;

    let schema = RecordSchema {
        record,
        table: table_name,
        families,
        row_key_flags,
        row_key_fields,
        columns,
        by_column,
    };
    Ok((schema, constructor, sample))
}

fn validate_table(
    record: &'static str,
    table: &TableDecl,
) -> Result<(TableName, BTreeMap<String, u32>, CodecFlags), SchemaError> {
    if table.name.trim().is_empty() {
        return Err(SchemaError::EmptyTableName { record });
    }
    if table.families.is_empty() {
        return Err(SchemaError::NoColumnFamilies { record });
    }
    let mut families = BTreeMap::new();
    for family in &table.families {
        if family.name.trim().is_empty() {
            return Err(SchemaError::EmptyFamilyName { record });
        }
        if family.max_versions < 1 {
            return Err(SchemaError::InvalidMaxVersions {
                record,
                family: family.name.clone(),
                versions: family.max_versions,
            });
        }
        if families
            .insert(family.name.clone(), family.max_versions)
            .is_some()
        {
            return Err(SchemaError::DuplicateFamily {
                record,
                family: family.name.clone(),
            });
        }
    }
    let row_key_flags = CodecFlags::from_declared(&table.row_key_flags).map_err(|flag| {
        SchemaError::DuplicateCodecFlag {
            record,
            scope: "row key".to_string(),
            flag,
        }
    })?;
    let name = TableName {
        namespace: table.namespace.clone(),
        name: table.name.clone(),
    };
    Ok((name, families, row_key_flags))
}

fn validate_field(
    record: &'static str,
    field: &FieldDecl,
) -> Result<Option<ColumnDescriptor>, SchemaError> {
    if !field.is_present() {
        return Ok(None);
    }
    let name = || field.name.clone();
    if field.is_static {
        return Err(SchemaError::StaticFieldMapped { record, field: name() });
    }
    if field.transient {
        return Err(SchemaError::TransientFieldMapped { record, field: name() });
    }
    if field.column.is_some() && field.multi_version.is_some() {
        return Err(SchemaError::ConflictingColumnDeclarations { record, field: name() });
    }
    if field.shape == FieldShape::Untyped || field.value_type.is_none() {
        return Err(SchemaError::UntypedFieldMapped { record, field: name() });
    }
    if field.multi_version.is_some() {
        let found = match field.shape {
            FieldShape::Nullable(ValueShape::Container(container)) => Some(container.to_string()),
            FieldShape::Nullable(ValueShape::Scalar) => Some("a scalar".to_string()),
            FieldShape::Primitive(type_name) => Some(type_name.to_string()),
            FieldShape::Nullable(ValueShape::TimestampMap) | FieldShape::Untyped => None,
        };
        if let Some(found) = found {
            return Err(SchemaError::IncompatibleVersionedType {
                record,
                field: name(),
                found,
            });
        }
    }
    if let FieldShape::Primitive(type_name) = field.shape {
        return Err(SchemaError::PrimitiveFieldMapped {
            record,
            field: name(),
            type_name,
        });
    }
    let descriptor = ColumnDescriptor::resolve(record, field)?;
    if let Some(descriptor) = &descriptor {
        if descriptor.family().is_empty() || descriptor.qualifier().is_empty() {
            return Err(SchemaError::EmptyColumnName { record, field: name() });
        }
    }
    Ok(descriptor)
}

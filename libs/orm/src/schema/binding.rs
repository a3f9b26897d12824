//! Agreement between a record's field visitors and its declarations.
//!
//! Every visitor call is bound against the schema: the field must be
//! column-mapped, reached through the accessor matching its declaration, and
//! handed over as the declared value type. When a visitor finishes, every
//! column-mapped field must have been visited.

use std::collections::{BTreeMap, BTreeSet};

use crate::codec::ColumnValue;
use crate::decl::ValueType;
use crate::error::{Result, SchemaError};
use crate::record::{FieldReader, FieldWriter, Record};

use super::{ColumnDescriptor, RecordSchema};

const SINGLE_VERSION: &str = "single-version";
const MULTI_VERSION: &str = "multi-version";

fn accessor_name(versioned: bool) -> &'static str {
    if versioned {
        MULTI_VERSION
    } else {
        SINGLE_VERSION
    }
}

/// Tracks the fields one visitor pass has handed over.
pub(crate) struct FieldBinder<'s> {
    schema: &'s RecordSchema,
    visited: BTreeSet<&'s str>,
}

impl<'s> FieldBinder<'s> {
    pub(crate) fn new(schema: &'s RecordSchema) -> Self {
        Self {
            schema,
            visited: BTreeSet::new(),
        }
    }

    /// Bind a single-version access of `field` with values of type `V`.
    pub(crate) fn single<V: ColumnValue>(&mut self, field: &str) -> Result<&'s ColumnDescriptor> {
        self.bind(field, false, ValueType::of::<V>())
    }

    /// Bind a multi-version access of `field` with values of type `V`.
    pub(crate) fn multi<V: ColumnValue>(&mut self, field: &str) -> Result<&'s ColumnDescriptor> {
        self.bind(field, true, ValueType::of::<BTreeMap<i64, V>>())
    }

    fn bind(&mut self, field: &str, versioned: bool, accessed: ValueType) -> Result<&'s ColumnDescriptor> {
        let schema: &'s RecordSchema = self.schema;
        let record = schema.record();
        let descriptor = schema
            .descriptor(field)
            .ok_or_else(|| SchemaError::UnknownField {
                record,
                field: field.to_string(),
            })?;
        if descriptor.is_versioned() != versioned {
            return Err(SchemaError::AccessorMismatch {
                record,
                field: field.to_string(),
                declared: accessor_name(descriptor.is_versioned()),
                accessed: accessor_name(versioned),
            }
            .into());
        }
        if let Some(declared) = descriptor.value_type() {
            if declared != accessed {
                return Err(SchemaError::FieldTypeMismatch {
                    record,
                    field: field.to_string(),
                    declared: declared.name(),
                    accessed: accessed.name(),
                }
                .into());
            }
        }
        self.visited.insert(descriptor.field());
        Ok(descriptor)
    }

    /// Fail on the first column-mapped field the pass never visited.
    pub(crate) fn finish(self) -> Result<()> {
        match self.schema.columns().find(|d| !self.visited.contains(d.field())) {
            Some(missing) => Err(SchemaError::UnboundField {
                record: self.schema.record(),
                field: missing.field().to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

/// Run both visitors of `sample` once against `schema`.
///
/// Called at validation, so visitor drift is rejected and cached like any
/// other definition error, and every entry point reports it identically.
pub(crate) fn check_visitors<T: Record>(schema: &RecordSchema, mut sample: T) -> Result<()> {
    let mut writer = WriteCheck(FieldBinder::new(schema));
    sample.write_fields(&mut writer)?;
    writer.0.finish()?;

    let mut reader = ReadCheck(FieldBinder::new(schema));
    sample.read_fields(&mut reader)?;
    reader.0.finish()
}

struct WriteCheck<'s>(FieldBinder<'s>);

impl FieldWriter for WriteCheck<'_> {
    fn single<V: ColumnValue>(&mut self, field: &str, _value: Option<&V>) -> Result<()> {
        self.0.single::<V>(field).map(|_| ())
    }

    fn multi<V: ColumnValue>(
        &mut self,
        field: &str,
        _versions: Option<&BTreeMap<i64, V>>,
    ) -> Result<()> {
        self.0.multi::<V>(field).map(|_| ())
    }
}

/// Reads every field as absent.
struct ReadCheck<'s>(FieldBinder<'s>);

impl FieldReader for ReadCheck<'_> {
    fn single<V: ColumnValue>(&mut self, field: &str) -> Result<Option<V>> {
        self.0.single::<V>(field)?;
        Ok(None)
    }

    fn multi<V: ColumnValue>(&mut self, field: &str) -> Result<Option<BTreeMap<i64, V>>> {
        self.0.multi::<V>(field)?;
        Ok(None)
    }
}

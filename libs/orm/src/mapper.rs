//! Record ↔ row conversion.
//!
//! ```text
//!   to_row ─────┐                      ┌──── from_row
//!               ├─► encode ─► cells    │
//!   to_mutation ┘   (CellEncoder)      ├──── from_mutation (viewed as a Row)
//!                                      ▼
//!                                   decode (CellDecoder)
//! ```
//!
//! Both write entry points share one encode path and both read entry points
//! share one decode path, so they fail with the same error for the same
//! record type and agree on the same logical content.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::codec::{BestFitCodec, Codec, ColumnValue};
use crate::config::MapperConfig;
use crate::decl::TableName;
use crate::error::{share, InstantiationError, MapperError, Result, RowKeyError};
use crate::record::{FieldReader, FieldWriter, Record};
use crate::row::{Row, RowMutation};
use crate::schema::{ColumnDescriptor, FieldBinder, RecordSchema, SchemaRegistry};

/// Converts records to rows and mutations and back.
///
/// # Example
///
/// ```rust,ignore
/// let mapper = Mapper::new(BestFitCodec);
/// let row = mapper.to_row(&employee)?;
/// let back: Option<Employee> = mapper.from_row(None, Some(&row))?;
/// ```
pub struct Mapper<C: Codec = BestFitCodec> {
    codec: C,
    registry: Arc<SchemaRegistry>,
    config: MapperConfig,
}

impl<C: Codec> Mapper<C> {
    /// A mapper with its own, fresh schema registry.
    pub fn new(codec: C) -> Self {
        Self::with_registry(codec, Arc::new(SchemaRegistry::new()))
    }

    /// A mapper sharing `registry` with other mappers.
    pub fn with_registry(codec: C, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            codec,
            registry,
            config: MapperConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------------

    pub fn schema_for<T: Record>(&self) -> Result<Arc<RecordSchema>> {
        self.registry.schema_for::<T>()
    }

    pub fn is_valid<T: Record>(&self) -> bool {
        self.registry.is_valid::<T>()
    }

    pub fn table_name<T: Record>(&self) -> Result<TableName> {
        Ok(self.schema_for::<T>()?.table_name().clone())
    }

    /// Column families of `T`'s table and their max-version counts.
    pub fn column_families<T: Record>(&self) -> Result<BTreeMap<String, u32>> {
        Ok(self.schema_for::<T>()?.column_families().clone())
    }

    /// The encoded row key of `record`.
    pub fn row_key<T: Record>(&self, record: &T) -> Result<Vec<u8>> {
        let resolved = self.registry.resolve::<T>()?;
        self.compose_key(&resolved.schema, record)
    }

    // ------------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------------

    /// The row a store would hold for `record`.
    ///
    /// Single-version cells are stamped per
    /// [`MapperConfig::single_version_timestamp`]; multi-version cells keep
    /// their own timestamps.
    pub fn to_row<T: Record>(&self, record: &T) -> Result<Row> {
        let encoded = self.encode(record)?;
        let stamp = self.config.single_version_timestamp.resolve();
        let mut row = Row::new(encoded.key);
        for cell in encoded.cells {
            row.put(
                cell.family,
                cell.qualifier,
                cell.timestamp.unwrap_or(stamp),
                cell.value,
            );
        }
        Ok(row)
    }

    /// An uncommitted write of `record`; single-version cells are left for
    /// the store to stamp.
    pub fn to_mutation<T: Record>(&self, record: &T) -> Result<RowMutation> {
        let encoded = self.encode(record)?;
        let mut mutation = RowMutation::new(encoded.key);
        for cell in encoded.cells {
            mutation.add(cell.family, cell.qualifier, cell.timestamp, cell.value);
        }
        Ok(mutation)
    }

    fn encode<T: Record>(&self, record: &T) -> Result<EncodedRecord> {
        let resolved = self.registry.resolve::<T>()?;
        let schema = &resolved.schema;
        let key = self.compose_key(schema, record)?;

        let mut encoder = CellEncoder::new(&self.codec, schema);
        record.write_fields(&mut encoder)?;
        let cells = encoder.finish()?;
        if cells.is_empty() {
            return Err(MapperError::EmptyRecord {
                record: schema.record(),
            });
        }

        tracing::trace!(
            record = schema.record(),
            table = %schema.table_name(),
            codec = self.codec.name(),
            cells = cells.len(),
            "Encoded record"
        );
        Ok(EncodedRecord { key, cells })
    }

    fn compose_key<T: Record>(&self, schema: &RecordSchema, record: &T) -> Result<Vec<u8>> {
        let name = schema.record();
        let key = record
            .compose_row_key()
            .map_err(|e| RowKeyError::ComposeFailed {
                record: name,
                source: share(e),
            })?
            .filter(|key| !key.is_empty_key())
            .ok_or(RowKeyError::Empty { record: name })?;
        let bytes = self
            .codec
            .encode(&key, schema.row_key_flags())
            .map_err(|e| MapperError::codec(name, "row key", e))?;
        if bytes.is_empty() {
            return Err(RowKeyError::Empty { record: name }.into());
        }
        Ok(bytes)
    }

    // ------------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------------

    /// Rebuild a record from a fetched row.
    ///
    /// `key` overrides the row's own key. An absent or cell-less row is
    /// `Ok(None)`: "no such row" is not an error.
    pub fn from_row<T: Record>(&self, key: Option<&[u8]>, row: Option<&Row>) -> Result<Option<T>> {
        let Some(row) = row.filter(|row| !row.is_empty()) else {
            return Ok(None);
        };
        let key = key.unwrap_or(row.key());
        self.decode(key, row).map(Some)
    }

    /// Rebuild a record from an uncommitted mutation, as if it had been
    /// committed and fetched back.
    pub fn from_mutation<T: Record>(&self, mutation: Option<&RowMutation>) -> Result<Option<T>> {
        let Some(mutation) = mutation.filter(|mutation| !mutation.is_empty()) else {
            return Ok(None);
        };
        self.decode(mutation.key(), &mutation.as_row()).map(Some)
    }

    fn decode<T: Record>(&self, key: &[u8], row: &Row) -> Result<T> {
        let resolved = self.registry.resolve::<T>()?;
        let schema = &resolved.schema;
        let name = schema.record();

        let instance = (resolved.constructor)().map_err(|e| InstantiationError::ConstructorFailed {
            record: name,
            source: share(e),
        })?;
        let key: T::RowKey = self
            .codec
            .decode(key, schema.row_key_flags())
            .map_err(|source| RowKeyError::Unparseable { record: name, source })?;
        let mut instance = instance
            .with_row_key(key)
            .map_err(|e| RowKeyError::ParseFailed {
                record: name,
                source: share(e),
            })?;

        let mut decoder = CellDecoder::new(&self.codec, schema, row);
        instance.read_fields(&mut decoder)?;
        decoder.finish()?;

        tracing::trace!(
            record = name,
            table = %schema.table_name(),
            codec = self.codec.name(),
            cells = row.len(),
            "Decoded record"
        );
        Ok(instance)
    }
}

impl<C: Codec + Default> Default for Mapper<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: Codec + Clone> Clone for Mapper<C> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            registry: self.registry.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: Codec> std::fmt::Debug for Mapper<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("codec", &self.codec.name())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Field visitors
// ============================================================================

struct EncodedRecord {
    key: Vec<u8>,
    cells: Vec<EncodedCell>,
}

struct EncodedCell {
    family: String,
    qualifier: String,
    timestamp: Option<i64>,
    value: Vec<u8>,
}

struct CellEncoder<'a, C> {
    codec: &'a C,
    schema: &'a RecordSchema,
    binder: FieldBinder<'a>,
    cells: Vec<EncodedCell>,
}

impl<'a, C: Codec> CellEncoder<'a, C> {
    fn new(codec: &'a C, schema: &'a RecordSchema) -> Self {
        Self {
            codec,
            schema,
            binder: FieldBinder::new(schema),
            cells: Vec::new(),
        }
    }

    fn push(&mut self, descriptor: &ColumnDescriptor, timestamp: Option<i64>, value: Vec<u8>) {
        self.cells.push(EncodedCell {
            family: descriptor.family().to_string(),
            qualifier: descriptor.qualifier().to_string(),
            timestamp,
            value,
        });
    }

    fn finish(self) -> Result<Vec<EncodedCell>> {
        self.binder.finish()?;
        Ok(self.cells)
    }
}

impl<C: Codec> FieldWriter for CellEncoder<'_, C> {
    fn single<V: ColumnValue>(&mut self, field: &str, value: Option<&V>) -> Result<()> {
        let schema = self.schema;
        let descriptor = self.binder.single::<V>(field)?;
        let bytes = self
            .codec
            .serialize(value, descriptor.flags())
            .map_err(|e| MapperError::codec(schema.record(), field, e))?;
        if let Some(bytes) = bytes {
            self.push(descriptor, None, bytes);
        }
        Ok(())
    }

    fn multi<V: ColumnValue>(
        &mut self,
        field: &str,
        versions: Option<&BTreeMap<i64, V>>,
    ) -> Result<()> {
        let schema = self.schema;
        let descriptor = self.binder.multi::<V>(field)?;
        for (timestamp, value) in versions.into_iter().flatten() {
            let bytes = self
                .codec
                .encode(value, descriptor.flags())
                .map_err(|e| MapperError::codec(schema.record(), field, e))?;
            self.push(descriptor, Some(*timestamp), bytes);
        }
        Ok(())
    }
}

struct CellDecoder<'a, C> {
    codec: &'a C,
    schema: &'a RecordSchema,
    row: &'a Row,
    binder: FieldBinder<'a>,
}

impl<'a, C: Codec> CellDecoder<'a, C> {
    fn new(codec: &'a C, schema: &'a RecordSchema, row: &'a Row) -> Self {
        Self {
            codec,
            schema,
            row,
            binder: FieldBinder::new(schema),
        }
    }

    fn finish(self) -> Result<()> {
        self.binder.finish()
    }
}

impl<C: Codec> FieldReader for CellDecoder<'_, C> {
    fn single<V: ColumnValue>(&mut self, field: &str) -> Result<Option<V>> {
        let schema = self.schema;
        let descriptor = self.binder.single::<V>(field)?;
        let bytes = self
            .row
            .latest(descriptor.family(), descriptor.qualifier())
            .map(|(_, bytes)| bytes);
        self.codec
            .deserialize(bytes, descriptor.flags())
            .map_err(|e| MapperError::codec(schema.record(), field, e))
    }

    fn multi<V: ColumnValue>(&mut self, field: &str) -> Result<Option<BTreeMap<i64, V>>> {
        let schema = self.schema;
        let descriptor = self.binder.multi::<V>(field)?;
        let Some(versions) = self
            .row
            .versions(descriptor.family(), descriptor.qualifier())
            .filter(|versions| !versions.is_empty())
        else {
            return Ok(None);
        };
        versions
            .iter()
            .map(|(timestamp, bytes)| {
                let value = self
                    .codec
                    .decode(bytes, descriptor.flags())
                    .map_err(|e| MapperError::codec(schema.record(), field, e))?;
                Ok((*timestamp, value))
            })
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Some)
    }
}

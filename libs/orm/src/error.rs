//! Error taxonomy for the mapping engine.
//!
//! Every failure is fail-fast: the engine never retries. Errors are `Clone`
//! because the schema registry caches a rejected definition and replays the
//! identical error on every later use of that record type.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::codec::CodecError;

/// Shared, clonable source error captured from a record callback.
pub type SharedSource = Arc<dyn StdError + Send + Sync + 'static>;

pub(crate) fn share(err: anyhow::Error) -> SharedSource {
    let boxed: Box<dyn StdError + Send + Sync + 'static> = err.into();
    Arc::from(boxed)
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapperError>;

/// Coarse error kind, used to assert that every entry point fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SchemaDefinition,
    Instantiation,
    RowKey,
    Codec,
    EmptyRecord,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SchemaDefinition => "schema definition",
            ErrorKind::Instantiation => "instantiation",
            ErrorKind::RowKey => "row key",
            ErrorKind::Codec => "codec",
            ErrorKind::EmptyRecord => "empty record",
        };
        f.write_str(name)
    }
}

/// Top-level error returned by every engine operation.
#[derive(Debug, Clone, Error)]
pub enum MapperError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    #[error(transparent)]
    RowKey(#[from] RowKeyError),

    #[error("codec failure on `{record}.{field}`: {source}")]
    Codec {
        record: &'static str,
        field: String,
        #[source]
        source: CodecError,
    },

    #[error("`{record}` has no non-empty column-mapped field; refusing to write a row with no cells")]
    EmptyRecord { record: &'static str },
}

impl MapperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapperError::Schema(_) => ErrorKind::SchemaDefinition,
            MapperError::Instantiation(_) => ErrorKind::Instantiation,
            MapperError::RowKey(_) => ErrorKind::RowKey,
            MapperError::Codec { .. } => ErrorKind::Codec,
            MapperError::EmptyRecord { .. } => ErrorKind::EmptyRecord,
        }
    }

    pub(crate) fn codec(record: &'static str, field: impl Into<String>, source: CodecError) -> Self {
        MapperError::Codec {
            record,
            field: field.into(),
            source,
        }
    }
}

/// A record type's declarations are structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("`{record}` carries no table declaration")]
    MissingTable { record: &'static str },

    #[error("`{record}` declares an empty table name")]
    EmptyTableName { record: &'static str },

    #[error("`{record}` declares no column families")]
    NoColumnFamilies { record: &'static str },

    #[error("`{record}` declares a column family with an empty name")]
    EmptyFamilyName { record: &'static str },

    #[error("`{record}` declares column family `{family}` more than once")]
    DuplicateFamily { record: &'static str, family: String },

    #[error("`{record}` declares column family `{family}` with {versions} max versions (must be at least 1)")]
    InvalidMaxVersions {
        record: &'static str,
        family: String,
        versions: u32,
    },

    #[error("`{record}` declares field `{field}` more than once")]
    DuplicateField { record: &'static str, field: String },

    #[error("`{record}` declares no row-key field")]
    NoRowKeyFields { record: &'static str },

    #[error("`{record}` declares no column-mapped field")]
    NoColumnFields { record: &'static str },

    #[error("field `{record}.{field}` is static and cannot be mapped to a column")]
    StaticFieldMapped { record: &'static str, field: String },

    #[error("field `{record}.{field}` is transient and cannot be mapped to a column")]
    TransientFieldMapped { record: &'static str, field: String },

    #[error("field `{record}.{field}` is declared as both a single-version and a multi-version column")]
    ConflictingColumnDeclarations { record: &'static str, field: String },

    #[error("field `{record}.{field}` is a multi-version column but its type is {found}; expected an ordered map of i64 timestamp to value")]
    IncompatibleVersionedType {
        record: &'static str,
        field: String,
        found: String,
    },

    #[error("field `{record}.{field}` has primitive type `{type_name}`, which cannot represent an absent value; wrap it in Option")]
    PrimitiveFieldMapped {
        record: &'static str,
        field: String,
        type_name: &'static str,
    },

    #[error("field `{record}.{field}` is mapped to a column but declares no type; declare it with `FieldDecl::new`")]
    UntypedFieldMapped { record: &'static str, field: String },

    #[error("field `{record}.{field}` declares an empty column family or qualifier")]
    EmptyColumnName { record: &'static str, field: String },

    #[error("field `{record}.{field}` maps to column family `{family}`, which the table does not declare")]
    UndeclaredFamily {
        record: &'static str,
        field: String,
        family: String,
    },

    #[error("fields `{record}.{first}` and `{record}.{second}` are both mapped to duplicate column `{family}:{qualifier}`")]
    DuplicateColumn {
        record: &'static str,
        first: String,
        second: String,
        family: String,
        qualifier: String,
    },

    #[error("codec flag `{flag}` is declared more than once on `{record}.{scope}`")]
    DuplicateCodecFlag {
        record: &'static str,
        scope: String,
        flag: String,
    },

    #[error("`{record}` accessed `{field}`, which is not a column-mapped field")]
    UnknownField { record: &'static str, field: String },

    #[error("`{record}` accessed {declared} column field `{field}` as {accessed}")]
    AccessorMismatch {
        record: &'static str,
        field: String,
        declared: &'static str,
        accessed: &'static str,
    },

    #[error("`{record}` accessed field `{field}` as `{accessed}`, but it is declared as `{declared}`")]
    FieldTypeMismatch {
        record: &'static str,
        field: String,
        declared: &'static str,
        accessed: &'static str,
    },

    #[error("`{record}` never visits column-mapped field `{field}`")]
    UnboundField { record: &'static str, field: String },
}

/// The record type cannot be constructed.
#[derive(Debug, Clone, Error)]
pub enum InstantiationError {
    #[error("`{record}` declares no parameterless constructor")]
    MissingConstructor { record: &'static str },

    #[error("constructor of `{record}` failed: {source}")]
    ConstructorFailed {
        record: &'static str,
        #[source]
        source: SharedSource,
    },
}

/// The row key could not be composed or parsed.
#[derive(Debug, Clone, Error)]
pub enum RowKeyError {
    #[error("`{record}` composed an empty row key")]
    Empty { record: &'static str },

    #[error("`{record}` failed to compose its row key: {source}")]
    ComposeFailed {
        record: &'static str,
        #[source]
        source: SharedSource,
    },

    #[error("row key bytes could not be decoded for `{record}`: {source}")]
    Unparseable {
        record: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("`{record}` failed to parse its row key: {source}")]
    ParseFailed {
        record: &'static str,
        #[source]
        source: SharedSource,
    },
}

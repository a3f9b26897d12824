//! Object mapper for wide-column stores.
//!
//! Maps typed records to the sparse, versioned representation of a
//! column-family store (`row key → family → qualifier → timestamp → bytes`)
//! and back.
//!
//! - [`record`]: the contract a record type implements
//! - [`decl`]: table, field and column declarations
//! - [`schema`]: validation and caching of those declarations
//! - [`codec`]: pluggable value encodings
//! - [`row`]: fetched rows and uncommitted mutations
//! - [`mapper`]: the conversion engine
//!
//! The crate performs no I/O. Building gets, puts and scans from the
//! produced rows is left to the caller.

pub mod codec;
pub mod config;
pub mod decl;
pub mod error;
pub mod mapper;
pub mod record;
pub mod row;
pub mod schema;

pub use codec::{BestFitCodec, BinaryCodec, Codec, CodecError, CodecFlags, ColumnValue, JsonCodec};
pub use config::{MapperConfig, TimestampPolicy};
pub use decl::{ColumnDecl, FieldDecl, TableDecl, TableName, ValueType};
pub use error::{
    ErrorKind, InstantiationError, MapperError, Result, RowKeyError, SchemaError,
};
pub use mapper::Mapper;
pub use record::{FieldReader, FieldWriter, Record, RecordDefinition};
pub use row::{Cell, PendingCell, Row, RowMutation, LATEST_TIMESTAMP};
pub use schema::{ColumnDescriptor, RecordSchema, SchemaRegistry};

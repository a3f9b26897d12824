//! The contract a record type implements to be mapped.
//!
//! Instead of reflecting over fields at runtime, a record describes itself
//! once through [`Record::definition`] and exposes its column-mapped fields
//! through serde-style visitors. The engine supplies the visitor
//! ([`FieldWriter`] on the write path, [`FieldReader`] on the read path), so
//! field↔column wiring is ordinary, type-checked code.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Employee {
//!     country: String,
//!     emp_id: i64,
//!     sal: Option<i32>,
//! }
//!
//! impl Record for Employee {
//!     type RowKey = String;
//!
//!     fn definition() -> RecordDefinition<Self> {
//!         RecordDefinition::new()
//!             .table(TableDecl::new("employees").family("optional", 1))
//!             .field(FieldDecl::row_key("country"))
//!             .field(FieldDecl::row_key("emp_id"))
//!             .field(FieldDecl::new::<Option<i32>>("sal").column(ColumnDecl::new("optional", "salary")))
//!             .default_constructor()
//!     }
//!
//!     fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
//!         Ok(Some(format!("{}#{}", self.country, self.emp_id)))
//!     }
//!
//!     fn with_row_key(mut self, key: String) -> anyhow::Result<Self> {
//!         let (country, id) = key.split_once('#').context("missing separator")?;
//!         self.country = country.to_string();
//!         self.emp_id = id.parse()?;
//!         Ok(self)
//!     }
//!
//!     fn write_fields<W: FieldWriter>(&self, out: &mut W) -> cellmap::Result<()> {
//!         out.single("sal", self.sal.as_ref())
//!     }
//!
//!     fn read_fields<R: FieldReader>(&mut self, input: &mut R) -> cellmap::Result<()> {
//!         input.read_into("sal", &mut self.sal)
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use crate::codec::ColumnValue;
use crate::decl::{FieldDecl, TableDecl};
use crate::error::Result;

/// Parameterless construction path of a record type.
pub type Constructor<T> = fn() -> anyhow::Result<T>;

/// A typed record mapped to one row.
pub trait Record: Sized + 'static {
    /// Row key type, encoded with the codec and the table's row-key flags.
    type RowKey: ColumnValue;

    /// Table and field declarations. Consulted once per type; the result is
    /// validated and cached by the schema registry.
    fn definition() -> RecordDefinition<Self>;

    /// Compose the row key from this record's identifying fields.
    ///
    /// `Ok(None)` means the record cannot produce a key.
    fn compose_row_key(&self) -> anyhow::Result<Option<Self::RowKey>>;

    /// Return this instance with its identifying fields taken from `key`.
    fn with_row_key(self, key: Self::RowKey) -> anyhow::Result<Self>;

    /// Hand every column-mapped field to `out`.
    fn write_fields<W: FieldWriter>(&self, out: &mut W) -> Result<()>;

    /// Fill column-mapped fields from `input`.
    fn read_fields<R: FieldReader>(&mut self, input: &mut R) -> Result<()>;
}

/// Write-side visitor over a record's column-mapped fields.
pub trait FieldWriter {
    /// A single-version field; `None` produces no cell.
    fn single<V: ColumnValue>(&mut self, field: &str, value: Option<&V>) -> Result<()>;

    /// A multi-version field; one cell per entry, each at its own timestamp.
    fn multi<V: ColumnValue>(&mut self, field: &str, versions: Option<&BTreeMap<i64, V>>)
        -> Result<()>;
}

/// Read-side visitor over a record's column-mapped fields.
pub trait FieldReader {
    /// The newest version of a single-version field, if its cell exists.
    fn single<V: ColumnValue>(&mut self, field: &str) -> Result<Option<V>>;

    /// Every version present for a multi-version field, if any exists.
    fn multi<V: ColumnValue>(&mut self, field: &str) -> Result<Option<BTreeMap<i64, V>>>;

    /// Assign a single-version field only when its cell is present.
    fn read_into<V: ColumnValue>(&mut self, field: &str, slot: &mut Option<V>) -> Result<()> {
        if let Some(value) = self.single(field)? {
            *slot = Some(value);
        }
        Ok(())
    }

    /// Assign a multi-version field only when at least one version is present.
    fn read_versions_into<V: ColumnValue>(
        &mut self,
        field: &str,
        slot: &mut Option<BTreeMap<i64, V>>,
    ) -> Result<()> {
        if let Some(versions) = self.multi(field)? {
            *slot = Some(versions);
        }
        Ok(())
    }
}

/// Declarations of one record type, as returned by [`Record::definition`].
pub struct RecordDefinition<T> {
    pub(crate) table: Option<TableDecl>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) constructor: Option<Constructor<T>>,
}

impl<T> RecordDefinition<T> {
    pub fn new() -> Self {
        Self {
            table: None,
            fields: Vec::new(),
            constructor: None,
        }
    }

    pub fn table(mut self, table: TableDecl) -> Self {
        self.table = Some(table);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Use `T::default()` as the construction path.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|| Ok(T::default()))
    }

    pub fn table_decl(&self) -> Option<&TableDecl> {
        self.table.as_ref()
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }
}

impl<T> Default for RecordDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared fixtures for cellmap integration tests.
//!
//! - `Employee`: a valid record touching every value kind the codecs handle
//! - `Address`: a nested value object stored through the structured fallback
//! - `declared_record!`: stamps out a small record around an arbitrary
//!   definition, used for the invalid-definition scenarios

#![allow(dead_code)]

use std::collections::BTreeMap;

use anyhow::Context;
use cellmap::{
    ColumnDecl, ColumnValue, FieldDecl, FieldReader, FieldWriter, Record, RecordDefinition, Row,
    RowMutation, TableDecl,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub fn init_tracing() {
    cellmap_core::telemetry::init_test_subscriber();
}

// ============================================================================
// Employee
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub pin: Option<u32>,
    pub tags: Vec<String>,
}

impl ColumnValue for Address {}

/// Row key `"<country>#<emp_id>"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Employee {
    pub country: String,
    pub emp_id: i64,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub sal: Option<i32>,
    pub pincode: Option<i32>,
    pub rating: Option<f64>,
    pub bonus: Option<Decimal>,
    pub address: Option<Address>,
    pub skills: Option<Vec<String>>,
    pub city: Option<BTreeMap<i64, String>>,
    /// Never persisted.
    pub display_label: Option<String>,
}

impl Employee {
    pub fn new(country: &str, emp_id: i64) -> Self {
        Self {
            country: country.to_string(),
            emp_id,
            ..Default::default()
        }
    }

    /// The employee of the salary scenario, with every other field set too.
    pub fn sample() -> Self {
        Self {
            name: Some("Asha".to_string()),
            active: Some(true),
            sal: Some(30000),
            pincode: Some(560034),
            rating: Some(4.25),
            bonus: Some(Decimal::new(125050, 2)),
            address: Some(Address {
                line1: "12 MG Road".to_string(),
                pin: Some(560001),
                tags: vec!["home".to_string()],
            }),
            skills: Some(vec!["rust".to_string(), "hbase".to_string()]),
            city: Some(BTreeMap::from([
                (1, "Pune".to_string()),
                (2, "Mumbai".to_string()),
                (3, "Delhi".to_string()),
            ])),
            ..Self::new("IND", 101)
        }
    }
}

impl Record for Employee {
    type RowKey = String;

    fn definition() -> RecordDefinition<Self> {
        RecordDefinition::new()
            .table(
                TableDecl::new("employees")
                    .family("main", 1)
                    .family("optional", 3)
                    .family("tracked", 10),
            )
            .field(FieldDecl::row_key("country"))
            .field(FieldDecl::row_key("emp_id"))
            .field(FieldDecl::new::<Option<String>>("name").column(ColumnDecl::new("main", "name")))
            .field(FieldDecl::new::<Option<bool>>("active").column(ColumnDecl::new("main", "active")))
            .field(FieldDecl::new::<Option<i32>>("sal").column(ColumnDecl::new("optional", "salary")))
            .field(
                FieldDecl::new::<Option<i32>>("pincode")
                    .column(ColumnDecl::new("optional", "pincode").serialize_as_string()),
            )
            .field(FieldDecl::new::<Option<f64>>("rating").column(ColumnDecl::new("optional", "rating")))
            .field(FieldDecl::new::<Option<Decimal>>("bonus").column(ColumnDecl::new("optional", "bonus")))
            .field(
                FieldDecl::new::<Option<Address>>("address")
                    .column(ColumnDecl::new("optional", "address")),
            )
            .field(
                FieldDecl::new::<Option<Vec<String>>>("skills")
                    .column(ColumnDecl::new("optional", "skills")),
            )
            .field(
                FieldDecl::new::<Option<BTreeMap<i64, String>>>("city")
                    .multi_version(ColumnDecl::new("tracked", "city")),
            )
            .field(FieldDecl::new::<Option<String>>("display_label").transient())
            .default_constructor()
    }

    fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
        if self.emp_id < 0 {
            anyhow::bail!("employee id {} is negative", self.emp_id);
        }
        if self.country.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{}#{}", self.country, self.emp_id)))
    }

    fn with_row_key(mut self, key: String) -> anyhow::Result<Self> {
        let (country, emp_id) = key
            .split_once('#')
            .with_context(|| format!("row key {key:?} has no '#' separator"))?;
        self.country = country.to_string();
        self.emp_id = emp_id
            .parse()
            .with_context(|| format!("row key {key:?} has a non-numeric employee id"))?;
        Ok(self)
    }

    fn write_fields<W: FieldWriter>(&self, out: &mut W) -> cellmap::Result<()> {
        out.single("name", self.name.as_ref())?;
        out.single("active", self.active.as_ref())?;
        out.single("sal", self.sal.as_ref())?;
        out.single("pincode", self.pincode.as_ref())?;
        out.single("rating", self.rating.as_ref())?;
        out.single("bonus", self.bonus.as_ref())?;
        out.single("address", self.address.as_ref())?;
        out.single("skills", self.skills.as_ref())?;
        out.multi("city", self.city.as_ref())
    }

    fn read_fields<R: FieldReader>(&mut self, input: &mut R) -> cellmap::Result<()> {
        input.read_into("name", &mut self.name)?;
        input.read_into("active", &mut self.active)?;
        input.read_into("sal", &mut self.sal)?;
        input.read_into("pincode", &mut self.pincode)?;
        input.read_into("rating", &mut self.rating)?;
        input.read_into("bonus", &mut self.bonus)?;
        input.read_into("address", &mut self.address)?;
        input.read_into("skills", &mut self.skills)?;
        input.read_versions_into("city", &mut self.city)
    }
}

// ============================================================================
// Declared records
// ============================================================================

/// A record with row key `id` and two optional integer fields `a` and `b`,
/// whose definition is `$definition`.
macro_rules! declared_record {
    ($name:ident, $definition:expr) => {
        #[derive(Debug, Default, PartialEq)]
        pub struct $name {
            pub id: String,
            pub a: Option<i32>,
            pub b: Option<i32>,
        }

        impl cellmap::Record for $name {
            type RowKey = String;

            fn definition() -> cellmap::RecordDefinition<Self> {
                $definition
            }

            fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
                Ok(Some(self.id.clone()))
            }

            fn with_row_key(mut self, key: String) -> anyhow::Result<Self> {
                self.id = key;
                Ok(self)
            }

            fn write_fields<W: cellmap::FieldWriter>(&self, out: &mut W) -> cellmap::Result<()> {
                out.single("a", self.a.as_ref())?;
                out.single("b", self.b.as_ref())
            }

            fn read_fields<R: cellmap::FieldReader>(&mut self, input: &mut R) -> cellmap::Result<()> {
                input.read_into("a", &mut self.a)?;
                input.read_into("b", &mut self.b)
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use declared_record;

/// The table every declared record uses unless a scenario says otherwise.
pub fn table() -> TableDecl {
    TableDecl::new("declared").family("a", 1).family("c", 2)
}

/// A non-empty row and mutation to feed the read entry points.
pub fn some_row() -> Row {
    Row::new("k1").with_cell("a", "a", 1, 7i32.to_be_bytes().to_vec())
}

pub fn some_mutation() -> RowMutation {
    RowMutation::new("k1").with_cell("a", "a", None, 7i32.to_be_bytes().to_vec())
}

//! Caller-owned cache of validated record schemas.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::binding::check_visitors;
use super::validate::validate;
use super::RecordSchema;
use crate::error::{MapperError, Result};
use crate::record::{Constructor, Record};

/// A validated schema together with the record's construction path.
pub(crate) struct Resolved<T> {
    pub(crate) schema: Arc<RecordSchema>,
    pub(crate) constructor: Constructor<T>,
}

type Entry = std::result::Result<Arc<dyn Any + Send + Sync>, MapperError>;

/// Published once; readers that arrive early wait on the cell, not the map.
type Slot = Arc<OnceLock<Entry>>;

/// Thread-safe registry of record schemas, keyed by record type.
///
/// Each record type is validated exactly once per registry. The map only
/// hands out a per-type slot; validation runs outside the map's locks, so
/// unrelated record types never wait on each other. Concurrent first
/// accesses to the same type race on the slot: one caller validates and
/// publishes, the others block and then read the published entry. Rejected
/// definitions are cached too, so every later access fails with the
/// identical error without re-validating.
///
/// Share one registry between mappers with `Arc`:
///
/// ```rust,ignore
/// let registry = Arc::new(SchemaRegistry::new());
/// let fast = Mapper::with_registry(BestFitCodec, registry.clone());
/// let portable = Mapper::with_registry(JsonCodec, registry);
/// ```
#[derive(Default)]
pub struct SchemaRegistry {
    entries: DashMap<TypeId, Slot>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The validated schema of `T`, validating on first access.
    pub fn schema_for<T: Record>(&self) -> Result<Arc<RecordSchema>> {
        self.resolve::<T>().map(|resolved| resolved.schema.clone())
    }

    /// Whether `T`'s definition is valid. Never fails.
    pub fn is_valid<T: Record>(&self) -> bool {
        self.resolve::<T>().is_ok()
    }

    /// Whether `T` has been looked up already (valid or not).
    pub fn contains<T: Record>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn resolve<T: Record>(&self) -> Result<Arc<Resolved<T>>> {
        let id = TypeId::of::<T>();

        // Both guards are released at the end of their statements.
        let cached = self.entries.get(&id).map(|slot| slot.value().clone());
        let slot = match cached {
            Some(slot) => slot,
            None => self.entries.entry(id).or_default().value().clone(),
        };

        let resolved = slot
            .get_or_init(Self::build::<T>)
            .clone()?
            .downcast::<Resolved<T>>()
            .unwrap_or_else(|_| unreachable!("registry entries are keyed by TypeId"));
        Ok(resolved)
    }

    fn build<T: Record>() -> Entry {
        let record = std::any::type_name::<T>();
        let outcome = validate(T::definition()).and_then(|(schema, constructor, sample)| {
            check_visitors(&schema, sample)?;
            Ok((schema, constructor))
        });
        match outcome {
            Ok((schema, constructor)) => {
                tracing::debug!(
                    record,
                    table = %schema.table_name(),
                    columns = schema.column_count(),
                    "Validated record schema"
                );
                let resolved: Arc<dyn Any + Send + Sync> = Arc::new(Resolved {
                    schema: Arc::new(schema),
                    constructor,
                });
                Ok(resolved)
            }
            Err(e) => {
                tracing::warn!(record, error = %e, "Rejected record definition");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

//! Mapping between records and transfer objects
//!
//! A [`Mapper`] converts in both directions. Audit attributes flow from record
//! to transfer object only: a record built from a transfer object always starts
//! with empty audit attributes, whatever the caller sent.

use crate::core::record::{AuditFields, Record, TransferObject, Updatable};
use std::collections::HashMap;

/// Named flags that switch optional parts of a mapping on or off
///
/// An empty set means "map unconditionally".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingConditions(HashMap<String, bool>);

impl MappingConditions {
    /// No conditions
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.0.insert(name.into(), enabled);
        self
    }

    /// True when `name` was set and enabled
    pub fn is_set(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Converts between a record type and its transfer object
pub trait Mapper<R, D>: Send + Sync
where
    R: Record,
    D: TransferObject<Id = R::Id>,
{
    /// Full conversion, audit attributes included
    fn to_dto_with(&self, record: &R, conditions: &MappingConditions) -> D;

    /// Copy identity and business fields into a new record
    fn map_to_record(&self, dto: &D) -> R;

    fn to_dto(&self, record: &R) -> D {
        self.to_dto_with(record, &MappingConditions::none())
    }

    fn to_entity(&self, dto: &D) -> R {
        let mut record = self.map_to_record(dto);
        *record.audit_mut() = AuditFields::default();
        record
    }

    fn to_entity_with(&self, dto: &D, _conditions: &MappingConditions) -> R {
        self.to_entity(dto)
    }

    fn to_dto_list(&self, records: &[R]) -> Vec<D> {
        self.to_dto_list_with(records, &MappingConditions::none())
    }

    fn to_dto_list_with(&self, records: &[R], conditions: &MappingConditions) -> Vec<D> {
        records
            .iter()
            .map(|record| self.to_dto_with(record, conditions))
            .collect()
    }

    fn to_entity_list(&self, dtos: &[D]) -> Vec<R> {
        dtos.iter().map(|dto| self.to_entity(dto)).collect()
    }
}

/// Apply `dto` onto `record` in place
///
/// The record's identity and audit attributes survive whatever the per-entity
/// update does.
pub fn apply_update<R, D>(dto: &D, record: &mut R)
where
    R: Updatable<D>,
{
    let id = record.id();
    let audit = record.audit().clone();

    record.apply_update(dto);

    if let Some(id) = id {
        record.set_id(id);
    }
    *record.audit_mut() = audit;
}

//! Identity, audit fields and the record / transfer-object contracts
//!
//! Every persisted record carries exactly one identity of a caller-chosen type
//! plus four audit attributes. Transfer objects mirror the same shape and add
//! only the fields a caller may see.

use crate::core::field::{FieldValue, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use uuid::Uuid;

/// Identity type of a record
///
/// `generate` is used by storage adapters that assign identities themselves.
pub trait Identity:
    Clone + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static
{
    /// Build a fresh identity; `sequence` is a per-repository counter starting at 1
    fn generate(sequence: u64) -> Self;

    fn to_field_value(&self) -> FieldValue;
}

impl Identity for i64 {
    fn generate(sequence: u64) -> Self {
        sequence as i64
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }
}

impl Identity for u64 {
    fn generate(sequence: u64) -> Self {
        sequence
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self as i64)
    }
}

impl Identity for Uuid {
    fn generate(_sequence: u64) -> Self {
        Uuid::new_v4()
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }
}

/// The four audit attributes shared by records and transfer objects
///
/// `created_*` is written once on create, `updated_*` on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl AuditFields {
    /// Stamp a record that is about to be created
    pub fn stamp_created(&mut self, actor: &str, at: DateTime<Utc>) {
        self.created_at = Some(at);
        self.created_by = Some(actor.to_string());
        self.updated_at = Some(at);
        self.updated_by = Some(actor.to_string());
    }

    /// Stamp a record that is about to be modified
    pub fn stamp_updated(&mut self, actor: &str, at: DateTime<Utc>) {
        self.updated_at = Some(at);
        self.updated_by = Some(actor.to_string());
    }

    /// True when no audit attribute is set
    pub fn is_zero(&self) -> bool {
        self.created_at.is_none()
            && self.created_by.is_none()
            && self.updated_at.is_none()
            && self.updated_by.is_none()
    }

    pub fn field_values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("created_at", self.created_at.into()),
            ("created_by", self.created_by.clone().into()),
            ("updated_at", self.updated_at.into()),
            ("updated_by", self.updated_by.clone().into()),
        ]
    }
}

/// A persisted record
pub trait Record: Fields + Clone + Debug + Send + Sync + 'static {
    type Id: Identity;

    fn id(&self) -> Option<Self::Id>;

    fn set_id(&mut self, id: Self::Id);

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Fields that must be unique across all stored records of this type
    fn unique_keys(&self) -> Vec<(&'static str, FieldValue)> {
        Vec::new()
    }
}

/// A transfer object exposed to callers
pub trait TransferObject: Fields + Clone + Debug + Send + Sync + 'static {
    type Id: Identity;

    fn id(&self) -> Option<Self::Id>;

    fn set_id(&mut self, id: Option<Self::Id>);

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;
}

/// Per-entity update application
///
/// Implementations decide field by field whether a missing value in the
/// transfer object clears the record field or leaves it alone. They must not
/// touch the identity or the audit attributes.
pub trait Updatable<D>: Record {
    fn apply_update(&mut self, dto: &D);
}

/// Records whose visibility is restricted to a single owner
pub trait Owned: Record {
    type OwnerId: Identity;

    /// Name of the owner field as exposed through [`Fields`]
    const OWNER_FIELD: &'static str;

    fn owner_id(&self) -> Option<Self::OwnerId>;
}

/// Transfer objects of owned records
pub trait OwnedTransferObject: TransferObject {
    type OwnerId: Identity;

    fn set_owner_id(&mut self, owner: Self::OwnerId);
}

/// Two records are the same when both identities are set and equal
pub fn same_identity<R: Record>(a: &R, b: &R) -> bool {
    match (a.id(), b.id()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

//! Shared test harness for repository and service contract testing
//!
//! Provides `Specimen`, an owned record with fields covering the scalar
//! `FieldValue` variants, its transfer object and mapper, and helpers that
//! wire an `EntityService` over any repository with a memory audit sink.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod repository_tests;
#[macro_use]
pub mod service_tests;

use keeper::core::mapper::{Mapper, MappingConditions};
use keeper::core::record::{AuditFields, Owned, OwnedTransferObject, Updatable};
use keeper::prelude::*;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Specimen: covers String, Integer, Float and Boolean fields
// ---------------------------------------------------------------------------

/// Owned test record
///
/// `email` is unique. `name` is only replaced by a non-null update while
/// `notes` follows the update unconditionally.
#[derive(Debug, Clone, Default)]
pub struct Specimen {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub score: Option<f64>,
    pub active: Option<bool>,
    pub notes: Option<String>,
    pub owner_id: Option<i64>,
}

impl_record!(
    Specimen,
    i64,
    [name, email, age, score, active, notes, owner_id],
    unique [email]
);

impl Owned for Specimen {
    type OwnerId = i64;
    const OWNER_FIELD: &'static str = "owner_id";

    fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }
}

impl Updatable<SpecimenDto> for Specimen {
    fn apply_update(&mut self, dto: &SpecimenDto) {
        if dto.name.is_some() {
            self.name = dto.name.clone();
        }
        if dto.age.is_some() {
            self.age = dto.age;
        }
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecimenDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub score: Option<f64>,
    pub active: Option<bool>,
    pub notes: Option<String>,
    pub owner_id: Option<i64>,
}

impl_transfer_object!(
    SpecimenDto,
    i64,
    [name, email, age, score, active, notes, owner_id]
);

impl OwnedTransferObject for SpecimenDto {
    type OwnerId = i64;

    fn set_owner_id(&mut self, owner: i64) {
        self.owner_id = Some(owner);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpecimenMapper;

impl Mapper<Specimen, SpecimenDto> for SpecimenMapper {
    fn to_dto_with(&self, record: &Specimen, _conditions: &MappingConditions) -> SpecimenDto {
        SpecimenDto {
            id: record.id,
            audit: record.audit.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            age: record.age,
            score: record.score,
            active: record.active,
            notes: record.notes.clone(),
            owner_id: record.owner_id,
        }
    }

    fn map_to_record(&self, dto: &SpecimenDto) -> Specimen {
        Specimen {
            id: dto.id,
            audit: dto.audit.clone(),
            name: dto.name.clone(),
            email: dto.email.clone(),
            age: dto.age,
            score: dto.score,
            active: dto.active,
            notes: dto.notes.clone(),
            owner_id: dto.owner_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Unsaved specimen
pub fn specimen(name: &str, email: &str, age: i64, score: f64, active: bool) -> Specimen {
    Specimen {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        age: Some(age),
        score: Some(score),
        active: Some(active),
        ..Default::default()
    }
}

/// Unsaved specimen of an owner
pub fn owned_specimen(name: &str, owner: i64) -> Specimen {
    Specimen {
        name: Some(name.to_string()),
        owner_id: Some(owner),
        ..Default::default()
    }
}

pub fn specimen_dto(name: &str, email: &str) -> SpecimenDto {
    SpecimenDto {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        ..Default::default()
    }
}

/// Entity service over `repository`, recording into the returned sink
pub fn service_over(
    repository: Arc<dyn Repository<Specimen>>,
) -> (EntityService<Specimen, SpecimenDto>, Arc<MemoryAuditSink>) {
    let sink = Arc::new(MemoryAuditSink::new());
    let resolver = ResourceTypeResolver::builder().register::<Specimen>().build();
    let service = EntityService::new(
        repository,
        Arc::new(SpecimenMapper),
        &resolver,
        AuditRecorder::new(sink.clone()),
    );
    (service, sink)
}

/// Owner-scoped service where `alice` is owner 7 and `bob` is owner 8
pub fn scoped_over(
    repository: Arc<dyn Repository<Specimen>>,
) -> (OwnerScoped<Specimen, SpecimenDto>, Arc<MemoryAuditSink>) {
    let (service, sink) = service_over(repository);
    let owners = StaticOwnerResolver::new().with("alice", 7_i64).with("bob", 8_i64);
    (OwnerScoped::new(service, Arc::new(owners)), sink)
}

pub fn alice() -> AuthContext {
    AuthContext::user("alice")
}

pub fn bob() -> AuthContext {
    AuthContext::user("bob")
}

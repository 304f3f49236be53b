//! # Keeper
//!
//! A generic persistence-service framework for record keeping, with a reptile
//! husbandry domain built on top of it.
//!
//! ## Features
//!
//! - **Generic CRUD**: one [`EntityService`](crate::core::service::EntityService) per record type,
//!   driven by a repository, a mapper and the resolved resource names
//! - **Audit Trail**: one event per created, modified, removed or accessed record,
//!   sent to an injectable sink that never fails the operation
//! - **Per-Owner Isolation**: [`OwnerScoped`](crate::core::ownership::OwnerScoped) resolves
//!   every lookup by `(id, owner)`; foreign records are `NotFound`
//! - **Query by Example**: partial matches with configurable string matching
//! - **Audit Stamping**: created/updated attributes managed by the framework
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keeper::prelude::*;
//!
//! let host = KeeperHost::in_memory(KeeperConfig::default())?;
//! host.users.create(&AuthContext::System, UserDto::new("alice", "alice@example.com")).await?;
//!
//! let alice = AuthContext::user("alice");
//! let tank = host
//!     .enclosures
//!     .create(&alice, EnclosureDto::new("Tank-1", EnclosureType::Terrarium))
//!     .await?;
//! let monty = host
//!     .reptiles
//!     .create(&alice, ReptileDto { enclosure_id: tank.id, ..ReptileDto::new("Monty", "Ball Python") })
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod entities;
pub mod host;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AuditEvent, AuditFields, AuditOperationType, AuditRecorder, AuditSink, AuditSubject,
        AuthContext, EntityService, Example, ExampleMatcher, FieldValue, Fields, Mapper,
        MappingConditions, OwnedRepository, OwnerResolver, OwnerScoped, Page, PageRequest,
        ParentGuard, Record, RelationshipHook, Repository, ResourceTypeResolver, ServiceError,
        ServiceResult, Sort, StaticOwnerResolver, StorageError, StringMatcher, TransferObject,
        Updatable,
    };
    pub use crate::core::audit::{BroadcastAuditSink, MemoryAuditSink, TracingAuditSink};

    // === Macros ===
    pub use crate::{field_enum, impl_record, impl_transfer_object};

    // === Domain ===
    pub use crate::domain::statistics::*;
    pub use crate::domain::*;
    pub use crate::entities::*;

    // === Storage ===
    pub use crate::storage::InMemoryRepository;

    // === Config and host ===
    pub use crate::config::{AuditSinkKind, KeeperConfig, init_tracing};
    pub use crate::host::KeeperHost;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
}

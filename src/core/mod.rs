//! Core module containing the generic persistence-service framework

pub mod audit;
pub mod auth;
pub mod error;
pub mod example;
pub mod field;
pub mod mapper;
pub mod ownership;
pub mod query;
pub mod record;
pub mod repository;
pub mod resolver;
pub mod service;

pub use audit::{AuditEvent, AuditOperationType, AuditRecorder, AuditSink, AuditSubject};
pub use auth::{AuthContext, OwnerResolver, StaticOwnerResolver};
pub use error::{ConfigError, ServiceError, ServiceResult, StorageError, StorageResult};
pub use example::{Example, ExampleMatcher, StringMatcher};
pub use field::{FieldValue, Fields};
pub use mapper::{Mapper, MappingConditions};
pub use ownership::{OwnerScoped, ParentGuard};
pub use query::{Direction, Page, PageRequest, PaginationMeta, Sort};
pub use record::{
    AuditFields, Identity, Owned, OwnedTransferObject, Record, TransferObject, Updatable,
};
pub use repository::{OwnedRepository, Repository};
pub use resolver::{ResourceNames, ResourceTypeResolver};
pub use service::{EntityService, NoRelationships, RelationshipHook};

//! Generic entity service
//!
//! [`EntityService`] gives every record type the same read and CRUD
//! behaviour: input validation before any write, audit stamping, one audit
//! event per touched record and a `tracing` line per write. It is generic
//! over the record and transfer object types and is configured by
//! composition: a repository, a mapper, the resolved resource names, an
//! audit recorder and an optional [`RelationshipHook`].
//!
//! Lifecycle of a record: absent → create → persisted → update* → delete → absent.

use crate::core::audit::{
    ACTION_ACCESS, ACTION_ACCESS_PAGE, ACTION_CREATE, ACTION_DELETE, ACTION_UPDATE,
    AuditOperationType, AuditRecorder, AuditSubject,
};
use crate::core::auth::AuthContext;
use crate::core::error::{ServiceError, ServiceResult, StorageError};
use crate::core::example::Example;
use crate::core::mapper::{self, Mapper, MappingConditions};
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::record::{Record, TransferObject, Updatable};
use crate::core::repository::Repository;
use crate::core::resolver::{ResourceNames, ResourceTypeResolver, simple_type_name};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

/// Default maximum page size
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Hook run during update, after the transfer object was applied and before
/// the record is saved
///
/// Implementations resolve related records (foreign keys) and fail with
/// `InvalidArgument` when one does not exist.
#[async_trait]
pub trait RelationshipHook<R, D>: Send + Sync
where
    R: Record,
    D: TransferObject,
{
    async fn handle_entity_relationships(
        &self,
        ctx: &AuthContext,
        record: &mut R,
        dto: &D,
        conditions: &MappingConditions,
    ) -> ServiceResult<()>;
}

/// Hook that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRelationships;

#[async_trait]
impl<R, D> RelationshipHook<R, D> for NoRelationships
where
    R: Record,
    D: TransferObject,
{
    async fn handle_entity_relationships(
        &self,
        _ctx: &AuthContext,
        _record: &mut R,
        _dto: &D,
        _conditions: &MappingConditions,
    ) -> ServiceResult<()> {
        Ok(())
    }
}

/// Read and CRUD operations for one record type
pub struct EntityService<R, D>
where
    R: Record,
    D: TransferObject<Id = R::Id>,
{
    repository: Arc<dyn Repository<R>>,
    mapper: Arc<dyn Mapper<R, D>>,
    audit: AuditRecorder,
    names: ResourceNames,
    type_name: &'static str,
    default_sort: Sort,
    max_page_size: usize,
    relationships: Arc<dyn RelationshipHook<R, D>>,
}

impl<R, D> Clone for EntityService<R, D>
where
    R: Record,
    D: TransferObject<Id = R::Id>,
{
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            mapper: self.mapper.clone(),
            audit: self.audit.clone(),
            names: self.names.clone(),
            type_name: self.type_name,
            default_sort: self.default_sort.clone(),
            max_page_size: self.max_page_size,
            relationships: self.relationships.clone(),
        }
    }
}

impl<R, D> Debug for EntityService<R, D>
where
    R: Record,
    D: TransferObject<Id = R::Id>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("type_name", &self.type_name)
            .field("names", &self.names)
            .field("default_sort", &self.default_sort)
            .field("max_page_size", &self.max_page_size)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Construction and accessors
// =============================================================================

impl<R, D> EntityService<R, D>
where
    R: Record,
    D: TransferObject<Id = R::Id> + Serialize,
{
    pub fn new(
        repository: Arc<dyn Repository<R>>,
        mapper: Arc<dyn Mapper<R, D>>,
        resolver: &ResourceTypeResolver,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            repository,
            mapper,
            audit,
            names: resolver.resolve::<R>(),
            type_name: simple_type_name::<R>(),
            default_sort: Sort::asc("id"),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            relationships: Arc::new(NoRelationships),
        }
    }

    /// Ordering used when a page request carries no sort
    pub fn with_default_sort(mut self, sort: Sort) -> Self {
        self.default_sort = sort;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub fn with_relationships(mut self, hook: Arc<dyn RelationshipHook<R, D>>) -> Self {
        self.relationships = hook;
        self
    }

    pub fn repository(&self) -> &Arc<dyn Repository<R>> {
        &self.repository
    }

    pub fn mapper(&self) -> &Arc<dyn Mapper<R, D>> {
        &self.mapper
    }

    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    /// Simple name of the record type, used in log lines
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn default_sort(&self) -> &Sort {
        &self.default_sort
    }

    /// Clamp the size and apply the default sort
    pub fn normalize(&self, request: PageRequest) -> PageRequest {
        request
            .clamped(self.max_page_size)
            .or_sort(&self.default_sort)
    }

    /// Record one ACCESS event for `id`
    pub fn record_access(&self, ctx: &AuthContext, id: &R::Id) {
        self.audit.record(
            ctx.principal_identifier(),
            AuditOperationType::Access,
            &self.names.resource_type,
            &self.names.action(ACTION_ACCESS),
            AuditSubject::identifier(id),
        );
    }

    /// Record one page-level ACCESS event
    pub fn record_page_access(&self, ctx: &AuthContext) {
        self.audit.record(
            ctx.principal_identifier(),
            AuditOperationType::Access,
            &self.names.resource_type,
            &self.names.action(ACTION_ACCESS_PAGE),
            AuditSubject::Page,
        );
    }

    fn not_found(&self, id: &R::Id) -> ServiceError {
        ServiceError::not_found(self.names.resource_type.clone(), id)
    }

    fn invalid(&self, message: String) -> ServiceError {
        ServiceError::invalid_argument(self.type_name, message)
    }

    pub(crate) fn require_id(
        &self,
        ctx: &AuthContext,
        id: Option<R::Id>,
        operation: &str,
    ) -> ServiceResult<R::Id> {
        id.ok_or_else(|| {
            info!(
                "'{}' tried {} '{}' with id 'null'",
                ctx.principal_identifier(),
                operation,
                self.type_name
            );
            self.invalid(format!(
                "{} '{}' with 'null' id is not allowed",
                operation, self.type_name
            ))
        })
    }

    /// Log a related record that could not be loaded and build the error for it
    pub fn failed_related_entity_load(
        &self,
        ctx: &AuthContext,
        related_name: &str,
        id: impl ToString,
    ) -> ServiceError {
        let id = id.to_string();
        info!(
            "'{}' tried update '{}' with nonexistent related entity '{}' '{}'",
            ctx.principal_identifier(),
            self.type_name,
            related_name,
            id
        );
        self.invalid(format!("related {} '{}' does not exist", related_name, id))
    }
}

// =============================================================================
// Reads
// =============================================================================

impl<R, D> EntityService<R, D>
where
    R: Record,
    D: TransferObject<Id = R::Id> + Serialize,
{
    /// Find one record by id and map it
    ///
    /// `None` is rejected with `InvalidArgument`, an unknown id is `NotFound`.
    pub async fn find_by_id(
        &self,
        ctx: &AuthContext,
        id: impl Into<Option<R::Id>> + Send,
    ) -> ServiceResult<D> {
        self.find_by_id_with(ctx, id, &MappingConditions::none())
            .await
    }

    pub async fn find_by_id_with(
        &self,
        ctx: &AuthContext,
        id: impl Into<Option<R::Id>> + Send,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        let record = self.find_entity_by_id(ctx, id).await?;
        Ok(self.mapper.to_dto_with(&record, conditions))
    }

    /// Find one record by id without mapping it
    pub async fn find_entity_by_id(
        &self,
        ctx: &AuthContext,
        id: impl Into<Option<R::Id>> + Send,
    ) -> ServiceResult<R> {
        let id = self.require_id(ctx, id.into(), "find")?;
        let record = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| self.not_found(&id))?;

        debug!(resource = %self.names.resource_type, id = %id, "found record");
        self.record_access(ctx, &id);
        Ok(record)
    }

    /// One page of all records; a page past the end is empty
    pub async fn find_all(&self, ctx: &AuthContext, request: PageRequest) -> ServiceResult<Page<D>> {
        self.find_all_with(ctx, request, &MappingConditions::none())
            .await
    }

    pub async fn find_all_with(
        &self,
        ctx: &AuthContext,
        request: PageRequest,
        conditions: &MappingConditions,
    ) -> ServiceResult<Page<D>> {
        let request = self.normalize(request);
        let page = self.repository.find_all(&request).await?;
        Ok(self.process_page(ctx, page, conditions))
    }

    /// Records for the given ids
    ///
    /// `None` or an empty list returns nothing and records no event. `None`
    /// entries are skipped; unknown ids are skipped. Order is the storage order.
    pub async fn find_all_by_ids(
        &self,
        ctx: &AuthContext,
        ids: Option<&[Option<R::Id>]>,
    ) -> ServiceResult<Vec<D>> {
        let ids: Vec<R::Id> = match ids {
            Some(ids) if !ids.is_empty() => ids.iter().flatten().cloned().collect(),
            _ => return Ok(Vec::new()),
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.repository.find_all_by_id(&ids).await?;
        Ok(self.process_list(ctx, records, &MappingConditions::none()))
    }

    /// One page of records matching `example`
    pub async fn find_by_example(
        &self,
        ctx: &AuthContext,
        example: &Example,
        request: PageRequest,
    ) -> ServiceResult<Page<D>> {
        let request = self.normalize(request);
        let page = self.repository.find_by_example(example, &request).await?;
        Ok(self.process_page(ctx, page, &MappingConditions::none()))
    }

    /// Map a page and record the page-level ACCESS event
    pub fn process_page(
        &self,
        ctx: &AuthContext,
        page: Page<R>,
        conditions: &MappingConditions,
    ) -> Page<D> {
        let mapped = page.map(|record| self.mapper.to_dto_with(&record, conditions));
        self.record_page_access(ctx);
        mapped
    }

    /// Map a list and record one ACCESS event per record
    pub fn process_list(
        &self,
        ctx: &AuthContext,
        records: Vec<R>,
        conditions: &MappingConditions,
    ) -> Vec<D> {
        for id in records.iter().filter_map(Record::id) {
            self.record_access(ctx, &id);
        }
        self.mapper.to_dto_list_with(&records, conditions)
    }
}

// =============================================================================
// Writes
// =============================================================================

impl<R, D> EntityService<R, D>
where
    R: Record,
    D: TransferObject<Id = R::Id> + Serialize,
{
    pub async fn create(&self, ctx: &AuthContext, dto: D) -> ServiceResult<D> {
        self.create_with(ctx, dto, &MappingConditions::none()).await
    }

    pub async fn create_with(
        &self,
        ctx: &AuthContext,
        dto: D,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        let mut created = self.create_all_with(ctx, vec![dto], conditions).await?;
        created.pop().ok_or_else(|| self.empty_save())
    }

    /// Create several records in one unit of work
    ///
    /// Every transfer object is validated before anything is written.
    pub async fn create_all(&self, ctx: &AuthContext, dtos: Vec<D>) -> ServiceResult<Vec<D>> {
        self.create_all_with(ctx, dtos, &MappingConditions::none())
            .await
    }

    pub async fn create_all_with(
        &self,
        ctx: &AuthContext,
        dtos: Vec<D>,
        conditions: &MappingConditions,
    ) -> ServiceResult<Vec<D>> {
        let records = self.create_all_as_entity(ctx, dtos, conditions).await?;
        Ok(self.mapper.to_dto_list_with(&records, conditions))
    }

    pub async fn create_as_entity(
        &self,
        ctx: &AuthContext,
        dto: D,
        conditions: &MappingConditions,
    ) -> ServiceResult<R> {
        let mut created = self
            .create_all_as_entity(ctx, vec![dto], conditions)
            .await?;
        created.pop().ok_or_else(|| self.empty_save())
    }

    pub async fn create_all_as_entity(
        &self,
        ctx: &AuthContext,
        dtos: Vec<D>,
        conditions: &MappingConditions,
    ) -> ServiceResult<Vec<R>> {
        let records = dtos
            .iter()
            .map(|dto| self.mapper.to_entity_with(dto, conditions))
            .collect();
        self.save_new(ctx, records).await
    }

    /// Persist a record built by the caller, e.g. one carrying storage-only data
    pub async fn create_entity(&self, ctx: &AuthContext, record: R) -> ServiceResult<R> {
        let mut saved = self.save_new(ctx, vec![record]).await?;
        saved.pop().ok_or_else(|| self.empty_save())
    }

    /// Every create path ends here; identities are always chosen by storage
    async fn save_new(&self, ctx: &AuthContext, mut records: Vec<R>) -> ServiceResult<Vec<R>> {
        let actor = ctx.principal_identifier();
        if let Some(id) = records.iter().find_map(Record::id) {
            info!(
                "'{}' tried create '{}' with id '{}'",
                actor, self.type_name, id
            );
            return Err(self.invalid(format!(
                "creation of '{}' with id is not allowed",
                self.type_name
            )));
        }

        let now = Utc::now();
        for record in &mut records {
            record.audit_mut().stamp_created(actor, now);
        }

        let saved = self.repository.save_all(records).await?;
        let ids: Vec<R::Id> = saved.iter().filter_map(Record::id).collect();

        info!("'{}' created '{}' '{:?}'", actor, self.type_name, ids);
        for id in &ids {
            self.audit.record(
                actor,
                AuditOperationType::Create,
                &self.names.resource_type,
                &self.names.action(ACTION_CREATE),
                AuditSubject::identifier(id),
            );
        }

        Ok(saved)
    }

    fn empty_save(&self) -> ServiceError {
        ServiceError::Storage(StorageError::Integrity {
            message: format!("saving '{}' returned no record", self.type_name),
        })
    }

    /// Delete by id; deleting an unknown id is not an error
    pub async fn delete_by_id(&self, ctx: &AuthContext, id: R::Id) -> ServiceResult<()> {
        let existed = self.repository.delete_by_id(&id).await?;

        info!(
            "'{}' deleted '{}' '{}'",
            ctx.principal_identifier(),
            self.type_name,
            id
        );
        if existed {
            self.record_remove(ctx, &id);
        }
        Ok(())
    }

    pub async fn delete_all_by_id(&self, ctx: &AuthContext, ids: &[R::Id]) -> ServiceResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let removed = self.repository.delete_all_by_id(ids).await?;

        info!(
            "'{}' deleted '{}' '{:?}'",
            ctx.principal_identifier(),
            self.type_name,
            ids
        );
        for id in &removed {
            self.record_remove(ctx, id);
        }
        Ok(())
    }

    /// Delete the record a transfer object refers to
    pub async fn delete(&self, ctx: &AuthContext, dto: &D) -> ServiceResult<()> {
        let id = self.require_id(ctx, dto.id(), "delete")?;
        self.delete_by_id(ctx, id).await
    }

    pub async fn delete_all(&self, ctx: &AuthContext, dtos: &[D]) -> ServiceResult<()> {
        let ids = dtos
            .iter()
            .map(|dto| self.require_id(ctx, dto.id(), "delete"))
            .collect::<ServiceResult<Vec<_>>>()?;
        self.delete_all_by_id(ctx, &ids).await
    }

    fn record_remove(&self, ctx: &AuthContext, id: &R::Id) {
        self.audit.record(
            ctx.principal_identifier(),
            AuditOperationType::Remove,
            &self.names.resource_type,
            &self.names.action(ACTION_DELETE),
            AuditSubject::identifier(id),
        );
    }
}

impl<R, D> EntityService<R, D>
where
    R: Record + Updatable<D>,
    D: TransferObject<Id = R::Id> + Serialize,
{
    pub async fn update(&self, ctx: &AuthContext, dto: D) -> ServiceResult<D> {
        self.update_with(ctx, dto, &MappingConditions::none()).await
    }

    /// Apply `dto` onto the stored record with the same id
    ///
    /// Fails with `InvalidArgument` when the id is missing and `NotFound` when
    /// no such record exists; nothing is written in either case.
    pub async fn update_with(
        &self,
        ctx: &AuthContext,
        dto: D,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        let id = self.require_id(ctx, dto.id(), "update")?;

        if !self.repository.exists_by_id(&id).await? {
            info!(
                "'{}' tried update '{}' with id '{}' that does not exist",
                ctx.principal_identifier(),
                self.type_name,
                id
            );
            return Err(self.not_found(&id));
        }

        let record = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| self.not_found(&id))?;

        self.update_loaded(ctx, record, &dto, conditions).await
    }

    /// Apply, resolve relationships, stamp, save and audit an already loaded record
    pub async fn update_loaded(
        &self,
        ctx: &AuthContext,
        mut record: R,
        dto: &D,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        mapper::apply_update(dto, &mut record);
        self.relationships
            .handle_entity_relationships(ctx, &mut record, dto, conditions)
            .await?;

        self.save_modified(ctx, record, conditions).await
    }

    /// Stamp, save and audit a record that was changed in place
    pub async fn save_modified(
        &self,
        ctx: &AuthContext,
        mut record: R,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        let actor = ctx.principal_identifier();
        record.audit_mut().stamp_updated(actor, Utc::now());

        let updated = self.repository.save(record).await?;
        let dto = self.mapper.to_dto_with(&updated, conditions);

        info!(
            "'{}' updated '{}' '{}'",
            actor,
            self.type_name,
            updated
                .id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "null".to_string())
        );
        self.audit.record(
            actor,
            AuditOperationType::Modify,
            &self.names.resource_type,
            &self.names.action(ACTION_UPDATE),
            AuditSubject::object(&dto),
        );

        Ok(dto)
    }
}

//! Owner-scoped entity service
//!
//! [`OwnerScoped`] wraps an [`EntityService`] and restricts every operation
//! to the records of the calling owner:
//! - create forces the owner to the caller
//! - reads, updates and deletes by id resolve by `(id, owner)`; a record of
//!   another owner is reported as `NotFound`
//! - collection queries add an owner criterion at the storage level
//! - [`OwnerScoped::verify_ownership`] is the one check that reports
//!   `AccessDenied` instead
//!
//! Child records (logs) are scoped through their parent with [`ParentGuard`].

use crate::core::auth::{AuthContext, OwnerResolver};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::example::Example;
use crate::core::mapper::MappingConditions;
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::record::{Identity, Owned, OwnedTransferObject, Updatable};
use crate::core::repository::{OwnedRepository, owner_example};
use crate::core::service::EntityService;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Visibility check for a parent record
#[async_trait]
pub trait ParentGuard<I: Identity>: Send + Sync {
    /// Fails with `NotFound` when the parent is absent or not visible to the caller
    async fn ensure_visible(&self, ctx: &AuthContext, parent_id: &I) -> ServiceResult<()>;
}

/// Entity service restricted to the caller's own records
pub struct OwnerScoped<R, D>
where
    R: Owned,
    D: OwnedTransferObject<Id = R::Id, OwnerId = R::OwnerId>,
{
    inner: EntityService<R, D>,
    owners: Arc<dyn OwnerResolver<R::OwnerId>>,
}

impl<R, D> Clone for OwnerScoped<R, D>
where
    R: Owned,
    D: OwnedTransferObject<Id = R::Id, OwnerId = R::OwnerId>,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            owners: self.owners.clone(),
        }
    }
}

impl<R, D> OwnerScoped<R, D>
where
    R: Owned,
    D: OwnedTransferObject<Id = R::Id, OwnerId = R::OwnerId> + Serialize,
{
    pub fn new(inner: EntityService<R, D>, owners: Arc<dyn OwnerResolver<R::OwnerId>>) -> Self {
        Self { inner, owners }
    }

    /// The unscoped service underneath
    pub fn inner(&self) -> &EntityService<R, D> {
        &self.inner
    }

    /// Owner id of the caller
    pub async fn current_owner(&self, ctx: &AuthContext) -> ServiceResult<R::OwnerId> {
        self.owners
            .resolve_owner_id(ctx.principal_identifier())
            .await
    }

    fn scoped_not_found(&self, ctx: &AuthContext, id: &R::Id) -> ServiceError {
        warn!(
            "'{}' requested '{}' '{}' which is absent or owned by someone else",
            ctx.principal_identifier(),
            self.inner.type_name(),
            id
        );
        ServiceError::not_found(self.inner.names().resource_type.clone(), id)
    }

    /// Load a record of the caller without recording an event
    pub async fn load_owned(&self, ctx: &AuthContext, id: &R::Id) -> ServiceResult<R> {
        let owner = self.current_owner(ctx).await?;
        self.inner
            .repository()
            .find_by_id_and_owner(id, &owner)
            .await?
            .ok_or_else(|| self.scoped_not_found(ctx, id))
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    pub async fn create(&self, ctx: &AuthContext, dto: D) -> ServiceResult<D> {
        self.create_with(ctx, dto, &MappingConditions::none()).await
    }

    pub async fn create_with(
        &self,
        ctx: &AuthContext,
        mut dto: D,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        dto.set_owner_id(self.current_owner(ctx).await?);
        self.inner.create_with(ctx, dto, conditions).await
    }

    pub async fn create_all(&self, ctx: &AuthContext, mut dtos: Vec<D>) -> ServiceResult<Vec<D>> {
        let owner = self.current_owner(ctx).await?;
        for dto in &mut dtos {
            dto.set_owner_id(owner.clone());
        }
        self.inner.create_all(ctx, dtos).await
    }

    /// Delete one of the caller's records; anything else is `NotFound`
    pub async fn delete_by_id(&self, ctx: &AuthContext, id: R::Id) -> ServiceResult<()> {
        let owner = self.current_owner(ctx).await?;
        if !self
            .inner
            .repository()
            .exists_by_id_and_owner(&id, &owner)
            .await?
        {
            return Err(self.scoped_not_found(ctx, &id));
        }
        self.inner.delete_by_id(ctx, id).await
    }

    pub async fn delete(&self, ctx: &AuthContext, dto: &D) -> ServiceResult<()> {
        let id = self.inner.require_id(ctx, dto.id(), "delete")?;
        self.delete_by_id(ctx, id).await
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

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
        Ok(self.inner.mapper().to_dto_with(&record, conditions))
    }

    pub async fn find_entity_by_id(
        &self,
        ctx: &AuthContext,
        id: impl Into<Option<R::Id>> + Send,
    ) -> ServiceResult<R> {
        let id = self.inner.require_id(ctx, id.into(), "find")?;
        let record = self.load_owned(ctx, &id).await?;
        self.inner.record_access(ctx, &id);
        Ok(record)
    }

    /// One page of the caller's records
    pub async fn find_all(&self, ctx: &AuthContext, request: PageRequest) -> ServiceResult<Page<D>> {
        self.find_by_example(ctx, Example::matching_all(), request)
            .await
    }

    /// One page of the caller's records matching `example`
    pub async fn find_by_example(
        &self,
        ctx: &AuthContext,
        example: Example,
        request: PageRequest,
    ) -> ServiceResult<Page<D>> {
        let owner = self.current_owner(ctx).await?;
        let example = example.and_equals(R::OWNER_FIELD, owner.to_field_value());
        self.inner.find_by_example(ctx, &example, request).await
    }

    /// The caller's records among `ids`; see [`EntityService::find_all_by_ids`]
    pub async fn find_all_by_ids(
        &self,
        ctx: &AuthContext,
        ids: Option<&[Option<R::Id>]>,
    ) -> ServiceResult<Vec<D>> {
        let ids: Vec<R::Id> = match ids {
            Some(ids) => ids.iter().flatten().cloned().collect(),
            None => return Ok(Vec::new()),
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let owner = self.current_owner(ctx).await?;
        let records = self
            .inner
            .repository()
            .find_all_by_id_and_owner(&ids, &owner)
            .await?;
        Ok(self
            .inner
            .process_list(ctx, records, &MappingConditions::none()))
    }

    /// Every record of the caller in the default order
    pub async fn find_all_by_owner(&self, ctx: &AuthContext) -> ServiceResult<Vec<D>> {
        let sort = self.inner.default_sort().clone();
        self.list_matching(ctx, Example::matching_all(), &sort)
            .await
    }

    /// The caller's records matching `example`, unmapped and without events
    pub async fn find_all_matching(
        &self,
        ctx: &AuthContext,
        example: Example,
        sort: &Sort,
    ) -> ServiceResult<Vec<R>> {
        let owner = self.current_owner(ctx).await?;
        let example = example.and_equals(R::OWNER_FIELD, owner.to_field_value());
        Ok(self
            .inner
            .repository()
            .find_all_by_example(&example, sort)
            .await?)
    }

    /// The caller's records matching `example`, mapped, with one page-level event
    pub async fn list_matching(
        &self,
        ctx: &AuthContext,
        example: Example,
        sort: &Sort,
    ) -> ServiceResult<Vec<D>> {
        let records = self.find_all_matching(ctx, example, sort).await?;
        self.inner.record_page_access(ctx);
        Ok(self.inner.mapper().to_dto_list(&records))
    }

    /// Number of the caller's records
    pub async fn count(&self, ctx: &AuthContext) -> ServiceResult<usize> {
        let owner = self.current_owner(ctx).await?;
        Ok(self
            .inner
            .repository()
            .count_by_example(&owner_example::<R>(&owner))
            .await?)
    }

    /// Fails with `AccessDenied` unless the record exists and belongs to the caller
    pub async fn verify_ownership(&self, ctx: &AuthContext, id: &R::Id) -> ServiceResult<()> {
        let owner = self.current_owner(ctx).await?;
        if self
            .inner
            .repository()
            .exists_by_id_and_owner(id, &owner)
            .await?
        {
            Ok(())
        } else {
            warn!(
                "'{}' does not own '{}' '{}'",
                ctx.principal_identifier(),
                self.inner.type_name(),
                id
            );
            Err(ServiceError::access_denied(
                self.inner.names().resource_type.clone(),
                id,
            ))
        }
    }
}

impl<R, D> OwnerScoped<R, D>
where
    R: Owned + Updatable<D>,
    D: OwnedTransferObject<Id = R::Id, OwnerId = R::OwnerId> + Serialize,
{
    pub async fn update(&self, ctx: &AuthContext, dto: D) -> ServiceResult<D> {
        self.update_with(ctx, dto, &MappingConditions::none()).await
    }

    /// Update one of the caller's records; anything else is `NotFound`
    pub async fn update_with(
        &self,
        ctx: &AuthContext,
        mut dto: D,
        conditions: &MappingConditions,
    ) -> ServiceResult<D> {
        let id = self.inner.require_id(ctx, dto.id(), "update")?;
        let record = self.load_owned(ctx, &id).await?;
        dto.set_owner_id(self.current_owner(ctx).await?);

        self.inner
            .update_loaded(ctx, record, &dto, conditions)
            .await
    }

    /// Change a loaded record of the caller in place and save it
    pub async fn modify<F>(&self, ctx: &AuthContext, id: &R::Id, change: F) -> ServiceResult<D>
    where
        F: FnOnce(&mut R) + Send,
    {
        let mut record = self.load_owned(ctx, id).await?;
        change(&mut record);
        self.inner
            .save_modified(ctx, record, &MappingConditions::none())
            .await
    }
}

#[async_trait]
impl<R, D> ParentGuard<R::Id> for OwnerScoped<R, D>
where
    R: Owned,
    D: OwnedTransferObject<Id = R::Id, OwnerId = R::OwnerId> + Serialize,
{
    async fn ensure_visible(&self, ctx: &AuthContext, parent_id: &R::Id) -> ServiceResult<()> {
        self.load_owned(ctx, parent_id).await.map(|_| ())
    }
}

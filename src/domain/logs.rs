//! Parent-scoped log service
//!
//! Logs have no owner of their own. A log is visible to whoever can see its
//! parent record, so every operation first asks a [`ParentGuard`] about the
//! parent and reports a hidden parent as `NotFound`.

use crate::core::auth::AuthContext;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::example::Example;
use crate::core::mapper::MappingConditions;
use crate::core::ownership::ParentGuard;
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::record::{Record, Updatable};
use crate::core::service::EntityService;
use crate::entities::{LogDto, LogRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// CRUD and history queries for records hanging off a parent
pub struct LogService<R, D>
where
    R: LogRecord,
    D: LogDto,
{
    inner: EntityService<R, D>,
    parents: Arc<dyn ParentGuard<i64>>,
    parent_name: &'static str,
}

impl<R, D> Clone for LogService<R, D>
where
    R: LogRecord,
    D: LogDto,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            parents: self.parents.clone(),
            parent_name: self.parent_name,
        }
    }
}

impl<R, D> LogService<R, D>
where
    R: LogRecord,
    D: LogDto + Serialize,
{
    /// Wrap `inner`; history defaults to newest first
    pub fn new(
        inner: EntityService<R, D>,
        parents: Arc<dyn ParentGuard<i64>>,
        parent_name: &'static str,
    ) -> Self {
        Self {
            inner: inner.with_default_sort(Sort::desc(R::DATE_FIELD)),
            parents,
            parent_name,
        }
    }

    pub fn inner(&self) -> &EntityService<R, D> {
        &self.inner
    }

    pub(crate) fn history_sort() -> Sort {
        Sort::desc(R::DATE_FIELD).then(Sort::desc("id"))
    }

    fn parent_example(parent_id: i64) -> Example {
        Example::matching_all().and_equals(R::PARENT_FIELD, parent_id)
    }

    fn require_parent(&self, ctx: &AuthContext, parent_id: Option<i64>) -> ServiceResult<i64> {
        parent_id.ok_or_else(|| {
            warn!(
                "'{}' tried create '{}' without {}",
                ctx.principal_identifier(),
                self.inner.type_name(),
                self.parent_name
            );
            ServiceError::invalid_argument(
                self.inner.type_name(),
                format!("{} is required", R::PARENT_FIELD),
            )
        })
    }

    /// Load a log whose parent the caller can see, without recording an event
    pub async fn load_visible(&self, ctx: &AuthContext, id: i64) -> ServiceResult<R> {
        let not_found = || ServiceError::not_found(self.inner.names().resource_type.clone(), id);

        let record = self
            .inner
            .repository()
            .find_by_id(&id)
            .await?
            .ok_or_else(not_found)?;
        let parent_id = record.parent_id().ok_or_else(not_found)?;

        match self.parents.ensure_visible(ctx, &parent_id).await {
            Ok(()) => Ok(record),
            Err(ServiceError::NotFound { .. }) => Err(not_found()),
            Err(e) => Err(e),
        }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Create a log under a parent the caller can see
    pub async fn create(&self, ctx: &AuthContext, dto: D) -> ServiceResult<D> {
        let parent_id = self.require_parent(ctx, dto.parent_id())?;
        self.parents.ensure_visible(ctx, &parent_id).await?;
        self.inner.create(ctx, dto).await
    }

    /// Persist a log built by the caller
    pub async fn create_entity(&self, ctx: &AuthContext, record: R) -> ServiceResult<R> {
        let parent_id = self.require_parent(ctx, record.parent_id())?;
        self.parents.ensure_visible(ctx, &parent_id).await?;
        self.inner.create_entity(ctx, record).await
    }

    /// Delete a visible log; anything else is `NotFound`
    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> ServiceResult<()> {
        self.load_visible(ctx, id).await?;
        self.inner.delete_by_id(ctx, id).await
    }

    /// Delete every log of a parent and return how many were removed
    pub async fn delete_all_for(&self, ctx: &AuthContext, parent_id: i64) -> ServiceResult<usize> {
        let ids: Vec<i64> = self
            .records_for(ctx, parent_id)
            .await?
            .iter()
            .filter_map(Record::id)
            .collect();
        self.inner.delete_all_by_id(ctx, &ids).await?;
        Ok(ids.len())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub async fn get(&self, ctx: &AuthContext, id: impl Into<Option<i64>> + Send) -> ServiceResult<D> {
        let id = self.inner.require_id(ctx, id.into(), "find")?;
        let record = self.load_visible(ctx, id).await?;
        self.inner.record_access(ctx, &id);
        Ok(self.inner.mapper().to_dto(&record))
    }

    /// Every log of a parent, newest first, unmapped and without events
    pub async fn records_for(&self, ctx: &AuthContext, parent_id: i64) -> ServiceResult<Vec<R>> {
        self.records_matching(ctx, parent_id, Example::matching_all(), &Self::history_sort())
            .await
    }

    /// Logs of a visible parent matching `example`
    pub async fn records_matching(
        &self,
        ctx: &AuthContext,
        parent_id: i64,
        example: Example,
        sort: &Sort,
    ) -> ServiceResult<Vec<R>> {
        self.parents.ensure_visible(ctx, &parent_id).await?;
        let example = example.and_equals(R::PARENT_FIELD, parent_id);
        debug!(resource = %self.inner.names().resource_type, parent_id, "loading logs");
        Ok(self
            .inner
            .repository()
            .find_all_by_example(&example, sort)
            .await?)
    }

    pub(crate) fn listed(&self, ctx: &AuthContext, records: Vec<R>) -> Vec<D> {
        self.inner.record_page_access(ctx);
        self.inner.mapper().to_dto_list(&records)
    }

    /// Every log of a parent, newest first
    pub async fn history(&self, ctx: &AuthContext, parent_id: i64) -> ServiceResult<Vec<D>> {
        let records = self.records_for(ctx, parent_id).await?;
        Ok(self.listed(ctx, records))
    }

    /// One page of a parent's logs
    pub async fn history_page(
        &self,
        ctx: &AuthContext,
        parent_id: i64,
        request: PageRequest,
    ) -> ServiceResult<Page<D>> {
        self.parents.ensure_visible(ctx, &parent_id).await?;
        self.inner
            .find_by_example(ctx, &Self::parent_example(parent_id), request)
            .await
    }

    /// The most recent log of a parent
    pub async fn latest(&self, ctx: &AuthContext, parent_id: i64) -> ServiceResult<Option<D>> {
        let latest = self.records_for(ctx, parent_id).await?.into_iter().next();
        Ok(latest.map(|record| {
            if let Some(id) = record.id() {
                self.inner.record_access(ctx, &id);
            }
            self.inner.mapper().to_dto(&record)
        }))
    }

    /// Logs dated within `[start, end]`, newest first
    pub async fn between(
        &self,
        ctx: &AuthContext,
        parent_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<D>> {
        if start > end {
            return Err(ServiceError::invalid_argument(
                self.inner.type_name(),
                format!("range start '{}' is after end '{}'", start, end),
            ));
        }

        let example = Example::matching_all().and_between(R::DATE_FIELD, start, end);
        let records = self
            .records_matching(ctx, parent_id, example, &Self::history_sort())
            .await?;
        Ok(self.listed(ctx, records))
    }

    /// Number of logs of a visible parent
    pub async fn count_for(&self, ctx: &AuthContext, parent_id: i64) -> ServiceResult<usize> {
        self.parents.ensure_visible(ctx, &parent_id).await?;
        Ok(self
            .inner
            .repository()
            .count_by_example(&Self::parent_example(parent_id))
            .await?)
    }
}

impl<R, D> LogService<R, D>
where
    R: LogRecord + Updatable<D>,
    D: LogDto + Serialize,
{
    /// Update a visible log
    ///
    /// Moving a log to another parent requires that parent to be visible too;
    /// a hidden or missing one fails with `InvalidArgument`.
    pub async fn update(&self, ctx: &AuthContext, dto: D) -> ServiceResult<D> {
        let id = self.inner.require_id(ctx, dto.id(), "update")?;
        let record = self.load_visible(ctx, id).await?;

        if let Some(new_parent) = dto.parent_id().filter(|p| record.parent_id() != Some(*p)) {
            match self.parents.ensure_visible(ctx, &new_parent).await {
                Ok(()) => {}
                Err(ServiceError::NotFound { .. }) => {
                    return Err(self
                        .inner
                        .failed_related_entity_load(ctx, self.parent_name, new_parent));
                }
                Err(e) => return Err(e),
            }
        }

        self.inner
            .update_loaded(ctx, record, &dto, &MappingConditions::none())
            .await
    }
}

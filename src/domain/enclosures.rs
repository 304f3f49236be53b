//! Enclosures of the calling keeper

use crate::core::auth::AuthContext;
use crate::core::error::ServiceResult;
use crate::core::example::{Example, ExampleMatcher, StringMatcher};
use crate::core::field::FieldValue;
use crate::core::ownership::{OwnerScoped, ParentGuard};
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::repository::{Repository, owner_example};
use crate::domain::statistics::{EnclosureStatistics, enclosure_statistics};
use crate::entities::{Enclosure, EnclosureDto, EnclosureType, Reptile};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Owner-scoped enclosure operations
///
/// Occupancy is derived from the caller's reptiles: an enclosure is occupied
/// when at least one of them lives in it.
#[derive(Clone)]
pub struct EnclosureService {
    scoped: OwnerScoped<Enclosure, EnclosureDto>,
    reptiles: Arc<dyn Repository<Reptile>>,
}

impl EnclosureService {
    pub fn new(scoped: OwnerScoped<Enclosure, EnclosureDto>, reptiles: Arc<dyn Repository<Reptile>>) -> Self {
        Self { scoped, reptiles }
    }

    pub fn scoped(&self) -> &OwnerScoped<Enclosure, EnclosureDto> {
        &self.scoped
    }

    pub async fn create(&self, ctx: &AuthContext, dto: EnclosureDto) -> ServiceResult<EnclosureDto> {
        self.scoped.create(ctx, dto).await
    }

    pub async fn get(&self, ctx: &AuthContext, id: impl Into<Option<i64>> + Send) -> ServiceResult<EnclosureDto> {
        self.scoped.find_by_id(ctx, id).await
    }

    pub async fn list(&self, ctx: &AuthContext) -> ServiceResult<Vec<EnclosureDto>> {
        self.scoped.find_all_by_owner(ctx).await
    }

    pub async fn page(&self, ctx: &AuthContext, request: PageRequest) -> ServiceResult<Page<EnclosureDto>> {
        self.scoped.find_all(ctx, request).await
    }

    pub async fn update(&self, ctx: &AuthContext, dto: EnclosureDto) -> ServiceResult<EnclosureDto> {
        self.scoped.update(ctx, dto).await
    }

    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> ServiceResult<()> {
        self.scoped.delete_by_id(ctx, id).await
    }

    pub async fn verify_ownership(&self, ctx: &AuthContext, id: i64) -> ServiceResult<()> {
        self.scoped.verify_ownership(ctx, &id).await
    }

    async fn list_where(&self, ctx: &AuthContext, example: Example) -> ServiceResult<Vec<EnclosureDto>> {
        let sort = self.scoped.inner().default_sort().clone();
        self.scoped.list_matching(ctx, example, &sort).await
    }

    pub async fn by_type(&self, ctx: &AuthContext, enclosure_type: EnclosureType) -> ServiceResult<Vec<EnclosureDto>> {
        self.list_where(
            ctx,
            Example::matching_all().and_equals("enclosure_type", enclosure_type),
        )
        .await
    }

    /// Enclosures whose name contains `name`, ignoring case
    pub async fn by_name(&self, ctx: &AuthContext, name: &str) -> ServiceResult<Vec<EnclosureDto>> {
        let probe = EnclosureDto {
            name: Some(name.to_string()),
            ..Default::default()
        };
        let example = Example::of_with(
            &probe,
            ExampleMatcher::matching()
                .with_string_matcher(StringMatcher::Containing)
                .with_ignore_case(),
        )?;
        self.list_where(ctx, example).await
    }

    /// Ids of the caller's enclosures that house at least one of the caller's reptiles
    pub async fn occupied_ids(&self, ctx: &AuthContext) -> ServiceResult<Vec<i64>> {
        let owner = self.scoped.current_owner(ctx).await?;
        let housed: BTreeSet<i64> = self
            .reptiles
            .find_all_by_example(&owner_example::<Reptile>(&owner), &Sort::unsorted())
            .await?
            .into_iter()
            .filter_map(|reptile| reptile.enclosure_id)
            .collect();

        let enclosures = self
            .scoped
            .find_all_matching(ctx, Example::matching_all().and_in("id", Self::values(&housed)), &Sort::asc("id"))
            .await?;
        debug!(count = enclosures.len(), "occupied enclosures");
        Ok(enclosures.into_iter().filter_map(|e| e.id).collect())
    }

    fn values(ids: &BTreeSet<i64>) -> Vec<FieldValue> {
        ids.iter().copied().map(FieldValue::from).collect()
    }

    /// The caller's enclosures without reptiles
    pub async fn empty(&self, ctx: &AuthContext) -> ServiceResult<Vec<EnclosureDto>> {
        let occupied: BTreeSet<i64> = self.occupied_ids(ctx).await?.into_iter().collect();
        self.list_where(ctx, Example::matching_all().and_not_in("id", Self::values(&occupied)))
            .await
    }

    /// True when no reptile of the caller lives in the enclosure
    pub async fn can_delete(&self, ctx: &AuthContext, id: i64) -> ServiceResult<bool> {
        Ok(!self.occupied_ids(ctx).await?.contains(&id))
    }

    pub async fn statistics(&self, ctx: &AuthContext) -> ServiceResult<EnclosureStatistics> {
        let enclosures = self
            .scoped
            .find_all_matching(ctx, Example::matching_all(), &Sort::unsorted())
            .await?;
        let occupied = self.occupied_ids(ctx).await?.into_iter().collect();
        Ok(enclosure_statistics(&enclosures, &occupied))
    }
}

#[async_trait]
impl ParentGuard<i64> for EnclosureService {
    async fn ensure_visible(&self, ctx: &AuthContext, parent_id: &i64) -> ServiceResult<()> {
        self.scoped.ensure_visible(ctx, parent_id).await
    }
}

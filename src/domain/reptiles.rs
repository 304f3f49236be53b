//! Reptiles of the calling keeper

use crate::core::auth::AuthContext;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::example::{Example, ExampleMatcher, StringMatcher};
use crate::core::mapper::MappingConditions;
use crate::core::ownership::{OwnerScoped, ParentGuard};
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::repository::Repository;
use crate::core::service::{EntityService, RelationshipHook};
use crate::domain::statistics::{ReptileStatistics, reptile_statistics};
use crate::entities::{Reptile, ReptileDto, ReptileImage, ReptileStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Checks the enclosure and highlight image a reptile points at during update
pub struct ReptileRelationships {
    reptiles: EntityService<Reptile, ReptileDto>,
    enclosures: Arc<dyn ParentGuard<i64>>,
    images: Arc<dyn Repository<ReptileImage>>,
}

impl ReptileRelationships {
    pub fn new(
        reptiles: EntityService<Reptile, ReptileDto>,
        enclosures: Arc<dyn ParentGuard<i64>>,
        images: Arc<dyn Repository<ReptileImage>>,
    ) -> Self {
        Self {
            reptiles,
            enclosures,
            images,
        }
    }
}

#[async_trait]
impl RelationshipHook<Reptile, ReptileDto> for ReptileRelationships {
    async fn handle_entity_relationships(
        &self,
        ctx: &AuthContext,
        record: &mut Reptile,
        _dto: &ReptileDto,
        _conditions: &MappingConditions,
    ) -> ServiceResult<()> {
        if let Some(enclosure_id) = record.enclosure_id {
            match self.enclosures.ensure_visible(ctx, &enclosure_id).await {
                Ok(()) => {}
                Err(ServiceError::NotFound { .. }) => {
                    return Err(self
                        .reptiles
                        .failed_related_entity_load(ctx, "enclosure", enclosure_id));
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(image_id) = record.highlight_image_id {
            let image = self.images.find_by_id(&image_id).await?;
            if record.id.is_none() || image.and_then(|image| image.reptile_id) != record.id {
                return Err(self
                    .reptiles
                    .failed_related_entity_load(ctx, "image", image_id));
            }
        }
        Ok(())
    }
}

/// Owner-scoped reptile operations
#[derive(Clone)]
pub struct ReptileService {
    scoped: OwnerScoped<Reptile, ReptileDto>,
    enclosures: Arc<dyn ParentGuard<i64>>,
    images: Arc<dyn Repository<ReptileImage>>,
}

impl ReptileService {
    pub fn new(
        scoped: OwnerScoped<Reptile, ReptileDto>,
        enclosures: Arc<dyn ParentGuard<i64>>,
        images: Arc<dyn Repository<ReptileImage>>,
    ) -> Self {
        Self {
            scoped,
            enclosures,
            images,
        }
    }

    pub fn scoped(&self) -> &OwnerScoped<Reptile, ReptileDto> {
        &self.scoped
    }

    async fn check_enclosure(&self, ctx: &AuthContext, enclosure_id: Option<i64>) -> ServiceResult<()> {
        match enclosure_id {
            Some(id) => self.enclosures.ensure_visible(ctx, &id).await.map_err(|e| match e {
                ServiceError::NotFound { .. } => {
                    ServiceError::invalid_argument("Reptile", format!("enclosure '{}' does not exist", id))
                }
                e => e,
            }),
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // CRUD
    // -------------------------------------------------------------------------

    /// Create a reptile for the caller; its enclosure must be the caller's too
    pub async fn create(&self, ctx: &AuthContext, dto: ReptileDto) -> ServiceResult<ReptileDto> {
        self.check_enclosure(ctx, dto.enclosure_id).await?;
        self.scoped.create(ctx, dto).await
    }

    pub async fn get(&self, ctx: &AuthContext, id: impl Into<Option<i64>> + Send) -> ServiceResult<ReptileDto> {
        self.scoped.find_by_id(ctx, id).await
    }

    /// Like [`ReptileService::get`], with the age in days filled in
    pub async fn get_with_age(&self, ctx: &AuthContext, id: i64) -> ServiceResult<ReptileDto> {
        let conditions = MappingConditions::none().with(crate::entities::reptile::WITH_AGE, true);
        self.scoped.find_by_id_with(ctx, id, &conditions).await
    }

    pub async fn list(&self, ctx: &AuthContext) -> ServiceResult<Vec<ReptileDto>> {
        self.scoped.find_all_by_owner(ctx).await
    }

    pub async fn page(&self, ctx: &AuthContext, request: PageRequest) -> ServiceResult<Page<ReptileDto>> {
        self.scoped.find_all(ctx, request).await
    }

    pub async fn update(&self, ctx: &AuthContext, dto: ReptileDto) -> ServiceResult<ReptileDto> {
        self.scoped.update(ctx, dto).await
    }

    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> ServiceResult<()> {
        self.scoped.delete_by_id(ctx, id).await
    }

    pub async fn verify_ownership(&self, ctx: &AuthContext, id: i64) -> ServiceResult<()> {
        self.scoped.verify_ownership(ctx, &id).await
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    async fn list_where(&self, ctx: &AuthContext, example: Example) -> ServiceResult<Vec<ReptileDto>> {
        let sort = self.scoped.inner().default_sort().clone();
        self.scoped.list_matching(ctx, example, &sort).await
    }

    pub async fn active(&self, ctx: &AuthContext) -> ServiceResult<Vec<ReptileDto>> {
        self.list_where(ctx, Example::matching_all().and_equals("status", ReptileStatus::Active))
            .await
    }

    pub async fn by_species(&self, ctx: &AuthContext, species: &str) -> ServiceResult<Vec<ReptileDto>> {
        self.list_where(ctx, Example::matching_all().and_equals("species", species))
            .await
    }

    /// Reptiles whose name contains `name`, ignoring case
    pub async fn by_name(&self, ctx: &AuthContext, name: &str) -> ServiceResult<Vec<ReptileDto>> {
        let probe = ReptileDto {
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

    pub async fn by_enclosure(&self, ctx: &AuthContext, enclosure_id: i64) -> ServiceResult<Vec<ReptileDto>> {
        self.list_where(ctx, Example::matching_all().and_equals("enclosure_id", enclosure_id))
            .await
    }

    pub async fn statistics(&self, ctx: &AuthContext) -> ServiceResult<ReptileStatistics> {
        let reptiles = self
            .scoped
            .find_all_matching(ctx, Example::matching_all(), &Sort::unsorted())
            .await?;
        Ok(reptile_statistics(&reptiles))
    }

    // -------------------------------------------------------------------------
    // Targeted changes
    // -------------------------------------------------------------------------

    /// Move a reptile into another of the caller's enclosures, or out of any with `None`
    pub async fn move_to_enclosure(
        &self,
        ctx: &AuthContext,
        reptile_id: i64,
        enclosure_id: Option<i64>,
    ) -> ServiceResult<ReptileDto> {
        self.check_enclosure(ctx, enclosure_id).await?;
        let moved = self
            .scoped
            .modify(ctx, &reptile_id, |reptile| reptile.enclosure_id = enclosure_id)
            .await?;
        info!("moved reptile {} to enclosure {:?}", reptile_id, enclosure_id);
        Ok(moved)
    }

    pub async fn update_status(
        &self,
        ctx: &AuthContext,
        reptile_id: i64,
        status: ReptileStatus,
    ) -> ServiceResult<ReptileDto> {
        self.scoped
            .modify(ctx, &reptile_id, |reptile| reptile.status = Some(status))
            .await
    }

    /// Make an image of this reptile its highlight
    ///
    /// Fails with `InvalidArgument` when the image does not exist or shows
    /// another reptile.
    pub async fn set_highlight_image(
        &self,
        ctx: &AuthContext,
        reptile_id: i64,
        image_id: i64,
    ) -> ServiceResult<ReptileDto> {
        let reptile = self.scoped.load_owned(ctx, &reptile_id).await?;

        let image = self.images.find_by_id(&image_id).await?;
        if image.and_then(|image| image.reptile_id) != Some(reptile_id) {
            warn!("image {} does not belong to reptile {}", image_id, reptile_id);
            return Err(ServiceError::invalid_argument(
                "Reptile",
                format!("image '{}' does not belong to reptile '{}'", image_id, reptile_id),
            ));
        }

        let mut reptile = reptile;
        reptile.highlight_image_id = Some(image_id);
        self.scoped
            .inner()
            .save_modified(ctx, reptile, &MappingConditions::none())
            .await
    }

    pub async fn remove_highlight_image(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<ReptileDto> {
        self.scoped
            .modify(ctx, &reptile_id, |reptile| reptile.highlight_image_id = None)
            .await
    }
}

#[async_trait]
impl ParentGuard<i64> for ReptileService {
    async fn ensure_visible(&self, ctx: &AuthContext, parent_id: &i64) -> ServiceResult<()> {
        self.scoped.ensure_visible(ctx, parent_id).await
    }
}

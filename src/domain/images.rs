//! Reptile images
//!
//! Uploads are checked for size and content type before anything is stored.
//! The first image of a reptile becomes its highlight when that can be set,
//! and deleting the highlight image clears the reference on the reptile.

use crate::core::auth::AuthContext;
use crate::core::error::{ServiceError, ServiceResult};
use crate::domain::logs::LogService;
use crate::domain::reptiles::ReptileService;
use crate::entities::{ReptileImage, ReptileImageDto};
use tracing::{info, warn};

/// Largest accepted upload, in bytes
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted for upload
pub const SUPPORTED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp", "image/bmp"];

/// One uploaded file
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub description: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct ReptileImageService {
    logs: LogService<ReptileImage, ReptileImageDto>,
    reptiles: ReptileService,
}

impl ReptileImageService {
    pub fn new(logs: LogService<ReptileImage, ReptileImageDto>, reptiles: ReptileService) -> Self {
        Self { logs, reptiles }
    }

    pub fn logs(&self) -> &LogService<ReptileImage, ReptileImageDto> {
        &self.logs
    }

    fn validate(upload: &ImageUpload) -> ServiceResult<()> {
        let invalid = |message: String| ServiceError::invalid_argument("ReptileImage", message);

        if upload.data.is_empty() {
            return Err(invalid("file is empty".to_string()));
        }
        if upload.data.len() > MAX_IMAGE_SIZE {
            return Err(invalid(format!(
                "file size exceeds maximum of {} bytes",
                MAX_IMAGE_SIZE
            )));
        }
        let content_type = upload.content_type.to_lowercase();
        if !SUPPORTED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(invalid(format!(
                "unsupported file type '{}'",
                upload.content_type
            )));
        }
        Ok(())
    }

    /// Store an image for one of the caller's reptiles
    pub async fn upload(
        &self,
        ctx: &AuthContext,
        reptile_id: i64,
        upload: ImageUpload,
    ) -> ServiceResult<ReptileImageDto> {
        Self::validate(&upload)?;

        let image = ReptileImage::upload(
            reptile_id,
            upload.filename,
            upload.content_type,
            upload.description,
            upload.data,
        );
        let saved = self.logs.create_entity(ctx, image).await?;

        if let Some(image_id) = saved.id {
            if let Err(e) = self.highlight_first_image(ctx, reptile_id, image_id).await {
                warn!(
                    "image {} stored without becoming highlight of reptile {}: {}",
                    image_id, reptile_id, e
                );
            }
        }

        Ok(self.logs.inner().mapper().to_dto(&saved))
    }

    /// The image stays stored when this fails
    async fn highlight_first_image(&self, ctx: &AuthContext, reptile_id: i64, image_id: i64) -> ServiceResult<()> {
        if self.logs.count_for(ctx, reptile_id).await? == 1 {
            self.reptiles
                .set_highlight_image(ctx, reptile_id, image_id)
                .await?;
            info!("image {} is now the highlight of reptile {}", image_id, reptile_id);
        }
        Ok(())
    }

    /// Metadata of one image
    pub async fn get(&self, ctx: &AuthContext, image_id: i64) -> ServiceResult<ReptileImageDto> {
        self.logs.get(ctx, image_id).await
    }

    /// Content type and bytes of one image
    pub async fn image_data(&self, ctx: &AuthContext, image_id: i64) -> ServiceResult<(String, Vec<u8>)> {
        let image = self.logs.load_visible(ctx, image_id).await?;
        self.logs.inner().record_access(ctx, &image_id);
        Ok((image.content_type.unwrap_or_default(), image.image_data))
    }

    /// Images of a reptile, newest first
    pub async fn for_reptile(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<Vec<ReptileImageDto>> {
        self.logs.history(ctx, reptile_id).await
    }

    pub async fn count(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<usize> {
        self.logs.count_for(ctx, reptile_id).await
    }

    /// Delete an image, clearing it as highlight where it was one
    pub async fn delete(&self, ctx: &AuthContext, image_id: i64) -> ServiceResult<()> {
        let image = self.logs.load_visible(ctx, image_id).await?;

        if let Some(reptile_id) = image.reptile_id {
            let reptile = self.reptiles.scoped().load_owned(ctx, &reptile_id).await?;
            if reptile.highlight_image_id == Some(image_id) {
                self.reptiles.remove_highlight_image(ctx, reptile_id).await?;
                info!("cleared highlight image of reptile {}", reptile_id);
            }
        }

        self.logs.delete(ctx, image_id).await
    }

    /// Delete every image of a reptile and return how many were removed
    pub async fn delete_all_for(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<usize> {
        let removed = self.logs.delete_all_for(ctx, reptile_id).await?;
        if removed > 0 {
            self.reptiles.remove_highlight_image(ctx, reptile_id).await?;
        }
        Ok(removed)
    }
}

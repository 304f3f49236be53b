//! Images attached to a reptile
//!
//! The binary payload lives only on the record. Transfer objects carry the
//! metadata, and the bytes are fetched through a dedicated service call.

use super::{LogDto, LogRecord};
use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{impl_record, impl_transfer_object};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct ReptileImage {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub size: Option<i64>,
    pub image_data: Vec<u8>,
}

impl_record!(
    ReptileImage,
    i64,
    [reptile_id, filename, content_type, description, size]
);

impl LogRecord for ReptileImage {
    const PARENT_FIELD: &'static str = "reptile_id";
    const DATE_FIELD: &'static str = "created_at";

    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl Updatable<ReptileImageDto> for ReptileImage {
    fn apply_update(&mut self, dto: &ReptileImageDto) {
        if dto.reptile_id.is_some() {
            self.reptile_id = dto.reptile_id;
        }
        if dto.filename.is_some() {
            self.filename = dto.filename.clone();
        }
        if dto.content_type.is_some() {
            self.content_type = dto.content_type.clone();
        }
        if dto.size.is_some() {
            self.size = dto.size;
        }
        self.description = dto.description.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReptileImageDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub size: Option<i64>,
}

impl_transfer_object!(
    ReptileImageDto,
    i64,
    [reptile_id, filename, content_type, description, size]
);

impl LogDto for ReptileImageDto {
    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl ReptileImage {
    /// Build a new image record from an upload
    pub fn upload(
        reptile_id: i64,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        description: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: None,
            audit: AuditFields::default(),
            reptile_id: Some(reptile_id),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            description,
            size: Some(data.len() as i64),
            image_data: data,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReptileImageMapper;

impl Mapper<ReptileImage, ReptileImageDto> for ReptileImageMapper {
    fn to_dto_with(&self, record: &ReptileImage, _conditions: &MappingConditions) -> ReptileImageDto {
        ReptileImageDto {
            id: record.id,
            audit: record.audit.clone(),
            reptile_id: record.reptile_id,
            filename: record.filename.clone(),
            content_type: record.content_type.clone(),
            description: record.description.clone(),
            size: record.size,
        }
    }

    fn map_to_record(&self, dto: &ReptileImageDto) -> ReptileImage {
        ReptileImage {
            id: dto.id,
            audit: AuditFields::default(),
            reptile_id: dto.reptile_id,
            filename: dto.filename.clone(),
            content_type: dto.content_type.clone(),
            description: dto.description.clone(),
            size: dto.size,
            image_data: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_records_size() {
        let image = ReptileImage::upload(4, "monty.png", "image/png", None, vec![0u8; 12]);
        assert_eq!(image.size, Some(12));
        assert_eq!(image.reptile_id, Some(4));
    }

    #[test]
    fn test_dto_never_carries_bytes() {
        let image = ReptileImage::upload(4, "monty.png", "image/png", None, vec![1, 2, 3]);
        let json = serde_json::to_value(ReptileImageMapper.to_dto(&image)).unwrap();
        assert!(json.get("image_data").is_none());
        assert_eq!(json["filename"], "monty.png");
    }
}

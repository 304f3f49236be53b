//! Shedding log entries of a reptile

use super::{LogDto, LogRecord};
use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{impl_record, impl_transfer_object};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct SheddingLog {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub shedding_date: Option<DateTime<Utc>>,
    pub shed_quality: Option<String>,
    pub ate_shed: Option<bool>,
    pub notes: Option<String>,
}

impl_record!(SheddingLog, i64, [reptile_id, shedding_date, shed_quality, ate_shed, notes]);

impl LogRecord for SheddingLog {
    const PARENT_FIELD: &'static str = "reptile_id";
    const DATE_FIELD: &'static str = "shedding_date";

    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl Updatable<SheddingLogDto> for SheddingLog {
    fn apply_update(&mut self, dto: &SheddingLogDto) {
        if dto.reptile_id.is_some() {
            self.reptile_id = dto.reptile_id;
        }
        if dto.shedding_date.is_some() {
            self.shedding_date = dto.shedding_date;
        }
        if dto.shed_quality.is_some() {
            self.shed_quality = dto.shed_quality.clone();
        }
        self.ate_shed = dto.ate_shed;
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheddingLogDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub shedding_date: Option<DateTime<Utc>>,
    pub shed_quality: Option<String>,
    pub ate_shed: Option<bool>,
    pub notes: Option<String>,
}

impl_transfer_object!(
    SheddingLogDto,
    i64,
    [reptile_id, shedding_date, shed_quality, ate_shed, notes]
);

impl LogDto for SheddingLogDto {
    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl SheddingLogDto {
    pub fn new(reptile_id: i64, shedding_date: DateTime<Utc>, shed_quality: impl Into<String>) -> Self {
        Self {
            reptile_id: Some(reptile_id),
            shedding_date: Some(shedding_date),
            shed_quality: Some(shed_quality.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SheddingLogMapper;

impl Mapper<SheddingLog, SheddingLogDto> for SheddingLogMapper {
    fn to_dto_with(&self, record: &SheddingLog, _conditions: &MappingConditions) -> SheddingLogDto {
        SheddingLogDto {
            id: record.id,
            audit: record.audit.clone(),
            reptile_id: record.reptile_id,
            shedding_date: record.shedding_date,
            shed_quality: record.shed_quality.clone(),
            ate_shed: record.ate_shed,
            notes: record.notes.clone(),
        }
    }

    fn map_to_record(&self, dto: &SheddingLogDto) -> SheddingLog {
        SheddingLog {
            id: dto.id,
            audit: AuditFields::default(),
            reptile_id: dto.reptile_id,
            shedding_date: dto.shedding_date,
            shed_quality: dto.shed_quality.clone(),
            ate_shed: dto.ate_shed,
            notes: dto.notes.clone(),
        }
    }
}

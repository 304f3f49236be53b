//! Feeding log entries of a reptile

use super::{LogDto, LogRecord};
use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{impl_record, impl_transfer_object};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct FeedingLog {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub feeding_date: Option<DateTime<Utc>>,
    pub food_type: Option<String>,
    pub quantity: Option<String>,
    /// Whether the animal took the food; missed feedings are `false`
    pub ate: Option<bool>,
    pub notes: Option<String>,
}

impl_record!(FeedingLog, i64, [reptile_id, feeding_date, food_type, quantity, ate, notes]);

impl LogRecord for FeedingLog {
    const PARENT_FIELD: &'static str = "reptile_id";
    const DATE_FIELD: &'static str = "feeding_date";

    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl Updatable<FeedingLogDto> for FeedingLog {
    fn apply_update(&mut self, dto: &FeedingLogDto) {
        if dto.reptile_id.is_some() {
            self.reptile_id = dto.reptile_id;
        }
        if dto.feeding_date.is_some() {
            self.feeding_date = dto.feeding_date;
        }
        if dto.food_type.is_some() {
            self.food_type = dto.food_type.clone();
        }
        if dto.quantity.is_some() {
            self.quantity = dto.quantity.clone();
        }
        if dto.ate.is_some() {
            self.ate = dto.ate;
        }
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedingLogDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub feeding_date: Option<DateTime<Utc>>,
    pub food_type: Option<String>,
    pub quantity: Option<String>,
    pub ate: Option<bool>,
    pub notes: Option<String>,
}

impl_transfer_object!(
    FeedingLogDto,
    i64,
    [reptile_id, feeding_date, food_type, quantity, ate, notes]
);

impl LogDto for FeedingLogDto {
    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl FeedingLogDto {
    pub fn new(reptile_id: i64, feeding_date: DateTime<Utc>, food_type: impl Into<String>) -> Self {
        Self {
            reptile_id: Some(reptile_id),
            feeding_date: Some(feeding_date),
            food_type: Some(food_type.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FeedingLogMapper;

impl Mapper<FeedingLog, FeedingLogDto> for FeedingLogMapper {
    fn to_dto_with(&self, record: &FeedingLog, _conditions: &MappingConditions) -> FeedingLogDto {
        FeedingLogDto {
            id: record.id,
            audit: record.audit.clone(),
            reptile_id: record.reptile_id,
            feeding_date: record.feeding_date,
            food_type: record.food_type.clone(),
            quantity: record.quantity.clone(),
            ate: record.ate,
            notes: record.notes.clone(),
        }
    }

    fn map_to_record(&self, dto: &FeedingLogDto) -> FeedingLog {
        FeedingLog {
            id: dto.id,
            audit: AuditFields::default(),
            reptile_id: dto.reptile_id,
            feeding_date: dto.feeding_date,
            food_type: dto.food_type.clone(),
            quantity: dto.quantity.clone(),
            ate: Some(dto.ate.unwrap_or(true)),
            notes: dto.notes.clone(),
        }
    }
}

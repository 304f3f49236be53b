//! Weight measurements of a reptile

use super::{LogDto, LogRecord};
use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{impl_record, impl_transfer_object};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct WeightLog {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub measurement_date: Option<DateTime<Utc>>,
    pub weight_grams: Option<f64>,
    pub notes: Option<String>,
}

impl_record!(WeightLog, i64, [reptile_id, measurement_date, weight_grams, notes]);

impl LogRecord for WeightLog {
    const PARENT_FIELD: &'static str = "reptile_id";
    const DATE_FIELD: &'static str = "measurement_date";

    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl Updatable<WeightLogDto> for WeightLog {
    fn apply_update(&mut self, dto: &WeightLogDto) {
        if dto.reptile_id.is_some() {
            self.reptile_id = dto.reptile_id;
        }
        if dto.measurement_date.is_some() {
            self.measurement_date = dto.measurement_date;
        }
        if dto.weight_grams.is_some() {
            self.weight_grams = dto.weight_grams;
        }
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightLogDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub measurement_date: Option<DateTime<Utc>>,
    pub weight_grams: Option<f64>,
    pub notes: Option<String>,
}

impl_transfer_object!(WeightLogDto, i64, [reptile_id, measurement_date, weight_grams, notes]);

impl LogDto for WeightLogDto {
    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl WeightLogDto {
    pub fn new(reptile_id: i64, measurement_date: DateTime<Utc>, weight_grams: f64) -> Self {
        Self {
            reptile_id: Some(reptile_id),
            measurement_date: Some(measurement_date),
            weight_grams: Some(weight_grams),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WeightLogMapper;

impl Mapper<WeightLog, WeightLogDto> for WeightLogMapper {
    fn to_dto_with(&self, record: &WeightLog, _conditions: &MappingConditions) -> WeightLogDto {
        WeightLogDto {
            id: record.id,
            audit: record.audit.clone(),
            reptile_id: record.reptile_id,
            measurement_date: record.measurement_date,
            weight_grams: record.weight_grams,
            notes: record.notes.clone(),
        }
    }

    fn map_to_record(&self, dto: &WeightLogDto) -> WeightLog {
        WeightLog {
            id: dto.id,
            audit: AuditFields::default(),
            reptile_id: dto.reptile_id,
            measurement_date: dto.measurement_date,
            weight_grams: dto.weight_grams,
            notes: dto.notes.clone(),
        }
    }
}

//! Droppings log of a reptile

use super::{LogDto, LogRecord};
use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{field_enum, impl_record, impl_transfer_object};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

field_enum!(
    Consistency {
        #[default]
        Normal => "NORMAL",
        Runny => "RUNNY",
        Hard => "HARD",
        Watery => "WATERY",
    }
);

#[derive(Debug, Clone, Default)]
pub struct PoopLog {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub poop_date: Option<DateTime<Utc>>,
    pub consistency: Option<Consistency>,
    pub color: Option<String>,
    pub parasites_present: Option<bool>,
    pub notes: Option<String>,
}

impl_record!(
    PoopLog,
    i64,
    [reptile_id, poop_date, consistency, color, parasites_present, notes]
);

impl LogRecord for PoopLog {
    const PARENT_FIELD: &'static str = "reptile_id";
    const DATE_FIELD: &'static str = "poop_date";

    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl Updatable<PoopLogDto> for PoopLog {
    fn apply_update(&mut self, dto: &PoopLogDto) {
        if dto.reptile_id.is_some() {
            self.reptile_id = dto.reptile_id;
        }
        if dto.poop_date.is_some() {
            self.poop_date = dto.poop_date;
        }
        if dto.consistency.is_some() {
            self.consistency = dto.consistency;
        }
        if dto.parasites_present.is_some() {
            self.parasites_present = dto.parasites_present;
        }
        self.color = dto.color.clone();
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoopLogDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub reptile_id: Option<i64>,
    pub poop_date: Option<DateTime<Utc>>,
    pub consistency: Option<Consistency>,
    pub color: Option<String>,
    pub parasites_present: Option<bool>,
    pub notes: Option<String>,
}

impl_transfer_object!(
    PoopLogDto,
    i64,
    [reptile_id, poop_date, consistency, color, parasites_present, notes]
);

impl LogDto for PoopLogDto {
    fn parent_id(&self) -> Option<i64> {
        self.reptile_id
    }
}

impl PoopLogDto {
    pub fn new(reptile_id: i64, poop_date: DateTime<Utc>, consistency: Consistency) -> Self {
        Self {
            reptile_id: Some(reptile_id),
            poop_date: Some(poop_date),
            consistency: Some(consistency),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PoopLogMapper;

impl Mapper<PoopLog, PoopLogDto> for PoopLogMapper {
    fn to_dto_with(&self, record: &PoopLog, _conditions: &MappingConditions) -> PoopLogDto {
        PoopLogDto {
            id: record.id,
            audit: record.audit.clone(),
            reptile_id: record.reptile_id,
            poop_date: record.poop_date,
            consistency: record.consistency,
            color: record.color.clone(),
            parasites_present: record.parasites_present,
            notes: record.notes.clone(),
        }
    }

    fn map_to_record(&self, dto: &PoopLogDto) -> PoopLog {
        PoopLog {
            id: dto.id,
            audit: AuditFields::default(),
            reptile_id: dto.reptile_id,
            poop_date: dto.poop_date,
            consistency: dto.consistency,
            color: dto.color.clone(),
            parasites_present: Some(dto.parasites_present.unwrap_or(false)),
            notes: dto.notes.clone(),
        }
    }
}

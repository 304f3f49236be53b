//! Cleaning log of an enclosure

use super::{LogDto, LogRecord};
use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{field_enum, impl_record, impl_transfer_object};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

field_enum!(
    CleaningType {
        #[default]
        SpotClean => "SPOT_CLEAN",
        FullClean => "FULL_CLEAN",
        WaterChange => "WATER_CHANGE",
        DeepClean => "DEEP_CLEAN",
    }
);

#[derive(Debug, Clone, Default)]
pub struct EnclosureCleaning {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub enclosure_id: Option<i64>,
    pub cleaning_date: Option<DateTime<Utc>>,
    pub cleaning_type: Option<CleaningType>,
    pub substrate_changed: Option<bool>,
    pub disinfected: Option<bool>,
    pub notes: Option<String>,
}

impl_record!(
    EnclosureCleaning,
    i64,
    [enclosure_id, cleaning_date, cleaning_type, substrate_changed, disinfected, notes]
);

impl LogRecord for EnclosureCleaning {
    const PARENT_FIELD: &'static str = "enclosure_id";
    const DATE_FIELD: &'static str = "cleaning_date";

    fn parent_id(&self) -> Option<i64> {
        self.enclosure_id
    }
}

impl Updatable<EnclosureCleaningDto> for EnclosureCleaning {
    fn apply_update(&mut self, dto: &EnclosureCleaningDto) {
        if dto.enclosure_id.is_some() {
            self.enclosure_id = dto.enclosure_id;
        }
        if dto.cleaning_date.is_some() {
            self.cleaning_date = dto.cleaning_date;
        }
        if dto.cleaning_type.is_some() {
            self.cleaning_type = dto.cleaning_type;
        }
        if dto.substrate_changed.is_some() {
            self.substrate_changed = dto.substrate_changed;
        }
        if dto.disinfected.is_some() {
            self.disinfected = dto.disinfected;
        }
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnclosureCleaningDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub enclosure_id: Option<i64>,
    pub cleaning_date: Option<DateTime<Utc>>,
    pub cleaning_type: Option<CleaningType>,
    pub substrate_changed: Option<bool>,
    pub disinfected: Option<bool>,
    pub notes: Option<String>,
}

impl_transfer_object!(
    EnclosureCleaningDto,
    i64,
    [enclosure_id, cleaning_date, cleaning_type, substrate_changed, disinfected, notes]
);

impl LogDto for EnclosureCleaningDto {
    fn parent_id(&self) -> Option<i64> {
        self.enclosure_id
    }
}

impl EnclosureCleaningDto {
    pub fn new(enclosure_id: i64, cleaning_date: DateTime<Utc>, cleaning_type: CleaningType) -> Self {
        Self {
            enclosure_id: Some(enclosure_id),
            cleaning_date: Some(cleaning_date),
            cleaning_type: Some(cleaning_type),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnclosureCleaningMapper;

impl Mapper<EnclosureCleaning, EnclosureCleaningDto> for EnclosureCleaningMapper {
    fn to_dto_with(
        &self,
        record: &EnclosureCleaning,
        _conditions: &MappingConditions,
    ) -> EnclosureCleaningDto {
        EnclosureCleaningDto {
            id: record.id,
            audit: record.audit.clone(),
            enclosure_id: record.enclosure_id,
            cleaning_date: record.cleaning_date,
            cleaning_type: record.cleaning_type,
            substrate_changed: record.substrate_changed,
            disinfected: record.disinfected,
            notes: record.notes.clone(),
        }
    }

    fn map_to_record(&self, dto: &EnclosureCleaningDto) -> EnclosureCleaning {
        EnclosureCleaning {
            id: dto.id,
            audit: AuditFields::default(),
            enclosure_id: dto.enclosure_id,
            cleaning_date: dto.cleaning_date,
            cleaning_type: dto.cleaning_type,
            substrate_changed: Some(dto.substrate_changed.unwrap_or(false)),
            disinfected: Some(dto.disinfected.unwrap_or(false)),
            notes: dto.notes.clone(),
        }
    }
}

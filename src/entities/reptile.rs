//! Reptiles, owned by a user and optionally housed in an enclosure

use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Owned, OwnedTransferObject, Updatable};
use crate::{field_enum, impl_record, impl_transfer_object};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Mapping condition that fills [`ReptileDto::age_days`]
pub const WITH_AGE: &str = "with_age";

field_enum!(
    ReptileGender {
        #[default]
        Unknown => "UNKNOWN",
        Male => "MALE",
        Female => "FEMALE",
    }
);

field_enum!(
    /// Where a reptile stands in its life with the keeper
    ReptileStatus {
        #[default]
        Active => "ACTIVE",
        Quarantine => "QUARANTINE",
        Deceased => "DECEASED",
        Sold => "SOLD",
    }
);

#[derive(Debug, Clone, Default)]
pub struct Reptile {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub name: Option<String>,
    pub species: Option<String>,
    pub subspecies: Option<String>,
    pub gender: Option<ReptileGender>,
    pub birth_date: Option<NaiveDate>,
    pub acquisition_date: Option<NaiveDate>,
    pub enclosure_id: Option<i64>,
    pub status: Option<ReptileStatus>,
    pub notes: Option<String>,
    pub highlight_image_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl_record!(
    Reptile,
    i64,
    [
        name,
        species,
        subspecies,
        gender,
        birth_date,
        acquisition_date,
        enclosure_id,
        status,
        notes,
        highlight_image_id,
        user_id
    ]
);

impl Owned for Reptile {
    type OwnerId = i64;
    const OWNER_FIELD: &'static str = "user_id";

    fn owner_id(&self) -> Option<i64> {
        self.user_id
    }
}

impl Updatable<ReptileDto> for Reptile {
    fn apply_update(&mut self, dto: &ReptileDto) {
        if dto.name.is_some() {
            self.name = dto.name.clone();
        }
        if dto.species.is_some() {
            self.species = dto.species.clone();
        }
        self.subspecies = dto.subspecies.clone();
        if dto.gender.is_some() {
            self.gender = dto.gender;
        }
        self.birth_date = dto.birth_date;
        if dto.acquisition_date.is_some() {
            self.acquisition_date = dto.acquisition_date;
        }
        self.enclosure_id = dto.enclosure_id;
        if dto.status.is_some() {
            self.status = dto.status;
        }
        self.notes = dto.notes.clone();
        self.highlight_image_id = dto.highlight_image_id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReptileDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub name: Option<String>,
    pub species: Option<String>,
    pub subspecies: Option<String>,
    pub gender: Option<ReptileGender>,
    pub birth_date: Option<NaiveDate>,
    pub acquisition_date: Option<NaiveDate>,
    pub enclosure_id: Option<i64>,
    pub status: Option<ReptileStatus>,
    pub notes: Option<String>,
    pub highlight_image_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Derived, only filled when mapped with [`WITH_AGE`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_days: Option<i64>,
}

impl_transfer_object!(
    ReptileDto,
    i64,
    [
        name,
        species,
        subspecies,
        gender,
        birth_date,
        acquisition_date,
        enclosure_id,
        status,
        notes,
        highlight_image_id,
        user_id
    ]
);

impl OwnedTransferObject for ReptileDto {
    type OwnerId = i64;

    fn set_owner_id(&mut self, owner: i64) {
        self.user_id = Some(owner);
    }
}

impl ReptileDto {
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            species: Some(species.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReptileMapper;

impl Mapper<Reptile, ReptileDto> for ReptileMapper {
    fn to_dto_with(&self, record: &Reptile, conditions: &MappingConditions) -> ReptileDto {
        let age_days = if conditions.is_set(WITH_AGE) {
            record
                .birth_date
                .map(|born| (Utc::now().date_naive() - born).num_days())
        } else {
            None
        };

        ReptileDto {
            id: record.id,
            audit: record.audit.clone(),
            name: record.name.clone(),
            species: record.species.clone(),
            subspecies: record.subspecies.clone(),
            gender: record.gender,
            birth_date: record.birth_date,
            acquisition_date: record.acquisition_date,
            enclosure_id: record.enclosure_id,
            status: record.status,
            notes: record.notes.clone(),
            highlight_image_id: record.highlight_image_id,
            user_id: record.user_id,
            age_days,
        }
    }

    fn map_to_record(&self, dto: &ReptileDto) -> Reptile {
        Reptile {
            id: dto.id,
            audit: AuditFields::default(),
            name: dto.name.clone(),
            species: dto.species.clone(),
            subspecies: dto.subspecies.clone(),
            gender: dto.gender,
            birth_date: dto.birth_date,
            acquisition_date: dto.acquisition_date,
            enclosure_id: dto.enclosure_id,
            // new reptiles start active
            status: Some(dto.status.unwrap_or_default()),
            notes: dto.notes.clone(),
            highlight_image_id: dto.highlight_image_id,
            user_id: dto.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapper::apply_update;

    #[test]
    fn test_status_defaults_to_active() {
        let record = ReptileMapper.to_entity(&ReptileDto::new("Monty", "Ball Python"));
        assert_eq!(record.status, Some(ReptileStatus::Active));
    }

    #[test]
    fn test_age_only_with_condition() {
        let record = Reptile {
            birth_date: Utc::now().date_naive().checked_sub_days(chrono::Days::new(10)),
            ..Default::default()
        };
        assert_eq!(ReptileMapper.to_dto(&record).age_days, None);
        let dto =
            ReptileMapper.to_dto_with(&record, &MappingConditions::none().with(WITH_AGE, true));
        assert_eq!(dto.age_days, Some(10));
    }

    #[test]
    fn test_update_clears_optional_keys() {
        let mut record = Reptile {
            id: Some(3),
            name: Some("Monty".into()),
            enclosure_id: Some(1),
            highlight_image_id: Some(9),
            status: Some(ReptileStatus::Quarantine),
            ..Default::default()
        };
        apply_update(
            &ReptileDto {
                id: Some(3),
                ..Default::default()
            },
            &mut record,
        );
        assert_eq!(record.name.as_deref(), Some("Monty"));
        assert_eq!(record.status, Some(ReptileStatus::Quarantine));
        assert_eq!(record.enclosure_id, None);
        assert_eq!(record.highlight_image_id, None);
    }
}
